//! Recursive 3x3 subdivision with an undo stack.

use crate::bindings::{Cell, GRID_SIZE};
use crate::geometry::{center_of, Monitor, Point, Region};

/// Result of stepping back one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackTarget {
    /// Still inside a subdivided region; move the pointer to its center.
    Center(Point),
    /// Back at the full monitor; put the pointer where it was before activation.
    RestoreCursor,
}

#[derive(Debug, Clone, Copy)]
struct Step {
    cell: Cell,
    before: Region,
}

/// Owns the current region and the history of subdivisions for one monitor.
#[derive(Debug, Clone)]
pub struct RegionNavigator {
    monitor: Monitor,
    region: Region,
    history: Vec<Step>,
}

impl RegionNavigator {
    pub fn new(monitor: Monitor) -> Self {
        let region = Region::full(&monitor);
        Self {
            monitor,
            region,
            history: Vec::new(),
        }
    }

    /// Back to the full, inactive monitor region with an empty history.
    pub fn reset(&mut self, monitor: &Monitor) {
        self.monitor = monitor.clone();
        self.region = Region::full(monitor);
        self.history.clear();
    }

    /// Zoom into `cell` of the current region and return its center pixel.
    pub fn subdivide(&mut self, cell: Cell) -> Point {
        self.history.push(Step {
            cell,
            before: self.region,
        });

        let divisor = GRID_SIZE as f64;
        let width = self.region.width / divisor;
        let height = self.region.height / divisor;
        self.region = Region {
            x: self.region.x + cell.col() as f64 * width,
            y: self.region.y + cell.row() as f64 * height,
            width,
            height,
            active: true,
        };
        self.center()
    }

    /// Undo the last subdivision. `None` when there is nothing to undo.
    pub fn go_back(&mut self) -> Option<BackTarget> {
        let step = self.history.pop()?;
        self.region = step.before;
        if self.region.active {
            Some(BackTarget::Center(self.center()))
        } else {
            Some(BackTarget::RestoreCursor)
        }
    }

    pub fn center(&self) -> Point {
        center_of(&self.monitor, &self.region)
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Cells chosen since the last reset, outermost first.
    pub fn path(&self) -> Vec<Cell> {
        self.history.iter().map(|step| step.cell).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(width: u32, height: u32) -> Monitor {
        Monitor {
            name: "test".into(),
            x: 0,
            y: 0,
            width,
            height,
            is_primary: true,
        }
    }

    fn replay(monitor: &Monitor, path: &[Cell]) -> Region {
        let mut nav = RegionNavigator::new(monitor.clone());
        for &cell in path {
            nav.subdivide(cell);
        }
        *nav.region()
    }

    #[test]
    fn subdivide_center_cell() {
        let mut nav = RegionNavigator::new(monitor(1920, 1080));
        let center = nav.subdivide(Cell::new(1, 1));
        assert_eq!(
            *nav.region(),
            Region {
                x: 640.0,
                y: 360.0,
                width: 640.0,
                height: 360.0,
                active: true
            }
        );
        assert_eq!(center, Point::new(960, 540));
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn size_shrinks_by_three_per_level() {
        let m = monitor(2560, 1440);
        let mut nav = RegionNavigator::new(m.clone());
        for n in 0..12 {
            nav.subdivide(Cell::new(n % 3, (n / 3) % 3));
            let scale = 3f64.powi(n as i32 + 1);
            let expected_w = m.width as f64 / scale;
            let expected_h = m.height as f64 / scale;
            assert!(((nav.region().width - expected_w) / expected_w).abs() < 1e-9);
            assert!(((nav.region().height - expected_h) / expected_h).abs() < 1e-9);
        }
    }

    #[test]
    fn deep_subdivision_stays_sub_pixel_accurate() {
        // Bottom-right cell eight times: x = W * (1 - 3^-8).
        let m = monitor(1920, 1080);
        let mut nav = RegionNavigator::new(m.clone());
        for _ in 0..8 {
            nav.subdivide(Cell::new(2, 2));
        }
        let scale = 3f64.powi(8);
        let r = nav.region();
        assert!((r.x - (1920.0 - 1920.0 / scale)).abs() < 1e-6);
        assert!((r.y - (1080.0 - 1080.0 / scale)).abs() < 1e-6);
        assert!(r.x + r.width <= m.width as f64 + 1e-9);
        assert!(r.y + r.height <= m.height as f64 + 1e-9);
    }

    #[test]
    fn go_back_restores_exact_snapshot() {
        let mut nav = RegionNavigator::new(monitor(1366, 768));
        nav.subdivide(Cell::new(0, 2));
        nav.subdivide(Cell::new(2, 1));
        let before = *nav.region();
        nav.subdivide(Cell::new(1, 0));
        assert_eq!(nav.go_back(), Some(BackTarget::Center(nav.center())));
        assert_eq!(nav.region().x.to_bits(), before.x.to_bits());
        assert_eq!(nav.region().y.to_bits(), before.y.to_bits());
        assert_eq!(nav.region().width.to_bits(), before.width.to_bits());
        assert_eq!(nav.region().height.to_bits(), before.height.to_bits());
    }

    #[test]
    fn go_back_to_top_level_requests_cursor_restore() {
        let m = monitor(1920, 1080);
        let mut nav = RegionNavigator::new(m.clone());
        nav.subdivide(Cell::new(0, 0));
        assert_eq!(nav.go_back(), Some(BackTarget::RestoreCursor));
        assert_eq!(*nav.region(), Region::full(&m));
        assert!(!nav.region().active);
        assert_eq!(nav.go_back(), None);
    }

    #[test]
    fn depth_tracks_subdivides_minus_backs() {
        let mut nav = RegionNavigator::new(monitor(800, 600));
        for cell in Cell::all().take(5) {
            nav.subdivide(cell);
        }
        nav.go_back();
        nav.go_back();
        assert_eq!(nav.depth(), 3);
        assert!(nav.region().active);
        nav.go_back();
        nav.go_back();
        nav.go_back();
        assert_eq!(nav.depth(), 0);
        assert!(!nav.region().active);
    }

    #[test]
    fn region_is_replay_of_path() {
        let m = monitor(3840, 2160);
        let mut nav = RegionNavigator::new(m.clone());
        for cell in [Cell::new(2, 0), Cell::new(1, 2), Cell::new(0, 1), Cell::new(2, 2)] {
            nav.subdivide(cell);
        }
        nav.go_back();
        assert_eq!(*nav.region(), replay(&m, &nav.path()));
    }

    #[test]
    fn rederived_region_has_same_center() {
        let m = monitor(1920, 1080);
        let mut direct = RegionNavigator::new(m.clone());
        direct.subdivide(Cell::new(1, 2));
        let direct_center = direct.subdivide(Cell::new(2, 0));

        let mut detour = RegionNavigator::new(m);
        detour.subdivide(Cell::new(1, 2));
        detour.subdivide(Cell::new(0, 0));
        detour.go_back();
        assert_eq!(detour.subdivide(Cell::new(2, 0)), direct_center);
    }

    #[test]
    fn reset_clears_history() {
        let m = monitor(1024, 768);
        let mut nav = RegionNavigator::new(m.clone());
        nav.subdivide(Cell::new(1, 1));
        nav.reset(&m);
        assert_eq!(nav.depth(), 0);
        assert!(nav.path().is_empty());
        assert_eq!(*nav.region(), Region::full(&m));
    }
}

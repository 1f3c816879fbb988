//! Monitors, regions and the region → pixel mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A physical output in global desktop coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    pub width: u32,
    pub height: u32,
    #[serde(default, rename = "primary")]
    pub is_primary: bool,
}

impl Monitor {
    pub fn contains(&self, point: Point) -> bool {
        let right = self.x as i64 + self.width as i64;
        let bottom = self.y as i64 + self.height as i64;
        (point.x as i64) >= self.x as i64
            && (point.x as i64) < right
            && (point.y as i64) >= self.y as i64
            && (point.y as i64) < bottom
    }

    /// Global pixel at the middle of the monitor.
    pub fn center(&self) -> Point {
        center_of(self, &Region::full(self))
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{}+{}+{}", self.name, self.width, self.height, self.x, self.y)
    }
}

/// Integer pixel in global desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Sub-area of a monitor, relative to its top-left corner.
///
/// `active` is false only for the untouched full-monitor region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub active: bool,
}

impl Region {
    pub fn full(monitor: &Monitor) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: monitor.width as f64,
            height: monitor.height as f64,
            active: false,
        }
    }
}

/// Global pixel at the center of `region`. Rounding happens only here.
pub fn center_of(monitor: &Monitor, region: &Region) -> Point {
    let x = monitor.x as f64 + region.x + region.width / 2.0;
    let y = monitor.y as f64 + region.y + region.height / 2.0;
    Point::new(x.round() as i32, y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(x: i32, y: i32, width: u32, height: u32) -> Monitor {
        Monitor {
            name: "test".into(),
            x,
            y,
            width,
            height,
            is_primary: false,
        }
    }

    #[test]
    fn center_of_full_monitor() {
        let m = monitor(0, 0, 1920, 1080);
        assert_eq!(center_of(&m, &Region::full(&m)), Point::new(960, 540));
    }

    #[test]
    fn center_applies_monitor_offset() {
        let m = monitor(1920, -200, 1280, 1024);
        assert_eq!(m.center(), Point::new(2560, 312));
    }

    #[test]
    fn center_rounds_to_nearest() {
        let m = monitor(0, 0, 1920, 1080);
        let r = Region {
            x: 640.0,
            y: 360.0,
            width: 640.0 / 3.0,
            height: 120.0,
            active: true,
        };
        assert_eq!(center_of(&m, &r), Point::new(747, 420));
    }

    #[test]
    fn contains_is_half_open() {
        let m = monitor(100, 0, 100, 50);
        assert!(m.contains(Point::new(100, 0)));
        assert!(m.contains(Point::new(199, 49)));
        assert!(!m.contains(Point::new(200, 10)));
        assert!(!m.contains(Point::new(99, 10)));
    }
}

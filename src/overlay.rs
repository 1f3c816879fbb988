//! Renderers. The terminal one draws a scaled mini-map of the monitor with
//! the current grid; the log one only records notifications.

use crossterm::style::Color;
use tracing::{debug, info, warn};

use crate::bindings::{Cell, KeyBindings, GRID_SIZE};
use crate::controller::Renderer;
use crate::geometry::{Monitor, Region};
use crate::keys::KeyId;
use crate::terminal::Terminal;

const GRID_COLOR: Color = Color::White;
const FRAME_COLOR: Color = Color::DarkGrey;
const HIGHLIGHT: Color = Color::DarkMagenta;
const HINT_COLOR: Color = Color::Yellow;
const HEADER_ROWS: i32 = 1;
const FOOTER_ROWS: i32 = 1;

/// Maps monitor-relative coordinates onto a block of terminal cells.
#[derive(Debug, Clone, Copy)]
pub struct MiniMap {
    left: i32,
    top: i32,
    scale_x: f64,
    scale_y: f64,
}

impl MiniMap {
    pub fn new(monitor: &Monitor, left: i32, top: i32, cols: u16, rows: u16) -> Self {
        let span = |cells: u16| (cells.max(2) - 1) as f64;
        Self {
            left,
            top,
            scale_x: span(cols) / monitor.width.max(1) as f64,
            scale_y: span(rows) / monitor.height.max(1) as f64,
        }
    }

    pub fn col(&self, x: f64) -> i32 {
        self.left + (x * self.scale_x).round() as i32
    }

    pub fn row(&self, y: f64) -> i32 {
        self.top + (y * self.scale_y).round() as i32
    }
}

pub struct TerminalRenderer {
    term: Terminal,
    monitor: Option<Monitor>,
    hints: Vec<Vec<Option<KeyId>>>,
    status: String,
}

impl TerminalRenderer {
    pub fn new(bindings: &KeyBindings, status: String) -> std::io::Result<Self> {
        let mut renderer = Self {
            term: Terminal::new(true)?,
            monitor: None,
            hints: bindings.rows(),
            status,
        };
        renderer.draw_idle();
        Ok(renderer)
    }

    fn flush(&mut self) {
        if let Err(e) = self.term.render() {
            warn!(error = %e, "terminal render failed");
        }
    }

    fn prepare(&mut self) -> (u16, u16) {
        if let Err(e) = self.term.sync_size() {
            debug!(error = %e, "terminal size unavailable");
        }
        self.term.clear();
        self.term.size()
    }

    fn draw_idle(&mut self) {
        let (_, h) = self.prepare();
        self.term.set_str(1, 0, "gridpoint | overlay hidden", Some(FRAME_COLOR), true);
        let status = self.status.clone();
        self.term.set_str(1, h as i32 / 2, &status, Some(GRID_COLOR), false);
        self.flush();
    }

    fn draw_frame(&mut self, monitor: &Monitor, region: &Region, path: &[Cell]) {
        let (w, h) = self.prepare();
        let map_rows = (h as i32 - HEADER_ROWS - FOOTER_ROWS).max(2) as u16;
        let map = MiniMap::new(monitor, 0, HEADER_ROWS, w, map_rows);

        let trail: Vec<String> = path.iter().map(|c| c.to_string()).collect();
        let header = format!(
            "{} | depth {} | {}",
            monitor,
            path.len(),
            if trail.is_empty() { "full screen".to_string() } else { trail.join(" > ") }
        );
        self.term.set_str(1, 0, &header, Some(GRID_COLOR), true);
        let status = self.status.clone();
        self.term.set_str(1, h as i32 - 1, &status, Some(FRAME_COLOR), false);

        let full = Region::full(monitor);
        self.draw_box(&map, &full, FRAME_COLOR);

        if region.active {
            for row in map.row(region.y)..=map.row(region.y + region.height) {
                for col in map.col(region.x)..=map.col(region.x + region.width) {
                    self.term.set_bg(col, row, HIGHLIGHT);
                }
            }
        }

        let third_w = region.width / GRID_SIZE as f64;
        let third_h = region.height / GRID_SIZE as f64;
        let (top, bottom) = (map.row(region.y), map.row(region.y + region.height));
        let (left, right) = (map.col(region.x), map.col(region.x + region.width));
        for i in 0..=GRID_SIZE {
            let col = map.col(region.x + i as f64 * third_w);
            for row in top..=bottom {
                self.term.set(col, row, '│', Some(GRID_COLOR), false);
            }
            let row = map.row(region.y + i as f64 * third_h);
            for col in left..=right {
                self.term.set(col, row, '─', Some(GRID_COLOR), false);
            }
        }

        for cell in Cell::all() {
            let Some(key) = &self.hints[cell.row()][cell.col()] else {
                continue;
            };
            let label = key.to_string();
            let cx = map.col(region.x + (cell.col() as f64 + 0.5) * third_w);
            let cy = map.row(region.y + (cell.row() as f64 + 0.5) * third_h);
            self.term
                .set_str(cx - label.chars().count() as i32 / 2, cy, &label, Some(HINT_COLOR), true);
        }

        self.flush();
    }

    fn draw_box(&mut self, map: &MiniMap, region: &Region, color: Color) {
        let (left, right) = (map.col(region.x), map.col(region.x + region.width));
        let (top, bottom) = (map.row(region.y), map.row(region.y + region.height));
        for col in left..=right {
            self.term.set(col, top, '─', Some(color), false);
            self.term.set(col, bottom, '─', Some(color), false);
        }
        for row in top..=bottom {
            self.term.set(left, row, '│', Some(color), false);
            self.term.set(right, row, '│', Some(color), false);
        }
    }
}

impl Renderer for TerminalRenderer {
    fn show_overlay(&mut self, monitor: &Monitor) {
        self.monitor = Some(monitor.clone());
        self.draw_frame(monitor, &Region::full(monitor), &[]);
    }

    fn hide_overlay(&mut self) {
        self.monitor = None;
        self.draw_idle();
    }

    fn redraw(&mut self, region: &Region, path: &[Cell]) {
        if let Some(monitor) = self.monitor.clone() {
            self.draw_frame(&monitor, region, path);
        }
    }
}

/// Renderer for headless runs.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn show_overlay(&mut self, monitor: &Monitor) {
        info!(%monitor, "overlay shown");
    }

    fn hide_overlay(&mut self) {
        info!("overlay hidden");
    }

    fn redraw(&mut self, region: &Region, path: &[Cell]) {
        info!(
            x = region.x,
            y = region.y,
            width = region.width,
            height = region.height,
            depth = path.len(),
            "region"
        );
    }
}

//! Monitor discovery.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{Monitor, Point};

pub trait ScreenProvider {
    fn list_monitors(&self) -> Vec<Monitor>;

    /// Monitor under `point`, falling back to the primary and then the first.
    fn monitor_containing(&self, point: Point) -> Option<Monitor> {
        let monitors = self.list_monitors();
        monitors
            .iter()
            .find(|m| m.contains(point))
            .or_else(|| monitors.iter().find(|m| m.is_primary))
            .or_else(|| monitors.first())
            .cloned()
    }
}

/// Monitors listed in the settings file.
pub struct ConfiguredScreens {
    monitors: Vec<Monitor>,
}

impl ConfiguredScreens {
    pub fn new(monitors: Vec<Monitor>) -> Self {
        Self { monitors }
    }
}

impl ScreenProvider for ConfiguredScreens {
    fn list_monitors(&self) -> Vec<Monitor> {
        self.monitors.clone()
    }
}

/// Connected DRM outputs from sysfs, laid out left to right in connector
/// order. The first one is treated as primary.
pub struct DrmScreens {
    root: PathBuf,
}

impl DrmScreens {
    pub fn new() -> Self {
        Self::with_root("/sys/class/drm")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_sysfs(path: &Path) -> Option<String> {
        fs::read_to_string(path).ok().map(|s| s.trim().to_string())
    }

    /// First advertised mode, e.g. `1920x1080`.
    fn preferred_mode(connector: &Path) -> Option<(u32, u32)> {
        let modes = fs::read_to_string(connector.join("modes")).ok()?;
        let first = modes.lines().next()?;
        let (w, h) = first.split_once('x')?;
        // Interlaced modes carry a suffix, e.g. 1920x1080i.
        let h: String = h.chars().take_while(|c| c.is_ascii_digit()).collect();
        let (w, h): (u32, u32) = (w.parse().ok()?, h.parse().ok()?);
        (w > 0 && h > 0).then_some((w, h))
    }
}

impl Default for DrmScreens {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenProvider for DrmScreens {
    fn list_monitors(&self) -> Vec<Monitor> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut connectors: Vec<(String, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                // card0-HDMI-A-1 -> HDMI-A-1; bare cardN entries are GPUs
                let (card, output) = name.split_once('-')?;
                card.starts_with("card").then(|| (output.to_string(), entry.path()))
            })
            .collect();
        connectors.sort();

        let mut monitors = Vec::new();
        let mut next_x = 0i32;
        for (output, path) in connectors {
            if Self::read_sysfs(&path.join("status")).as_deref() != Some("connected") {
                continue;
            }
            let Some((width, height)) = Self::preferred_mode(&path) else {
                debug!(%output, "connected output without modes");
                continue;
            };
            monitors.push(Monitor {
                name: output,
                x: next_x,
                y: 0,
                width,
                height,
                is_primary: monitors.is_empty(),
            });
            next_x += width as i32;
        }
        monitors
    }
}

/// Configured monitors when the settings list any, sysfs otherwise.
pub fn detect(configured: &[Monitor]) -> Box<dyn ScreenProvider> {
    if configured.is_empty() {
        Box::new(DrmScreens::new())
    } else {
        Box::new(ConfiguredScreens::new(configured.to_vec()))
    }
}

pub fn select_monitor(provider: &dyn ScreenProvider, index: usize) -> Result<Monitor> {
    let monitors = provider.list_monitors();
    if monitors.is_empty() {
        return Err(Error::NoMonitors);
    }
    let count = monitors.len();
    monitors
        .into_iter()
        .nth(index)
        .ok_or(Error::MonitorIndex { index, count })
}

/// Bounding box of all monitors as (left, top, right, bottom).
pub fn desktop_bounds(monitors: &[Monitor]) -> Option<(i32, i32, i32, i32)> {
    monitors.iter().fold(None, |acc, m| {
        let right = m.x + m.width as i32;
        let bottom = m.y + m.height as i32;
        Some(match acc {
            None => (m.x, m.y, right, bottom),
            Some((l, t, r, b)) => (l.min(m.x), t.min(m.y), r.max(right), b.max(bottom)),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(name: &str, x: i32, width: u32, primary: bool) -> Monitor {
        Monitor {
            name: name.into(),
            x,
            y: 0,
            width,
            height: 1080,
            is_primary: primary,
        }
    }

    fn fake_connector(root: &Path, name: &str, status: &str, modes: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("status"), format!("{}\n", status)).unwrap();
        fs::write(dir.join("modes"), modes).unwrap();
    }

    #[test]
    fn containing_falls_back_to_primary_then_first() {
        let screens = ConfiguredScreens::new(vec![
            monitor("left", 0, 1920, false),
            monitor("right", 1920, 1920, true),
        ]);
        assert_eq!(screens.monitor_containing(Point::new(10, 10)).unwrap().name, "left");
        assert_eq!(screens.monitor_containing(Point::new(9000, 10)).unwrap().name, "right");

        let no_primary = ConfiguredScreens::new(vec![monitor("only", 0, 800, false)]);
        assert_eq!(no_primary.monitor_containing(Point::new(-5, -5)).unwrap().name, "only");
        assert!(ConfiguredScreens::new(Vec::new())
            .monitor_containing(Point::new(0, 0))
            .is_none());
    }

    #[test]
    fn drm_probe_lists_connected_outputs() {
        let root = tempfile::tempdir().unwrap();
        fake_connector(root.path(), "card0-HDMI-A-1", "connected", "2560x1440\n1920x1080\n");
        fake_connector(root.path(), "card0-DP-1", "connected", "1920x1080i\n");
        fake_connector(root.path(), "card0-DP-2", "disconnected", "");
        fake_connector(root.path(), "card0-DP-3", "connected", "0x0\n");
        fs::create_dir_all(root.path().join("card0")).unwrap();

        let monitors = DrmScreens::with_root(root.path()).list_monitors();
        assert_eq!(monitors.len(), 2);
        assert_eq!(monitors[0].name, "DP-1");
        assert!(monitors[0].is_primary);
        assert_eq!((monitors[0].width, monitors[0].height), (1920, 1080));
        assert_eq!(monitors[1].name, "HDMI-A-1");
        assert_eq!(monitors[1].x, 1920);
        assert!(!monitors[1].is_primary);
    }

    #[test]
    fn select_monitor_errors() {
        let empty = ConfiguredScreens::new(Vec::new());
        assert!(matches!(select_monitor(&empty, 0), Err(Error::NoMonitors)));

        let one = ConfiguredScreens::new(vec![monitor("a", 0, 800, true)]);
        assert!(matches!(
            select_monitor(&one, 2),
            Err(Error::MonitorIndex { index: 2, count: 1 })
        ));
        assert_eq!(select_monitor(&one, 0).unwrap().name, "a");
    }

    #[test]
    fn bounds_cover_all_monitors() {
        let monitors = vec![monitor("a", -1280, 1280, false), monitor("b", 0, 1920, true)];
        assert_eq!(desktop_bounds(&monitors), Some((-1280, 0, 1920, 1080)));
        assert_eq!(desktop_bounds(&[]), None);
    }
}

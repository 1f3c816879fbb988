//! Pointer collaborators: a uinput absolute pointer that moves and clicks,
//! and a dry-run stand-in that only logs.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, UinputAbsSetup};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::controller::{ClickDispatcher, CursorAccess};
use crate::error::{Error, Result};
use crate::geometry::{Monitor, Point};
use crate::screens::desktop_bounds;
use crate::settings::ClickSettings;

const DEVICE_NAME: &str = "gridpoint virtual pointer";

/// Where this device last put the pointer. uinput cannot read the real
/// pointer back, so the position is only trusted between the first move of a
/// session and the session's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tracked {
    position: Point,
    synced: bool,
}

impl Tracked {
    fn new(start: Point) -> Self {
        Self {
            position: start,
            synced: false,
        }
    }

    /// Moving to the tracked position while unsynced would jump the real
    /// pointer to a guess, so it is skipped.
    fn should_move(&self, point: Point) -> bool {
        self.synced || point != self.position
    }

    fn moved(&mut self, point: Point) {
        self.position = point;
        self.synced = true;
    }

    fn release(&mut self) {
        self.synced = false;
    }
}

struct Inner {
    device: VirtualDevice,
    tracked: Tracked,
}

/// Virtual absolute pointer spanning the desktop bounding box.
#[derive(Clone)]
pub struct UinputPointer {
    inner: Arc<Mutex<Inner>>,
    origin: (i32, i32),
    click: ClickSettings,
}

impl UinputPointer {
    pub fn new(monitors: &[Monitor], start: Point, click: ClickSettings) -> Result<Self> {
        let (left, top, right, bottom) = desktop_bounds(monitors).ok_or(Error::NoMonitors)?;

        let mut buttons = AttributeSet::<Key>::new();
        buttons.insert(Key::BTN_LEFT);
        buttons.insert(Key::BTN_RIGHT);
        buttons.insert(Key::BTN_MIDDLE);
        let abs_x = UinputAbsSetup::new(
            AbsoluteAxisType::ABS_X,
            AbsInfo::new(0, 0, right - left - 1, 0, 0, 0),
        );
        let abs_y = UinputAbsSetup::new(
            AbsoluteAxisType::ABS_Y,
            AbsInfo::new(0, 0, bottom - top - 1, 0, 0, 0),
        );

        let device = VirtualDeviceBuilder::new()
            .and_then(|b| b.name(DEVICE_NAME).with_keys(&buttons))
            .and_then(|b| b.with_absolute_axis(&abs_x))
            .and_then(|b| b.with_absolute_axis(&abs_y))
            .and_then(|b| b.build())
            .map_err(Error::VirtualPointer)?;
        info!(left, top, right, bottom, "virtual pointer created");

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                device,
                tracked: Tracked::new(start),
            })),
            origin: (left, top),
            click,
        })
    }

    fn move_events(&self, point: Point) -> [InputEvent; 2] {
        [
            InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_X.0, point.x - self.origin.0),
            InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_Y.0, point.y - self.origin.1),
        ]
    }

    /// Clicks in place unless this device is currently driving the pointer.
    fn emit_click(inner: &Mutex<Inner>, moves: &[InputEvent], count: u32) -> io::Result<()> {
        let mut inner = inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "pointer lock poisoned"))?;
        if inner.tracked.synced {
            inner.device.emit(moves)?;
        }
        let code = Key::BTN_LEFT.code();
        for _ in 0..count {
            inner.device.emit(&[InputEvent::new(EventType::KEY, code, 1)])?;
            inner.device.emit(&[InputEvent::new(EventType::KEY, code, 0)])?;
        }
        Ok(())
    }
}

impl CursorAccess for UinputPointer {
    fn position(&self) -> Point {
        self.inner
            .lock()
            .map(|inner| inner.tracked.position)
            .unwrap_or_default()
    }

    fn set_position(&mut self, point: Point) {
        let events = self.move_events(point);
        let Ok(mut inner) = self.inner.lock() else {
            warn!("pointer lock poisoned; move dropped");
            return;
        };
        if !inner.tracked.should_move(point) {
            debug!(%point, "pointer not moved this session; restore skipped");
            return;
        }
        match inner.device.emit(&events) {
            Ok(()) => inner.tracked.moved(point),
            Err(e) => warn!(%point, error = %e, "pointer move failed"),
        }
    }

    fn release(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.tracked.release();
        }
    }
}

impl ClickDispatcher for UinputPointer {
    /// Clicks on a worker thread after the configured delay, giving the
    /// renderer time to get out of the way.
    fn click(&mut self, point: Point) {
        let inner = Arc::clone(&self.inner);
        let moves = self.move_events(point);
        let ClickSettings { delay_ms, count } = self.click.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(delay_ms));
            match Self::emit_click(&inner, &moves, count) {
                Ok(()) => debug!(%point, count, "clicked"),
                Err(e) => warn!(%point, error = %e, "click failed"),
            }
        });
    }
}

/// Tracks the position in memory and logs instead of touching the system.
#[derive(Debug, Clone, Default)]
pub struct DryRunPointer {
    position: Point,
    pub clicks: Vec<Point>,
}

impl DryRunPointer {
    pub fn new(start: Point) -> Self {
        Self {
            position: start,
            clicks: Vec::new(),
        }
    }
}

impl CursorAccess for DryRunPointer {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, point: Point) {
        info!(%point, "[dry-run] move pointer");
        self.position = point;
    }
}

impl ClickDispatcher for DryRunPointer {
    fn click(&mut self, point: Point) {
        info!(%point, "[dry-run] click");
        self.clicks.push(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_to_unsynced_start_is_skipped() {
        let start = Point::new(960, 540);
        let mut tracked = Tracked::new(start);
        assert!(!tracked.should_move(start));
        assert!(tracked.should_move(Point::new(320, 180)));

        tracked.moved(Point::new(320, 180));
        assert!(tracked.synced);
        assert!(tracked.should_move(start));
        assert!(tracked.should_move(Point::new(320, 180)));
    }

    #[test]
    fn release_drops_trust_in_tracked_position() {
        let mut tracked = Tracked::new(Point::new(0, 0));
        tracked.moved(Point::new(747, 420));
        tracked.release();
        assert!(!tracked.synced);
        assert_eq!(tracked.position, Point::new(747, 420));
        assert!(!tracked.should_move(Point::new(747, 420)));
    }

    #[test]
    fn dry_run_tracks_moves_and_clicks() {
        let mut pointer = DryRunPointer::new(Point::new(5, 5));
        assert_eq!(pointer.position(), Point::new(5, 5));
        pointer.set_position(Point::new(100, 200));
        assert_eq!(pointer.position(), Point::new(100, 200));
        pointer.click(Point::new(100, 200));
        assert_eq!(pointer.clicks, vec![Point::new(100, 200)]);
    }
}

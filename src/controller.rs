//! Session orchestration for one monitor.
//!
//! The controller is the only writer of session state. Everything it does to
//! the outside world goes through [`CursorAccess`] and [`Renderer`], or comes
//! back to the caller as a [`ControllerEvent`] for a [`ClickDispatcher`].

use tracing::{debug, info};

use crate::bindings::Cell;
use crate::geometry::{Monitor, Point, Region};
use crate::navigator::{BackTarget, RegionNavigator};

/// Reads and moves the system pointer.
pub trait CursorAccess {
    fn position(&self) -> Point;
    fn set_position(&mut self, point: Point);

    /// The session is over and the user owns the pointer again.
    fn release(&mut self) {}
}

/// Receives overlay visibility changes and redraw requests.
pub trait Renderer {
    fn show_overlay(&mut self, monitor: &Monitor);
    fn hide_overlay(&mut self);
    fn redraw(&mut self, region: &Region, path: &[Cell]);
}

/// Performs the click once a selection is confirmed. Failures are the
/// dispatcher's to report; the session is already over by then.
pub trait ClickDispatcher {
    fn click(&mut self, point: Point);
}

impl<T: CursorAccess + ?Sized> CursorAccess for Box<T> {
    fn position(&self) -> Point {
        (**self).position()
    }

    fn set_position(&mut self, point: Point) {
        (**self).set_position(point)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

impl<T: Renderer + ?Sized> Renderer for Box<T> {
    fn show_overlay(&mut self, monitor: &Monitor) {
        (**self).show_overlay(monitor)
    }

    fn hide_overlay(&mut self) {
        (**self).hide_overlay()
    }

    fn redraw(&mut self, region: &Region, path: &[Cell]) {
        (**self).redraw(region, path)
    }
}

impl<T: ClickDispatcher + ?Sized> ClickDispatcher for Box<T> {
    fn click(&mut self, point: Point) {
        (**self).click(point)
    }
}

/// Requests for collaborators outside the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    ClickRequested(Point),
    ShutdownRequested,
}

struct Session {
    original_cursor: Point,
}

pub struct NavigationController<C, R> {
    monitor: Monitor,
    navigator: RegionNavigator,
    cursor: C,
    renderer: R,
    session: Option<Session>,
}

impl<C: CursorAccess, R: Renderer> NavigationController<C, R> {
    pub fn new(monitor: Monitor, cursor: C, renderer: R) -> Self {
        Self {
            navigator: RegionNavigator::new(monitor.clone()),
            monitor,
            cursor,
            renderer,
            session: None,
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn overlay_visible(&self) -> bool {
        self.session.is_some()
    }

    pub fn region(&self) -> Option<&Region> {
        self.session.as_ref().map(|_| self.navigator.region())
    }

    pub fn depth(&self) -> usize {
        self.session.as_ref().map_or(0, |_| self.navigator.depth())
    }

    pub fn original_cursor(&self) -> Option<Point> {
        self.session.as_ref().map(|s| s.original_cursor)
    }

    pub fn cursor(&self) -> &C {
        &self.cursor
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Start a session. Returns false when one is already running.
    pub fn activate(&mut self) -> bool {
        if self.session.is_some() {
            debug!("activate ignored: session already active");
            return false;
        }
        let original_cursor = self.cursor.position();
        self.navigator.reset(&self.monitor);
        self.session = Some(Session { original_cursor });
        self.renderer.show_overlay(&self.monitor);
        info!(monitor = %self.monitor, cursor = %original_cursor, "overlay shown");
        true
    }

    pub fn select_cell(&mut self, cell: Cell) {
        if self.session.is_none() {
            debug!(%cell, "select ignored: no active session");
            return;
        }
        let center = self.navigator.subdivide(cell);
        self.cursor.set_position(center);
        self.redraw();
        debug!(%cell, %center, depth = self.navigator.depth(), "zoomed in");
    }

    /// Step back one level, or cancel the session when already at the top.
    pub fn go_back(&mut self) {
        let Some(original_cursor) = self.original_cursor() else {
            debug!("go back ignored: no active session");
            return;
        };
        match self.navigator.go_back() {
            None => self.cancel(),
            Some(target) => {
                let point = match target {
                    BackTarget::Center(center) => center,
                    BackTarget::RestoreCursor => original_cursor,
                };
                self.cursor.set_position(point);
                self.redraw();
                debug!(%point, depth = self.navigator.depth(), "stepped back");
            }
        }
    }

    /// End the session and ask for a click at the current pointer position.
    pub fn confirm(&mut self) -> Option<ControllerEvent> {
        if self.session.is_none() {
            debug!("confirm ignored: no active session");
            return None;
        }
        let point = self.cursor.position();
        self.teardown();
        info!(%point, "selection confirmed");
        Some(ControllerEvent::ClickRequested(point))
    }

    /// End the session and put the pointer back where it started.
    pub fn cancel(&mut self) {
        let Some(original) = self.original_cursor() else {
            debug!("cancel ignored: no active session");
            return;
        };
        self.cursor.set_position(original);
        self.teardown();
        info!(cursor = %original, "selection cancelled");
    }

    pub fn quit(&mut self) -> ControllerEvent {
        if self.session.is_some() {
            self.teardown();
        }
        info!("shutdown requested");
        ControllerEvent::ShutdownRequested
    }

    fn redraw(&mut self) {
        let path = self.navigator.path();
        self.renderer.redraw(self.navigator.region(), &path);
    }

    /// Drop the session; region and history are rebuilt on the next activate.
    fn teardown(&mut self) {
        self.session = None;
        self.navigator.reset(&self.monitor);
        self.cursor.release();
        self.renderer.hide_overlay();
    }
}

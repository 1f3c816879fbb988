//! The serialized event loop: key events in, controller commands out.

use std::ops::ControlFlow;
use std::sync::mpsc::Receiver;
use tracing::{debug, error};

use crate::capture::KeyEvent;
use crate::combo::{ComboMatcher, Signal};
use crate::controller::{ClickDispatcher, ControllerEvent, CursorAccess, NavigationController, Renderer};
use crate::error::{Error, Result};
use crate::keys::normalize;

pub struct App<C, R, D> {
    matcher: ComboMatcher,
    controller: NavigationController<C, R>,
    clicker: D,
}

impl<C, R, D> App<C, R, D>
where
    C: CursorAccess,
    R: Renderer,
    D: ClickDispatcher,
{
    pub fn new(matcher: ComboMatcher, controller: NavigationController<C, R>, clicker: D) -> Self {
        Self {
            matcher,
            controller,
            clicker,
        }
    }

    pub fn controller(&self) -> &NavigationController<C, R> {
        &self.controller
    }

    pub fn clicker(&self) -> &D {
        &self.clicker
    }

    /// Apply one key event. Breaks once shutdown was requested.
    pub fn handle(&mut self, event: &KeyEvent) -> ControlFlow<()> {
        let (key, _) = normalize(&event.raw);
        let visible = self.controller.overlay_visible();
        let Some(signal) = self.matcher.on_key(&key, event.pressed, visible) else {
            return ControlFlow::Continue(());
        };
        debug!(?signal, %key, "signal");

        let outcome = match signal {
            Signal::Activate => {
                self.controller.activate();
                None
            }
            Signal::Cancel => {
                self.controller.cancel();
                None
            }
            Signal::GridCell(cell) => {
                self.controller.select_cell(cell);
                None
            }
            Signal::GoBack => {
                self.controller.go_back();
                None
            }
            Signal::Confirm => self.controller.confirm(),
            Signal::Quit => Some(self.controller.quit()),
        };

        match outcome {
            Some(ControllerEvent::ClickRequested(point)) => {
                self.clicker.click(point);
                ControlFlow::Continue(())
            }
            Some(ControllerEvent::ShutdownRequested) => ControlFlow::Break(()),
            None => ControlFlow::Continue(()),
        }
    }

    /// Consume events until shutdown. A closed channel means every listener
    /// died; the session is torn down the same way as a quit.
    pub fn run(&mut self, events: Receiver<KeyEvent>) -> Result<()> {
        for event in events.iter() {
            if self.handle(&event).is_break() {
                return Ok(());
            }
        }
        error!("key capture lost");
        self.controller.quit();
        Err(Error::CaptureLost)
    }
}

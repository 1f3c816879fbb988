//! Global key capture. One thread per keyboard forwards press/release events
//! over a channel to the single consumer that owns the session.

use evdev::Key;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::evdev_util::{find_keyboard_devices, ReconnectingDevice};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A key going down or up, named the way [`crate::keys::normalize`] expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub raw: String,
    pub pressed: bool,
}

impl KeyEvent {
    pub fn press(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            pressed: true,
        }
    }

    pub fn release(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            pressed: false,
        }
    }
}

/// Raw name for an evdev key code.
pub fn raw_name(key: Key) -> Option<&'static str> {
    Some(match key {
        Key::KEY_LEFTCTRL => "ctrl_l", Key::KEY_RIGHTCTRL => "ctrl_r",
        Key::KEY_LEFTALT => "alt_l", Key::KEY_RIGHTALT => "alt_gr",
        Key::KEY_LEFTSHIFT => "shift_l", Key::KEY_RIGHTSHIFT => "shift_r",
        Key::KEY_LEFTMETA => "cmd_l", Key::KEY_RIGHTMETA => "cmd_r",
        Key::KEY_ESC => "esc", Key::KEY_ENTER => "enter", Key::KEY_KPENTER => "kp_enter",
        Key::KEY_SPACE => "space", Key::KEY_TAB => "tab", Key::KEY_BACKSPACE => "backspace",
        Key::KEY_Q => "q", Key::KEY_W => "w", Key::KEY_E => "e", Key::KEY_R => "r", Key::KEY_T => "t",
        Key::KEY_Y => "y", Key::KEY_U => "u", Key::KEY_I => "i", Key::KEY_O => "o", Key::KEY_P => "p",
        Key::KEY_A => "a", Key::KEY_S => "s", Key::KEY_D => "d", Key::KEY_F => "f", Key::KEY_G => "g",
        Key::KEY_H => "h", Key::KEY_J => "j", Key::KEY_K => "k", Key::KEY_L => "l",
        Key::KEY_Z => "z", Key::KEY_X => "x", Key::KEY_C => "c", Key::KEY_V => "v", Key::KEY_B => "b",
        Key::KEY_N => "n", Key::KEY_M => "m",
        Key::KEY_1 => "1", Key::KEY_2 => "2", Key::KEY_3 => "3", Key::KEY_4 => "4", Key::KEY_5 => "5",
        Key::KEY_6 => "6", Key::KEY_7 => "7", Key::KEY_8 => "8", Key::KEY_9 => "9", Key::KEY_0 => "0",
        Key::KEY_MINUS => "-", Key::KEY_EQUAL => "=", Key::KEY_GRAVE => "`",
        Key::KEY_LEFTBRACE => "[", Key::KEY_RIGHTBRACE => "]", Key::KEY_BACKSLASH => "\\",
        Key::KEY_SEMICOLON => ";", Key::KEY_APOSTROPHE => "'",
        Key::KEY_COMMA => ",", Key::KEY_DOT => ".", Key::KEY_SLASH => "/",
        Key::KEY_F1 => "f1", Key::KEY_F2 => "f2", Key::KEY_F3 => "f3", Key::KEY_F4 => "f4",
        Key::KEY_F5 => "f5", Key::KEY_F6 => "f6", Key::KEY_F7 => "f7", Key::KEY_F8 => "f8",
        Key::KEY_F9 => "f9", Key::KEY_F10 => "f10", Key::KEY_F11 => "f11", Key::KEY_F12 => "f12",
        Key::KEY_UP => "up", Key::KEY_DOWN => "down", Key::KEY_LEFT => "left", Key::KEY_RIGHT => "right",
        Key::KEY_KP1 => "kp_1", Key::KEY_KP2 => "kp_2", Key::KEY_KP3 => "kp_3",
        Key::KEY_KP4 => "kp_4", Key::KEY_KP5 => "kp_5", Key::KEY_KP6 => "kp_6",
        Key::KEY_KP7 => "kp_7", Key::KEY_KP8 => "kp_8", Key::KEY_KP9 => "kp_9",
        _ => return None,
    })
}

/// Translate an evdev event value. Autorepeat (2) is dropped so a held
/// modifier cannot toggle the overlay over and over.
fn key_event(key: Key, value: i32) -> Option<KeyEvent> {
    let raw = raw_name(key)?;
    match value {
        1 => Some(KeyEvent::press(raw)),
        0 => Some(KeyEvent::release(raw)),
        _ => None,
    }
}

/// Keys one device reported down and has not released yet.
#[derive(Debug, Default)]
struct PressedKeys {
    down: BTreeSet<String>,
}

impl PressedKeys {
    fn track(&mut self, event: &KeyEvent) {
        if event.pressed {
            self.down.insert(event.raw.clone());
        } else {
            self.down.remove(&event.raw);
        }
    }

    /// Synthetic releases for everything still down. A lost device never
    /// sends them, which would leave modifiers held in the matcher.
    fn release_all(&mut self) -> Vec<KeyEvent> {
        std::mem::take(&mut self.down)
            .into_iter()
            .map(KeyEvent::release)
            .collect()
    }
}

/// Background listener threads, one per keyboard.
pub struct KeyListener {
    running: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl KeyListener {
    /// Start listening on every keyboard. `tx` is moved into the threads, so
    /// the receiver disconnects once all of them have stopped.
    pub fn spawn(tx: Sender<KeyEvent>) -> Result<Self> {
        let keyboards = find_keyboard_devices();
        if keyboards.is_empty() {
            return Err(Error::NoKeyboards);
        }

        let running = Arc::new(AtomicBool::new(true));
        let mut handles = Vec::new();
        for device in keyboards {
            let tx = tx.clone();
            let running = Arc::clone(&running);
            let handle = std::thread::spawn(move || {
                let mut reader = ReconnectingDevice::new(device);
                let mut pressed = PressedKeys::default();
                debug!(name = reader.name(), "listening");

                while running.load(Ordering::Relaxed) {
                    let mut disconnected = false;
                    let polled = reader.poll_events(|ev| {
                        if let evdev::InputEventKind::Key(key) = ev.kind() {
                            if let Some(event) = key_event(key, ev.value()) {
                                pressed.track(&event);
                                disconnected |= tx.send(event).is_err();
                            }
                        }
                    });
                    if polled.is_err() || reader.is_reconnecting() {
                        for event in pressed.release_all() {
                            debug!(key = %event.raw, "releasing key held on lost keyboard");
                            let _ = tx.send(event);
                        }
                    }
                    if let Err(e) = polled {
                        error!(error = %e, "keyboard listener stopped");
                        break;
                    }
                    if disconnected {
                        break;
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            });
            handles.push(handle);
        }

        Ok(Self { running, handles })
    }

    pub fn stop(self) {
        self.running.store(false, Ordering::Relaxed);
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

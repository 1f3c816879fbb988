//! Evdev utilities with automatic device reconnection.

use evdev::Device;
use std::io;
use std::os::unix::io::AsRawFd;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Read errors in a row before the device is considered gone.
const MAX_CONSECUTIVE_ERRORS: u32 = 50;
/// Reconnect attempts before giving up on the device.
const MAX_RECONNECT_ATTEMPTS: u32 = 30;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Sets a device to non-blocking mode.
pub fn set_nonblocking(device: &Device) {
    let fd = device.as_raw_fd();
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
    }
}

fn is_keyboard(device: &Device) -> bool {
    device
        .supported_keys()
        .is_some_and(|keys| keys.contains(evdev::Key::KEY_A) && keys.contains(evdev::Key::KEY_SPACE))
}

/// Finds all keyboard devices.
pub fn find_keyboard_devices() -> Vec<Device> {
    let mut keyboards = Vec::new();
    if let Ok(entries) = std::fs::read_dir("/dev/input") {
        for entry in entries.flatten() {
            let path = entry.path();
            let is_event_node = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("event"));
            if !is_event_node {
                continue;
            }
            match Device::open(&path) {
                Ok(device) if is_keyboard(&device) => {
                    debug!(path = %path.display(), name = device.name().unwrap_or("?"), "keyboard found");
                    keyboards.push(device);
                }
                Ok(_) => {}
                Err(e) => debug!(path = %path.display(), error = %e, "cannot open input device"),
            }
        }
    }
    keyboards
}

fn device_name(device: &Device) -> String {
    device.name().unwrap_or("unknown keyboard").to_string()
}

/// Wrapper for evdev device with automatic reconnection support.
pub struct ReconnectingDevice {
    device: Device,
    name: String,
    physical_path: Option<String>,
    consecutive_errors: u32,
    reconnect_attempts: u32,
    needs_reconnect: bool,
}

impl ReconnectingDevice {
    pub fn new(device: Device) -> Self {
        let physical_path = device.physical_path().map(|p| p.to_string());
        set_nonblocking(&device);
        Self {
            name: device_name(&device),
            device,
            physical_path,
            consecutive_errors: 0,
            reconnect_attempts: 0,
            needs_reconnect: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True while the device is lost and a reconnect is pending.
    pub fn is_reconnecting(&self) -> bool {
        self.needs_reconnect
    }

    fn adopt(&mut self, device: Device) {
        set_nonblocking(&device);
        self.name = device_name(&device);
        self.device = device;
        self.consecutive_errors = 0;
        self.reconnect_attempts = 0;
        info!(name = self.name(), "keyboard reconnected");
    }

    fn reconnect(&mut self) -> io::Result<()> {
        self.needs_reconnect = false;
        std::thread::sleep(RECONNECT_DELAY);

        let mut candidates = find_keyboard_devices().into_iter();
        let found = match self.physical_path {
            Some(ref path) => {
                candidates.find(|dev| dev.physical_path().map(|p| p.to_string()).as_ref() == Some(path))
            }
            None => candidates.next(),
        };

        match found {
            Some(device) => self.adopt(device),
            None => {
                self.reconnect_attempts += 1;
                if self.reconnect_attempts >= MAX_RECONNECT_ATTEMPTS {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("keyboard {:?} did not come back", self.physical_path),
                    ));
                }
                self.needs_reconnect = true;
            }
        }
        Ok(())
    }

    /// Fetch pending events, reconnecting when reads keep failing. The
    /// callback runs once per event. Errors only once the device is given up.
    pub fn poll_events<F>(&mut self, mut callback: F) -> io::Result<()>
    where
        F: FnMut(&evdev::InputEvent),
    {
        if self.needs_reconnect {
            return self.reconnect();
        }

        match self.device.fetch_events() {
            Ok(events) => {
                self.consecutive_errors = 0;
                for ev in events {
                    callback(&ev);
                }
            }
            Err(e) => {
                // EAGAIN/EWOULDBLOCK are normal for non-blocking reads
                if e.raw_os_error() != Some(libc::EAGAIN)
                    && e.raw_os_error() != Some(libc::EWOULDBLOCK)
                {
                    self.consecutive_errors += 1;
                    if self.consecutive_errors > MAX_CONSECUTIVE_ERRORS {
                        warn!(name = %self.name, error = %e, "keyboard read failing, reconnecting");
                        self.needs_reconnect = true;
                    }
                }
            }
        }
        Ok(())
    }
}

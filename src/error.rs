use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bindings::Cell;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no monitors detected; add a [[monitors]] entry to the config file")]
    NoMonitors,

    #[error("monitor index {index} out of range (found {count} monitors)")]
    MonitorIndex { index: usize, count: usize },

    #[error("monitor {name:?} must have a positive width and height (got {width}x{height})")]
    EmptyMonitor { name: String, width: u32, height: u32 },

    #[error("failed to read settings from {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings in {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write settings to {path}: {source}")]
    SettingsWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize settings: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),

    #[error("unknown key name: {0:?}")]
    UnknownKey(String),

    #[error("key {key} is bound to both {first} and {second}")]
    DuplicateBinding { key: String, first: Cell, second: Cell },

    #[error("grid cell ({row}, {col}) is outside the 3x3 grid")]
    CellOutOfRange { row: usize, col: usize },

    #[error("key {0} cannot be bound to a grid cell: it is needed for confirm, back or the combo")]
    ReservedGridKey(String),

    #[error("activation combo needs at least one modifier")]
    EmptyActivation,

    #[error("activation key {0} must not be a modifier")]
    ModifierAsActivationKey(String),

    #[error("no keyboard devices found under /dev/input (is the user in the `input` group?)")]
    NoKeyboards,

    #[error("all keyboard listeners stopped")]
    CaptureLost,

    #[error("failed to create virtual pointer: {0}")]
    VirtualPointer(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

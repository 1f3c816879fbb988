//! Canonical key identities.
//!
//! Capture backends report keys by raw name (`ctrl_l`, `alt_gr`, `Q`, ...).
//! [`normalize`] folds the side-specific modifier variants into one identity
//! per modifier family and passes every other key through as itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Modifier families. Left/right variants collapse onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Cmd,
}

impl Modifier {
    pub fn name(self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
            Modifier::Cmd => "cmd",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized key identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeyId {
    Modifier(Modifier),
    Char(char),
    Escape,
    Enter,
    Space,
    Tab,
    Backspace,
    Function(u8),
    Named(String),
}

impl KeyId {
    pub fn is_modifier(&self) -> bool {
        matches!(self, KeyId::Modifier(_))
    }

    pub fn modifier(&self) -> Option<Modifier> {
        match self {
            KeyId::Modifier(m) => Some(*m),
            _ => None,
        }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Modifier(m) => write!(f, "{}", m),
            KeyId::Char(c) => write!(f, "{}", c),
            KeyId::Escape => f.write_str("esc"),
            KeyId::Enter => f.write_str("enter"),
            KeyId::Space => f.write_str("space"),
            KeyId::Tab => f.write_str("tab"),
            KeyId::Backspace => f.write_str("backspace"),
            KeyId::Function(n) => write!(f, "f{}", n),
            KeyId::Named(name) => f.write_str(name),
        }
    }
}

impl FromStr for KeyId {
    type Err = Error;

    /// Parses a key name from configuration. Unlike [`normalize`] this rejects
    /// blank names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::UnknownKey(s.to_string()));
        }
        Ok(normalize(trimmed).0)
    }
}

impl TryFrom<String> for KeyId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyId> for String {
    fn from(key: KeyId) -> Self {
        key.to_string()
    }
}

/// Map a raw key name to its canonical identity and whether it is a modifier.
pub fn normalize(raw: &str) -> (KeyId, bool) {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() == 1 {
        let c = chars[0];
        let id = if c == ' ' {
            KeyId::Space
        } else {
            KeyId::Char(c.to_ascii_lowercase())
        };
        return (id, false);
    }

    let lower = raw.to_ascii_lowercase();
    let modifier = match lower.as_str() {
        "ctrl" | "ctrl_l" | "ctrl_r" | "control" | "control_l" | "control_r" | "leftctrl"
        | "rightctrl" => Some(Modifier::Ctrl),
        "alt" | "alt_l" | "alt_r" | "alt_gr" | "altgr" | "option" | "option_l" | "option_r"
        | "opt" | "leftalt" | "rightalt" => Some(Modifier::Alt),
        "shift" | "shift_l" | "shift_r" | "leftshift" | "rightshift" => Some(Modifier::Shift),
        "cmd" | "cmd_l" | "cmd_r" | "command" | "super" | "super_l" | "super_r" | "meta"
        | "meta_l" | "meta_r" | "win" | "leftmeta" | "rightmeta" => Some(Modifier::Cmd),
        _ => None,
    };
    if let Some(m) = modifier {
        return (KeyId::Modifier(m), true);
    }

    let id = match lower.as_str() {
        "esc" | "escape" => KeyId::Escape,
        "enter" | "return" | "kp_enter" => KeyId::Enter,
        "space" => KeyId::Space,
        "tab" => KeyId::Tab,
        "backspace" | "bksp" => KeyId::Backspace,
        name => match name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n) if (1..=24).contains(&n) => KeyId::Function(n),
            _ => KeyId::Named(name.to_string()),
        },
    };
    (id, false)
}

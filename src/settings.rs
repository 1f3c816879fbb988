use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bindings::KeyBindings;
use crate::combo::ActivationCombo;
use crate::error::{Error, Result};
use crate::geometry::Monitor;
use crate::keys::KeyId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_selection_key")]
    pub selection_key: KeyId,
    /// Row-major key names; an empty string leaves the cell unbound.
    #[serde(default = "default_grid")]
    pub grid: Vec<Vec<String>>,
    // Tables below plain values so the TOML writer never emits a value after a table.
    #[serde(default)]
    pub activation: ActivationCombo,
    #[serde(default)]
    pub click: ClickSettings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monitors: Vec<Monitor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickSettings {
    #[serde(default = "default_click_delay")]
    pub delay_ms: u64,
    #[serde(default = "default_click_count")]
    pub count: u32,
}

impl Default for ClickSettings {
    fn default() -> Self {
        Self {
            delay_ms: default_click_delay(),
            count: default_click_count(),
        }
    }
}

fn default_selection_key() -> KeyId {
    KeyId::Enter
}

fn default_grid() -> Vec<Vec<String>> {
    ["qwe", "asd", "zxc"]
        .iter()
        .map(|row| row.chars().map(String::from).collect())
        .collect()
}

fn default_click_delay() -> u64 {
    200
}

fn default_click_count() -> u32 {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selection_key: default_selection_key(),
            grid: default_grid(),
            activation: ActivationCombo::default(),
            click: ClickSettings::default(),
            monitors: Vec::new(),
        }
    }
}

impl Settings {
    /// Load from `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| Error::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&content).map_err(|source| Error::SettingsParse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)
        };
        write().map_err(|source| Error::SettingsWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.activation.validate()?;
        if let Some(m) = self.monitors.iter().find(|m| m.width == 0 || m.height == 0) {
            return Err(Error::EmptyMonitor {
                name: m.name.clone(),
                width: m.width,
                height: m.height,
            });
        }
        let bindings = self.bindings()?;
        // A grid binding shadows confirm and back; modifiers never reach the grid.
        for row in bindings.rows() {
            for key in row.into_iter().flatten() {
                if key == self.selection_key || key == KeyId::Escape || key.is_modifier() {
                    return Err(Error::ReservedGridKey(key.to_string()));
                }
            }
        }
        Ok(())
    }

    pub fn bindings(&self) -> Result<KeyBindings> {
        let rows = self
            .grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|name| match name.trim() {
                        "" => Ok(None),
                        name => name.parse::<KeyId>().map(Some),
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        KeyBindings::from_rows(&rows)
    }

    pub fn set_bindings(&mut self, bindings: &KeyBindings) {
        self.grid = bindings
            .rows()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|key| key.map(|k| k.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridpoint")
            .join("config.toml")
    }
}

//! Hotkey recognition: held-modifier tracking, the activation combo and the
//! per-key commands that apply while the overlay is up.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::bindings::{Cell, KeyBindings};
use crate::error::{Error, Result};
use crate::keys::{KeyId, Modifier};

/// Modifier set (plus an optional trigger key) that shows or cancels the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationCombo {
    pub modifiers: BTreeSet<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyId>,
}

impl ActivationCombo {
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, key: Option<KeyId>) -> Result<Self> {
        let combo = Self {
            modifiers: modifiers.into_iter().collect(),
            key,
        };
        combo.validate()?;
        Ok(combo)
    }

    pub fn validate(&self) -> Result<()> {
        if self.modifiers.is_empty() {
            return Err(Error::EmptyActivation);
        }
        match &self.key {
            Some(key) if key.is_modifier() => Err(Error::ModifierAsActivationKey(key.to_string())),
            _ => Ok(()),
        }
    }
}

impl Default for ActivationCombo {
    fn default() -> Self {
        Self {
            modifiers: [Modifier::Ctrl, Modifier::Alt].into_iter().collect(),
            key: None,
        }
    }
}

impl fmt::Display for ActivationCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.modifiers.iter().map(|m| m.to_string()).collect();
        if let Some(key) = &self.key {
            parts.push(key.to_string());
        }
        f.write_str(&parts.join("+"))
    }
}

/// Command recognized from a single key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Activate,
    Cancel,
    GridCell(Cell),
    Confirm,
    GoBack,
    Quit,
}

pub struct ComboMatcher {
    activation: ActivationCombo,
    selection_key: KeyId,
    bindings: KeyBindings,
    held: BTreeSet<Modifier>,
}

impl ComboMatcher {
    pub fn new(activation: ActivationCombo, selection_key: KeyId, bindings: KeyBindings) -> Self {
        Self {
            activation,
            selection_key,
            bindings,
            held: BTreeSet::new(),
        }
    }

    pub fn held(&self) -> &BTreeSet<Modifier> {
        &self.held
    }

    pub fn activation(&self) -> &ActivationCombo {
        &self.activation
    }

    pub fn selection_key(&self) -> &KeyId {
        &self.selection_key
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    /// Feed one normalized key event.
    pub fn on_key(&mut self, key: &KeyId, pressed: bool, overlay_visible: bool) -> Option<Signal> {
        match (key.modifier(), pressed) {
            (Some(m), true) => self.on_modifier_press(m, overlay_visible),
            (Some(m), false) => {
                self.on_modifier_release(m);
                None
            }
            (None, true) => self.on_non_modifier_press(key, overlay_visible),
            (None, false) => None,
        }
    }

    pub fn on_modifier_press(&mut self, modifier: Modifier, overlay_visible: bool) -> Option<Signal> {
        self.held.insert(modifier);
        self.check_activation(overlay_visible)
    }

    pub fn on_modifier_release(&mut self, modifier: Modifier) {
        self.held.remove(&modifier);
    }

    /// Modifier-only activation. Combos with a trigger key fire from
    /// [`on_non_modifier_press`](Self::on_non_modifier_press) instead.
    pub fn check_activation(&self, overlay_visible: bool) -> Option<Signal> {
        if self.activation.key.is_some() || self.held != self.activation.modifiers {
            return None;
        }
        Some(toggle(overlay_visible))
    }

    pub fn on_non_modifier_press(&self, key: &KeyId, overlay_visible: bool) -> Option<Signal> {
        if *key == KeyId::Escape && self.held.contains(&Modifier::Ctrl) {
            return Some(Signal::Quit);
        }
        if self.activation.key.as_ref() == Some(key) && self.held == self.activation.modifiers {
            return Some(toggle(overlay_visible));
        }
        if !overlay_visible {
            return None;
        }
        if let Some(cell) = self.bindings.lookup(key) {
            return Some(Signal::GridCell(cell));
        }
        if *key == self.selection_key {
            return Some(Signal::Confirm);
        }
        if *key == KeyId::Escape {
            return Some(Signal::GoBack);
        }
        None
    }
}

fn toggle(overlay_visible: bool) -> Signal {
    if overlay_visible {
        Signal::Cancel
    } else {
        Signal::Activate
    }
}

//! Keyboard-driven pointer placement.
//!
//! A hotkey shows a 3x3 grid over one monitor; each grid key zooms into a
//! cell and moves the pointer to its center, escape steps back, and the
//! selection key clicks. The core ([`keys`], [`combo`], [`bindings`],
//! [`navigator`], [`geometry`], [`controller`]) is pure state; the remaining
//! modules connect it to evdev, uinput, sysfs and the terminal.

pub mod app;
pub mod bindings;
pub mod capture;
pub mod combo;
pub mod controller;
pub mod error;
pub mod evdev_util;
pub mod geometry;
pub mod keys;
pub mod logging;
pub mod navigator;
pub mod overlay;
pub mod pointer;
pub mod screens;
pub mod settings;
pub mod terminal;

pub use error::{Error, Result};

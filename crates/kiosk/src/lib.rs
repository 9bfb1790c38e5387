//! Kiosk: a touch-driven terminal UI core.
//!
//! The crate reads raw events from a touchscreen, classifies them into
//! gestures and routes those to a stack of full-screen views drawn with box
//! glyphs on a character grid. Screens can hand the display over to external
//! collaborator processes (media players, mirroring receivers, monitors) and
//! take it back when they exit.
//!
//! # Module Organization
//!
//! - [`input`] - Touch device discovery and the background reader thread
//! - [`gesture`] - Raw events to taps, presses, long presses and swipes
//! - [`canvas`] - The character grid and its diffing renderer
//! - [`widget`] - Buttons, item rows, scroll bars and sliders
//! - [`screen`] - The screen trait and the widget panel
//! - [`collaborator`], [`control`], [`handoff`] - External processes
//! - [`app`] - Navigation and the main loop

#![warn(missing_docs)]

pub use geom;

pub mod app;
pub mod backend;
pub mod canvas;
pub mod collaborator;
pub mod config;
pub mod control;
pub mod error;
pub mod event;
pub mod gesture;
pub mod handoff;
pub mod input;
pub mod screen;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod widget;

pub use app::{Animation, App};
pub use config::Config;
pub use error::{Error, Result};
pub use event::{Gesture, GestureKind, RawEvent};
pub use screen::{Context, Panel, Screen};

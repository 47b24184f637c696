//! Recinto Console - Terminal front end for the seating panel
//!
//! Wires the poll driver to a [`recinto_overlay::SeatingPanel`] and draws
//! it with ratatui, or logs it in headless mode.

pub mod config;
pub mod console;
pub mod logging;
pub mod seating_view;

pub use config::{ConsoleConfig, LogFormat, Overrides};

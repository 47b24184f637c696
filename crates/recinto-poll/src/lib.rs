//! Recinto Poll - Fetches the backend's global state on a fixed cadence
//! and fans every snapshot out to the registered panels.
//!
//! Ticks never overlap: the next fetch is scheduled only after the
//! previous one, fan-out included, has completed.

pub mod driver;
pub mod sink;
pub mod source;

pub use driver::{Connectivity, PollConfig, PollDriver, PollStatus};
pub use sink::PanelSink;
pub use source::{state_url, HttpStateSource, StateSource};

use std::time::Duration;

use recinto_protocol::ProtocolError;

/// Errors from one poll tick. Every variant counts as a connectivity
/// failure for that tick.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend answered with status {0}")]
    Status(u16),

    #[error("No answer within {0:?}")]
    Timeout(Duration),

    #[error("Invalid state document: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Invalid backend URL: {0}")]
    Url(String),
}

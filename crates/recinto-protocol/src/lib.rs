//! Recinto Protocol - Snapshot types for the moderation console
//!
//! Models the global state document published by the session backend
//! (`GET /estados/estado_global`) and the identities used to track a
//! session and a vote across successive polls.

pub mod constants;
pub mod error;
pub mod identity;
pub mod lenient;
pub mod timestamps;
pub mod types;

pub use constants::*;
pub use error::*;
pub use identity::*;
pub use timestamps::parse_timestamp;
pub use types::*;

//! Recinto Overlay - Per-tick reconciliation of the seating panel
//!
//! Paints the polled session state onto the seat grid:
//! - vote marks of the single in-progress vote, kept visible for a
//!   cooldown after it closes
//! - absence and "currently speaking" marks
//! - the session header (quorum delta) and the floor-request queue

pub mod header;
pub mod panel;
pub mod presence;
pub mod votes;

pub use header::{floor_queue, QuorumTone, SessionHeader};
pub use panel::{PanelView, SeatingPanel};
pub use votes::{OverlayPhase, VoteOverlay, VoteOverlayConfig, VoteTally};

use recinto_layout::LayoutError;

/// Errors from the vote overlay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverlayError {
    #[error("{count} votes are EN_CURSO at the same time; seat votes cannot be rendered")]
    MultipleConcurrentVotes { count: usize },
}

/// Errors shown in place of the seat grid. Both kinds are local to the
/// panel and clear on their own once a consistent snapshot arrives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

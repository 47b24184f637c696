//! Recinto Layout - Seat numbering and the seat-grid cache
//!
//! Turns the session's row/seat-count description into a deterministic
//! seat numbering, assigns roster members to seats, and keeps the built
//! grid of seat cells across polls until the session or the description
//! changes.

pub mod assignment;
pub mod cache;
pub mod grid;
pub mod resolver;

pub use assignment::SeatAssignment;
pub use cache::{GridState, Rebuild, SeatGridCache};
pub use grid::{SeatCell, SeatGrid};
pub use resolver::{
    cell_inner_width, resolve, resolve_description, DrawRow, ResolvedLayout, Row,
    SeatLayoutSpec, SeatPlacement,
};

/// Errors produced while resolving a seating description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Seating description is invalid: {0}")]
    Malformed(String),

    #[error("Seating description has no valid rows")]
    Empty,

    #[error("sum(columnas)={seats} does not match roster size={members}")]
    SeatCountMismatch { seats: u64, members: usize },
}

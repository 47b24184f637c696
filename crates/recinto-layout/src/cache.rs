//! Memoised seat grid, keyed by session identity and raw description.
//!
//! Lifecycle per call of [`SeatGridCache::maybe_rebuild`]:
//! - different session → drop everything, then build
//! - same session, different description → rebuild layout and cells
//! - same session and description with a grid in place → reuse it
//! - resolution failure → hold the error and retry on the next call

use recinto_protocol::{Member, SessionIdentity};

use crate::{resolve_description, LayoutError, ResolvedLayout, SeatAssignment, SeatGrid};

/// What the cache currently holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GridState {
    /// Nothing built yet (no session, or just reset).
    #[default]
    Empty,
    /// A grid built from a valid description.
    Ready(SeatGrid),
    /// The last description failed to resolve.
    Failed(LayoutError),
}

/// Outcome of a successful [`SeatGridCache::maybe_rebuild`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rebuild {
    /// `false` when the cached grid was reused; callers must not rebuild
    /// per-seat state in that case.
    pub rebuilt: bool,
}

#[derive(Debug, Default)]
pub struct SeatGridCache {
    session: Option<SessionIdentity>,
    description: Option<String>,
    state: GridState,
}

impl SeatGridCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached grid or resolve a new one.
    pub fn maybe_rebuild(
        &mut self,
        session: &SessionIdentity,
        raw_description: &str,
        roster: &[Member],
    ) -> Result<Rebuild, LayoutError> {
        if self.session.as_ref() != Some(session) {
            if let Some(previous) = &self.session {
                tracing::info!(%previous, current = %session, "Session changed, dropping seat grid");
            }
            self.reset();
            self.session = Some(session.clone());
        }

        if matches!(self.state, GridState::Ready(_))
            && self.description.as_deref() == Some(raw_description)
        {
            return Ok(Rebuild { rebuilt: false });
        }

        self.description = None;
        match resolve_description(raw_description, roster.len()) {
            Ok(layout) => {
                let assignment = SeatAssignment::build(&layout, roster);
                tracing::info!(
                    session = %session,
                    rows = layout.rows_ascending().len(),
                    seats = layout.total_seats(),
                    "Seat grid built"
                );
                self.state = GridState::Ready(SeatGrid::build(layout, &assignment));
                self.description = Some(raw_description.to_string());
                Ok(Rebuild { rebuilt: true })
            }
            Err(e) => {
                if self.error() != Some(&e) {
                    tracing::warn!(session = %session, error = %e, "Seating description rejected");
                } else {
                    tracing::debug!(error = %e, "Seating description still rejected");
                }
                self.state = GridState::Failed(e.clone());
                Err(e)
            }
        }
    }

    /// Rebuild the cells of the cached layout with every mark blank.
    pub fn rebuild_cells(&mut self) {
        if let GridState::Ready(grid) = &mut self.state {
            grid.reset_marks();
        }
    }

    /// Back to the initial empty state.
    pub fn reset(&mut self) {
        self.session = None;
        self.description = None;
        self.state = GridState::Empty;
    }

    pub fn session(&self) -> Option<&SessionIdentity> {
        self.session.as_ref()
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn layout(&self) -> Option<&ResolvedLayout> {
        self.grid().map(SeatGrid::layout)
    }

    pub fn grid(&self) -> Option<&SeatGrid> {
        match &self.state {
            GridState::Ready(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn grid_mut(&mut self) -> Option<&mut SeatGrid> {
        match &mut self.state {
            GridState::Ready(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LayoutError> {
        match &self.state {
            GridState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

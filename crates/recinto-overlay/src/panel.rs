//! The seating panel: one reconciler instance per displayed panel.
//!
//! Each poll tick goes through [`SeatingPanel::on_state`]:
//! 1. no open session → reset to the initial empty state
//! 2. session identity changed → reset, then continue
//! 3. header and floor queue refreshed
//! 4. seat grid reused or rebuilt (layout errors stop the tick)
//! 5. vote consistency checked (inconsistency stops the tick, no writes)
//! 6. presence/speaker marks, then vote marks
//!
//! Poll failures go through [`SeatingPanel::on_error`]: the last rendered
//! state stays, but a cooldown whose deadline has passed is still cleared.

use std::fmt;

use chrono::{DateTime, Utc};

use recinto_layout::{GridState, Rebuild, SeatGrid, SeatGridCache};
use recinto_protocol::{GlobalState, SessionIdentity};

use crate::header::{floor_queue, SessionHeader};
use crate::votes::{VoteOverlay, VoteOverlayConfig};
use crate::{presence, OverlayError, PanelError};

/// What the panel should display right now.
#[derive(Debug)]
pub enum PanelView<'a> {
    /// No open session: the panel is empty, without placeholder.
    NoSession,
    /// A panel-local error replaces the seat grid.
    Error(PanelError),
    Seats(&'a SeatGrid),
}

pub struct SeatingPanel {
    cache: SeatGridCache,
    votes: VoteOverlay,
    overlay_error: Option<OverlayError>,
    header: Option<SessionHeader>,
    floor_queue: Vec<String>,
}

impl SeatingPanel {
    pub fn new(config: VoteOverlayConfig) -> Self {
        Self {
            cache: SeatGridCache::new(),
            votes: VoteOverlay::new(config),
            overlay_error: None,
            header: None,
            floor_queue: Vec::new(),
        }
    }

    /// Reconcile the panel with one polled snapshot.
    pub fn on_state(
        &mut self,
        state: &GlobalState,
        now: DateTime<Utc>,
    ) -> Result<Rebuild, PanelError> {
        let Some(session) = state.open_session() else {
            if self.cache.session().is_some() {
                tracing::info!("Session closed, seating panel cleared");
            }
            self.reset();
            return Ok(Rebuild { rebuilt: false });
        };

        let identity = SessionIdentity::of(session);
        if self.cache.session() != Some(&identity) {
            tracing::info!(session = %identity, "Tracking new session");
            self.reset();
        }

        self.header = Some(SessionHeader::from_session(session));
        self.floor_queue = floor_queue(session);

        let rebuild = match self.cache.maybe_rebuild(
            &identity,
            session.seating_description(),
            &session.concejales,
        ) {
            Ok(rebuild) => rebuild,
            Err(e) => {
                self.overlay_error = None;
                return Err(e.into());
            }
        };

        if let Err(e) = VoteOverlay::check_consistency(session) {
            if self.overlay_error.as_ref() != Some(&e) {
                tracing::warn!(session = %identity, error = %e, "Inconsistent vote state, seat overlay suspended");
            }
            self.overlay_error = Some(e.clone());
            return Err(e.into());
        }

        // Recovering from an inconsistent snapshot: start from blank cells.
        if self.overlay_error.take().is_some() && !rebuild.rebuilt {
            tracing::info!(session = %identity, "Vote state consistent again, seat grid restored");
            self.cache.rebuild_cells();
        }

        let Some(grid) = self.cache.grid_mut() else {
            return Ok(rebuild);
        };
        presence::apply_session(grid, session);
        self.votes.apply(session, grid, now)?;

        Ok(rebuild)
    }

    /// A poll failed. The last rendered state stays, except for vote
    /// results whose cooldown ran out during the outage.
    pub fn on_error(&mut self, error: &dyn fmt::Display, now: DateTime<Utc>) {
        tracing::debug!(error = %error, "Poll failed, keeping last seating state");
        if let Some(grid) = self.cache.grid_mut() {
            self.votes.expire(grid, now);
        }
    }

    /// Back to the initial empty state.
    pub fn reset(&mut self) {
        self.cache.reset();
        self.votes.reset();
        self.overlay_error = None;
        self.header = None;
        self.floor_queue.clear();
    }

    /// Current display state. An inconsistent vote snapshot takes
    /// precedence over a stale but valid grid.
    pub fn view(&self) -> PanelView<'_> {
        if let Some(e) = &self.overlay_error {
            return PanelView::Error(e.clone().into());
        }
        match self.cache.state() {
            GridState::Empty => PanelView::NoSession,
            GridState::Failed(e) => PanelView::Error(e.clone().into()),
            GridState::Ready(grid) => PanelView::Seats(grid),
        }
    }

    pub fn error(&self) -> Option<PanelError> {
        match self.view() {
            PanelView::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn grid(&self) -> Option<&SeatGrid> {
        self.cache.grid()
    }

    pub fn session(&self) -> Option<&SessionIdentity> {
        self.cache.session()
    }

    pub fn header(&self) -> Option<&SessionHeader> {
        self.header.as_ref()
    }

    pub fn floor_queue(&self) -> &[String] {
        &self.floor_queue
    }

    pub fn votes(&self) -> &VoteOverlay {
        &self.votes
    }
}

impl Default for SeatingPanel {
    fn default() -> Self {
        Self::new(VoteOverlayConfig::default())
    }
}

//! Vote overlay: which vote owns the seat marks, and for how long.
//!
//! Phases, per session:
//! - `Idle`: nothing tracked, every seat blank
//! - `Live`: one vote is EN_CURSO; its ballots are re-applied every tick
//! - `Cooldown`: the tracked vote has closed; its ballots keep being
//!   re-applied (late ballots still show) until the deadline, then the
//!   seats are blanked and the overlay returns to `Idle`
//!
//! A different vote going live blanks the seats at once and cancels any
//! pending deadline. The deadline is fixed when the vote closes; a grid
//! rebuild during cooldown repaints the marks without moving it. Two or more votes EN_CURSO in one snapshot is an
//! inconsistency: nothing is written until the backend settles.

use chrono::{DateTime, Duration, Utc};

use recinto_layout::SeatGrid;
use recinto_protocol::{
    BallotClass, SessionSnapshot, VoteRef, VoteSnapshot, VoteState, VOTE_RESULT_COOLDOWN_MS,
};

use crate::OverlayError;

/// Configuration for the vote overlay.
#[derive(Debug, Clone)]
pub struct VoteOverlayConfig {
    /// How long results stay on the seats after the vote closes.
    pub cooldown: Duration,
}

impl Default for VoteOverlayConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::milliseconds(VOTE_RESULT_COOLDOWN_MS as i64),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverlayPhase {
    #[default]
    Idle,
    Live {
        vote: VoteRef,
    },
    Cooldown {
        vote: VoteRef,
        deadline: DateTime<Utc>,
    },
}

/// Ballot counts of the tracked vote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub positive: usize,
    pub negative: usize,
    pub abstention: usize,
    /// Ballots whose value matches no known class.
    pub other: usize,
    pub total: usize,
}

impl VoteTally {
    pub fn of(vote: &VoteSnapshot) -> Self {
        let mut tally = Self::default();
        for ballot in &vote.votos {
            match ballot.value().class {
                Some(BallotClass::Positive) => tally.positive += 1,
                Some(BallotClass::Negative) => tally.negative += 1,
                Some(BallotClass::Abstention) => tally.abstention += 1,
                None => tally.other += 1,
            }
            tally.total += 1;
        }
        tally
    }
}

/// Owns the overlay state of one session.
pub struct VoteOverlay {
    config: VoteOverlayConfig,
    phase: OverlayPhase,
    tally: Option<VoteTally>,
    vote_state: Option<VoteState>,
}

impl VoteOverlay {
    pub fn new(config: VoteOverlayConfig) -> Self {
        Self {
            config,
            phase: OverlayPhase::Idle,
            tally: None,
            vote_state: None,
        }
    }

    /// Fail when the snapshot reports more than one vote EN_CURSO.
    pub fn check_consistency(session: &SessionSnapshot) -> Result<(), OverlayError> {
        let count = session.votes_in_progress().len();
        if count > 1 {
            return Err(OverlayError::MultipleConcurrentVotes { count });
        }
        Ok(())
    }

    /// Reconcile the seat marks with one snapshot.
    ///
    /// On error no seat is touched and the phase is left as it was.
    pub fn apply(
        &mut self,
        session: &SessionSnapshot,
        grid: &mut SeatGrid,
        now: DateTime<Utc>,
    ) -> Result<(), OverlayError> {
        Self::check_consistency(session)?;

        if let [vote] = session.votes_in_progress().as_slice() {
            let vote_ref = VoteRef::of(vote);
            match &self.phase {
                OverlayPhase::Live { vote: tracked } if *tracked == vote_ref => {}
                OverlayPhase::Cooldown { vote: tracked, .. } if *tracked == vote_ref => {
                    tracing::debug!(vote = %vote_ref, "Tracked vote is in progress again, clear cancelled");
                }
                _ => {
                    tracing::info!(vote = %vote_ref, "Vote in progress, seat marks blanked");
                    grid.clear_vote_marks();
                }
            }
            self.phase = OverlayPhase::Live { vote: vote_ref };
            self.paint(grid, vote);
            return Ok(());
        }

        let tracked = match &self.phase {
            OverlayPhase::Idle => {
                grid.clear_vote_marks();
                self.tally = None;
                self.vote_state = None;
                return Ok(());
            }
            OverlayPhase::Live { vote } | OverlayPhase::Cooldown { vote, .. } => vote.clone(),
        };

        // Keep showing the tracked vote so ballots landing right at the
        // close are not lost.
        let closed = tracked.find_in(&session.votaciones);
        if let Some(vote) = closed {
            self.paint(grid, vote);
        }

        if matches!(self.phase, OverlayPhase::Live { .. }) {
            let deadline = closed
                .and_then(VoteSnapshot::ended_at)
                .map(|ended| ended + self.config.cooldown)
                .unwrap_or(now + self.config.cooldown);
            tracing::debug!(vote = %tracked, %deadline, "Vote closed, results held until deadline");
            self.phase = OverlayPhase::Cooldown {
                vote: tracked,
                deadline,
            };
        }

        self.expire(grid, now);
        Ok(())
    }

    /// Blank the seats if the cooldown deadline has passed.
    /// Returns `true` when it did.
    pub fn expire(&mut self, grid: &mut SeatGrid, now: DateTime<Utc>) -> bool {
        let OverlayPhase::Cooldown { vote, deadline } = &self.phase else {
            return false;
        };
        if now < *deadline {
            return false;
        }
        tracing::info!(vote = %vote, "Vote results cleared from seats");
        grid.clear_vote_marks();
        self.phase = OverlayPhase::Idle;
        self.tally = None;
        self.vote_state = None;
        true
    }

    pub fn reset(&mut self) {
        self.phase = OverlayPhase::Idle;
        self.tally = None;
        self.vote_state = None;
    }

    pub fn phase(&self) -> &OverlayPhase {
        &self.phase
    }

    pub fn active_vote_ref(&self) -> Option<&VoteRef> {
        match &self.phase {
            OverlayPhase::Idle => None,
            OverlayPhase::Live { vote } | OverlayPhase::Cooldown { vote, .. } => Some(vote),
        }
    }

    pub fn pending_clear_deadline(&self) -> Option<DateTime<Utc>> {
        match &self.phase {
            OverlayPhase::Cooldown { deadline, .. } => Some(*deadline),
            _ => None,
        }
    }

    /// Counts of the vote currently painted, if any.
    pub fn tally(&self) -> Option<VoteTally> {
        self.tally
    }

    /// Backend state of the vote currently painted, e.g. `Aprobada`.
    pub fn vote_state(&self) -> Option<VoteState> {
        self.vote_state
    }

    fn paint(&mut self, grid: &mut SeatGrid, vote: &VoteSnapshot) {
        grid.clear_vote_marks();
        for ballot in &vote.votos {
            let Some(seat) = ballot.seat_number() else {
                continue;
            };
            match grid.cell_mut(seat) {
                Some(cell) => cell.vote = Some(ballot.value()),
                None => tracing::debug!(seat, "Ballot for a seat outside the grid"),
            }
        }
        self.tally = Some(VoteTally::of(vote));
        self.vote_state = Some(vote.estado);
    }
}

impl Default for VoteOverlay {
    fn default() -> Self {
        Self::new(VoteOverlayConfig::default())
    }
}

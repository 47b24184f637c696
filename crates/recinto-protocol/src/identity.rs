use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{SessionSnapshot, VoteSnapshot};

/// Identity of a session across polls.
///
/// Session numbers are reused, so the start timestamp is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub number: String,
    pub started_at: String,
}

impl SessionIdentity {
    pub fn new(number: impl Into<String>, started_at: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            started_at: started_at.into(),
        }
    }

    pub fn of(session: &SessionSnapshot) -> Self {
        Self::new(
            session.numero_sesion.clone().unwrap_or_default(),
            session.hora_inicio.clone().unwrap_or_default(),
        )
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.number, self.started_at)
    }
}

/// Identity of a vote: its id (or number when the id is missing) plus
/// its start time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteRef {
    pub key: String,
    pub started_at: String,
}

impl VoteRef {
    pub fn of(vote: &VoteSnapshot) -> Self {
        let key = vote
            .id
            .clone()
            .or_else(|| vote.numero.clone())
            .unwrap_or_default();
        Self {
            key,
            started_at: vote.hora_inicio.clone().unwrap_or_default(),
        }
    }

    /// Find the vote this reference points at: exact id first, then the
    /// vote number, both with a matching start time.
    pub fn find_in<'a>(&self, votes: &'a [VoteSnapshot]) -> Option<&'a VoteSnapshot> {
        let started = |v: &VoteSnapshot| v.hora_inicio.as_deref().unwrap_or("") == self.started_at;
        votes
            .iter()
            .find(|v| v.id.as_deref().unwrap_or("") == self.key && started(v))
            .or_else(|| {
                votes
                    .iter()
                    .find(|v| v.numero.as_deref().unwrap_or("") == self.key && started(v))
            })
    }
}

impl fmt::Display for VoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.key, self.started_at)
    }
}

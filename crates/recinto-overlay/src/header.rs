use std::fmt;

use recinto_protocol::SessionSnapshot;

/// Colour of the quorum delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuorumTone {
    Good,
    Bad,
    Neutral,
}

/// Header line of the seating panel: session number, attendance and the
/// distance to quorum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeader {
    pub number: Option<String>,
    pub present: i64,
    pub total: i64,
    pub quorum: Option<i64>,
}

impl SessionHeader {
    /// Explicit counts from the backend win; otherwise they are derived
    /// from the roster.
    pub fn from_session(session: &SessionSnapshot) -> Self {
        let total = session
            .cantidad_concejales
            .unwrap_or(session.concejales.len() as i64);
        let present = session.cantidad_presentes.unwrap_or_else(|| {
            session
                .concejales
                .iter()
                .filter(|m| m.presente == Some(true))
                .count() as i64
        });
        Self {
            number: session.numero_sesion.clone(),
            present,
            total,
            quorum: session.quorum,
        }
    }

    /// `present - quorum`, when quorum is known.
    pub fn quorum_delta(&self) -> Option<i64> {
        self.quorum.map(|q| self.present - q)
    }

    pub fn tone(&self) -> QuorumTone {
        match self.quorum_delta() {
            None => QuorumTone::Neutral,
            Some(d) if d >= 0 => QuorumTone::Good,
            Some(_) => QuorumTone::Bad,
        }
    }

    /// `+2`, `0`, `-1`, or `–` when quorum is unknown.
    pub fn delta_text(&self) -> String {
        match self.quorum_delta() {
            None => "–".to_string(),
            Some(d) if d > 0 => format!("+{d}"),
            Some(d) => d.to_string(),
        }
    }
}

impl fmt::Display for SessionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sesión Nº {} - Concejales {} de {} totales - Quorum: {}",
            self.number.as_deref().unwrap_or("–"),
            self.present,
            self.total,
            self.delta_text()
        )
    }
}

/// Labels of the floor-request queue, in queue order.
pub fn floor_queue(session: &SessionSnapshot) -> Vec<String> {
    session
        .pedidos_uso_de_palabra
        .iter()
        .map(|r| r.label())
        .collect()
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{lenient, parse_timestamp, ProtocolError};

/// The document returned by the state endpoint.
#[derive(Debug, Clone, Default)]
pub struct GlobalState {
    /// Session as reported by the backend, open or closed.
    pub sesion: Option<SessionSnapshot>,
}

impl GlobalState {
    /// Decode a raw state document.
    ///
    /// The endpoint normally wraps the session as `{"sesion": {...}}`, but a
    /// bare session object is accepted too. A `sesion` that is not an
    /// object counts as "no session".
    pub fn from_value(raw: Value) -> Result<Self, ProtocolError> {
        let session_value = match raw {
            Value::Object(mut map) => match map.remove("sesion") {
                Some(inner) => inner,
                None => Value::Object(map),
            },
            _ => return Ok(Self::default()),
        };

        if !session_value.is_object() {
            return Ok(Self::default());
        }

        let sesion = serde_json::from_value::<SessionSnapshot>(session_value)
            .map_err(|e| ProtocolError::Snapshot(e.to_string()))?;
        Ok(Self { sesion: Some(sesion) })
    }

    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// The session, if one exists and has not been closed.
    pub fn open_session(&self) -> Option<&SessionSnapshot> {
        self.sesion.as_ref().filter(|s| s.is_open())
    }
}

/// One council session as published by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub numero_sesion: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub abierta: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hora_inicio: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hora_fin: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub quorum: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub cantidad_concejales: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub cantidad_presentes: Option<i64>,
    #[serde(default, deserialize_with = "lenient::vec_or_default")]
    pub concejales: Vec<Member>,
    /// Raw seating description (`{"filas":[{"fila":1,"columnas":3}]}`).
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub disposicion_bancas: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_object")]
    pub en_uso_de_palabra: Option<SpeakerRef>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub pedidos_uso_de_palabra: Vec<FloorRequest>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub votaciones: Vec<VoteSnapshot>,
}

impl SessionSnapshot {
    /// Only an explicit `abierta: false` closes a session.
    pub fn is_open(&self) -> bool {
        self.abierta != Some(false)
    }

    pub fn seating_description(&self) -> &str {
        self.disposicion_bancas.as_deref().unwrap_or("")
    }

    /// Seat number of the member currently holding the floor.
    pub fn speaking_seat(&self) -> Option<u32> {
        self.en_uso_de_palabra.as_ref().and_then(|s| s.banca)
    }

    /// Votes currently reported as `EN_CURSO`.
    pub fn votes_in_progress(&self) -> Vec<&VoteSnapshot> {
        self.votaciones
            .iter()
            .filter(|v| v.estado.is_in_progress())
            .collect()
    }
}

/// A council member on the session roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub dni: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub nombre: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub apellido: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub bloque: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub presente: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_seat")]
    pub banca: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub mostrar_test: Option<bool>,
}

impl Member {
    /// Absent only when the backend says so explicitly.
    pub fn is_absent(&self) -> bool {
        self.presente == Some(false)
    }

    /// `"Apellido N."`, the short form used on the floor queue.
    pub fn short_name(&self) -> String {
        short_name(&self.nombre, &self.apellido)
    }
}

/// The member currently holding the floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakerRef {
    #[serde(default, deserialize_with = "lenient::opt_seat")]
    pub banca: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub nombre: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub apellido: String,
}

/// A pending request to speak.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorRequest {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub nombre: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub apellido: String,
    #[serde(default, deserialize_with = "lenient::opt_seat")]
    pub banca: Option<u32>,
}

impl FloorRequest {
    pub fn label(&self) -> String {
        short_name(&self.nombre, &self.apellido)
    }
}

fn short_name(nombre: &str, apellido: &str) -> String {
    let apellido = apellido.trim();
    let initial = nombre
        .trim()
        .chars()
        .next()
        .map(|c| format!("{c}."))
        .unwrap_or_default();
    format!("{apellido} {initial}").trim().to_string()
}

/// State of a vote as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum VoteState {
    #[serde(rename = "EN_CURSO")]
    EnCurso,
    #[serde(rename = "EMPATADA")]
    Empatada,
    #[serde(rename = "APROBADA")]
    Aprobada,
    #[serde(rename = "RECHAZADA")]
    Rechazada,
    #[serde(rename = "INCONCLUSA")]
    Inconclusa,
    /// Anything else; never treated as in progress.
    #[default]
    Unknown,
}

impl VoteState {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "EN_CURSO" => Self::EnCurso,
            "EMPATADA" => Self::Empatada,
            "APROBADA" => Self::Aprobada,
            "RECHAZADA" => Self::Rechazada,
            "INCONCLUSA" => Self::Inconclusa,
            _ => Self::Unknown,
        }
    }

    /// Human label shown next to the vote.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EnCurso => "En curso",
            Self::Empatada => "Empatada",
            Self::Aprobada => "Aprobada",
            Self::Rechazada => "Rechazada",
            Self::Inconclusa => "Inconclusa",
            Self::Unknown => "",
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::EnCurso)
    }
}

impl fmt::Display for VoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl<'de> Deserialize<'de> for VoteState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(VoteState::from_wire).unwrap_or_default())
    }
}

/// One vote of the session with the ballots cast so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteSnapshot {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub numero: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub tema: Option<String>,
    #[serde(default)]
    pub estado: VoteState,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hora_inicio: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hora_fin: Option<String>,
    #[serde(default, deserialize_with = "lenient::vec_or_empty")]
    pub votos: Vec<BallotSnapshot>,
}

impl VoteSnapshot {
    /// End time, if present and parseable.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.hora_fin.as_deref().and_then(parse_timestamp)
    }
}

/// A single ballot: who voted (by seat) and the raw value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallotSnapshot {
    #[serde(default, deserialize_with = "lenient::opt_object")]
    pub concejal: Option<BallotVoter>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub valor_voto: String,
}

impl BallotSnapshot {
    pub fn seat_number(&self) -> Option<u32> {
        self.concejal.as_ref().and_then(|c| c.banca)
    }

    pub fn value(&self) -> BallotValue {
        BallotValue::from_wire(&self.valor_voto)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallotVoter {
    #[serde(default, deserialize_with = "lenient::opt_seat")]
    pub banca: Option<u32>,
}

/// Colour class of a ballot value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BallotClass {
    Positive,
    Negative,
    Abstention,
}

/// A ballot value as shown on a seat: the trimmed text plus its class.
/// Values that match no class keep their text and get no colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotValue {
    pub text: String,
    pub class: Option<BallotClass>,
}

impl BallotValue {
    /// Classification is accent- and case-insensitive on the prefix, so
    /// `Abstención`, `Abstencion` and `ABS` all count as abstentions.
    pub fn from_wire(raw: &str) -> Self {
        let text = raw.trim().to_string();
        let lower = text.to_lowercase();
        let class = if lower.starts_with("pos") || lower.contains("positivo") {
            Some(BallotClass::Positive)
        } else if lower.starts_with("neg") || lower.contains("negativo") {
            Some(BallotClass::Negative)
        } else if lower.starts_with("abs") || lower.contains("abst") {
            Some(BallotClass::Abstention)
        } else {
            None
        };
        Self { text, class }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrapped_and_bare_sessions_decode() {
        let wrapped = GlobalState::from_value(json!({
            "hay_sesion": true,
            "sesion": { "numero_sesion": 7, "abierta": true }
        }))
        .unwrap();
        let bare = GlobalState::from_value(json!({ "numero_sesion": 7, "abierta": true })).unwrap();

        assert_eq!(wrapped.sesion.unwrap().numero_sesion.as_deref(), Some("7"));
        assert_eq!(bare.sesion.unwrap().numero_sesion.as_deref(), Some("7"));
    }

    #[test]
    fn test_null_or_scalar_session_is_absent() {
        assert!(GlobalState::from_value(json!({ "sesion": null })).unwrap().sesion.is_none());
        assert!(GlobalState::from_value(json!({ "sesion": 3 })).unwrap().sesion.is_none());
        assert!(GlobalState::from_value(json!(null)).unwrap().sesion.is_none());
    }

    #[test]
    fn test_closed_session_is_not_open() {
        let state = GlobalState::from_value(json!({ "sesion": { "abierta": false } })).unwrap();
        assert!(state.sesion.is_some());
        assert!(state.open_session().is_none());

        // Missing flag means open.
        let state = GlobalState::from_value(json!({ "sesion": {} })).unwrap();
        assert!(state.open_session().is_some());
    }

    #[test]
    fn test_lenient_member_fields() {
        let state = GlobalState::from_value(json!({
            "sesion": {
                "concejales": [
                    { "nombre": "Ana", "apellido": "Paz", "banca": "3", "presente": false },
                    { "nombre": "Luis", "apellido": "Gil", "banca": "x", "presente": "no" },
                    "not-an-object"
                ]
            }
        }))
        .unwrap();
        let roster = &state.sesion.unwrap().concejales;
        assert_eq!(roster.len(), 3, "every roster entry counts toward the seat total");
        assert_eq!(roster[0].banca, Some(3));
        assert!(roster[0].is_absent());
        assert_eq!(roster[1].banca, None);
        assert!(!roster[1].is_absent());
        assert_eq!(roster[2], Member::default());
    }

    #[test]
    fn test_vote_state_unknown_values() {
        let vote: VoteSnapshot = serde_json::from_value(json!({ "estado": "SUSPENDIDA" })).unwrap();
        assert_eq!(vote.estado, VoteState::Unknown);
        let vote: VoteSnapshot = serde_json::from_value(json!({ "estado": null })).unwrap();
        assert!(!vote.estado.is_in_progress());
        let vote: VoteSnapshot = serde_json::from_value(json!({ "estado": "EN_CURSO" })).unwrap();
        assert!(vote.estado.is_in_progress());
    }

    #[test]
    fn test_ballot_classification() {
        assert_eq!(BallotValue::from_wire(" Positivo ").class, Some(BallotClass::Positive));
        assert_eq!(BallotValue::from_wire("Negativo").class, Some(BallotClass::Negative));
        assert_eq!(BallotValue::from_wire("Abstención").class, Some(BallotClass::Abstention));
        assert_eq!(BallotValue::from_wire("ABSTENCION").class, Some(BallotClass::Abstention));

        let other = BallotValue::from_wire("Ausente");
        assert_eq!(other.text, "Ausente");
        assert_eq!(other.class, None);
    }

    #[test]
    fn test_short_name_format() {
        let req = FloorRequest { nombre: "María".into(), apellido: " Suárez ".into(), banca: None };
        assert_eq!(req.label(), "Suárez M.");
        let req = FloorRequest { nombre: "".into(), apellido: "Gil".into(), banca: None };
        assert_eq!(req.label(), "Gil");
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed session snapshot: {0}")]
    Snapshot(String),
}

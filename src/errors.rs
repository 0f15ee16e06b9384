use thiserror::Error;

/// Error type that captures ledger, trip, and persistence failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),
    #[error("Record not found: {0}")]
    RecordNotFound(String),
    #[error("Trip not found: {0}")]
    TripNotFound(String),
    #[error("Trip `{0}` is locked")]
    TripLocked(String),
    #[error("Incorrect password for trip `{0}`")]
    IncorrectPassword(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

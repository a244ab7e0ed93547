use thiserror::Error;

#[derive(Debug, Error)]
pub enum KlimatError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for KlimatError {
    fn from(e: serde_json::Error) -> Self {
        KlimatError::SerializationError(e.to_string())
    }
}

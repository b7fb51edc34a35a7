use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DealSnapError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Root not bracketed: {function} has no sign change between {lower} and {upper}")]
    RootNotBracketed {
        function: String,
        lower: Decimal,
        upper: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DealSnapError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        DealSnapError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for DealSnapError {
    fn from(e: serde_json::Error) -> Self {
        DealSnapError::SerializationError(e.to_string())
    }
}

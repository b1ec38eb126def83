use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// loan parameters fail the positivity gate; recoverable by fixing input
    #[error("invalid loan parameter {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// degenerate numeric configuration handed straight to a calculator
    #[error("invalid term: {message}")]
    InvalidTerm {
        message: String,
    },

    #[error("calculation error: {message}")]
    Calculation {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation { .. })
    }

    /// decimal overflow at a named calculation step
    pub fn overflow(step: &str) -> Self {
        EngineError::Calculation {
            message: format!("decimal overflow in {}", step),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

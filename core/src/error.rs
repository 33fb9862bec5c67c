use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Arithmetic error in check '{check}': {operation} out of range")]
    Arithmetic {
        check: &'static str,
        operation: &'static str,
    },

    #[error("Check '{check}' panicked during evaluation")]
    CheckPanicked { check: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

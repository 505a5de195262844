use thiserror::Error;
use weft_merge::MergeError;
use weft_redact::RedactError;
use weft_types::TypeError;

/// Errors returned by the [`Engine`](crate::Engine).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("redaction failed: {0}")]
    Redact(#[from] RedactError),

    /// Strict mode: an input failed reference validation.
    #[error("input document {index} ('{label}') is invalid: {source}")]
    InvalidDocument {
        index: usize,
        label: String,
        source: TypeError,
    },

    /// Every input was rejected.
    #[error("no valid input documents ({rejected} rejected)")]
    NoValidDocuments { rejected: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

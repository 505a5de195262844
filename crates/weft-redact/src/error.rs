//! Error types for redaction.

use std::fmt;

use weft_types::TypeError;

/// Why a salt was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaltDefect {
    Missing,
    /// Too few distinct byte values: all-zero or patterned.
    LowEntropy { distinct: usize, required: usize },
    /// Equal to the salt of the document being redacted.
    SameAsInput,
    /// Already used for an earlier output.
    AlreadyUsed,
}

impl fmt::Display for SaltDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("no salt supplied"),
            Self::LowEntropy { distinct, required } => write!(
                f,
                "salt has {distinct} distinct byte values, at least {required} required"
            ),
            Self::SameAsInput => f.write_str("salt equals the input document's salt"),
            Self::AlreadyUsed => f.write_str("salt was already used for another output"),
        }
    }
}

/// Errors that abort a redaction. Nothing is produced when one is returned.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RedactError {
    #[error("salt missing or reused: {0}")]
    SaltMissingOrReused(SaltDefect),

    #[error("invalid input document: {0}")]
    InvalidDocument(#[from] TypeError),
}

/// Convenience alias for redaction results.
pub type RedactResult<T> = Result<T, RedactError>;

//! Error types for identifier handling.

/// Errors raised while canonicalizing identifier records.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The record cannot be given a canonical form.
    #[error("malformed identifier {scheme}:{value}: {reason}")]
    MalformedIdentifier {
        /// Raw scheme code of the offending record.
        scheme: String,
        /// Raw value of the offending record.
        value: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl IdentityError {
    pub(crate) fn malformed(scheme: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            scheme: scheme.to_owned(),
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for identity results.
pub type IdentityResult<T> = Result<T, IdentityError>;

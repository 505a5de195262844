//! Error types for merging.

use weft_types::TypeError;

/// Errors that abort a merge. Nothing is produced when one is returned.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// `merge` was called with an empty document list.
    #[error("no input documents")]
    NoInputDocuments,

    /// The combined inputs exceed what a `u32` ordinal can address.
    #[error("too many {kind}: {count} exceeds the u32 ordinal space")]
    TooManyElements {
        /// `"nodes"` or `"edges"`.
        kind: &'static str,
        count: usize,
    },

    /// An input document failed reference validation.
    #[error("invalid input document: {0}")]
    InvalidDocument(#[from] TypeError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;

//! Selective redaction for Weft graph documents.
//!
//! Sensitive nodes are replaced by `boundary_ref` stand-ins whose single
//! `opaque` identifier is a salted SHA-256 of the node's public identifiers.
//! Stand-ins keep the graph connected without revealing who they are, and a
//! fresh salt per output keeps stand-ins of different outputs unlinkable.
//!
//! # Key Types
//!
//! - [`Redactor`] / [`RedactionSet`] - Redaction entry point and node selection
//! - [`RedactOutput`] - Redacted document, stub mapping, and warnings
//! - [`SaltLedger`] - Fingerprints of salts already used
//! - [`apply_scope`] - Disclosure-scope gate

pub mod boundary;
pub mod config;
pub mod error;
pub mod redactor;
pub mod salt;
pub mod scope;

pub use boundary::{boundary_digest, BoundaryDigest};
pub use config::RedactConfig;
pub use error::{RedactError, RedactResult, SaltDefect};
pub use redactor::{RedactOutput, RedactWarning, RedactionSet, Redactor};
pub use salt::{check_salt, distinct_bytes, SaltLedger};
pub use scope::{apply_scope, ScopeReport};

//! Multi-document merge for Weft graph documents.
//!
//! Nodes from independent documents that share a matching external
//! identifier are collapsed with a disjoint-set forest; edges whose
//! endpoints resolve to the same merged nodes are collapsed when they match.
//! Disagreeing properties are recorded as conflicts rather than resolved.
//!
//! # Key Types
//!
//! - [`Merger`] - Entry point: resolve, then assemble
//! - [`MergeConfig`] / [`SameAsPolicy`] - Tunables
//! - [`MergeOutput`] - Merged document, conflicts, and warnings
//! - [`DisjointSet`] - Union-find used for both nodes and edges

pub mod assemble;
pub mod config;
pub mod conflict;
pub mod error;
pub mod merger;
pub mod resolver;
pub mod warning;

pub use assemble::MergeOutput;
pub use config::{MergeConfig, SameAsPolicy, SameAsThreshold};
pub use conflict::{
    union_identifiers, Conflict, ConflictEntry, ConflictRecord, ElementKind, Reconciled,
    Reconciler, CONFLICTS_KEY, PROVENANCE_KEY, SOURCES_KEY, TYPE_FIELD,
};
pub use weft_identity::DisjointSet;
pub use error::{MergeError, MergeResult};
pub use merger::Merger;
pub use resolver::{InputDocument, Resolution};
pub use warning::MergeWarning;

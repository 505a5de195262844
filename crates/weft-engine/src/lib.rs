//! Merge and redaction pipelines for Weft graph documents.
//!
//! [`Engine`] ties the workspace together: it validates and de-duplicates
//! inputs, merges them with [`weft_merge`], optionally gates the result to a
//! disclosure scope, and redacts it with [`weft_redact`]. Configuration is a
//! serde struct loadable from TOML.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use pipeline::{Engine, MergeReport, PipelineReport, RejectedDocument, StageTiming};

pub use weft_merge::{MergeConfig, MergeOutput, SameAsPolicy, SameAsThreshold};
pub use weft_redact::{RedactConfig, RedactOutput, RedactionSet};

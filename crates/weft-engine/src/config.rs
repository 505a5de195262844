use std::path::Path;

use serde::{Deserialize, Serialize};
use weft_merge::MergeConfig;
use weft_redact::RedactConfig;
use weft_types::DisclosureScope;

use crate::error::{EngineError, EngineResult};

/// Engine configuration, usually loaded from TOML.
///
/// ```toml
/// strict = true
/// target_scope = "partner"
///
/// [merge]
/// group_size_limit = 25
/// same_as = { mode = "honour", threshold = "probable" }
///
/// [redact]
/// scope = "public"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fail the whole operation on the first invalid input instead of
    /// excluding it.
    pub strict: bool,
    /// When set, merged output is passed through the disclosure-scope gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_scope: Option<DisclosureScope>,
    pub merge: MergeConfig,
    pub redact: RedactConfig,
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> EngineResult<String> {
        toml::to_string(self).map_err(|e| EngineError::Config(e.to_string()))
    }
}

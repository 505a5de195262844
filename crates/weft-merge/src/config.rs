use serde::{Deserialize, Serialize};

/// Configuration for the merge resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Merge groups larger than this raise an `OversizedMergeGroup` warning.
    pub group_size_limit: usize,
    /// Label used for input documents whose header has none.
    pub default_source_label: String,
    /// How intra-document `same_as` declarations are treated.
    pub same_as: SameAsPolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            group_size_limit: 50,
            default_source_label: "unlabelled".into(),
            same_as: SameAsPolicy::Ignore,
        }
    }
}

/// Treatment of `same_as` edges during node resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SameAsPolicy {
    /// Declarations are advisory; they are carried through as plain edges.
    #[default]
    Ignore,
    /// Declarations at or above `threshold` join their endpoints.
    Honour {
        threshold: SameAsThreshold,
        /// When `false`, a declaration sharing an endpoint with another
        /// qualifying declaration of the same document is skipped.
        #[serde(default)]
        transitive: bool,
    },
}

/// Confidence levels a `same_as` edge may declare, strongest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameAsThreshold {
    Definite,
    Probable,
    Possible,
}

impl SameAsThreshold {
    /// Parse the `confidence` property of a `same_as` edge.
    ///
    /// Missing or unrecognised values count as `possible`.
    pub fn from_confidence(value: Option<&serde_json::Value>) -> Self {
        match value.and_then(|v| v.as_str()) {
            Some("definite") => Self::Definite,
            Some("probable") => Self::Probable,
            _ => Self::Possible,
        }
    }

    /// Whether a declaration of confidence `declared` meets this threshold.
    pub fn admits(&self, declared: SameAsThreshold) -> bool {
        declared <= *self
    }
}

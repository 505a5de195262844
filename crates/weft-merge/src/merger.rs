use chrono::{DateTime, Utc};
use weft_types::GraphDocument;

use crate::assemble::{assemble, MergeOutput};
use crate::config::MergeConfig;
use crate::error::MergeResult;
use crate::resolver::{resolve, Resolution};

/// Merges graph documents into one.
///
/// The two phases are exposed separately so callers can time or inspect
/// them; [`Merger::merge`] runs both.
#[derive(Clone, Debug, Default)]
pub struct Merger {
    config: MergeConfig,
}

impl Merger {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Compute merge groups without building any output.
    pub fn resolve<'a>(&self, documents: &'a [GraphDocument]) -> MergeResult<Resolution<'a>> {
        resolve(documents, &self.config)
    }

    /// Fold resolved groups into the merged document.
    pub fn assemble(&self, resolution: Resolution<'_>, timestamp: DateTime<Utc>) -> MergeOutput {
        assemble(resolution, &self.config, timestamp)
    }

    /// Merge `documents`, stamping the result with `timestamp`.
    pub fn merge(&self, documents: &[GraphDocument], timestamp: DateTime<Utc>) -> MergeResult<MergeOutput> {
        let resolution = self.resolve(documents)?;
        Ok(self.assemble(resolution, timestamp))
    }
}

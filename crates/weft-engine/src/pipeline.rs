//! Staged merge and redaction pipelines.
//!
//! A merge runs `validate` -> `resolve` -> `reconcile` -> (`scope`); a
//! redaction runs `redact`. Every stage is timed and logged. A pipeline
//! either returns a complete result or an error, never a partial document.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use weft_merge::{MergeOutput, Merger};
use weft_redact::{apply_scope, RedactOutput, RedactionSet, Redactor, SaltLedger, ScopeReport};
use weft_types::{FileSalt, GraphDocument, TypeError};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// Wall-clock time spent in one pipeline stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: &'static str,
    pub elapsed: Duration,
}

/// An input excluded because it failed reference validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedDocument {
    /// Position in the caller's input list.
    pub index: usize,
    pub label: String,
    pub error: TypeError,
}

/// Result of [`Engine::merge`].
#[derive(Clone, Debug)]
pub struct MergeReport {
    pub output: MergeOutput,
    pub rejected: Vec<RejectedDocument>,
    /// Inputs skipped because an identical document came earlier.
    pub duplicates_skipped: usize,
    /// Present when a target scope is configured.
    pub scope: Option<ScopeReport>,
    pub timings: Vec<StageTiming>,
}

impl MergeReport {
    pub fn document(&self) -> &GraphDocument {
        &self.output.document
    }
}

/// Result of [`Engine::merge_and_redact`].
#[derive(Clone, Debug)]
pub struct PipelineReport {
    pub merge: MergeReport,
    pub redaction: RedactOutput,
}

/// Runs merge and redaction pipelines under one configuration.
///
/// Salts used for redacted output are remembered for the engine's lifetime
/// and refused when offered again.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    merger: Merger,
    redactor: Redactor,
    ledger: Mutex<SaltLedger>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            merger: Merger::new(config.merge.clone()),
            redactor: Redactor::new(config.redact.clone()),
            ledger: Mutex::new(SaltLedger::new()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Merge `documents`, stamping the result with the current time.
    pub fn merge(&self, documents: &[GraphDocument]) -> EngineResult<MergeReport> {
        self.merge_at(documents, Utc::now())
    }

    /// Merge `documents`, stamping the result with `timestamp`.
    pub fn merge_at(&self, documents: &[GraphDocument], timestamp: DateTime<Utc>) -> EngineResult<MergeReport> {
        let mut timings = Vec::new();

        let (admitted, rejected, duplicates_skipped) =
            timed(&mut timings, "validate", || self.admit(documents))?;
        let resolution = timed(&mut timings, "resolve", || self.merger.resolve(&admitted))?;
        let mut output = timed(&mut timings, "reconcile", || {
            self.merger.assemble(resolution, timestamp)
        });
        let scope = self.config.target_scope.map(|target| {
            timed(&mut timings, "scope", || apply_scope(&mut output.document, target))
        });

        info!(
            inputs = documents.len(),
            merged = admitted.len(),
            rejected = rejected.len(),
            duplicates = duplicates_skipped,
            nodes = output.document.nodes.len(),
            edges = output.document.edges.len(),
            "merge pipeline complete"
        );
        Ok(MergeReport {
            output,
            rejected,
            duplicates_skipped,
            scope,
            timings,
        })
    }

    /// Redact `document` with a fresh output `salt`.
    pub fn redact(
        &self,
        document: &GraphDocument,
        selection: &RedactionSet,
        salt: FileSalt,
    ) -> EngineResult<RedactOutput> {
        let mut timings = Vec::new();
        self.redact_timed(document, selection, salt, &mut timings)
    }

    /// Merge `documents`, then redact the merged document.
    pub fn merge_and_redact(
        &self,
        documents: &[GraphDocument],
        selection: &RedactionSet,
        salt: FileSalt,
    ) -> EngineResult<PipelineReport> {
        let mut merge = self.merge(documents)?;
        let redaction =
            self.redact_timed(&merge.output.document, selection, salt, &mut merge.timings)?;
        Ok(PipelineReport { merge, redaction })
    }

    fn redact_timed(
        &self,
        document: &GraphDocument,
        selection: &RedactionSet,
        salt: FileSalt,
        timings: &mut Vec<StageTiming>,
    ) -> EngineResult<RedactOutput> {
        // Held for the whole redaction so a salt cannot be claimed twice
        // concurrently.
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        let output = timed(timings, "redact", || {
            self.redactor
                .redact_tracked(document, selection, Some(salt), &mut ledger)
        })?;
        Ok(output)
    }

    /// Drop invalid and repeated inputs.
    fn admit<'d>(
        &self,
        documents: &'d [GraphDocument],
    ) -> EngineResult<(Cow<'d, [GraphDocument]>, Vec<RejectedDocument>, usize)> {
        let mut keep = Vec::with_capacity(documents.len());
        let mut rejected = Vec::new();
        let mut seen = HashSet::new();
        let mut duplicates = 0;

        for (index, doc) in documents.iter().enumerate() {
            if let Err(error) = doc.validate_references() {
                if self.config.strict {
                    return Err(EngineError::InvalidDocument {
                        index,
                        label: doc.label().to_owned(),
                        source: error,
                    });
                }
                warn!(index, label = doc.label(), %error, "rejected input document");
                rejected.push(RejectedDocument {
                    index,
                    label: doc.label().to_owned(),
                    error,
                });
                continue;
            }
            if !seen.insert(digest(doc)?) {
                debug!(index, label = doc.label(), "skipped duplicate input document");
                duplicates += 1;
                continue;
            }
            keep.push(index);
        }

        if keep.is_empty() {
            return Err(EngineError::NoValidDocuments {
                rejected: rejected.len(),
            });
        }
        let admitted = if keep.len() == documents.len() {
            Cow::Borrowed(documents)
        } else {
            Cow::Owned(keep.iter().map(|&i| documents[i].clone()).collect())
        };
        Ok((admitted, rejected, duplicates))
    }
}

/// BLAKE3 digest of a document's JSON form.
fn digest(doc: &GraphDocument) -> EngineResult<[u8; 32]> {
    let bytes = serde_json::to_vec(doc).map_err(|e| EngineError::Serialization(e.to_string()))?;
    Ok(*blake3::hash(&bytes).as_bytes())
}

fn timed<T>(timings: &mut Vec<StageTiming>, stage: &'static str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let value = f();
    let elapsed = start.elapsed();
    debug!(stage, elapsed_us = elapsed.as_micros() as u64, "stage finished");
    timings.push(StageTiming { stage, elapsed });
    value
}

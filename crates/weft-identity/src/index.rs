//! Scheme-bucketed candidate discovery.
//!
//! Every identifier of every subject is placed in a bucket keyed by its
//! scheme. Buckets are independent, so each is canonicalized, sorted and
//! scanned on the rayon pool; the resulting links are merged into one sorted,
//! de-duplicated list. Matching records always share a canonical string, so
//! only records with equal canonical keys are ever compared, and pairs that
//! are already connected within a key are not compared again.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;
use weft_types::{Identifier, Scheme};

use crate::canonical::{canonicalize, CanonicalId};
use crate::dsu::DisjointSet;
use crate::error::IdentityError;
use crate::predicate::{identifiers_match, is_lei_annulled};

/// One element taking part in discovery.
#[derive(Clone, Copy, Debug)]
pub struct Subject<'a> {
    /// Caller-assigned ordinal, reported back in candidate pairs.
    pub ordinal: u32,
    /// Sorted ids of the source documents the element stems from. Subjects
    /// with a common origin are never paired.
    pub origins: &'a [u32],
    pub identifiers: &'a [Identifier],
}

/// An identifier record that was skipped because it has no canonical form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedRecord {
    pub ordinal: u32,
    pub error: IdentityError,
}

/// Result of a discovery pass.
#[derive(Clone, Debug, Default)]
pub struct Discovery {
    /// Candidate links `(a, b)` with `a < b`, sorted and unique. Unioning
    /// them yields the same groups as unioning every matching pair, but a
    /// key shared by `k` subjects contributes at most `k - 1` links.
    pub pairs: Vec<(u32, u32)>,
    pub malformed: Vec<MalformedRecord>,
}

struct Entry<'a> {
    key: CanonicalId,
    ordinal: u32,
    origins: &'a [u32],
    identifier: &'a Identifier,
}

/// Whether two sorted origin lists share no element.
pub fn origins_disjoint(a: &[u32], b: &[u32]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => return false,
        }
    }
    true
}

/// Find all cross-document pairs of subjects sharing a matching identifier.
pub fn discover_candidates<'a>(subjects: &[Subject<'a>]) -> Discovery {
    let mut buckets: BTreeMap<&Scheme, Vec<(&Subject<'a>, &'a Identifier)>> = BTreeMap::new();
    for subject in subjects {
        for id in subject.identifiers {
            // Never matched, and not worth reporting as malformed.
            if id.scheme == Scheme::Internal || is_lei_annulled(id) {
                continue;
            }
            buckets.entry(&id.scheme).or_default().push((subject, id));
        }
    }

    debug!(
        subjects = subjects.len(),
        buckets = buckets.len(),
        "bucketed identifiers by scheme"
    );

    let per_bucket: Vec<(Vec<(u32, u32)>, Vec<MalformedRecord>)> = buckets
        .into_par_iter()
        .map(|(scheme, records)| scan_bucket(scheme, records))
        .collect();

    let mut discovery = Discovery::default();
    for (pairs, malformed) in per_bucket {
        discovery.pairs.extend(pairs);
        discovery.malformed.extend(malformed);
    }
    discovery.pairs.sort_unstable();
    discovery.pairs.dedup();
    discovery
        .malformed
        .sort_by(|a, b| a.ordinal.cmp(&b.ordinal));

    debug!(
        pairs = discovery.pairs.len(),
        malformed = discovery.malformed.len(),
        "candidate discovery complete"
    );
    discovery
}

fn scan_bucket<'a>(
    scheme: &Scheme,
    records: Vec<(&Subject<'a>, &'a Identifier)>,
) -> (Vec<(u32, u32)>, Vec<MalformedRecord>) {
    let mut entries = Vec::with_capacity(records.len());
    let mut malformed = Vec::new();

    for (subject, identifier) in records {
        match canonicalize(identifier) {
            Ok(key) => entries.push(Entry {
                key,
                ordinal: subject.ordinal,
                origins: subject.origins,
                identifier,
            }),
            Err(error) => malformed.push(MalformedRecord {
                ordinal: subject.ordinal,
                error,
            }),
        }
    }

    entries.sort_by(|a, b| a.key.cmp(&b.key).then(a.ordinal.cmp(&b.ordinal)));

    let mut pairs = Vec::new();
    for run in entries.chunk_by(|a, b| a.key == b.key) {
        pairs.extend(spanning_links(run));
    }

    debug!(
        scheme = %scheme,
        records = entries.len(),
        pairs = pairs.len(),
        "scanned scheme bucket"
    );
    (pairs, malformed)
}

/// Links of one canonical-key run: at most `run.len() - 1` pairs whose union
/// yields the same components as the full match graph of the run.
fn spanning_links(run: &[Entry<'_>]) -> Vec<(u32, u32)> {
    let mut joined = DisjointSet::new(run.len() as u32);
    let mut links = Vec::new();
    for (i, a) in run.iter().enumerate() {
        for (j, b) in run.iter().enumerate().skip(i + 1) {
            let (i, j) = (i as u32, j as u32);
            if joined.find(i) == joined.find(j) {
                continue;
            }
            if a.ordinal == b.ordinal {
                joined.union(i, j);
                continue;
            }
            if origins_disjoint(a.origins, b.origins) && identifiers_match(a.identifier, b.identifier) {
                joined.union(i, j);
                links.push((a.ordinal.min(b.ordinal), a.ordinal.max(b.ordinal)));
            }
        }
    }
    links
}

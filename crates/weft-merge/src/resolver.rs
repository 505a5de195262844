//! Node and edge merge-group resolution.
//!
//! Nodes are resolved first: identifier candidates from
//! [`weft_identity::discover_candidates`] (plus honoured `same_as`
//! declarations) are unioned in sorted order. Edges are then bucketed by
//! `(source group, target group, type)` and only compared within a bucket.
//!
//! Elements are never paired with elements of the same origin. An element
//! of a plain input stems from that input alone; an element of a merged
//! input (one whose header carries merge metadata) stems from the documents
//! listed in its `_sources` property. This keeps nested merges equivalent to
//! a flat one. Every input is its own origin: inputs sharing a label are told
//! apart by a `#<n>` suffix.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use rayon::prelude::*;
use serde_json::Value;
use tracing::debug;
use weft_identity::{
    canonicalize, discover_candidates, edges_match, is_lei_annulled, origins_disjoint, DisjointSet,
    Subject,
};
use weft_types::{Edge, EdgeType, GraphDocument, Node, Properties, Scheme};

use crate::config::{MergeConfig, SameAsPolicy, SameAsThreshold};
use crate::conflict::SOURCES_KEY;
use crate::error::{MergeError, MergeResult};
use crate::warning::MergeWarning;

/// One input document with its effective provenance label.
#[derive(Clone, Debug)]
pub struct InputDocument<'a> {
    /// Unique among the inputs of one merge.
    pub label: String,
    pub document: &'a GraphDocument,
}

impl InputDocument<'_> {
    /// Whether the document is the output of an earlier merge, so its
    /// bookkeeping properties are trusted.
    pub fn is_merged(&self) -> bool {
        self.document.header.merge_metadata.is_some()
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct NodeRef<'a> {
    pub document: u32,
    pub node: &'a Node,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct EdgeRef<'a> {
    pub document: u32,
    pub edge: &'a Edge,
    /// Node ordinals of the endpoints.
    pub source: u32,
    pub target: u32,
}

/// Interned origin document labels.
#[derive(Debug, Default)]
pub(crate) struct OriginTable {
    labels: Vec<String>,
    ids: HashMap<String, u32>,
}

impl OriginTable {
    fn intern(&mut self, label: &str) -> u32 {
        if let Some(&id) = self.ids.get(label) {
            return id;
        }
        let id = self.labels.len() as u32;
        self.labels.push(label.to_owned());
        self.ids.insert(label.to_owned(), id);
        id
    }

    /// Origins of an element: for merged inputs its `_sources` list if it
    /// carries a valid one, otherwise its document's own origin.
    fn element_origins(&mut self, input: &InputDocument<'_>, properties: &Properties, document_origin: u32) -> Box<[u32]> {
        if !input.is_merged() {
            return Box::new([document_origin]);
        }
        let listed = properties
            .get(SOURCES_KEY)
            .and_then(Value::as_array)
            .filter(|list| !list.is_empty())
            .and_then(|list| list.iter().map(Value::as_str).collect::<Option<Vec<&str>>>());
        match listed {
            Some(labels) => {
                let mut ids: Vec<u32> = labels.into_iter().map(|l| self.intern(l)).collect();
                ids.sort_unstable();
                ids.dedup();
                ids.into_boxed_slice()
            }
            None => Box::new([document_origin]),
        }
    }

    /// Sorted labels of a set of origin ids.
    pub(crate) fn labels<'i>(&self, ids: impl IntoIterator<Item = &'i u32>) -> Vec<String> {
        let mut labels: Vec<String> = ids
            .into_iter()
            .map(|&id| self.labels[id as usize].clone())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }
}

/// Merge groups of a set of input documents, before reconciliation.
#[derive(Debug)]
pub struct Resolution<'a> {
    pub(crate) inputs: Vec<InputDocument<'a>>,
    pub(crate) origins: OriginTable,
    pub(crate) nodes: Vec<NodeRef<'a>>,
    pub(crate) node_origins: Vec<Box<[u32]>>,
    pub(crate) edges: Vec<EdgeRef<'a>>,
    pub(crate) edge_origins: Vec<Box<[u32]>>,
    pub(crate) node_groups: Vec<Vec<u32>>,
    pub(crate) edge_groups: Vec<Vec<u32>>,
    pub(crate) warnings: Vec<MergeWarning>,
}

impl<'a> Resolution<'a> {
    pub fn inputs(&self) -> &[InputDocument<'a>] {
        &self.inputs
    }

    pub fn node_group_count(&self) -> usize {
        self.node_groups.len()
    }

    pub fn edge_group_count(&self) -> usize {
        self.edge_groups.len()
    }

    /// Warnings raised while resolving.
    pub fn warnings(&self) -> &[MergeWarning] {
        &self.warnings
    }
}

/// Compute node and edge merge groups for `documents`.
pub fn resolve<'a>(documents: &'a [GraphDocument], config: &MergeConfig) -> MergeResult<Resolution<'a>> {
    if documents.is_empty() {
        return Err(MergeError::NoInputDocuments);
    }
    for doc in documents {
        doc.validate_references()?;
    }

    let node_total: usize = documents.iter().map(|d| d.nodes.len()).sum();
    let edge_total: usize = documents.iter().map(|d| d.edges.len()).sum();
    check_ordinal_space("nodes", node_total)?;
    check_ordinal_space("edges", edge_total)?;
    check_ordinal_space("documents", documents.len())?;

    let inputs: Vec<InputDocument<'a>> = input_labels(documents, config)
        .into_iter()
        .zip(documents)
        .map(|(label, document)| InputDocument { label, document })
        .collect();

    let mut origins = OriginTable::default();
    let document_origins: Vec<u32> = inputs.iter().map(|i| origins.intern(&i.label)).collect();

    // Flatten into global ordinals. Document-local ids only ever resolve
    // within their own document.
    let mut nodes = Vec::with_capacity(node_total);
    let mut node_origins = Vec::with_capacity(node_total);
    let mut edges = Vec::with_capacity(edge_total);
    let mut edge_origins = Vec::with_capacity(edge_total);
    for (d, doc) in documents.iter().enumerate() {
        let document = d as u32;
        let base = nodes.len() as u32;
        let local: HashMap<&str, u32> = doc
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), base + i as u32))
            .collect();
        for node in &doc.nodes {
            nodes.push(NodeRef { document, node });
            node_origins.push(origins.element_origins(&inputs[d], &node.properties, document_origins[d]));
        }
        for edge in &doc.edges {
            // validate_references guarantees both endpoints exist.
            if let (Some(&source), Some(&target)) =
                (local.get(edge.source.as_str()), local.get(edge.target.as_str()))
            {
                edges.push(EdgeRef {
                    document,
                    edge,
                    source,
                    target,
                });
                edge_origins.push(origins.element_origins(&inputs[d], &edge.properties, document_origins[d]));
            }
        }
    }

    let mut warnings = Vec::new();

    // -- Nodes --------------------------------------------------------------

    let subjects: Vec<Subject<'_>> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| Subject {
            ordinal: i as u32,
            origins: &node_origins[i],
            identifiers: &n.node.identifiers,
        })
        .collect();
    let discovery = discover_candidates(&subjects);
    for record in discovery.malformed {
        let node = nodes[record.ordinal as usize];
        warnings.push(MergeWarning::MalformedIdentifier {
            document: inputs[node.document as usize].label.clone(),
            element: node.node.id.to_string(),
            error: record.error,
        });
    }

    let mut pairs = discovery.pairs;
    if let SameAsPolicy::Honour {
        threshold,
        transitive,
    } = config.same_as
    {
        pairs.extend(same_as_pairs(&edges, &inputs, threshold, transitive, &mut warnings));
        pairs.sort_unstable();
        pairs.dedup();
    }

    let mut node_sets = DisjointSet::new(nodes.len() as u32);
    for &(a, b) in &pairs {
        node_sets.union(a, b);
    }
    let node_groups = node_sets.groups();
    let node_root: Vec<u32> = (0..nodes.len() as u32).map(|i| node_sets.find(i)).collect();

    debug!(
        nodes = nodes.len(),
        candidate_pairs = pairs.len(),
        groups = node_groups.len(),
        "resolved node merge groups"
    );

    // -- Edges --------------------------------------------------------------

    // Edge identifiers are matched pairwise inside buckets; report the ones
    // that can never match here, once.
    for e in &edges {
        for id in &e.edge.identifiers {
            if id.scheme == Scheme::Internal || is_lei_annulled(id) {
                continue;
            }
            if let Err(error) = canonicalize(id) {
                warnings.push(MergeWarning::MalformedIdentifier {
                    document: inputs[e.document as usize].label.clone(),
                    element: e.edge.id.to_string(),
                    error,
                });
            }
        }
    }

    let honour_same_as = matches!(config.same_as, SameAsPolicy::Honour { .. });
    let mut dropped = vec![false; edges.len()];
    let mut buckets: HashMap<(u32, u32, &str), Vec<u32>> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        let source = node_root[e.source as usize];
        let target = node_root[e.target as usize];
        if e.edge.edge_type.is(EdgeType::SameAs) {
            // An honoured declaration whose endpoints collapsed says nothing more.
            if honour_same_as && source == target {
                dropped[i] = true;
            }
            continue;
        }
        buckets
            .entry((source, target, e.edge.edge_type.as_str()))
            .or_default()
            .push(i as u32);
    }

    let bucket_list: Vec<Vec<u32>> = buckets.into_values().filter(|b| b.len() > 1).collect();
    let mut edge_pairs: Vec<(u32, u32)> = bucket_list
        .par_iter()
        .flat_map_iter(|bucket| edge_pairs_in_bucket(bucket, &edges, &edge_origins))
        .collect();
    edge_pairs.sort_unstable();

    let mut edge_sets = DisjointSet::new(edges.len() as u32);
    for &(a, b) in &edge_pairs {
        edge_sets.union(a, b);
    }
    let edge_groups: Vec<Vec<u32>> = edge_sets
        .groups()
        .into_iter()
        .filter(|g| !(g.len() == 1 && dropped[g[0] as usize]))
        .collect();

    debug!(
        edges = edges.len(),
        multi_member_buckets = bucket_list.len(),
        candidate_pairs = edge_pairs.len(),
        groups = edge_groups.len(),
        "resolved edge merge groups"
    );

    Ok(Resolution {
        inputs,
        origins,
        nodes,
        node_origins,
        edges,
        edge_origins,
        node_groups,
        edge_groups,
        warnings,
    })
}

fn check_ordinal_space(kind: &'static str, count: usize) -> MergeResult<()> {
    if count > u32::MAX as usize {
        return Err(MergeError::TooManyElements { kind, count });
    }
    Ok(())
}

/// Effective labels of the inputs, unique per input.
///
/// Unlabelled inputs are named after their position. When several inputs
/// share a label, they are ordered by content and all but the first get a
/// `#<n>` suffix, so the assignment does not depend on input order.
fn input_labels(documents: &[GraphDocument], config: &MergeConfig) -> Vec<String> {
    let mut labels: Vec<String> = documents
        .iter()
        .enumerate()
        .map(|(i, d)| {
            if d.header.label.is_empty() {
                format!("{}-{}", config.default_source_label, i + 1)
            } else {
                d.header.label.clone()
            }
        })
        .collect();

    let mut positions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        positions.entry(label.clone()).or_default().push(i);
    }
    let mut taken: HashSet<String> = positions.keys().cloned().collect();
    for (label, mut shared) in positions {
        if shared.len() < 2 {
            continue;
        }
        shared.sort_by_cached_key(|&i| serde_json::to_vec(&documents[i]).unwrap_or_default());
        let mut n = 1;
        for &i in &shared[1..] {
            labels[i] = loop {
                n += 1;
                let candidate = format!("{label}#{n}");
                if taken.insert(candidate.clone()) {
                    break candidate;
                }
            };
        }
    }
    labels
}

/// Spanning links of one edge bucket: edges already connected through an
/// earlier link are not compared again.
fn edge_pairs_in_bucket(bucket: &[u32], edges: &[EdgeRef<'_>], origins: &[Box<[u32]>]) -> Vec<(u32, u32)> {
    let mut joined = DisjointSet::new(bucket.len() as u32);
    let mut pairs = Vec::new();
    for (i, &a) in bucket.iter().enumerate() {
        for (j, &b) in bucket.iter().enumerate().skip(i + 1) {
            let (i, j) = (i as u32, j as u32);
            if joined.find(i) == joined.find(j) {
                continue;
            }
            let (ea, eb) = (&edges[a as usize], &edges[b as usize]);
            if origins_disjoint(&origins[a as usize], &origins[b as usize]) && edges_match(ea.edge, eb.edge) {
                joined.union(i, j);
                pairs.push((a.min(b), a.max(b)));
            }
        }
    }
    pairs
}

/// Node pairs joined by qualifying `same_as` declarations.
fn same_as_pairs(
    edges: &[EdgeRef<'_>],
    inputs: &[InputDocument<'_>],
    threshold: SameAsThreshold,
    transitive: bool,
    warnings: &mut Vec<MergeWarning>,
) -> Vec<(u32, u32)> {
    let qualifying: Vec<&EdgeRef<'_>> = edges
        .iter()
        .filter(|e| {
            e.edge.edge_type.is(EdgeType::SameAs)
                && e.source != e.target
                && threshold.admits(SameAsThreshold::from_confidence(
                    e.edge.properties.get("confidence"),
                ))
        })
        .collect();

    // Node ordinals are global, so partner sets never mix documents.
    let mut partners: HashMap<u32, BTreeSet<u32>> = HashMap::new();
    if !transitive {
        for e in &qualifying {
            partners.entry(e.source).or_default().insert(e.target);
            partners.entry(e.target).or_default().insert(e.source);
        }
    }
    let chained = |n: u32| partners.get(&n).is_some_and(|p| p.len() > 1);

    let mut pairs = Vec::with_capacity(qualifying.len());
    for e in qualifying {
        if !transitive && (chained(e.source) || chained(e.target)) {
            warnings.push(MergeWarning::SameAsChainSkipped {
                document: inputs[e.document as usize].label.clone(),
                edge: e.edge.id.clone(),
            });
            continue;
        }
        pairs.push((e.source.min(e.target), e.source.max(e.target)));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use weft_types::{Identifier, MergeMetadata, NodeType};

    fn org(id: &str, ids: &[(&str, &str)]) -> Node {
        ids.iter().fold(Node::new(id, NodeType::Organization), |n, (s, v)| {
            n.with_identifier(Identifier::new(*s, *v))
        })
    }

    fn honour(transitive: bool) -> MergeConfig {
        MergeConfig {
            same_as: SameAsPolicy::Honour {
                threshold: SameAsThreshold::Probable,
                transitive,
            },
            ..MergeConfig::default()
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = resolve(&[], &MergeConfig::default()).unwrap_err();
        assert_eq!(err, MergeError::NoInputDocuments);
    }

    #[test]
    fn dangling_reference_is_an_error() {
        let doc = GraphDocument::new("a")
            .with_node(org("x", &[]))
            .with_edge(Edge::new("e", EdgeType::Supplies, "x", "missing"));
        assert!(matches!(
            resolve(&[doc], &MergeConfig::default()),
            Err(MergeError::InvalidDocument(_))
        ));
    }

    #[test]
    fn transitive_closure_across_three_documents() {
        let docs = [
            GraphDocument::new("a").with_node(org("x", &[("lei", "ABC")])),
            GraphDocument::new("b").with_node(org("y", &[("lei", "ABC"), ("duns", "123")])),
            GraphDocument::new("c").with_node(org("z", &[("duns", "123")])),
        ];
        let r = resolve(&docs, &MergeConfig::default()).unwrap();
        assert_eq!(r.node_groups, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn same_as_ignored_by_default() {
        let doc = GraphDocument::new("a")
            .with_node(org("x", &[]))
            .with_node(org("y", &[]))
            .with_edge(Edge::new("s", EdgeType::SameAs, "x", "y"));
        let docs = [doc];
        let r = resolve(&docs, &MergeConfig::default()).unwrap();
        assert_eq!(r.node_group_count(), 2);
        assert_eq!(r.edge_group_count(), 1);
    }

    #[test]
    fn honoured_same_as_joins_and_drops_declaration() {
        let doc = GraphDocument::new("a")
            .with_node(org("x", &[]))
            .with_node(org("y", &[]))
            .with_edge(
                Edge::new("s", EdgeType::SameAs, "x", "y")
                    .with_property("confidence", json!("definite")),
            );
        let docs = [doc];
        let r = resolve(&docs, &honour(false)).unwrap();
        assert_eq!(r.node_groups, vec![vec![0, 1]]);
        assert_eq!(r.edge_group_count(), 0);
    }

    #[test]
    fn same_as_below_threshold_is_not_honoured() {
        let doc = GraphDocument::new("a")
            .with_node(org("x", &[]))
            .with_node(org("y", &[]))
            .with_edge(Edge::new("s", EdgeType::SameAs, "x", "y"));
        let docs = [doc];
        let r = resolve(&docs, &honour(false)).unwrap();
        assert_eq!(r.node_group_count(), 2);
    }

    #[test]
    fn chained_same_as_skipped_unless_transitive() {
        let doc = GraphDocument::new("a")
            .with_node(org("x", &[]))
            .with_node(org("y", &[]))
            .with_node(org("z", &[]))
            .with_edge(
                Edge::new("s1", EdgeType::SameAs, "x", "y")
                    .with_property("confidence", json!("probable")),
            )
            .with_edge(
                Edge::new("s2", EdgeType::SameAs, "y", "z")
                    .with_property("confidence", json!("probable")),
            );

        let strict = resolve(std::slice::from_ref(&doc), &honour(false)).unwrap();
        assert_eq!(strict.node_group_count(), 3);
        assert_eq!(strict.warnings().len(), 2);
        assert!(matches!(
            strict.warnings()[0],
            MergeWarning::SameAsChainSkipped { .. }
        ));

        let chained = resolve(std::slice::from_ref(&doc), &honour(true)).unwrap();
        assert_eq!(chained.node_groups, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn edges_bucket_by_resolved_endpoints() {
        let a = GraphDocument::new("a")
            .with_node(org("s", &[("lei", "S")]))
            .with_node(org("t", &[("lei", "T")]))
            .with_edge(Edge::new("e", EdgeType::Supplies, "s", "t"));
        let b = GraphDocument::new("b")
            .with_node(org("s2", &[("lei", "S")]))
            .with_node(org("t2", &[("lei", "T")]))
            .with_edge(Edge::new("f", EdgeType::Supplies, "s2", "t2"))
            .with_edge(Edge::new("g", EdgeType::Supplies, "t2", "s2"));
        let docs = [a, b];
        let r = resolve(&docs, &MergeConfig::default()).unwrap();
        assert_eq!(r.edge_groups, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn elements_of_a_merged_input_pair_by_origin() {
        let mut merged = GraphDocument::new("a+b")
            .with_node(org("n-1", &[("lei", "L")]).with_property("_sources", json!(["a"])))
            .with_node(org("n-2", &[("lei", "L")]).with_property("_sources", json!(["b"])))
            .with_node(org("n-3", &[("lei", "L")]).with_property("_sources", json!(["a", "c"])));
        merged.header.merge_metadata = Some(MergeMetadata::default());
        let docs = [merged];
        let r = resolve(&docs, &MergeConfig::default()).unwrap();
        // n-1 and n-3 share origin `a`; both still reach n-2.
        assert_eq!(r.node_groups, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn unlabelled_inputs_get_distinct_labels() {
        let docs = [
            GraphDocument::new("").with_node(org("x", &[("lei", "L")])),
            GraphDocument::new("").with_node(org("y", &[("lei", "L")])),
        ];
        let r = resolve(&docs, &MergeConfig::default()).unwrap();
        assert_eq!(r.inputs()[0].label, "unlabelled-1");
        assert_eq!(r.node_group_count(), 1);
    }

    #[test]
    fn malformed_identifiers_become_warnings() {
        let doc = GraphDocument::new("a").with_node(org("x", &[("nat-reg", "HRB 1")]));
        let docs = [doc];
        let r = resolve(&docs, &MergeConfig::default()).unwrap();
        assert!(matches!(
            &r.warnings()[0],
            MergeWarning::MalformedIdentifier { document, element, .. }
                if document == "a" && element == "x"
        ));
    }

    #[test]
    fn plain_inputs_cannot_claim_other_origins() {
        let docs = [
            GraphDocument::new("a")
                .with_node(org("x", &[("lei", "L")]).with_property("_sources", json!(["b"]))),
            GraphDocument::new("b").with_node(org("y", &[("lei", "L")])),
        ];
        let r = resolve(&docs, &MergeConfig::default()).unwrap();
        assert_eq!(r.node_groups, vec![vec![0, 1]]);
    }

    #[test]
    fn inputs_sharing_a_label_are_distinct_sources() {
        let docs = [
            GraphDocument::new("erp-export").with_node(org("x", &[("lei", "L")])),
            GraphDocument::new("erp-export").with_node(org("y", &[("lei", "L"), ("duns", "D")])),
        ];
        let r = resolve(&docs, &MergeConfig::default()).unwrap();
        assert_eq!(r.node_groups, vec![vec![0, 1]]);
        let labels: BTreeSet<&str> = r.inputs().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, BTreeSet::from(["erp-export", "erp-export#2"]));
    }

    #[test]
    fn shared_label_suffix_follows_content_not_position() {
        let x = GraphDocument::new("feed").with_node(org("x", &[("lei", "X")]));
        let y = GraphDocument::new("feed").with_node(org("y", &[("lei", "Y")]));
        let forward = [x.clone(), y.clone()];
        let backward = [y, x];
        let f = resolve(&forward, &MergeConfig::default()).unwrap();
        let b = resolve(&backward, &MergeConfig::default()).unwrap();
        assert_eq!(f.inputs()[0].label, b.inputs()[1].label);
        assert_eq!(f.inputs()[1].label, b.inputs()[0].label);
    }

    #[test]
    fn suffix_skips_labels_already_in_use() {
        let docs = [
            GraphDocument::new("feed").with_node(org("x", &[])),
            GraphDocument::new("feed#2").with_node(org("y", &[])),
            GraphDocument::new("feed").with_node(org("z", &[("lei", "Z")])),
        ];
        let r = resolve(&docs, &MergeConfig::default()).unwrap();
        let labels: BTreeSet<&str> = r.inputs().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, BTreeSet::from(["feed", "feed#2", "feed#3"]));
    }

    #[test]
    fn malformed_edge_identifiers_become_warnings() {
        let doc = GraphDocument::new("a")
            .with_node(org("s", &[]))
            .with_node(org("t", &[]))
            .with_edge(
                Edge::new("e", EdgeType::Supplies, "s", "t")
                    .with_identifier(Identifier::new("vat", "DE1"))
                    .with_identifier(Identifier::new("internal", "PO-1")),
            );
        let docs = [doc];
        let r = resolve(&docs, &MergeConfig::default()).unwrap();
        assert_eq!(r.warnings().len(), 1);
        assert!(matches!(
            &r.warnings()[0],
            MergeWarning::MalformedIdentifier { element, .. } if element == "e"
        ));
    }

    #[test]
    fn parallel_matching_edges_link_once_each() {
        let doc = |label: &str| {
            GraphDocument::new(label)
                .with_node(org("s", &[("lei", "S")]))
                .with_node(org("t", &[("lei", "T")]))
                .with_edge(Edge::new("e", EdgeType::Supplies, "s", "t"))
        };
        let docs: Vec<GraphDocument> = (0..6).map(|i| doc(&format!("d{i}"))).collect();
        let r = resolve(&docs, &MergeConfig::default()).unwrap();
        assert_eq!(r.edge_groups, vec![vec![0, 1, 2, 3, 4, 5]]);
        let bucket: Vec<u32> = (0..6).collect();
        assert_eq!(edge_pairs_in_bucket(&bucket, &r.edges, &r.edge_origins).len(), 5);
    }
}

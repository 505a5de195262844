//! Folding resolved merge groups into the merged document.
//!
//! Output order depends only on group content, never on input order: node
//! groups are sorted by (smallest canonical identifier, type, merged
//! properties, smallest `(source label, local id)`) and numbered `n-<i>`;
//! edges are sorted by (source, target, type, the same content key) and
//! numbered `e-<i>`.
//!
//! Every output element lists the documents it stems from under `_sources`;
//! values stated by only some of them are attributed under `_provenance`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{info, warn};
use weft_identity::canonicalize;
use weft_types::{
    CalendarDate, DocumentHeader, Edge, EdgeId, EdgeTypeTag, FileSalt, GraphDocument, Identifier,
    MergeMetadata, Node, NodeId, NodeTypeTag, Properties,
};

use crate::config::MergeConfig;
use crate::conflict::{
    union_identifiers, ConflictRecord, ElementKind, Reconciled, Reconciler, TYPE_FIELD,
};
use crate::resolver::{InputDocument, Resolution};
use crate::warning::MergeWarning;

/// The merged document together with its audit trail.
#[derive(Clone, Debug)]
pub struct MergeOutput {
    pub document: GraphDocument,
    /// Every conflict, by element, in output order.
    pub conflicts: Vec<ConflictRecord>,
    pub warnings: Vec<MergeWarning>,
}

/// Content sort key of one merge group.
type ContentKey = (String, String, String, (String, String));

struct Draft {
    members: Vec<u32>,
    identifiers: Vec<Identifier>,
    reconciled: Reconciled,
    key: ContentKey,
}

/// Build the merged document from a resolution.
pub fn assemble(resolution: Resolution<'_>, config: &MergeConfig, timestamp: DateTime<Utc>) -> MergeOutput {
    let Resolution {
        inputs,
        origins,
        nodes,
        node_origins,
        edges,
        edge_origins,
        node_groups,
        edge_groups,
        mut warnings,
    } = resolution;

    // -- Nodes --------------------------------------------------------------

    let mut node_drafts: Vec<Draft> = node_groups
        .into_par_iter()
        .map(|members| {
            let mut reconciler = Reconciler::new();
            let mut provenance = Vec::with_capacity(members.len());
            for &m in &members {
                let n = nodes[m as usize];
                let labels = origins.labels(node_origins[m as usize].iter());
                let merged = inputs[n.document as usize].is_merged();
                reconciler.add_member(&labels, n.node.node_type.as_str(), &n.node.properties, merged);
                provenance.push((labels.join("+"), n.node.id.to_string()));
            }
            let identifiers = union_identifiers(members.iter().flat_map(|&m| {
                let node = nodes[m as usize].node;
                node.identifiers.iter().map(move |id| (id, Some(&node.node_type)))
            }));
            let reconciled = reconciler.finish();
            let key = content_key(&identifiers, &reconciled.type_name, &reconciled.properties, provenance);
            Draft {
                members,
                identifiers,
                reconciled,
                key,
            }
        })
        .collect();
    node_drafts.sort_by(|a, b| a.key.cmp(&b.key));

    let mut output_index = vec![0u32; nodes.len()];
    for (i, draft) in node_drafts.iter().enumerate() {
        for &m in &draft.members {
            output_index[m as usize] = i as u32;
        }
    }

    let mut conflicts = Vec::new();
    let mut out_nodes = Vec::with_capacity(node_drafts.len());
    for (i, draft) in node_drafts.into_iter().enumerate() {
        let id = NodeId::new(format!("n-{}", i + 1));

        if draft.members.len() > config.group_size_limit {
            warnings.push(MergeWarning::OversizedMergeGroup {
                node: id.clone(),
                size: draft.members.len(),
                limit: config.group_size_limit,
            });
        }

        let mut by_document: BTreeMap<u32, Vec<NodeId>> = BTreeMap::new();
        for &m in &draft.members {
            let n = nodes[m as usize];
            by_document.entry(n.document).or_default().push(n.node.id.clone());
        }
        for (document, mut members) in by_document {
            if members.len() > 1 {
                members.sort();
                warnings.push(MergeWarning::SameDocumentCollapse {
                    node: id.clone(),
                    document: inputs[document as usize].label.clone(),
                    members,
                });
            }
        }

        if let Some(types) = draft.reconciled.conflicts.iter().find(|c| c.field == TYPE_FIELD) {
            let names: BTreeSet<&str> = types.values.iter().filter_map(|e| e.value.as_str()).collect();
            warnings.push(MergeWarning::AmbiguousMergeGroup {
                node: id.clone(),
                reason: format!(
                    "members disagree on type ({})",
                    names.into_iter().collect::<Vec<_>>().join(", ")
                ),
            });
        }
        if has_disjoint_validity(draft.members.iter().map(|&m| &nodes[m as usize].node.properties)) {
            warnings.push(MergeWarning::AmbiguousMergeGroup {
                node: id.clone(),
                reason: "members have disjoint validity periods".into(),
            });
        }

        conflicts.extend(draft.reconciled.conflicts.into_iter().map(|conflict| ConflictRecord {
            kind: ElementKind::Node,
            id: id.to_string(),
            conflict,
        }));
        out_nodes.push(Node {
            id,
            node_type: NodeTypeTag::from(draft.reconciled.type_name),
            identifiers: draft.identifiers,
            properties: draft.reconciled.properties,
        });
    }

    // -- Edges --------------------------------------------------------------

    let mut edge_drafts: Vec<(u32, u32, Draft)> = edge_groups
        .into_par_iter()
        .map(|members| {
            let first = edges[members[0] as usize];
            let source = output_index[first.source as usize];
            let target = output_index[first.target as usize];
            let mut reconciler = Reconciler::new();
            let mut provenance = Vec::with_capacity(members.len());
            for &m in &members {
                let e = edges[m as usize];
                let labels = origins.labels(edge_origins[m as usize].iter());
                let merged = inputs[e.document as usize].is_merged();
                reconciler.add_member(&labels, e.edge.edge_type.as_str(), &e.edge.properties, merged);
                provenance.push((labels.join("+"), e.edge.id.to_string()));
            }
            let identifiers = union_identifiers(
                members
                    .iter()
                    .flat_map(|&m| edges[m as usize].edge.identifiers.iter().map(|id| (id, None))),
            );
            let reconciled = reconciler.finish();
            let key = content_key(&identifiers, &reconciled.type_name, &reconciled.properties, provenance);
            (
                source,
                target,
                Draft {
                    members,
                    identifiers,
                    reconciled,
                    key,
                },
            )
        })
        .collect();
    // The content key leads with the canonical identifier, so order by type
    // explicitly first.
    edge_drafts.sort_by(|(sa, ta, a), (sb, tb, b)| {
        (sa, ta, &a.key.1, &a.key).cmp(&(sb, tb, &b.key.1, &b.key))
    });

    let mut out_edges = Vec::with_capacity(edge_drafts.len());
    for (i, (source, target, draft)) in edge_drafts.into_iter().enumerate() {
        let id = format!("e-{}", i + 1);
        conflicts.extend(draft.reconciled.conflicts.into_iter().map(|conflict| ConflictRecord {
            kind: ElementKind::Edge,
            id: id.clone(),
            conflict,
        }));
        out_edges.push(Edge {
            id: EdgeId::new(id),
            edge_type: EdgeTypeTag::from(draft.reconciled.type_name),
            source: out_nodes[source as usize].id.clone(),
            target: out_nodes[target as usize].id.clone(),
            identifiers: draft.identifiers,
            properties: draft.reconciled.properties,
        });
    }

    // -- Header ---------------------------------------------------------------

    let input_node_count = nodes.len();
    let input_edge_count: usize = inputs.iter().map(|i| i.document.edges.len()).sum();
    let reporting = reporting_entities(&inputs, &output_index, &out_nodes);
    let mut source_documents: Vec<String> = inputs
        .iter()
        .flat_map(|input| match &input.document.header.merge_metadata {
            Some(meta) if !meta.source_documents.is_empty() => meta.source_documents.clone(),
            _ => vec![input.label.clone()],
        })
        .collect();
    source_documents.sort();
    source_documents.dedup();

    let metadata = MergeMetadata {
        source_documents: source_documents.clone(),
        reporting_entities: reporting.clone(),
        timestamp,
        input_node_count,
        input_edge_count,
        merged_node_count: out_nodes.len(),
        merged_edge_count: out_edges.len(),
        collapsed_node_count: input_node_count - out_nodes.len(),
        collapsed_edge_count: input_edge_count.saturating_sub(out_edges.len()),
        conflict_count: conflicts.len(),
    };

    let header = DocumentHeader {
        label: source_documents.join("+"),
        salt: Some(FileSalt::generate()),
        disclosure_scope: inputs.iter().filter_map(|i| i.document.header.disclosure_scope).min(),
        reporting_entity: match reporting.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        },
        snapshot_date: inputs
            .iter()
            .filter_map(|i| i.document.header.snapshot_date)
            .max(),
        merge_metadata: Some(metadata),
    };

    for w in &warnings {
        warn!(warning = %w, "merge warning");
    }
    info!(
        inputs = inputs.len(),
        nodes = out_nodes.len(),
        edges = out_edges.len(),
        conflicts = conflicts.len(),
        warnings = warnings.len(),
        "merge complete"
    );

    MergeOutput {
        document: GraphDocument {
            header,
            nodes: out_nodes,
            edges: out_edges,
        },
        conflicts,
        warnings,
    }
}

fn content_key(
    identifiers: &[Identifier],
    type_name: &str,
    properties: &Properties,
    provenance: Vec<(String, String)>,
) -> ContentKey {
    let first_canonical = identifiers
        .first()
        .and_then(|id| canonicalize(id).ok())
        .map(|c| c.into_string())
        .unwrap_or_default();
    let properties = serde_json::to_string(properties).unwrap_or_default();
    let origin = provenance.into_iter().min().unwrap_or_default();
    (first_canonical, type_name.to_owned(), properties, origin)
}

/// Whether some two members' `valid_from`/`valid_to` property intervals
/// cannot overlap. Unparseable dates are ignored.
fn has_disjoint_validity<'a>(members: impl Iterator<Item = &'a Properties>) -> bool {
    let date = |p: &Properties, key: &str| {
        p.get(key)
            .and_then(|v| v.as_str())
            .and_then(|s| CalendarDate::try_from(s).ok())
    };
    let mut latest_start: Option<CalendarDate> = None;
    let mut earliest_end: Option<CalendarDate> = None;
    for p in members {
        if let Some(start) = date(p, "valid_from") {
            latest_start = latest_start.max(Some(start));
        }
        if let Some(end) = date(p, "valid_to") {
            earliest_end = Some(earliest_end.map_or(end, |e| e.min(end)));
        }
    }
    matches!((latest_start, earliest_end), (Some(start), Some(end)) if end < start)
}

/// Merged node ids of every reporting entity the inputs name, sorted.
fn reporting_entities(inputs: &[InputDocument<'_>], output_index: &[u32], out_nodes: &[Node]) -> Vec<NodeId> {
    let mut base = 0usize;
    let mut found = BTreeSet::new();
    for input in inputs {
        let doc = input.document;
        let positions: HashMap<&str, usize> = doc.node_positions();
        let declared = doc.header.reporting_entity.iter().chain(
            doc.header
                .merge_metadata
                .iter()
                .flat_map(|m| m.reporting_entities.iter()),
        );
        for entity in declared {
            if let Some(&pos) = positions.get(entity.as_str()) {
                let out = output_index[base + pos] as usize;
                found.insert(out_nodes[out].id.clone());
            }
        }
        base += doc.nodes.len();
    }
    found.into_iter().collect()
}

//! Disclosure-scope gate.
//!
//! Removes whatever a document of the target scope may not carry:
//! identifiers above the scope's sensitivity ceiling and, for public output,
//! person nodes together with their edges. A merged node whose members
//! disagreed on type counts as a person if any member was one.

use std::collections::HashSet;

use tracing::debug;
use weft_types::{
    DisclosureScope, Edge, GraphDocument, Identifier, Node, NodeId, NodeType, Sensitivity,
};

/// What the gate removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeReport {
    pub removed_identifiers: usize,
    /// Ids of dropped nodes, in document order.
    pub dropped_nodes: Vec<NodeId>,
    pub dropped_edges: usize,
}

/// Edge identifiers have no owner type, so only the record and its scheme
/// decide.
fn edge_identifier_sensitivity(id: &Identifier) -> Sensitivity {
    id.sensitivity.unwrap_or_else(|| id.scheme.default_sensitivity())
}

fn is_person(node: &Node) -> bool {
    let person = NodeType::Person.as_str();
    node.node_type.is(NodeType::Person)
        || node
            .properties
            .get("_conflicts")
            .and_then(|c| c.as_array())
            .into_iter()
            .flatten()
            .filter(|c| c.get("field").and_then(|f| f.as_str()) == Some("type"))
            .filter_map(|c| c.get("values").and_then(|v| v.as_array()))
            .flatten()
            .any(|entry| entry.get("value").and_then(|v| v.as_str()) == Some(person))
}

/// Apply `scope` to `doc` in place and stamp it into the header.
pub fn apply_scope(doc: &mut GraphDocument, scope: DisclosureScope) -> ScopeReport {
    let mut report = ScopeReport::default();

    if scope == DisclosureScope::Public {
        let dropped: HashSet<NodeId> = doc
            .nodes
            .iter()
            .filter(|n| is_person(n))
            .map(|n| n.id.clone())
            .collect();
        if !dropped.is_empty() {
            report.dropped_nodes = doc
                .nodes
                .iter()
                .filter(|n| dropped.contains(&n.id))
                .map(|n| n.id.clone())
                .collect();
            doc.nodes.retain(|n| !dropped.contains(&n.id));
            let before = doc.edges.len();
            doc.edges
                .retain(|e| !dropped.contains(&e.source) && !dropped.contains(&e.target));
            report.dropped_edges = before - doc.edges.len();
            forget_reporting_entities(doc, &dropped);
        }
    }

    for node in &mut doc.nodes {
        let before = node.identifiers.len();
        let owner = node.node_type.clone();
        node.identifiers
            .retain(|id| scope.allows(id.effective_sensitivity(&owner)));
        report.removed_identifiers += before - node.identifiers.len();
    }
    for edge in &mut doc.edges {
        report.removed_identifiers += filter_edge_identifiers(edge, scope);
    }

    doc.header.disclosure_scope = Some(scope);
    debug!(
        scope = %scope,
        removed_identifiers = report.removed_identifiers,
        dropped_nodes = report.dropped_nodes.len(),
        dropped_edges = report.dropped_edges,
        "applied disclosure scope"
    );
    report
}

fn filter_edge_identifiers(edge: &mut Edge, scope: DisclosureScope) -> usize {
    let before = edge.identifiers.len();
    edge.identifiers
        .retain(|id| scope.allows(edge_identifier_sensitivity(id)));
    before - edge.identifiers.len()
}

/// Clear header references to nodes that no longer exist.
pub(crate) fn forget_reporting_entities(doc: &mut GraphDocument, gone: &HashSet<NodeId>) {
    if doc
        .header
        .reporting_entity
        .as_ref()
        .is_some_and(|id| gone.contains(id))
    {
        doc.header.reporting_entity = None;
    }
    if let Some(meta) = doc.header.merge_metadata.as_mut() {
        meta.reporting_entities.retain(|id| !gone.contains(id));
    }
}

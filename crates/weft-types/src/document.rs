//! Graph documents and their headers.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::DisclosureScope;
use crate::error::{TypeError, TypeResult};
use crate::graph::{Edge, Node};
use crate::newtypes::{CalendarDate, FileSalt, NodeId};

/// Document header.
///
/// Only `disclosure_scope` influences merge and redaction behaviour; the
/// other fields are carried through and reconciled on merge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeader {
    /// Source document label used for provenance and conflict attribution.
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<FileSalt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclosure_scope: Option<DisclosureScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_entity: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_date: Option<CalendarDate>,
    /// Present on documents produced by a merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_metadata: Option<MergeMetadata>,
}

/// Provenance record written into a merged document's header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeMetadata {
    /// Sorted labels of every original document that contributed.
    pub source_documents: Vec<String>,
    /// Reporting entities of the inputs, mapped to merged node ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reporting_entities: Vec<NodeId>,
    pub timestamp: DateTime<Utc>,
    pub input_node_count: usize,
    pub input_edge_count: usize,
    pub merged_node_count: usize,
    pub merged_edge_count: usize,
    /// Input nodes absorbed into another member of their merge group.
    pub collapsed_node_count: usize,
    /// Input edges absorbed into another member of their merge group.
    pub collapsed_edge_count: usize,
    pub conflict_count: usize,
}

/// A parsed graph document: header plus node and edge lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub header: DocumentHeader,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphDocument {
    /// Create an empty document with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            header: DocumentHeader {
                label: label.into(),
                ..DocumentHeader::default()
            },
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.header.label
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Map from node id to its position in `nodes`.
    pub fn node_positions(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }

    /// Check id uniqueness and that every edge endpoint resolves to a node.
    ///
    /// Stops at the first problem found.
    pub fn validate_references(&self) -> TypeResult<()> {
        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(TypeError::DuplicateNodeId {
                    document: self.header.label.clone(),
                    id: node.id.clone(),
                });
            }
        }

        let mut edge_ids = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(TypeError::DuplicateEdgeId {
                    document: self.header.label.clone(),
                    id: edge.id.clone(),
                });
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(TypeError::DanglingEdgeReference {
                        document: self.header.label.clone(),
                        edge: edge.id.clone(),
                        node: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

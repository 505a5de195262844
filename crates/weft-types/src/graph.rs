//! Graph elements.
//!
//! Both nodes and edges carry an open property map. Properties are compared
//! structurally (`serde_json::Value` equality); the merge engine never
//! interprets them beyond the temporal keys named by the identity predicate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{EdgeTypeTag, NodeTypeTag};
use crate::identifier::Identifier;
use crate::newtypes::{EdgeId, NodeId};

/// Open property map of a node or edge, ordered by key.
pub type Properties = BTreeMap<String, Value>;

/// A graph node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeTypeTag,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<NodeTypeTag>) -> Self {
        Self {
            id: NodeId::new(id),
            node_type: node_type.into(),
            identifiers: Vec::new(),
            properties: Properties::new(),
        }
    }

    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifiers.push(identifier);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// A typed, directed edge between two nodes of the same document.
///
/// Parallel edges of one type between one endpoint pair are allowed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    #[serde(rename = "type")]
    pub edge_type: EdgeTypeTag,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        edge_type: impl Into<EdgeTypeTag>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: EdgeId::new(id),
            edge_type: edge_type.into(),
            source: NodeId::new(source),
            target: NodeId::new(target),
            identifiers: Vec::new(),
            properties: Properties::new(),
        }
    }

    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifiers.push(identifier);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

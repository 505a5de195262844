//! Closed vocabularies for node types, edge types and disclosure tiers.
//!
//! Node and edge types are open sets: anything outside the known vocabulary
//! is carried verbatim in an `Extension` variant so it survives a merge or a
//! redaction untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Node types
// ---------------------------------------------------------------------------

/// Known node types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Organization,
    Facility,
    Good,
    Person,
    Attestation,
    Consignment,
    /// Redacted stand-in produced by the redactor.
    BoundaryRef,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::Organization,
        NodeType::Facility,
        NodeType::Good,
        NodeType::Person,
        NodeType::Attestation,
        NodeType::Consignment,
        NodeType::BoundaryRef,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Organization => "organization",
            NodeType::Facility => "facility",
            NodeType::Good => "good",
            NodeType::Person => "person",
            NodeType::Attestation => "attestation",
            NodeType::Consignment => "consignment",
            NodeType::BoundaryRef => "boundary_ref",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// A node type: either a known [`NodeType`] or a reverse-domain extension.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeTypeTag {
    Known(NodeType),
    Extension(String),
}

impl NodeTypeTag {
    pub fn as_str(&self) -> &str {
        match self {
            NodeTypeTag::Known(t) => t.as_str(),
            NodeTypeTag::Extension(s) => s,
        }
    }

    pub fn is(&self, node_type: NodeType) -> bool {
        matches!(self, NodeTypeTag::Known(t) if *t == node_type)
    }
}

impl From<NodeType> for NodeTypeTag {
    fn from(t: NodeType) -> Self {
        NodeTypeTag::Known(t)
    }
}

impl From<String> for NodeTypeTag {
    fn from(s: String) -> Self {
        match NodeType::parse(&s) {
            Some(t) => NodeTypeTag::Known(t),
            None => NodeTypeTag::Extension(s),
        }
    }
}

impl From<NodeTypeTag> for String {
    fn from(tag: NodeTypeTag) -> Self {
        match tag {
            NodeTypeTag::Known(t) => t.as_str().to_owned(),
            NodeTypeTag::Extension(s) => s,
        }
    }
}

impl fmt::Display for NodeTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Edge types
// ---------------------------------------------------------------------------

/// Known edge types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeType {
    Ownership,
    OperationalControl,
    LegalParentage,
    FormerIdentity,
    BeneficialOwnership,
    Supplies,
    Subcontracts,
    Tolls,
    Distributes,
    Brokers,
    Operates,
    Produces,
    ComposedOf,
    SellsTo,
    AttestedBy,
    /// Same-identity declaration between two nodes of one document.
    SameAs,
}

impl EdgeType {
    pub const ALL: [EdgeType; 16] = [
        EdgeType::Ownership,
        EdgeType::OperationalControl,
        EdgeType::LegalParentage,
        EdgeType::FormerIdentity,
        EdgeType::BeneficialOwnership,
        EdgeType::Supplies,
        EdgeType::Subcontracts,
        EdgeType::Tolls,
        EdgeType::Distributes,
        EdgeType::Brokers,
        EdgeType::Operates,
        EdgeType::Produces,
        EdgeType::ComposedOf,
        EdgeType::SellsTo,
        EdgeType::AttestedBy,
        EdgeType::SameAs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Ownership => "ownership",
            EdgeType::OperationalControl => "operational_control",
            EdgeType::LegalParentage => "legal_parentage",
            EdgeType::FormerIdentity => "former_identity",
            EdgeType::BeneficialOwnership => "beneficial_ownership",
            EdgeType::Supplies => "supplies",
            EdgeType::Subcontracts => "subcontracts",
            EdgeType::Tolls => "tolls",
            EdgeType::Distributes => "distributes",
            EdgeType::Brokers => "brokers",
            EdgeType::Operates => "operates",
            EdgeType::Produces => "produces",
            EdgeType::ComposedOf => "composed_of",
            EdgeType::SellsTo => "sells_to",
            EdgeType::AttestedBy => "attested_by",
            EdgeType::SameAs => "same_as",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// An edge type: either a known [`EdgeType`] or a reverse-domain extension.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeTypeTag {
    Known(EdgeType),
    Extension(String),
}

impl EdgeTypeTag {
    pub fn as_str(&self) -> &str {
        match self {
            EdgeTypeTag::Known(t) => t.as_str(),
            EdgeTypeTag::Extension(s) => s,
        }
    }

    pub fn is(&self, edge_type: EdgeType) -> bool {
        matches!(self, EdgeTypeTag::Known(t) if *t == edge_type)
    }
}

impl From<EdgeType> for EdgeTypeTag {
    fn from(t: EdgeType) -> Self {
        EdgeTypeTag::Known(t)
    }
}

impl From<String> for EdgeTypeTag {
    fn from(s: String) -> Self {
        match EdgeType::parse(&s) {
            Some(t) => EdgeTypeTag::Known(t),
            None => EdgeTypeTag::Extension(s),
        }
    }
}

impl From<EdgeTypeTag> for String {
    fn from(tag: EdgeTypeTag) -> Self {
        match tag {
            EdgeTypeTag::Known(t) => t.as_str().to_owned(),
            EdgeTypeTag::Extension(s) => s,
        }
    }
}

impl fmt::Display for EdgeTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Disclosure
// ---------------------------------------------------------------------------

/// Sensitivity of an identifier record, ordered from least to most sensitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    Public,
    Restricted,
    Confidential,
}

/// Intended audience of a document, ordered from narrowest to widest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclosureScope {
    Internal,
    Partner,
    Public,
}

impl DisclosureScope {
    /// The most sensitive level that may appear in a document of this scope.
    pub fn max_sensitivity(&self) -> Sensitivity {
        match self {
            DisclosureScope::Internal => Sensitivity::Confidential,
            DisclosureScope::Partner => Sensitivity::Restricted,
            DisclosureScope::Public => Sensitivity::Public,
        }
    }

    pub fn allows(&self, sensitivity: Sensitivity) -> bool {
        sensitivity <= self.max_sensitivity()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisclosureScope::Internal => "internal",
            DisclosureScope::Partner => "partner",
            DisclosureScope::Public => "public",
        }
    }
}

impl fmt::Display for DisclosureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use std::fmt;

use weft_identity::IdentityError;
use weft_types::{EdgeId, NodeId};

/// A non-fatal finding raised during a merge.
///
/// Warnings never change the merged output; they flag groups and records a
/// reviewer may want to look at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeWarning {
    /// An identifier record was skipped during matching.
    MalformedIdentifier {
        document: String,
        element: String,
        error: IdentityError,
    },
    /// A merge group grew beyond the configured limit.
    OversizedMergeGroup {
        node: NodeId,
        size: usize,
        limit: usize,
    },
    /// Transitive closure joined several nodes of one input document.
    SameDocumentCollapse {
        node: NodeId,
        document: String,
        members: Vec<NodeId>,
    },
    /// The members of a group disagree on type or validity period.
    AmbiguousMergeGroup { node: NodeId, reason: String },
    /// A `same_as` declaration was not honoured because it is chained with
    /// another declaration and transitive honouring is disabled.
    SameAsChainSkipped { document: String, edge: EdgeId },
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedIdentifier {
                document,
                element,
                error,
            } => write!(f, "{document}/{element}: {error}"),
            Self::OversizedMergeGroup { node, size, limit } => {
                write!(f, "merge group {node} has {size} members (limit {limit})")
            }
            Self::SameDocumentCollapse {
                node,
                document,
                members,
            } => {
                let ids: Vec<&str> = members.iter().map(NodeId::as_str).collect();
                write!(
                    f,
                    "merge group {node} joins nodes [{}] of document {document}",
                    ids.join(", ")
                )
            }
            Self::AmbiguousMergeGroup { node, reason } => {
                write!(f, "merge group {node} is ambiguous: {reason}")
            }
            Self::SameAsChainSkipped { document, edge } => {
                write!(f, "{document}/{edge}: chained same_as declaration skipped")
            }
        }
    }
}

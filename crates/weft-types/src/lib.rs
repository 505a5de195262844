//! Foundation types for Weft.
//!
//! This crate provides the graph data model shared by every other Weft crate:
//! documents, nodes, edges, identifier records and the provenance record
//! attached to merged documents.
//!
//! # Key Types
//!
//! - [`GraphDocument`]: A header plus node and edge lists
//! - [`Node`] / [`Edge`]: Graph elements with document-local ids
//! - [`Identifier`]: External identifier record (scheme, value, authority, validity)
//! - [`Scheme`]: Identifier scheme vocabulary with an extension variant
//! - [`NodeTypeTag`] / [`EdgeTypeTag`]: Known or extension element types
//! - [`Sensitivity`] / [`DisclosureScope`]: Disclosure tiers
//! - [`FileSalt`]: Per-document 32-byte salt
//! - [`MergeMetadata`]: Provenance written into merged document headers

pub mod document;
pub mod enums;
pub mod error;
pub mod graph;
pub mod identifier;
pub mod newtypes;
pub mod scheme;

pub use document::{DocumentHeader, GraphDocument, MergeMetadata};
pub use enums::{DisclosureScope, EdgeType, EdgeTypeTag, NodeType, NodeTypeTag, Sensitivity};
pub use error::{TypeError, TypeResult};
pub use graph::{Edge, Node, Properties};
pub use identifier::Identifier;
pub use newtypes::{CalendarDate, EdgeId, FileSalt, NodeId};
pub use scheme::Scheme;

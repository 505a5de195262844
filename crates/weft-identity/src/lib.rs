//! Identity resolution primitives for Weft.
//!
//! Decides when identifier records, nodes, and edges from independently
//! produced graph documents denote the same real-world thing.
//!
//! # Key Types
//!
//! - [`CanonicalId`] - Deterministic `scheme[:authority]:value` form of a record
//! - [`Subject`] / [`Discovery`] - Input and output of parallel candidate discovery
//! - [`DisjointSet`] - Union-find over compact ordinals
//! - [`IdentityError`] - Malformed identifier records

pub mod canonical;
pub mod dsu;
pub mod error;
pub mod index;
pub mod predicate;

pub use canonical::{canonicalize, CanonicalId};
pub use dsu::DisjointSet;
pub use error::{IdentityError, IdentityResult};
pub use index::{discover_candidates, origins_disjoint, Discovery, MalformedRecord, Subject};
pub use predicate::{
    edges_match, has_external_identifier, identifiers_match, is_lei_annulled, is_matchable,
    nodes_match, structural_properties_equal, temporal_compatible, UNCOMPARED_PROPERTY_KEYS,
};

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use rayon::prelude::*;
use tracing::{debug, info, warn};
use weft_identity::IdentityError;
use weft_types::{FileSalt, GraphDocument, Identifier, Node, NodeId, NodeType, Scheme};

use crate::boundary::boundary_digest;
use crate::config::RedactConfig;
use crate::error::RedactResult;
use crate::salt::{check_salt, SaltLedger};
use crate::scope::{apply_scope, forget_reporting_entities};

/// Which nodes to replace with boundary references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedactionSet {
    /// Replace exactly these nodes.
    Redact(BTreeSet<NodeId>),
    /// Replace every node except these.
    Retain(BTreeSet<NodeId>),
}

impl RedactionSet {
    pub fn redact<'s>(ids: impl IntoIterator<Item = &'s str>) -> Self {
        Self::Redact(ids.into_iter().map(NodeId::from).collect())
    }

    pub fn retain<'s>(ids: impl IntoIterator<Item = &'s str>) -> Self {
        Self::Retain(ids.into_iter().map(NodeId::from).collect())
    }

    fn named(&self) -> &BTreeSet<NodeId> {
        match self {
            Self::Redact(ids) | Self::Retain(ids) => ids,
        }
    }

    /// Whether the node `id` is to be replaced.
    pub fn selects(&self, id: &NodeId) -> bool {
        match self {
            Self::Redact(ids) => ids.contains(id),
            Self::Retain(ids) => !ids.contains(id),
        }
    }
}

/// A non-fatal finding raised during redaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedactWarning {
    /// A public identifier was left out of a boundary hash.
    MalformedIdentifier { node: NodeId, error: IdentityError },
    /// The selection names a node the document does not contain.
    UnknownNode { node: NodeId },
}

impl fmt::Display for RedactWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedIdentifier { node, error } => write!(f, "{node}: {error}"),
            Self::UnknownNode { node } => write!(f, "selected node {node} does not exist"),
        }
    }
}

/// The redacted document together with what was done to it.
#[derive(Clone, Debug)]
pub struct RedactOutput {
    pub document: GraphDocument,
    /// Original node id to boundary-reference id.
    pub stubs: BTreeMap<NodeId, NodeId>,
    /// Stand-ins keyed by a random token rather than a hash.
    pub unlinkable_count: usize,
    /// Nodes removed outright by the disclosure scope.
    pub dropped_nodes: Vec<NodeId>,
    pub removed_identifiers: usize,
    pub warnings: Vec<RedactWarning>,
}

impl RedactOutput {
    pub fn redacted_count(&self) -> usize {
        self.stubs.len()
    }
}

/// Produces redacted projections of graph documents.
#[derive(Clone, Debug, Default)]
pub struct Redactor {
    config: RedactConfig,
}

impl Redactor {
    pub fn new(config: RedactConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RedactConfig {
        &self.config
    }

    /// Redact `doc`, keying boundary references with `salt`.
    pub fn redact(
        &self,
        doc: &GraphDocument,
        selection: &RedactionSet,
        salt: Option<FileSalt>,
    ) -> RedactResult<RedactOutput> {
        let salt = check_salt(salt, doc.header.salt.as_ref(), self.config.min_distinct_salt_bytes)?;
        self.redact_checked(doc, selection, salt)
    }

    /// Like [`Redactor::redact`], refusing salts recorded in `ledger` and
    /// recording `salt` there once the redaction succeeded.
    pub fn redact_tracked(
        &self,
        doc: &GraphDocument,
        selection: &RedactionSet,
        salt: Option<FileSalt>,
        ledger: &mut SaltLedger,
    ) -> RedactResult<RedactOutput> {
        let salt = check_salt(salt, doc.header.salt.as_ref(), self.config.min_distinct_salt_bytes)?;
        ledger.check(&salt)?;
        let output = self.redact_checked(doc, selection, salt)?;
        ledger.register(&salt);
        Ok(output)
    }

    fn redact_checked(
        &self,
        doc: &GraphDocument,
        selection: &RedactionSet,
        salt: FileSalt,
    ) -> RedactResult<RedactOutput> {
        doc.validate_references()?;

        let mut warnings: Vec<RedactWarning> = {
            let present = doc.node_positions();
            selection
                .named()
                .iter()
                .filter(|id| !present.contains_key(id.as_str()))
                .map(|id| RedactWarning::UnknownNode { node: id.clone() })
                .collect()
        };

        let mut out = doc.clone();
        let scope = apply_scope(&mut out, self.config.scope);

        // Existing boundary references pass through untouched.
        let selected: Vec<usize> = out
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.node_type.is(NodeType::BoundaryRef) && selection.selects(&n.id))
            .map(|(i, _)| i)
            .collect();

        // The scope never removes public identifiers, so the hash input is
        // unaffected by it.
        let digests: Vec<_> = selected
            .par_iter()
            .map(|&i| boundary_digest(&out.nodes[i], &salt))
            .collect();
        debug!(selected = selected.len(), "computed boundary digests");

        let mut taken: HashSet<String> = out.nodes.iter().map(|n| n.id.to_string()).collect();
        let mut next = 0usize;
        let mut stubs = BTreeMap::new();
        let mut unlinkable_count = 0;
        for (&i, digest) in selected.iter().zip(digests) {
            let original = out.nodes[i].id.clone();
            warnings.extend(digest.skipped.into_iter().map(|error| RedactWarning::MalformedIdentifier {
                node: original.clone(),
                error,
            }));
            if !digest.derived {
                unlinkable_count += 1;
            }

            let stub_id = loop {
                next += 1;
                let candidate = format!("boundary-{next}");
                if taken.insert(candidate.clone()) {
                    break NodeId::new(candidate);
                }
            };
            out.nodes[i] = Node::new(stub_id.as_str(), NodeType::BoundaryRef)
                .with_identifier(Identifier::new(Scheme::Opaque, digest.value));
            stubs.insert(original, stub_id);
        }

        let renamed: HashMap<&NodeId, &NodeId> = stubs.iter().collect();
        for edge in &mut out.edges {
            if let Some(&to) = renamed.get(&edge.source) {
                edge.source = to.clone();
            }
            if let Some(&to) = renamed.get(&edge.target) {
                edge.target = to.clone();
            }
        }

        let replaced: HashSet<NodeId> = stubs.keys().cloned().collect();
        forget_reporting_entities(&mut out, &replaced);
        out.header.salt = Some(salt);

        for w in &warnings {
            warn!(warning = %w, "redaction warning");
        }
        info!(
            document = out.label(),
            scope = %self.config.scope,
            redacted = stubs.len(),
            unlinkable = unlinkable_count,
            dropped = scope.dropped_nodes.len(),
            "redaction complete"
        );

        Ok(RedactOutput {
            document: out,
            stubs,
            unlinkable_count,
            dropped_nodes: scope.dropped_nodes,
            removed_identifiers: scope.removed_identifiers,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RedactError, SaltDefect};
    use serde_json::json;
    use weft_types::{DisclosureScope, Edge, EdgeType};

    fn supply_chain() -> GraphDocument {
        GraphDocument::new("acme")
            .with_node(
                Node::new("buyer", NodeType::Organization)
                    .with_identifier(Identifier::new("lei", "BUYER"))
                    .with_property("name", json!("Buyer AG")),
            )
            .with_node(
                Node::new("tier1", NodeType::Organization)
                    .with_identifier(Identifier::new("duns", "111"))
                    .with_property("name", json!("Tier One")),
            )
            .with_node(Node::new("mill", NodeType::Facility))
            .with_node(Node::new("plant", NodeType::Facility))
            .with_edge(Edge::new("e1", EdgeType::Supplies, "tier1", "buyer"))
            .with_edge(Edge::new("e2", EdgeType::Operates, "tier1", "mill"))
            .with_edge(Edge::new("e3", EdgeType::Operates, "tier1", "plant"))
    }

    fn opaque(doc: &GraphDocument, id: &NodeId) -> String {
        doc.node(id.as_str()).unwrap().identifiers[0].value.clone()
    }

    #[test]
    fn redacted_node_becomes_boundary_reference() {
        let out = Redactor::default()
            .redact(&supply_chain(), &RedactionSet::redact(["tier1"]), Some(FileSalt::generate()))
            .unwrap();
        let stub_id = &out.stubs[&NodeId::from("tier1")];
        let stub = out.document.node(stub_id.as_str()).unwrap();
        assert!(stub.node_type.is(NodeType::BoundaryRef));
        assert_eq!(stub.identifiers.len(), 1);
        assert_eq!(stub.identifiers[0].scheme, Scheme::Opaque);
        assert!(stub.properties.is_empty());
        assert_eq!(out.document.edges[0].source, *stub_id);
        assert!(out.document.validate_references().is_ok());
        assert!(out.document.node("tier1").is_none());
    }

    #[test]
    fn different_salts_give_different_values() {
        let doc = supply_chain();
        let set = RedactionSet::redact(["buyer"]);
        let a = Redactor::default().redact(&doc, &set, Some(FileSalt::generate())).unwrap();
        let b = Redactor::default().redact(&doc, &set, Some(FileSalt::generate())).unwrap();
        let id = NodeId::from("buyer");
        assert_ne!(opaque(&a.document, &a.stubs[&id]), opaque(&b.document, &b.stubs[&id]));
    }

    #[test]
    fn identifierless_nodes_get_distinct_values() {
        let out = Redactor::default()
            .redact(&supply_chain(), &RedactionSet::redact(["mill", "plant"]), Some(FileSalt::generate()))
            .unwrap();
        let mill = opaque(&out.document, &out.stubs[&NodeId::from("mill")]);
        let plant = opaque(&out.document, &out.stubs[&NodeId::from("plant")]);
        assert_ne!(mill, plant);
        assert_eq!(out.unlinkable_count, 2);
    }

    #[test]
    fn retain_set_replaces_everything_else() {
        let out = Redactor::default()
            .redact(&supply_chain(), &RedactionSet::retain(["buyer"]), Some(FileSalt::generate()))
            .unwrap();
        assert_eq!(out.redacted_count(), 3);
        assert!(out.document.node("buyer").is_some());
        assert_eq!(out.document.nodes.len(), 4);
    }

    #[test]
    fn boundary_references_pass_through() {
        let doc = supply_chain().with_node(
            Node::new("b", NodeType::BoundaryRef).with_identifier(Identifier::new("opaque", "ff")),
        );
        let out = Redactor::default()
            .redact(&doc, &RedactionSet::retain(["buyer"]), Some(FileSalt::generate()))
            .unwrap();
        assert!(!out.stubs.contains_key(&NodeId::from("b")));
        assert_eq!(out.document.node("b").unwrap().identifiers[0].value, "ff");
    }

    #[test]
    fn stub_ids_avoid_existing_ids() {
        let doc = supply_chain().with_node(Node::new("boundary-1", NodeType::Good));
        let out = Redactor::default()
            .redact(&doc, &RedactionSet::redact(["mill"]), Some(FileSalt::generate()))
            .unwrap();
        assert_eq!(out.stubs[&NodeId::from("mill")].as_str(), "boundary-2");
    }

    #[test]
    fn header_is_rewritten() {
        let mut doc = supply_chain();
        doc.header.reporting_entity = Some(NodeId::from("buyer"));
        let salt = FileSalt::generate();
        let redactor = Redactor::new(RedactConfig {
            scope: DisclosureScope::Public,
            ..RedactConfig::default()
        });
        let out = redactor.redact(&doc, &RedactionSet::redact(["buyer"]), Some(salt)).unwrap();
        assert_eq!(out.document.header.salt, Some(salt));
        assert_eq!(out.document.header.disclosure_scope, Some(DisclosureScope::Public));
        assert_eq!(out.document.header.reporting_entity, None);
    }

    #[test]
    fn reused_input_salt_is_fatal() {
        let mut doc = supply_chain();
        let salt = FileSalt::generate();
        doc.header.salt = Some(salt);
        let err = Redactor::default()
            .redact(&doc, &RedactionSet::redact(["buyer"]), Some(salt))
            .unwrap_err();
        assert_eq!(err, RedactError::SaltMissingOrReused(SaltDefect::SameAsInput));
    }

    #[test]
    fn ledger_refuses_second_use() {
        let doc = supply_chain();
        let set = RedactionSet::redact(["buyer"]);
        let salt = FileSalt::generate();
        let mut ledger = SaltLedger::new();
        let redactor = Redactor::default();
        redactor.redact_tracked(&doc, &set, Some(salt), &mut ledger).unwrap();
        let err = redactor
            .redact_tracked(&doc, &set, Some(salt), &mut ledger)
            .unwrap_err();
        assert_eq!(err, RedactError::SaltMissingOrReused(SaltDefect::AlreadyUsed));
    }

    #[test]
    fn failed_redaction_does_not_burn_the_salt() {
        let bad = GraphDocument::new("bad").with_edge(Edge::new("e", EdgeType::Supplies, "x", "y"));
        let salt = FileSalt::generate();
        let mut ledger = SaltLedger::new();
        assert!(Redactor::default()
            .redact_tracked(&bad, &RedactionSet::redact(["x"]), Some(salt), &mut ledger)
            .is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn unknown_selection_is_a_warning() {
        let out = Redactor::default()
            .redact(&supply_chain(), &RedactionSet::redact(["ghost"]), Some(FileSalt::generate()))
            .unwrap();
        assert_eq!(
            out.warnings,
            vec![RedactWarning::UnknownNode {
                node: NodeId::from("ghost")
            }]
        );
        assert!(out.stubs.is_empty());
    }
}

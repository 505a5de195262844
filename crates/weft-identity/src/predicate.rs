//! Identity predicates over identifier records, nodes, and edges.

use serde_json::Value;
use weft_types::{CalendarDate, Edge, EdgeType, Identifier, Node, Properties, Scheme};

/// Property keys ignored when comparing edges structurally: validity bounds
/// and the bookkeeping keys a merge writes.
pub const UNCOMPARED_PROPERTY_KEYS: [&str; 5] =
    ["valid_from", "valid_to", "_conflicts", "_sources", "_provenance"];

/// Whether `id` may take part in identity matching at all.
///
/// Internal identifiers are scoped to their issuing system, annulled LEIs
/// denote nothing, and records without a canonical form cannot be compared.
pub fn is_matchable(id: &Identifier) -> bool {
    if id.scheme == Scheme::Internal || is_lei_annulled(id) {
        return false;
    }
    if id.scheme.as_str().is_empty() || id.value.trim().is_empty() {
        return false;
    }
    if id.scheme.requires_authority() {
        return id.authority.as_deref().is_some_and(|a| !a.trim().is_empty());
    }
    true
}

/// Returns `true` for an LEI record whose registration status is `ANNULLED`.
pub fn is_lei_annulled(id: &Identifier) -> bool {
    id.scheme == Scheme::Lei
        && id
            .extra
            .get("entity_status")
            .and_then(|v| v.as_str())
            .is_some_and(|s| s == "ANNULLED")
}

/// Whether two identifier records denote the same real-world identifier.
///
/// Symmetric. Values compare after trimming, case-sensitively and without
/// numeric coercion. Authorities compare case-insensitively and must be
/// present on both sides if present on either.
pub fn identifiers_match(a: &Identifier, b: &Identifier) -> bool {
    if !is_matchable(a) || !is_matchable(b) {
        return false;
    }
    if a.scheme != b.scheme {
        return false;
    }
    if a.value.trim() != b.value.trim() {
        return false;
    }
    match (&a.authority, &b.authority) {
        (None, None) => {}
        (Some(x), Some(y)) => {
            if !x.trim().eq_ignore_ascii_case(y.trim()) {
                return false;
            }
        }
        _ => return false,
    }
    temporal_compatible(a, b)
}

/// Whether the validity intervals of two records overlap.
///
/// A record with no temporal bounds is compatible with anything. A missing
/// or `null` `valid_to` is open-ended, and an interval ending on the day
/// another begins still overlaps it.
pub fn temporal_compatible(a: &Identifier, b: &Identifier) -> bool {
    if !a.has_temporal_bounds() || !b.has_temporal_bounds() {
        return true;
    }
    !ends_before(a.valid_to, b.valid_from) && !ends_before(b.valid_to, a.valid_from)
}

fn ends_before(end: Option<Option<CalendarDate>>, start: Option<CalendarDate>) -> bool {
    match (end.flatten(), start) {
        (Some(end), Some(start)) => end < start,
        _ => false,
    }
}

/// Two nodes are merge candidates iff some pair of their records match.
///
/// Callers are responsible for never pairing nodes of the same document.
pub fn nodes_match(a: &Node, b: &Node) -> bool {
    a.identifiers
        .iter()
        .any(|x| b.identifiers.iter().any(|y| identifiers_match(x, y)))
}

/// Whether an edge carries any identifier usable for matching.
pub fn has_external_identifier(edge: &Edge) -> bool {
    edge.identifiers.iter().any(|id| id.scheme != Scheme::Internal)
}

/// Edge identity, assuming both endpoints already resolve to the same
/// merge groups.
///
/// Types must be equal and `same_as` edges never match. With identifiers on
/// either side a shared identifier decides; otherwise the properties must be
/// structurally equal apart from [`UNCOMPARED_PROPERTY_KEYS`].
pub fn edges_match(a: &Edge, b: &Edge) -> bool {
    if a.edge_type != b.edge_type || a.edge_type.is(EdgeType::SameAs) {
        return false;
    }
    match (has_external_identifier(a), has_external_identifier(b)) {
        (false, false) => structural_properties_equal(&a.properties, &b.properties),
        (true, true) => a
            .identifiers
            .iter()
            .any(|x| b.identifiers.iter().any(|y| identifiers_match(x, y))),
        _ => false,
    }
}

/// Structural equality of two property maps, ignoring
/// [`UNCOMPARED_PROPERTY_KEYS`].
pub fn structural_properties_equal(a: &Properties, b: &Properties) -> bool {
    compared(a) == compared(b)
}

fn compared(p: &Properties) -> Vec<(&String, &Value)> {
    p.iter()
        .filter(|(k, _)| !UNCOMPARED_PROPERTY_KEYS.contains(&k.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use weft_types::NodeType;

    fn date(s: &str) -> CalendarDate {
        CalendarDate::try_from(s).unwrap()
    }

    #[test]
    fn equal_lei_matches() {
        let a = Identifier::new("lei", "ABC");
        let b = Identifier::new("lei", " ABC ");
        assert!(identifiers_match(&a, &b));
        assert!(identifiers_match(&b, &a));
    }

    #[test]
    fn internal_scheme_never_matches() {
        let a = Identifier::new("internal", "V-100").with_authority("sap-prod");
        let b = Identifier::new("internal", "V-100").with_authority("sap-prod");
        assert!(!identifiers_match(&a, &b));
    }

    #[test]
    fn different_schemes_do_not_match() {
        assert!(!identifiers_match(
            &Identifier::new("lei", "123"),
            &Identifier::new("duns", "123")
        ));
    }

    #[test]
    fn values_are_case_sensitive() {
        assert!(!identifiers_match(
            &Identifier::new("com.acme.id", "abc"),
            &Identifier::new("com.acme.id", "ABC")
        ));
    }

    #[test]
    fn authority_compared_case_insensitively() {
        let a = Identifier::new("vat", "DE1").with_authority("DE");
        let b = Identifier::new("vat", "DE1").with_authority("de");
        assert!(identifiers_match(&a, &b));
    }

    #[test]
    fn one_sided_authority_does_not_match() {
        let a = Identifier::new("duns", "081466849").with_authority("dnb");
        let b = Identifier::new("duns", "081466849");
        assert!(!identifiers_match(&a, &b));
    }

    #[test]
    fn missing_required_authority_does_not_match() {
        let a = Identifier::new("vat", "DE1");
        let b = Identifier::new("vat", "DE1");
        assert!(!identifiers_match(&a, &b));
    }

    #[test]
    fn annulled_lei_never_matches() {
        let mut annulled = Identifier::new("lei", "ABC");
        annulled
            .extra
            .insert("entity_status".into(), json!("ANNULLED"));
        assert!(is_lei_annulled(&annulled));
        assert!(!identifiers_match(&annulled, &Identifier::new("lei", "ABC")));
    }

    #[test]
    fn disjoint_validity_does_not_match() {
        let a = Identifier::new("duns", "1").with_validity(None, Some(Some(date("2019-12-31"))));
        let b = Identifier::new("duns", "1").with_validity(Some(date("2020-01-01")), None);
        assert!(!identifiers_match(&a, &b));
    }

    #[test]
    fn touching_validity_overlaps() {
        let a = Identifier::new("duns", "1").with_validity(None, Some(Some(date("2020-01-01"))));
        let b = Identifier::new("duns", "1").with_validity(Some(date("2020-01-01")), None);
        assert!(temporal_compatible(&a, &b));
    }

    #[test]
    fn null_valid_to_is_open_ended() {
        let a = Identifier::new("duns", "1").with_validity(Some(date("2000-01-01")), Some(None));
        let b = Identifier::new("duns", "1").with_validity(Some(date("2030-01-01")), None);
        assert!(temporal_compatible(&a, &b));
    }

    #[test]
    fn unbounded_record_is_always_compatible() {
        let a = Identifier::new("duns", "1");
        let b = Identifier::new("duns", "1").with_validity(None, Some(Some(date("1990-01-01"))));
        assert!(temporal_compatible(&a, &b));
    }

    #[test]
    fn nodes_match_on_any_shared_identifier() {
        let x = Node::new("x", NodeType::Organization)
            .with_identifier(Identifier::new("lei", "ABC"))
            .with_identifier(Identifier::new("duns", "123"));
        let z = Node::new("z", NodeType::Organization).with_identifier(Identifier::new("duns", "123"));
        let other = Node::new("o", NodeType::Organization).with_identifier(Identifier::new("duns", "999"));
        assert!(nodes_match(&x, &z));
        assert!(!nodes_match(&x, &other));
    }

    #[test]
    fn identifierless_edges_compare_properties() {
        let a = Edge::new("a", EdgeType::Supplies, "s", "t")
            .with_property("contract_ref", json!("C-1"))
            .with_property("valid_from", json!("2020-01-01"));
        let b = Edge::new("b", EdgeType::Supplies, "s", "t")
            .with_property("contract_ref", json!("C-1"))
            .with_property("valid_from", json!("2022-06-01"));
        let c = Edge::new("c", EdgeType::Supplies, "s", "t").with_property("contract_ref", json!("C-2"));
        assert!(edges_match(&a, &b));
        assert!(!edges_match(&a, &c));
    }

    #[test]
    fn merge_bookkeeping_is_not_compared() {
        let a = Edge::new("a", EdgeType::Supplies, "s", "t")
            .with_property("volume", json!(10))
            .with_property("_sources", json!(["x", "y"]))
            .with_property("_provenance", json!({"volume": ["x"]}));
        let b = Edge::new("b", EdgeType::Supplies, "s", "t").with_property("volume", json!(10));
        assert!(edges_match(&a, &b));
    }

    #[test]
    fn edges_with_identifiers_ignore_properties() {
        let a = Edge::new("a", EdgeType::Ownership, "s", "t")
            .with_identifier(Identifier::new("com.registry.share", "S1"))
            .with_property("percentage", json!(51));
        let b = Edge::new("b", EdgeType::Ownership, "s", "t")
            .with_identifier(Identifier::new("com.registry.share", "S1"))
            .with_property("percentage", json!(49));
        assert!(edges_match(&a, &b));
    }

    #[test]
    fn internal_only_edge_identifiers_fall_back_to_properties() {
        let a = Edge::new("a", EdgeType::Supplies, "s", "t")
            .with_identifier(Identifier::new("internal", "PO-1").with_authority("erp"));
        let b = Edge::new("b", EdgeType::Supplies, "s", "t");
        assert!(edges_match(&a, &b));
    }

    #[test]
    fn different_edge_types_never_match() {
        let a = Edge::new("a", EdgeType::Supplies, "s", "t");
        let b = Edge::new("b", EdgeType::SellsTo, "s", "t");
        assert!(!edges_match(&a, &b));
    }

    #[test]
    fn same_as_edges_never_match() {
        let a = Edge::new("a", EdgeType::SameAs, "s", "t");
        let b = Edge::new("b", EdgeType::SameAs, "s", "t");
        assert!(!edges_match(&a, &b));
    }
}

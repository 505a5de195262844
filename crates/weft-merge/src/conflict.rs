//! Conflict and provenance recording for merge groups.
//!
//! Each merge group is folded into one element. Properties on which the
//! members agree are kept; a property with more than one distinct value is
//! dropped from the element and recorded as a [`Conflict`] naming every
//! `(source, value)` pair. The conflicts of an element are also written into
//! its `_conflicts` property, and that property is read back when a merged
//! document is merged again, so nested merges keep the full value set.
//!
//! A kept value stated by only some of an element's sources is listed under
//! `_provenance` (`{field: [sources]}`), so a later merge credits it to those
//! sources alone. Bookkeeping properties are only interpreted on elements of
//! merged documents; on plain inputs they are ignored.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use weft_identity::canonicalize;
use weft_types::{CalendarDate, Identifier, NodeTypeTag, Properties, Sensitivity};

/// Property key carrying an element's recorded conflicts.
pub const CONFLICTS_KEY: &str = "_conflicts";

/// Property key listing the source documents a merged element stems from.
pub const SOURCES_KEY: &str = "_sources";

/// Property key mapping kept fields to the sources that stated them, for
/// fields not stated by every source.
pub const PROVENANCE_KEY: &str = "_provenance";

/// Conflict field used for disagreeing element types.
pub const TYPE_FIELD: &str = "type";

/// One contributed value and the document it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictEntry {
    pub source: String,
    pub value: Value,
}

/// A field whose contributed values disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub field: String,
    /// Sorted by source, then by value; no duplicates.
    pub values: Vec<ConflictEntry>,
}

impl Conflict {
    fn to_json(&self) -> Value {
        let values = self
            .values
            .iter()
            .map(|e| {
                let mut entry = serde_json::Map::new();
                entry.insert("source".into(), Value::String(e.source.clone()));
                entry.insert("value".into(), e.value.clone());
                Value::Object(entry)
            })
            .collect();
        let mut obj = serde_json::Map::new();
        obj.insert("field".into(), Value::String(self.field.clone()));
        obj.insert("values".into(), Value::Array(values));
        Value::Object(obj)
    }
}

/// Which kind of element a conflict was recorded on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Node,
    Edge,
}

/// A conflict together with the merged element it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub kind: ElementKind,
    /// Id of the element in the merged document.
    pub id: String,
    pub conflict: Conflict,
}

/// The folded type and properties of one merge group.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciled {
    pub type_name: String,
    pub properties: Properties,
    pub conflicts: Vec<Conflict>,
}

/// Accumulates the contributions of every member of one merge group.
#[derive(Debug, Default)]
pub struct Reconciler {
    origins: BTreeSet<String>,
    types: Vec<ConflictEntry>,
    fields: BTreeMap<String, Vec<ConflictEntry>>,
}

type Provenance = BTreeMap<String, BTreeSet<String>>;

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one member's type and properties, attributed to each of the
    /// documents in `sources`.
    ///
    /// `merged` marks a member taken from an earlier merge's output: its
    /// `_conflicts` and `_provenance` properties are read back instead of
    /// being treated as values.
    pub fn add_member<S: AsRef<str>>(
        &mut self,
        sources: &[S],
        type_name: &str,
        properties: &Properties,
        merged: bool,
    ) {
        self.origins.extend(sources.iter().map(|s| s.as_ref().to_owned()));
        let type_value = Value::String(type_name.to_owned());
        self.types.extend(attributed(sources, &type_value));

        let provenance = if merged {
            properties.get(PROVENANCE_KEY).and_then(parse_provenance)
        } else {
            None
        };

        for (key, value) in properties {
            match key.as_str() {
                SOURCES_KEY => continue,
                PROVENANCE_KEY if !merged || provenance.is_some() => continue,
                CONFLICTS_KEY if !merged => continue,
                CONFLICTS_KEY => {
                    if let Some(previous) = parse_conflicts(value) {
                        self.reexpand_conflicts(previous);
                        continue;
                    }
                }
                _ => {}
            }

            let entries = self.fields.entry(key.clone()).or_default();
            let stated: Vec<&str> = match provenance.as_ref().and_then(|p| p.get(key)) {
                Some(labels) => sources
                    .iter()
                    .map(|s| s.as_ref())
                    .filter(|s| labels.contains(*s))
                    .collect(),
                None => Vec::new(),
            };
            if stated.is_empty() {
                entries.extend(attributed(sources, value));
            } else {
                entries.extend(stated.into_iter().map(|s| ConflictEntry {
                    source: s.to_owned(),
                    value: value.clone(),
                }));
            }
        }
    }

    fn reexpand_conflicts(&mut self, previous: Vec<Conflict>) {
        for conflict in previous {
            if conflict.field == TYPE_FIELD {
                self.types.extend(conflict.values);
            } else {
                self.fields
                    .entry(conflict.field)
                    .or_default()
                    .extend(conflict.values);
            }
        }
    }

    /// Fold the contributions into one type and property map, including
    /// the `_sources`, `_provenance` and `_conflicts` bookkeeping.
    ///
    /// The lexicographically smallest type wins a type disagreement.
    pub fn finish(self) -> Reconciled {
        let mut conflicts = Vec::new();

        let types = normalize(self.types);
        let type_name = types
            .iter()
            .filter_map(|(_, e)| e.value.as_str())
            .min()
            .unwrap_or_default()
            .to_owned();
        if distinct_values(&types) > 1 {
            conflicts.push(Conflict {
                field: TYPE_FIELD.to_owned(),
                values: types.into_iter().map(|(_, e)| e).collect(),
            });
        }

        let mut properties = Properties::new();
        let mut provenance = serde_json::Map::new();
        for (field, entries) in self.fields {
            let entries = normalize(entries);
            if distinct_values(&entries) > 1 {
                conflicts.push(Conflict {
                    field,
                    values: entries.into_iter().map(|(_, e)| e).collect(),
                });
                continue;
            }
            let stated: BTreeSet<String> = entries.iter().map(|(_, e)| e.source.clone()).collect();
            if let Some((_, entry)) = entries.into_iter().next() {
                if !self.origins.iter().all(|o| stated.contains(o)) {
                    provenance.insert(
                        field.clone(),
                        Value::Array(stated.into_iter().map(Value::String).collect()),
                    );
                }
                properties.insert(field, entry.value);
            }
        }

        if !self.origins.is_empty() {
            properties.insert(
                SOURCES_KEY.to_owned(),
                Value::Array(self.origins.into_iter().map(Value::String).collect()),
            );
        }
        if !provenance.is_empty() {
            properties.insert(PROVENANCE_KEY.to_owned(), Value::Object(provenance));
        }

        conflicts.sort_by(|a, b| a.field.cmp(&b.field));
        if !conflicts.is_empty() {
            properties.insert(
                CONFLICTS_KEY.to_owned(),
                Value::Array(conflicts.iter().map(Conflict::to_json).collect()),
            );
        }

        Reconciled {
            type_name,
            properties,
            conflicts,
        }
    }
}

fn attributed<'s, S: AsRef<str>>(
    sources: &'s [S],
    value: &'s Value,
) -> impl Iterator<Item = ConflictEntry> + 's {
    sources.iter().map(move |s| ConflictEntry {
        source: s.as_ref().to_owned(),
        value: value.clone(),
    })
}

fn parse_conflicts(value: &Value) -> Option<Vec<Conflict>> {
    serde_json::from_value(value.clone()).ok()
}

fn parse_provenance(value: &Value) -> Option<Provenance> {
    serde_json::from_value(value.clone()).ok()
}

/// Sort entries by (source, serialized value) and drop duplicates. The
/// serialized value is kept alongside for distinct-value counting.
fn normalize(entries: Vec<ConflictEntry>) -> Vec<(String, ConflictEntry)> {
    let mut keyed: Vec<(String, ConflictEntry)> =
        entries.into_iter().map(|e| (e.value.to_string(), e)).collect();
    keyed.sort_by(|(va, a), (vb, b)| a.source.cmp(&b.source).then_with(|| va.cmp(vb)));
    keyed.dedup_by(|(va, a), (vb, b)| a.source == b.source && va == vb);
    keyed
}

fn distinct_values(entries: &[(String, ConflictEntry)]) -> usize {
    let mut keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
    keys.sort_unstable();
    keys.dedup();
    keys.len()
}

/// Union of identifier records across a merge group.
///
/// Each record comes with the type of the node that carried it, or `None`
/// for edge identifiers. A node record's sensitivity is first pinned to its
/// effective value under that owner type, so an identifier that was
/// confidential on a person stays confidential whatever type the merged node
/// ends up with.
///
/// Records sharing a canonical string collapse into one: the record whose
/// JSON form (validity and sensitivity aside) is smallest, widened to the
/// hull of all their validity periods and carrying the most restrictive
/// sensitivity. Every step is a min or a max, so nested merges collapse to
/// the same record as a flat one. Output is sorted by canonical string;
/// records without a canonical form are de-duplicated by JSON and placed
/// last.
pub fn union_identifiers<'a>(
    records: impl IntoIterator<Item = (&'a Identifier, Option<&'a NodeTypeTag>)>,
) -> Vec<Identifier> {
    let mut canonical: BTreeMap<String, Collapsed> = BTreeMap::new();
    let mut malformed: BTreeMap<String, Identifier> = BTreeMap::new();

    for (record, owner) in records {
        let sensitivity = match owner {
            Some(owner) => Some(record.effective_sensitivity(owner)),
            None => record.sensitivity,
        };
        match canonicalize(record) {
            Ok(key) => match canonical.entry(key.into_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(Collapsed::new(record, sensitivity));
                }
                Entry::Occupied(mut slot) => slot.get_mut().absorb(record, sensitivity),
            },
            Err(_) => {
                let mut pinned = record.clone();
                pinned.sensitivity = sensitivity;
                let json = serde_json::to_string(&pinned).unwrap_or_default();
                malformed.entry(json).or_insert(pinned);
            }
        }
    }

    canonical
        .into_values()
        .map(Collapsed::finish)
        .chain(malformed.into_values())
        .collect()
}

struct Collapsed {
    base_json: String,
    base: Identifier,
    sensitivity: Option<Sensitivity>,
    unbounded: bool,
    from_open: bool,
    from: Option<CalendarDate>,
    to_absent: bool,
    to_null: bool,
    to: Option<CalendarDate>,
}

impl Collapsed {
    fn new(record: &Identifier, sensitivity: Option<Sensitivity>) -> Self {
        let base = strip(record);
        let mut this = Self {
            base_json: serde_json::to_string(&base).unwrap_or_default(),
            base,
            sensitivity: None,
            unbounded: false,
            from_open: false,
            from: None,
            to_absent: false,
            to_null: false,
            to: None,
        };
        this.widen(record, sensitivity);
        this
    }

    fn absorb(&mut self, record: &Identifier, sensitivity: Option<Sensitivity>) {
        let base = strip(record);
        let json = serde_json::to_string(&base).unwrap_or_default();
        if json < self.base_json {
            self.base_json = json;
            self.base = base;
        }
        self.widen(record, sensitivity);
    }

    fn widen(&mut self, record: &Identifier, sensitivity: Option<Sensitivity>) {
        self.sensitivity = self.sensitivity.max(sensitivity);
        if !record.has_temporal_bounds() {
            self.unbounded = true;
            return;
        }
        match record.valid_from {
            Some(d) => self.from = Some(self.from.map_or(d, |f| f.min(d))),
            None => self.from_open = true,
        }
        match record.valid_to {
            None => self.to_absent = true,
            Some(None) => self.to_null = true,
            Some(Some(d)) => self.to = Some(self.to.map_or(d, |t| t.max(d))),
        }
    }

    fn finish(self) -> Identifier {
        let mut out = self.base;
        out.sensitivity = self.sensitivity;
        if !self.unbounded {
            out.valid_from = if self.from_open { None } else { self.from };
            out.valid_to = if self.to_absent {
                None
            } else if self.to_null {
                Some(None)
            } else {
                self.to.map(Some)
            };
        }
        out
    }
}

fn strip(record: &Identifier) -> Identifier {
    let mut base = record.clone();
    base.sensitivity = None;
    base.valid_from = None;
    base.valid_to = None;
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use weft_types::NodeType;

    fn on_edges<'a>(records: &[&'a Identifier]) -> Vec<(&'a Identifier, Option<&'a NodeTypeTag>)> {
        records.iter().map(|&r| (r, None)).collect()
    }

    fn props(pairs: &[(&str, Value)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn agreeing_property_is_kept() {
        let mut r = Reconciler::new();
        r.add_member(&["a"], "organization", &props(&[("name", json!("Acme"))]), false);
        r.add_member(&["b"], "organization", &props(&[("name", json!("Acme"))]), false);
        let out = r.finish();
        assert_eq!(out.type_name, "organization");
        assert_eq!(out.properties.get("name"), Some(&json!("Acme")));
        assert!(out.conflicts.is_empty());
        assert!(!out.properties.contains_key(CONFLICTS_KEY));
    }

    #[test]
    fn disagreeing_property_becomes_conflict() {
        let mut r = Reconciler::new();
        r.add_member(&["b"], "organization", &props(&[("name", json!("Acme GmbH"))]), false);
        r.add_member(&["a"], "organization", &props(&[("name", json!("Acme"))]), false);
        let out = r.finish();

        assert!(!out.properties.contains_key("name"));
        assert_eq!(out.conflicts.len(), 1);
        let c = &out.conflicts[0];
        assert_eq!(c.field, "name");
        assert_eq!(
            c.values,
            vec![
                ConflictEntry {
                    source: "a".into(),
                    value: json!("Acme")
                },
                ConflictEntry {
                    source: "b".into(),
                    value: json!("Acme GmbH")
                },
            ]
        );
        assert_eq!(out.properties[CONFLICTS_KEY][0]["field"], json!("name"));
    }

    #[test]
    fn property_missing_on_one_side_is_not_a_conflict() {
        let mut r = Reconciler::new();
        r.add_member(&["a"], "facility", &props(&[("city", json!("Lyon"))]), false);
        r.add_member(&["b"], "facility", &Properties::new(), false);
        let out = r.finish();
        assert_eq!(out.properties.get("city"), Some(&json!("Lyon")));
    }

    #[test]
    fn type_disagreement_picks_smallest() {
        let mut r = Reconciler::new();
        r.add_member(&["a"], "organization", &Properties::new(), false);
        r.add_member(&["b"], "facility", &Properties::new(), false);
        let out = r.finish();
        assert_eq!(out.type_name, "facility");
        assert_eq!(out.conflicts[0].field, TYPE_FIELD);
    }

    #[test]
    fn previous_conflicts_are_carried_into_nested_merge() {
        let mut first = Reconciler::new();
        first.add_member(&["a"], "organization", &props(&[("name", json!("X"))]), false);
        first.add_member(&["b"], "organization", &props(&[("name", json!("Y"))]), false);
        let merged = first.finish();

        let mut second = Reconciler::new();
        second.add_member(&["a", "b"], "organization", &merged.properties, true);
        second.add_member(&["c"], "organization", &props(&[("name", json!("Z"))]), false);
        let out = second.finish();

        assert_eq!(out.conflicts.len(), 1);
        let values: Vec<&Value> = out.conflicts[0].values.iter().map(|e| &e.value).collect();
        assert_eq!(values, vec![&json!("X"), &json!("Y"), &json!("Z")]);
    }

    #[test]
    fn malformed_conflicts_property_is_treated_as_plain_value() {
        let mut r = Reconciler::new();
        r.add_member(&["a"], "good", &props(&[(CONFLICTS_KEY, json!("not a list"))]), true);
        let out = r.finish();
        assert_eq!(out.properties.get(CONFLICTS_KEY), Some(&json!("not a list")));
    }

    #[test]
    fn identifier_union_dedups_by_canonical_form() {
        let a = Identifier::new("lei", "ABC");
        let b = Identifier::new("lei", " ABC ");
        let c = Identifier::new("duns", "123");
        let bad = Identifier::new("vat", "DE1");
        let out = union_identifiers(on_edges(&[&a, &b, &c, &bad, &bad]));
        let schemes: Vec<&str> = out.iter().map(|i| i.scheme.as_str()).collect();
        assert_eq!(schemes, vec!["duns", "lei", "vat"]);
        // `" ABC "` serializes smaller than `"ABC"`.
        assert_eq!(out[1].value, " ABC ");
    }

    #[test]
    fn collapsed_identifier_keeps_strictest_sensitivity() {
        let a = Identifier::new("duns", "1").with_sensitivity(Sensitivity::Public);
        let b = Identifier::new("duns", "1").with_sensitivity(Sensitivity::Confidential);
        let out = union_identifiers(on_edges(&[&a, &b]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sensitivity, Some(Sensitivity::Confidential));
    }

    #[test]
    fn collapsed_identifier_spans_validity_hull() {
        let d = |s: &str| CalendarDate::try_from(s).unwrap();
        let a = Identifier::new("duns", "1").with_validity(Some(d("2000-01-01")), Some(Some(d("2005-01-01"))));
        let b = Identifier::new("duns", "1").with_validity(Some(d("2004-01-01")), Some(Some(d("2010-01-01"))));
        let out = union_identifiers(on_edges(&[&b, &a]));
        assert_eq!(out[0].valid_from, Some(d("2000-01-01")));
        assert_eq!(out[0].valid_to, Some(Some(d("2010-01-01"))));

        let open = Identifier::new("duns", "1").with_validity(Some(d("2012-01-01")), Some(None));
        let out = union_identifiers(on_edges(&[&a, &open]));
        assert_eq!(out[0].valid_to, Some(None));

        let unbounded = Identifier::new("duns", "1");
        let out = union_identifiers(on_edges(&[&a, &unbounded]));
        assert!(!out[0].has_temporal_bounds());
    }

    #[test]
    fn partially_stated_field_records_its_sources() {
        let mut r = Reconciler::new();
        r.add_member(&["a"], "facility", &props(&[("city", json!("Lyon"))]), false);
        r.add_member(&["b"], "facility", &props(&[("city", json!("Lyon"))]), false);
        r.add_member(&["c"], "facility", &Properties::new(), false);
        let out = r.finish();
        assert_eq!(out.properties[SOURCES_KEY], json!(["a", "b", "c"]));
        assert_eq!(out.properties[PROVENANCE_KEY], json!({"city": ["a", "b"]}));
    }

    #[test]
    fn nested_merge_credits_kept_value_to_its_source() {
        // a states X, b is silent, c states Y.
        let a = props(&[("name", json!("X"))]);
        let c = props(&[("name", json!("Y"))]);

        let mut flat = Reconciler::new();
        flat.add_member(&["a"], "organization", &a, false);
        flat.add_member(&["b"], "organization", &Properties::new(), false);
        flat.add_member(&["c"], "organization", &c, false);
        let flat = flat.finish();

        let mut left = Reconciler::new();
        left.add_member(&["a"], "organization", &a, false);
        left.add_member(&["b"], "organization", &Properties::new(), false);
        let left = left.finish();
        let mut nested = Reconciler::new();
        nested.add_member(&["a", "b"], "organization", &left.properties, true);
        nested.add_member(&["c"], "organization", &c, false);
        let nested = nested.finish();

        let expected = vec![
            ConflictEntry { source: "a".into(), value: json!("X") },
            ConflictEntry { source: "c".into(), value: json!("Y") },
        ];
        assert_eq!(flat.conflicts[0].values, expected);
        assert_eq!(nested.conflicts, flat.conflicts);
        assert_eq!(nested.properties, flat.properties);
    }

    #[test]
    fn bookkeeping_on_plain_members_is_ignored() {
        let forged = props(&[
            ("name", json!("Acme")),
            (SOURCES_KEY, json!(["x", "y"])),
            (PROVENANCE_KEY, json!({"name": ["x"]})),
            (CONFLICTS_KEY, json!([{"field": "name", "values": [{"source": "x", "value": "Evil"}]}])),
        ]);
        let mut r = Reconciler::new();
        r.add_member(&["a"], "organization", &forged, false);
        let out = r.finish();
        assert!(out.conflicts.is_empty());
        assert_eq!(out.properties.get("name"), Some(&json!("Acme")));
        assert_eq!(out.properties[SOURCES_KEY], json!(["a"]));
        assert!(!out.properties.contains_key(PROVENANCE_KEY));
    }

    #[test]
    fn provenance_outside_member_sources_falls_back_to_all() {
        let mut r = Reconciler::new();
        let merged = props(&[("name", json!("X")), (PROVENANCE_KEY, json!({"name": ["zzz"]}))]);
        r.add_member(&["a", "b"], "organization", &merged, true);
        let out = r.finish();
        assert_eq!(out.properties.get("name"), Some(&json!("X")));
        assert!(!out.properties.contains_key(PROVENANCE_KEY));
    }

    #[test]
    fn person_identifier_stays_confidential_on_a_merged_node() {
        let person = NodeTypeTag::Known(NodeType::Person);
        let org = NodeTypeTag::Known(NodeType::Organization);
        let a = Identifier::new("duns", "1");
        let b = Identifier::new("duns", "1");
        let out = union_identifiers([(&a, Some(&person)), (&b, Some(&org))]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sensitivity, Some(Sensitivity::Confidential));

        let bad = Identifier::new("vat", "DE1");
        let out = union_identifiers([(&bad, Some(&person))]);
        assert_eq!(out[0].sensitivity, Some(Sensitivity::Confidential));
    }

    #[test]
    fn edge_identifiers_keep_declared_sensitivity() {
        let a = Identifier::new("duns", "1");
        let out = union_identifiers(on_edges(&[&a]));
        assert_eq!(out[0].sensitivity, None);
    }
}

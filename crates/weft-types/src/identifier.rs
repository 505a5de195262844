use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{NodeType, NodeTypeTag, Sensitivity};
use crate::newtypes::CalendarDate;
use crate::scheme::Scheme;

/// An external identifier record attached to a node or edge.
///
/// `valid_to` has three states: absent (`None`), explicit `null` meaning the
/// identifier never expires (`Some(None)`), and a concrete end date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub scheme: Scheme,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<CalendarDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub valid_to: Option<Option<CalendarDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<Sensitivity>,
    /// Unknown fields, preserved across merge and redaction.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Identifier {
    pub fn new(scheme: impl Into<Scheme>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
            authority: None,
            valid_from: None,
            valid_to: None,
            sensitivity: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = Some(sensitivity);
        self
    }

    pub fn with_validity(mut self, from: Option<CalendarDate>, to: Option<Option<CalendarDate>>) -> Self {
        self.valid_from = from;
        self.valid_to = to;
        self
    }

    /// Sensitivity used for disclosure decisions.
    ///
    /// An explicit value wins. Identifiers of `person` nodes default to
    /// confidential; everything else falls back to the scheme default.
    pub fn effective_sensitivity(&self, owner: &NodeTypeTag) -> Sensitivity {
        if let Some(s) = self.sensitivity {
            return s;
        }
        if owner.is(NodeType::Person) {
            return Sensitivity::Confidential;
        }
        self.scheme.default_sensitivity()
    }

    /// Returns `true` if the record carries any validity bound.
    pub fn has_temporal_bounds(&self) -> bool {
        self.valid_from.is_some() || self.valid_to.is_some()
    }
}

/// Serde adapter distinguishing an absent field from an explicit `null`.
mod nullable {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::Sensitivity;

/// Identifier scheme: a controlled vocabulary plus reverse-domain extensions.
///
/// Unknown scheme codes are preserved verbatim in [`Scheme::Extension`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scheme {
    /// Legal Entity Identifier (ISO 17442).
    Lei,
    /// Dun & Bradstreet number.
    Duns,
    /// GS1 Global Location Number.
    Gln,
    /// National business registry number; authority names the registry.
    NatReg,
    /// VAT number; authority names the issuing country.
    Vat,
    /// System-local identifier, scoped to its issuing system only.
    Internal,
    /// Salted hash carried by boundary references.
    Opaque,
    Extension(String),
}

impl Scheme {
    pub fn as_str(&self) -> &str {
        match self {
            Scheme::Lei => "lei",
            Scheme::Duns => "duns",
            Scheme::Gln => "gln",
            Scheme::NatReg => "nat-reg",
            Scheme::Vat => "vat",
            Scheme::Internal => "internal",
            Scheme::Opaque => "opaque",
            Scheme::Extension(s) => s,
        }
    }

    /// Schemes whose values are only unique within an issuing authority.
    pub fn requires_authority(&self) -> bool {
        matches!(self, Scheme::NatReg | Scheme::Vat | Scheme::Internal)
    }

    /// Sensitivity assumed when a record does not declare one.
    pub fn default_sensitivity(&self) -> Sensitivity {
        match self {
            Scheme::Vat | Scheme::Internal => Sensitivity::Restricted,
            Scheme::Lei
            | Scheme::Duns
            | Scheme::Gln
            | Scheme::NatReg
            | Scheme::Opaque
            | Scheme::Extension(_) => Sensitivity::Public,
        }
    }

    /// Extension codes are expected in reverse-domain form (`com.example.id`).
    pub fn is_well_formed(&self) -> bool {
        match self {
            Scheme::Extension(s) => s.contains('.') && !s.starts_with('.') && !s.ends_with('.'),
            _ => true,
        }
    }
}

impl From<&str> for Scheme {
    fn from(s: &str) -> Self {
        match s {
            "lei" => Scheme::Lei,
            "duns" => Scheme::Duns,
            "gln" => Scheme::Gln,
            "nat-reg" => Scheme::NatReg,
            "vat" => Scheme::Vat,
            "internal" => Scheme::Internal,
            "opaque" => Scheme::Opaque,
            other => Scheme::Extension(other.to_owned()),
        }
    }
}

impl From<String> for Scheme {
    fn from(s: String) -> Self {
        match Scheme::from(s.as_str()) {
            Scheme::Extension(_) => Scheme::Extension(s),
            known => known,
        }
    }
}

impl From<Scheme> for String {
    fn from(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Extension(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

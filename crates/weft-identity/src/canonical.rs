//! Canonical identifier strings.
//!
//! The canonical form is `scheme:value`, or `scheme:authority:value` for
//! schemes whose values are only unique within an issuing authority. Values
//! are trimmed, authorities are trimmed and ASCII-lowercased, and `%` / `:`
//! inside either component are percent-encoded so the separator stays
//! unambiguous.

use std::fmt;

use serde::{Deserialize, Serialize};
use weft_types::Identifier;

use crate::error::{IdentityError, IdentityResult};

/// The deterministic textual form of an identifier record.
///
/// Computed on demand and never stored on the record itself.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalId(String);

impl CanonicalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalId({})", self.0)
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the canonical string of `id`.
///
/// Fails when the scheme or trimmed value is empty, or when the scheme
/// requires an authority and none is given.
pub fn canonicalize(id: &Identifier) -> IdentityResult<CanonicalId> {
    let scheme = id.scheme.as_str();
    if scheme.is_empty() {
        return Err(IdentityError::malformed(scheme, &id.value, "empty scheme"));
    }

    let value = id.value.trim();
    if value.is_empty() {
        return Err(IdentityError::malformed(scheme, &id.value, "empty value"));
    }

    let mut out = String::with_capacity(scheme.len() + value.len() + 16);
    out.push_str(scheme);
    out.push(':');

    if id.scheme.requires_authority() {
        let authority = id.authority.as_deref().map(str::trim).unwrap_or_default();
        if authority.is_empty() {
            return Err(IdentityError::malformed(
                scheme,
                &id.value,
                format!("scheme {scheme} requires an authority"),
            ));
        }
        push_encoded(&mut out, &authority.to_ascii_lowercase());
        out.push(':');
    }

    push_encoded(&mut out, value);
    Ok(CanonicalId(out))
}

// `%` first, so an already-encoded `%3A` in the input cannot collide with a
// raw `:`.
fn push_encoded(out: &mut String, component: &str) {
    for c in component.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            other => out.push(other),
        }
    }
}

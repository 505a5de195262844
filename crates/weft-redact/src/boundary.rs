//! Opaque values of boundary-reference stand-ins.

use rand::RngCore;
use sha2::{Digest, Sha256};
use weft_identity::{canonicalize, IdentityError};
use weft_types::{FileSalt, Node, Sensitivity};

/// Opaque value computed for one redacted node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryDigest {
    /// 64 lowercase hex characters.
    pub value: String,
    /// `true` if derived from public identifiers, `false` for a random token.
    pub derived: bool,
    /// Public identifiers left out because they have no canonical form.
    pub skipped: Vec<IdentityError>,
}

/// Compute the opaque value for `node` under `salt`.
///
/// The canonical strings of the node's public identifiers are sorted,
/// de-duplicated and joined with `\n`; the value is the hex SHA-256 of that
/// string followed by the raw salt bytes. A node without public identifiers
/// gets a fresh random token, so it cannot be linked to anything.
pub fn boundary_digest(node: &Node, salt: &FileSalt) -> BoundaryDigest {
    let mut canonical = Vec::new();
    let mut skipped = Vec::new();
    for id in &node.identifiers {
        if id.effective_sensitivity(&node.node_type) != Sensitivity::Public {
            continue;
        }
        match canonicalize(id) {
            Ok(c) => canonical.push(c.into_string()),
            Err(e) => skipped.push(e),
        }
    }
    canonical.sort_unstable();
    canonical.dedup();

    if canonical.is_empty() {
        return BoundaryDigest {
            value: random_token(),
            derived: false,
            skipped,
        };
    }

    let mut hasher = Sha256::new();
    hasher.update(canonical.join("\n").as_bytes());
    hasher.update(salt.as_bytes());
    BoundaryDigest {
        value: hex::encode(hasher.finalize()),
        derived: true,
        skipped,
    }
}

fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

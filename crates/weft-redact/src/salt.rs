//! Salt validation and the reuse ledger.
//!
//! A boundary-reference hash is only unlinkable across outputs if every
//! output is keyed with its own salt. The ledger remembers which salts were
//! used, storing a domain-separated BLAKE3 fingerprint of each rather than
//! the salt itself.

use std::collections::HashSet;

use weft_types::FileSalt;

use crate::error::{RedactError, RedactResult, SaltDefect};

/// Domain tag of ledger fingerprints.
const LEDGER_DOMAIN: &str = "weft-salt-v1";

/// Number of distinct byte values in `salt`.
pub fn distinct_bytes(salt: &FileSalt) -> usize {
    let mut seen = [false; 256];
    for &b in salt.as_bytes() {
        seen[b as usize] = true;
    }
    seen.iter().filter(|&&s| s).count()
}

/// Check a candidate output salt against the input document's salt and the
/// entropy floor.
pub fn check_salt(
    salt: Option<FileSalt>,
    input_salt: Option<&FileSalt>,
    min_distinct: usize,
) -> RedactResult<FileSalt> {
    let salt = salt.ok_or(RedactError::SaltMissingOrReused(SaltDefect::Missing))?;
    let distinct = distinct_bytes(&salt);
    if distinct < min_distinct {
        return Err(RedactError::SaltMissingOrReused(SaltDefect::LowEntropy {
            distinct,
            required: min_distinct,
        }));
    }
    if input_salt == Some(&salt) {
        return Err(RedactError::SaltMissingOrReused(SaltDefect::SameAsInput));
    }
    Ok(salt)
}

/// Fingerprints of salts already used for redacted output.
#[derive(Debug, Default)]
pub struct SaltLedger {
    fingerprints: HashSet<[u8; 32]>,
}

impl SaltLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn fingerprint(salt: &FileSalt) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(LEDGER_DOMAIN.as_bytes());
        hasher.update(b":");
        hasher.update(salt.as_bytes());
        *hasher.finalize().as_bytes()
    }

    pub fn contains(&self, salt: &FileSalt) -> bool {
        self.fingerprints.contains(&Self::fingerprint(salt))
    }

    /// Fail if `salt` was registered before.
    pub fn check(&self, salt: &FileSalt) -> RedactResult<()> {
        if self.contains(salt) {
            return Err(RedactError::SaltMissingOrReused(SaltDefect::AlreadyUsed));
        }
        Ok(())
    }

    /// Record `salt` as used. Returns `false` if it already was.
    pub fn register(&mut self, salt: &FileSalt) -> bool {
        self.fingerprints.insert(Self::fingerprint(salt))
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

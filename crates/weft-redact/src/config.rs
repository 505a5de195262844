use serde::{Deserialize, Serialize};
use weft_types::DisclosureScope;

/// Configuration for the [`Redactor`](crate::Redactor).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactConfig {
    /// Disclosure scope written into redacted output and enforced on it.
    pub scope: DisclosureScope,
    /// Salts with fewer distinct byte values are refused.
    pub min_distinct_salt_bytes: usize,
}

impl Default for RedactConfig {
    fn default() -> Self {
        Self {
            scope: DisclosureScope::Partner,
            min_distinct_salt_bytes: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RedactConfig::default();
        assert_eq!(config.scope, DisclosureScope::Partner);
        assert_eq!(config.min_distinct_salt_bytes, 8);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: RedactConfig = toml::from_str(r#"scope = "public""#).unwrap();
        assert_eq!(config.scope, DisclosureScope::Public);
        assert_eq!(config.min_distinct_salt_bytes, 8);
    }
}

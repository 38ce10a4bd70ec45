//! OAuth scope handling.
//!
//! [`AuthScopes`] is the set of access scopes the app requests on the
//! permission page.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A deduplicated set of OAuth scopes.
///
/// Scopes are kept sorted so the `scope` parameter of a permission URL is
/// stable for a given configuration. `Display` and serde both use the
/// comma-separated form Shopify expects.
///
/// # Example
///
/// ```rust
/// use shopify_auth::AuthScopes;
///
/// let scopes: AuthScopes = "write_orders, read_products,read_products".parse().unwrap();
/// assert_eq!(scopes.len(), 2);
/// assert_eq!(scopes.to_string(), "read_products,write_orders");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: BTreeSet<String>,
}

impl AuthScopes {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the scope set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns the number of distinct scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if `scope` is part of the set.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Returns an iterator over the scopes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = BTreeSet::new();

        for scope in s.split(',') {
            let scope = scope.trim();
            if scope.is_empty() {
                continue;
            }

            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }

            scopes.insert(scope.to_string());
        }

        Ok(Self { scopes })
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

impl Serialize for AuthScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AuthScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_skips_empty_entries() {
        let scopes: AuthScopes = " read_products, ,write_orders,".parse().unwrap();
        assert_eq!(scopes.len(), 2);
        assert!(scopes.contains("read_products"));
        assert!(scopes.contains("write_orders"));
    }

    #[test]
    fn test_parse_rejects_invalid_characters() {
        let result: Result<AuthScopes, _> = "read products".parse();
        assert!(matches!(result, Err(ConfigError::InvalidScopes { .. })));

        let result: Result<AuthScopes, _> = "read-products".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_display_is_sorted_and_comma_joined() {
        let scopes: AuthScopes = "write_orders,read_customers,read_products".parse().unwrap();
        assert_eq!(
            scopes.to_string(),
            "read_customers,read_products,write_orders"
        );
    }

    #[test]
    fn test_empty_scopes_display_as_empty_string() {
        let scopes = AuthScopes::new();
        assert!(scopes.is_empty());
        assert_eq!(scopes.to_string(), "");
    }

    #[test]
    fn test_serde_uses_comma_separated_string() {
        let scopes: AuthScopes = "read_products,write_orders".parse().unwrap();
        let json = serde_json::to_string(&scopes).unwrap();
        assert_eq!(json, r#""read_products,write_orders""#);

        let restored: AuthScopes = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, scopes);
    }
}

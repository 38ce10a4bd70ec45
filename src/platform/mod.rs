//! The remote commerce platform, as seen by the handshake.
//!
//! The handshake needs exactly two things from Shopify: a permission URL
//! to send the merchant to, and an access token in exchange for the code
//! Shopify returns. [`RemotePlatform`] is that seam; [`ShopifyClient`] is
//! the production implementation.
//!
//! # Example
//!
//! ```rust
//! use shopify_auth::platform::{RemotePlatform, ShopifyClient};
//! use shopify_auth::{AuthConfig, ApiKey, ApiSecretKey, HostUrl, SigningSecret};
//!
//! let config = AuthConfig::builder()
//!     .api_key(ApiKey::new("api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("api-secret").unwrap())
//!     .signing_secret(SigningSecret::new("signing").unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let client = ShopifyClient::new(&config);
//! let url = client
//!     .create_permission_url(
//!         "my-store",
//!         &"read_products".parse().unwrap(),
//!         "https://myapp.example.com/login/finalize/",
//!     )
//!     .unwrap();
//! assert!(url.starts_with("https://my-store.myshopify.com/admin/oauth/authorize?"));
//! ```

mod client;
mod error;
pub mod hmac;

pub use client::ShopifyClient;
pub use error::PlatformError;

use crate::auth::AuthScopes;
use crate::config::ShopDomain;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// The query parameters Shopify appended to the finalize redirect.
///
/// Kept as an ordered map: the shape is owned by Shopify, and the whole
/// set is signed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
    params: BTreeMap<String, String>,
}

impl CallbackParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Returns the parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl FromIterator<(String, String)> for CallbackParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

/// Operations the handshake needs from the remote platform.
///
/// Implementations must be shareable between concurrent requests.
#[async_trait]
pub trait RemotePlatform: Send + Sync {
    /// Builds the permission URL for `shop`, requesting `scope` and
    /// returning to `redirect_uri`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidShopDomain`] if `shop` is malformed.
    fn create_permission_url(
        &self,
        shop: &str,
        scope: &AuthScopes,
        redirect_uri: &str,
    ) -> Result<String, PlatformError>;

    /// Exchanges the code carried by `params` for an access token.
    ///
    /// # Errors
    ///
    /// Any failure: tampered or stale parameters, parameters signed for
    /// another shop, a missing code, a network failure, or a rejection by
    /// the token endpoint.
    async fn request_token(
        &self,
        shop: &ShopDomain,
        params: &CallbackParams,
    ) -> Result<String, PlatformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_params_collects_and_orders() {
        let params: CallbackParams = vec![
            ("shop".to_string(), "a.myshopify.com".to_string()),
            ("code".to_string(), "xyz".to_string()),
        ]
        .into_iter()
        .collect();

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["code", "shop"]);
        assert_eq!(params.get("code"), Some("xyz"));
        assert_eq!(params.get("hmac"), None);
    }

    #[test]
    fn test_callback_params_insert_replaces() {
        let mut params = CallbackParams::new();
        assert!(params.is_empty());
        params.insert("code", "one");
        params.insert("code", "two");
        assert_eq!(params.get("code"), Some("two"));
    }
}

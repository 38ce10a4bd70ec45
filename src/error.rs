//! Configuration error types.
//!
//! All configuration constructors return `Result<T, ConfigError>` so a
//! misconfigured application fails at startup rather than mid-handshake.
//!
//! # Example
//!
//! ```rust
//! use shopify_auth::{SigningSecret, ConfigError};
//!
//! let result = SigningSecret::new("");
//! assert!(matches!(result, Err(ConfigError::EmptySigningSecret)));
//! ```

use thiserror::Error;

/// Errors that can occur while building an [`AuthConfig`](crate::AuthConfig)
/// or one of its validated newtypes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Shopify API key.")]
    EmptyApiKey,

    /// API secret key cannot be empty.
    #[error("API secret key cannot be empty. Please provide a valid Shopify API secret key.")]
    EmptyApiSecretKey,

    /// Signing secret cannot be empty.
    #[error("Signing secret cannot be empty. Please provide the application's secret key.")]
    EmptySigningSecret,

    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name' or 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// Scopes are invalid.
    #[error("Invalid scopes: {reason}")]
    InvalidScopes {
        /// The reason the scopes are invalid.
        reason: String,
    },

    /// A path setting is not an absolute local path.
    #[error("Invalid path '{path}' for '{field}'. Paths must start with a single '/'.")]
    InvalidPath {
        /// The setting the path was provided for.
        field: &'static str,
        /// The rejected path.
        path: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Host URL is invalid.
    #[error("Invalid host URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://myapp.example.com').")]
    InvalidHostUrl {
        /// The invalid URL that was provided.
        url: String,
    },
}

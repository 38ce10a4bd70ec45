//! # Shopify OAuth handshake
//!
//! Server-side login for Shopify apps: the merchant names a shop, is sent
//! to Shopify's permission page, and comes back with a code this crate
//! exchanges for an access token before logging the shop user in.
//!
//! ## Overview
//!
//! - Type-safe configuration via [`AuthConfig`] and [`AuthConfigBuilder`]
//! - Validated newtypes for credentials, shop domains and the app's host
//! - Signed, short-lived `state` nonces bound to a shop ([`auth::NonceCodec`])
//! - Callback HMAC verification and code exchange ([`platform::ShopifyClient`])
//! - A framework-neutral request handler for the three handshake endpoints
//!   ([`Handshake`])
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_auth::{ApiKey, ApiSecretKey, AuthConfig, HostUrl, SigningSecret};
//!
//! let config = AuthConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .signing_secret(SigningSecret::new("a-long-random-secret").unwrap())
//!     .host(HostUrl::new("https://your-app.example.com").unwrap())
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.finalize_url(), "https://your-app.example.com/login/finalize/");
//! ```
//!
//! ## Handling requests
//!
//! ```rust,ignore
//! use shopify_auth::{Handshake, HandshakeRequest, ShopUserBackend};
//! use std::sync::Arc;
//!
//! let handshake = Handshake::with_shopify(config, Arc::new(ShopUserBackend::new()), sessions);
//!
//! // GET/POST /login/
//! let response = handshake.login(&request).await?;
//!
//! // GET /login/finalize/
//! let response = handshake.finalize(&request).await;
//! ```
//!
//! ## Logging
//!
//! Handshake transitions are reported through [`tracing`]. The crate never
//! installs a subscriber and never logs secrets or access tokens.

pub mod auth;
pub mod config;
pub mod error;
pub mod handshake;
pub mod platform;

// Re-export public types at crate root for convenience
pub use auth::{AuthScopes, IdentityBackend, LoginSession, Principal, ShopUserBackend};
pub use config::{
    ApiKey, ApiSecretKey, AuthConfig, AuthConfigBuilder, HostUrl, ShopDomain, SigningSecret,
};
pub use error::ConfigError;

// Re-export handshake types
pub use handshake::{
    is_anonymous, Handshake, HandshakeError, HandshakeRequest, HandshakeResponse,
};

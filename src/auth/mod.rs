//! The building blocks of the OAuth handshake.
//!
//! # Overview
//!
//! - [`NonceCodec`]: signs and verifies the short-lived `state` nonce
//! - [`build_authorization_url`]: permission URL with the nonce embedded
//! - [`validate_callback`]: checks a returning nonce against the claimed shop
//! - [`exchange_token`]: trades the callback's code for an access token
//! - [`establish_session`]: logs the resolved principal in
//!
//! [`crate::handshake::Handshake`] strings these together into the
//! request-facing flow.
//!
//! # Example
//!
//! ```rust
//! use shopify_auth::auth::{validate_callback, NonceCodec};
//! use shopify_auth::SigningSecret;
//!
//! let codec = NonceCodec::new(&SigningSecret::new("signing").unwrap());
//! let state = codec.encode("test-shop.myshopify.com", NonceCodec::ttl());
//!
//! let nonce = validate_callback(&codec, "test-shop.myshopify.com", &state).unwrap();
//! assert_eq!(nonce.shop, "test-shop.myshopify.com");
//! ```

mod authorize;
mod callback;
mod error;
mod exchange;
mod nonce;
mod scopes;
mod session;

pub use authorize::{build_authorization_url, AuthorizationUrl};
pub use callback::validate_callback;
pub use error::{ExchangeFailure, StateError};
pub use exchange::{exchange_token, ExchangedToken, PendingSession};
pub use nonce::{NonceCodec, StateNonce};
pub use scopes::AuthScopes;
pub use session::{
    establish_session, IdentityBackend, LoginSession, Principal, ShopUser, ShopUserBackend,
};

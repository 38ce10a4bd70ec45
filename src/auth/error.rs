//! Error types for the handshake steps.
//!
//! - [`StateError`]: the state nonce failed validation at the finalize step;
//!   surfaced to the browser as a 401 with [`StateError::message`]
//! - [`ExchangeFailure`]: the code-for-token exchange failed for any reason;
//!   recovered by restarting the handshake

use crate::platform::PlatformError;
use thiserror::Error;

/// Reasons a returning callback's state nonce is rejected.
///
/// # Example
///
/// ```rust
/// use shopify_auth::auth::StateError;
///
/// assert_eq!(StateError::ExpiredToken.message(), "Token expired");
/// assert_eq!(StateError::ShopMismatch.message(), "Shop invalid");
/// ```
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// The nonce verified but its expiry has passed.
    #[error("state token expired")]
    ExpiredToken,

    /// The nonce is missing, malformed, or signed with another key.
    #[error("state token invalid")]
    InvalidToken,

    /// The nonce was issued for a different shop than the callback claims.
    #[error("state token was issued for a different shop")]
    ShopMismatch,
}

impl StateError {
    /// Returns the body of the 401 response for this failure.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ExpiredToken => "Token expired",
            Self::InvalidToken => "Token invalid",
            Self::ShopMismatch => "Shop invalid",
        }
    }
}

/// The code-for-token exchange failed.
///
/// The orchestrator does not branch on the cause; it is kept so the
/// failure can be logged.
#[derive(Debug, Error)]
#[error("token exchange failed: {source}")]
pub struct ExchangeFailure {
    /// What the platform client reported.
    #[from]
    pub source: PlatformError,
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateError>();
    assert_send_sync::<ExchangeFailure>();
};

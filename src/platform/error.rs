//! Errors reported by the remote platform client.

use thiserror::Error;

/// Errors that can occur while talking to Shopify.
///
/// # Example
///
/// ```rust
/// use shopify_auth::platform::PlatformError;
///
/// let error = PlatformError::TokenExchangeFailed {
///     status: 400,
///     message: "invalid_request".to_string(),
/// };
/// assert!(error.to_string().contains("400"));
/// ```
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The shop is not a valid `*.myshopify.com` domain.
    #[error("Invalid shop domain '{domain}'")]
    InvalidShopDomain {
        /// The rejected input.
        domain: String,
    },

    /// A required callback parameter is absent.
    #[error("Missing callback parameter '{name}'")]
    MissingParameter {
        /// The parameter name.
        name: &'static str,
    },

    /// The callback's `hmac` does not match its parameters.
    #[error("HMAC signature validation failed")]
    InvalidHmac,

    /// The signed `shop` of the callback is not the shop being exchanged for.
    #[error("Callback was signed for shop '{signed}', not '{expected}'")]
    ShopMismatch {
        /// The shop the token is requested for.
        expected: String,
        /// The callback's signed `shop`, empty if absent.
        signed: String,
    },

    /// The callback's `timestamp` is missing, unparseable, or older than a day.
    #[error("Callback timestamp '{timestamp}' is too old")]
    StaleCallback {
        /// The timestamp as received.
        timestamp: String,
    },

    /// The access token request failed.
    ///
    /// `status` is 0 when no HTTP response was received.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// The HTTP status code returned.
        status: u16,
        /// The error message from the response.
        message: String,
    },
}

// Verify PlatformError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PlatformError>();
};

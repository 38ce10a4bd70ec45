//! Validation of the state nonce on the finalize redirect.
//!
//! A nonce is only accepted for the shop it was issued for. Without the
//! shop check a nonce obtained for shop A could be replayed on a callback
//! claiming shop B.

use crate::auth::error::StateError;
use crate::auth::nonce::{NonceCodec, StateNonce};

/// Validates the `state` of a returning callback against the shop it claims.
///
/// The comparison is exact and case-sensitive, on the shop as supplied.
///
/// # Errors
///
/// - [`StateError::InvalidToken`] or [`StateError::ExpiredToken`] from
///   decoding the nonce
/// - [`StateError::ShopMismatch`] if the nonce names another shop
///
/// # Example
///
/// ```rust
/// use shopify_auth::auth::{validate_callback, NonceCodec, StateError};
/// use shopify_auth::SigningSecret;
///
/// let codec = NonceCodec::new(&SigningSecret::new("signing").unwrap());
/// let state = codec.encode("shop-a.myshopify.com", NonceCodec::ttl());
///
/// assert!(validate_callback(&codec, "shop-a.myshopify.com", &state).is_ok());
/// assert_eq!(
///     validate_callback(&codec, "shop-b.myshopify.com", &state),
///     Err(StateError::ShopMismatch)
/// );
/// ```
pub fn validate_callback(
    codec: &NonceCodec,
    claimed_shop: &str,
    state: &str,
) -> Result<StateNonce, StateError> {
    let nonce = codec.decode(state)?;

    if nonce.shop != claimed_shop {
        return Err(StateError::ShopMismatch);
    }

    Ok(nonce)
}

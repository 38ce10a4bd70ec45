//! Signed, expiring state nonces.
//!
//! The state nonce is the only thing carrying handshake state across the
//! round trip to Shopify. It binds a shop to the authorization request and
//! travels inside the permission URL's `state` parameter, so nothing is
//! kept server-side.
//!
//! Nonces are HS256 JWTs with two claims, `shop` and `exp`. They provide
//! integrity and expiry, not confidentiality.
//!
//! # Example
//!
//! ```rust
//! use shopify_auth::auth::NonceCodec;
//! use shopify_auth::SigningSecret;
//!
//! let codec = NonceCodec::new(&SigningSecret::new("app-secret").unwrap());
//! let token = codec.encode("my-store.myshopify.com", NonceCodec::ttl());
//!
//! let nonce = codec.decode(&token).unwrap();
//! assert_eq!(nonce.shop, "my-store.myshopify.com");
//! ```

use crate::auth::error::StateError;
use crate::config::SigningSecret;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// The decoded contents of a state nonce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateNonce {
    /// The shop the nonce was issued for, exactly as supplied.
    pub shop: String,
    /// When the nonce stops being accepted.
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct NonceClaims {
    shop: String,
    exp: i64,
}

/// Encodes and decodes state nonces with the process-wide signing secret.
///
/// The codec holds only derived key material and is safe to share between
/// concurrent requests.
#[derive(Clone)]
pub struct NonceCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl NonceCodec {
    /// Lifetime in seconds of a nonce issued by the authorization step.
    pub const TTL_SECONDS: i64 = 60;

    /// Lifetime of a nonce issued by the authorization step.
    #[must_use]
    pub fn ttl() -> Duration {
        Duration::seconds(Self::TTL_SECONDS)
    }

    /// Creates a codec signing with `secret`.
    #[must_use]
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a nonce for `shop` expiring `ttl` from now.
    #[must_use]
    pub fn encode(&self, shop: &str, ttl: Duration) -> String {
        self.encode_at(shop, ttl, Utc::now())
    }

    /// Issues a nonce for `shop` expiring `ttl` after `now`.
    ///
    /// An expiry beyond the representable range is clamped to it.
    #[must_use]
    #[allow(clippy::missing_panics_doc)] // HS256 over a String and an i64 never fails
    pub fn encode_at(&self, shop: &str, ttl: Duration, now: DateTime<Utc>) -> String {
        let expires_at = now.checked_add_signed(ttl).unwrap_or(if ttl < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
        let claims = NonceClaims {
            shop: shop.to_string(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .expect("HS256 can sign string and integer claims with any key")
    }

    /// Verifies `token` and checks its expiry against the current time.
    ///
    /// # Errors
    ///
    /// - [`StateError::InvalidToken`] if the token is malformed, uses another
    ///   algorithm, or was signed with another key
    /// - [`StateError::ExpiredToken`] if the expiry has been reached
    pub fn decode(&self, token: &str) -> Result<StateNonce, StateError> {
        self.decode_at(token, Utc::now())
    }

    /// Verifies `token` and checks its expiry against `now`.
    ///
    /// A nonce is expired from the second its `exp` claim names onwards.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<StateNonce, StateError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against `now`, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<NonceClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| StateError::InvalidToken)?
            .claims;

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(StateError::InvalidToken)?;

        if now.timestamp() >= claims.exp {
            return Err(StateError::ExpiredToken);
        }

        Ok(StateNonce {
            shop: claims.shop,
            expires_at,
        })
    }
}

impl std::fmt::Debug for NonceCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NonceCodec(*****)")
    }
}

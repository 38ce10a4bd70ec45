//! HMAC validation for Shopify OAuth callbacks.
//!
//! Shopify signs every redirect back to the app. The signature covers all
//! query parameters except `hmac` itself, so a tampered `code`, `shop` or
//! `state` is detected independently of the app's own state nonce.
//!
//! # Signable form
//!
//! Each parameter becomes `key=value`, with `%` and `=` escaped in keys,
//! `%` escaped in values, and `&` escaped in the pair. The pairs are sorted
//! and joined with `&`.
//!
//! ```rust
//! use shopify_auth::platform::hmac::compute_signature;
//!
//! let signature = compute_signature("code=abc&shop=example.myshopify.com", "secret");
//! assert_eq!(signature.len(), 64);
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::platform::CallbackParams;

type HmacSha256 = Hmac<Sha256>;

/// Computes a lowercase hex HMAC-SHA256 signature of `message`.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Compares two strings in constant time.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Builds the string Shopify signs for a set of callback parameters.
///
/// `hmac` itself and the legacy `signature` are left out.
#[must_use]
pub fn signable_string(params: &CallbackParams) -> String {
    let mut pairs: Vec<String> = params
        .iter()
        .filter(|(key, _)| !matches!(*key, "hmac" | "signature"))
        .map(|(key, value)| {
            let key = key.replace('%', "%25").replace('=', "%3D");
            let value = value.replace('%', "%25");
            format!("{key}={value}").replace('&', "%26")
        })
        .collect();
    pairs.sort();
    pairs.join("&")
}

/// Returns `true` if the callback's `hmac` matches one of `secrets`.
///
/// Secrets are tried in order, which lets a rotated-out key keep
/// validating callbacks that were already in flight.
#[must_use]
pub fn validate_hmac<'a>(params: &CallbackParams, secrets: impl IntoIterator<Item = &'a str>) -> bool {
    let Some(received) = params.get("hmac") else {
        return false;
    };
    let signable = signable_string(params);

    secrets
        .into_iter()
        .any(|secret| constant_time_compare(&compute_signature(&signable, secret), received))
}

// Internal hex encoding since we don't want to add another dependency
mod hex {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        let mut result = String::with_capacity(bytes.len() * 2);
        for &byte in bytes {
            result.push(HEX_CHARS[(byte >> 4) as usize] as char);
            result.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
        }
        result
    }
}

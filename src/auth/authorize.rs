//! Permission URL generation.
//!
//! [`build_authorization_url`] asks the platform for the permission URL of
//! a shop and appends a freshly signed state nonce as the `state`
//! parameter.

use crate::auth::nonce::NonceCodec;
use crate::auth::AuthScopes;
use crate::platform::{PlatformError, RemotePlatform};

/// Result of building a permission URL.
#[derive(Clone, Debug)]
pub struct AuthorizationUrl {
    /// Where to send the merchant.
    pub url: String,

    /// The signed nonce embedded in `url` as `state`.
    pub state: String,
}

/// Builds the permission URL for `shop` with an embedded state nonce.
///
/// The nonce binds `shop` exactly as supplied and expires after
/// [`NonceCodec::ttl`].
///
/// # Errors
///
/// Errors from [`RemotePlatform::create_permission_url`] (a malformed shop
/// domain) are returned unchanged.
///
/// # Example
///
/// ```rust
/// use shopify_auth::auth::{build_authorization_url, NonceCodec};
/// use shopify_auth::platform::ShopifyClient;
/// use shopify_auth::{AuthConfig, ApiKey, ApiSecretKey, HostUrl, SigningSecret};
///
/// let config = AuthConfig::builder()
///     .api_key(ApiKey::new("api-key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .signing_secret(SigningSecret::new("signing").unwrap())
///     .host(HostUrl::new("https://myapp.example.com").unwrap())
///     .build()
///     .unwrap();
/// let client = ShopifyClient::new(&config);
/// let codec = NonceCodec::new(config.signing_secret());
///
/// let result = build_authorization_url(
///     &client,
///     &codec,
///     "test-shop.myshopify.com",
///     config.scopes(),
///     &config.finalize_url(),
/// )
/// .unwrap();
///
/// assert!(result.url.ends_with(&format!("&state={}", result.state)));
/// assert_eq!(codec.decode(&result.state).unwrap().shop, "test-shop.myshopify.com");
/// ```
pub fn build_authorization_url(
    platform: &dyn RemotePlatform,
    codec: &NonceCodec,
    shop: &str,
    scope: &AuthScopes,
    redirect_uri: &str,
) -> Result<AuthorizationUrl, PlatformError> {
    let permission_url = platform.create_permission_url(shop.trim(), scope, redirect_uri)?;

    let state = codec.encode(shop, NonceCodec::ttl());
    let separator = if permission_url.contains('?') { '&' } else { '?' };
    let url = format!(
        "{permission_url}{separator}state={}",
        urlencoding::encode(&state)
    );

    Ok(AuthorizationUrl { url, state })
}

// Verify AuthorizationUrl is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthorizationUrl>();
};

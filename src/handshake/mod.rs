//! The request-facing OAuth handshake.
//!
//! A [`Handshake`] drives one merchant through
//! `Entry → AwaitingShop → AuthorizationRedirect → Finalize → Done`:
//!
//! 1. [`Handshake::login`] prompts for a shop, or moves straight on to the
//!    authorization redirect when one was supplied.
//! 2. The authorization redirect sends the browser to Shopify's permission
//!    page with a signed `state` nonce.
//! 3. [`Handshake::finalize`] handles Shopify's redirect back: it checks
//!    the nonce, exchanges the code for an access token, logs the shop user
//!    in and redirects to the return address.
//!
//! Every step is for anonymous callers only. A caller that is already
//! logged in is redirected to the default post-login path instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_auth::handshake::{Handshake, HandshakeRequest};
//! use shopify_auth::ShopUserBackend;
//! use std::sync::Arc;
//!
//! let handshake = Handshake::with_shopify(config, Arc::new(ShopUserBackend::new()), sessions);
//!
//! let request = HandshakeRequest::from_query(query_pairs);
//! let response = handshake.finalize(&request).await;
//! respond(response.status_code(), response.location(), response.body());
//! ```

mod error;
mod request;
mod response;

pub use error::HandshakeError;
pub use request::HandshakeRequest;
pub use response::HandshakeResponse;

use crate::auth::{
    build_authorization_url, establish_session, exchange_token, validate_callback,
    IdentityBackend, LoginSession, NonceCodec,
};
use crate::config::{AuthConfig, HostUrl, ShopDomain};
use crate::platform::{PlatformError, RemotePlatform, ShopifyClient};
use std::fmt;
use std::sync::Arc;

/// Access token used in development mode in place of a real exchange.
pub const DEV_MODE_TOKEN: &str = "00000000000000000000000000000000";

/// Query parameter carrying the address to return to after login.
pub const REDIRECT_FIELD_NAME: &str = "next";

/// The states of a handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeStep {
    /// A request arrived at the login endpoint.
    Entry,
    /// The shop prompt was rendered; waiting for the merchant.
    AwaitingShop,
    /// Sending the merchant to the permission page.
    AuthorizationRedirect,
    /// Shopify redirected back with a code.
    Finalize,
    /// Logged in (or not) and sent to the return address.
    Done,
}

impl HandshakeStep {
    /// A short name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::AwaitingShop => "awaiting_shop",
            Self::AuthorizationRedirect => "authorization_redirect",
            Self::Finalize => "finalize",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `true` if `request` may enter the handshake.
#[must_use]
pub const fn is_anonymous(request: &HandshakeRequest) -> bool {
    !request.is_authenticated()
}

/// The OAuth handshake for one app.
///
/// Holds no per-request state; share one instance across requests.
pub struct Handshake {
    config: AuthConfig,
    codec: NonceCodec,
    platform: Arc<dyn RemotePlatform>,
    identity: Arc<dyn IdentityBackend>,
    login: Arc<dyn LoginSession>,
}

impl Handshake {
    /// Creates a handshake from its configuration and collaborators.
    #[must_use]
    pub fn new(
        config: AuthConfig,
        platform: Arc<dyn RemotePlatform>,
        identity: Arc<dyn IdentityBackend>,
        login: Arc<dyn LoginSession>,
    ) -> Self {
        let codec = NonceCodec::new(config.signing_secret());
        Self {
            config,
            codec,
            platform,
            identity,
            login,
        }
    }

    /// Creates a handshake talking to Shopify through a [`ShopifyClient`].
    #[must_use]
    pub fn with_shopify(
        config: AuthConfig,
        identity: Arc<dyn IdentityBackend>,
        login: Arc<dyn LoginSession>,
    ) -> Self {
        let platform = Arc::new(ShopifyClient::new(&config));
        Self::new(config, platform, identity, login)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Returns the codec signing this handshake's nonces.
    #[must_use]
    pub const fn codec(&self) -> &NonceCodec {
        &self.codec
    }

    /// The login endpoint: prompts for a shop or starts authorization.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::PermissionUrl`] if the supplied shop is not
    /// a valid shop domain.
    pub async fn login(
        &self,
        request: &HandshakeRequest,
    ) -> Result<HandshakeResponse, HandshakeError> {
        if let Some(response) = self.guard(request, HandshakeStep::Entry) {
            return Ok(response);
        }

        if shop_param(request).is_some() {
            return self.authorize(request).await;
        }

        tracing::debug!(step = %HandshakeStep::AwaitingShop, "Prompting for shop");
        Ok(HandshakeResponse::ShopPrompt {
            app_name: self.config.app_name().to_string(),
            action: self.config.login_path().to_string(),
        })
    }

    /// Starts authorization for the shop in `request`.
    ///
    /// Without a shop, redirects to the return address.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::PermissionUrl`] if the supplied shop is not
    /// a valid shop domain.
    pub async fn authenticate(
        &self,
        request: &HandshakeRequest,
    ) -> Result<HandshakeResponse, HandshakeError> {
        if let Some(response) = self.guard(request, HandshakeStep::AuthorizationRedirect) {
            return Ok(response);
        }
        self.authorize(request).await
    }

    /// The finalize endpoint Shopify redirects back to.
    ///
    /// Never fails: validation failures become a 401 response and exchange
    /// failures restart the handshake at the login endpoint.
    pub async fn finalize(&self, request: &HandshakeRequest) -> HandshakeResponse {
        if let Some(response) = self.guard(request, HandshakeStep::Finalize) {
            return response;
        }

        let shop = request.param("shop").unwrap_or_default();
        let state = request.param("state").unwrap_or_default();
        let preset_token = if self.config.dev_mode() {
            request.param("token").map(str::to_string)
        } else {
            None
        };

        self.complete(request, shop, state, preset_token).await
    }

    /// Where to send the browser once the handshake is done.
    ///
    /// The `next` query parameter when it points into this app, otherwise
    /// the default post-login path.
    ///
    /// The redirect URI sent to Shopify is always the bare finalize URL, so
    /// a `next` given to [`login`](Self::login) is not carried through the
    /// round trip. On finalize only a `next` already present in Shopify's
    /// redirect query is honored.
    #[must_use]
    pub fn return_address(&self, request: &HandshakeRequest) -> String {
        request
            .query(REDIRECT_FIELD_NAME)
            .filter(|next| is_safe_return_address(next, self.config.host()))
            .unwrap_or_else(|| self.config.login_redirect_path())
            .to_string()
    }

    fn guard(&self, request: &HandshakeRequest, step: HandshakeStep) -> Option<HandshakeResponse> {
        if is_anonymous(request) {
            tracing::debug!(step = %step, shop = ?request.param("shop"), "Handshake step");
            return None;
        }

        tracing::debug!(step = %step, "Already logged in; leaving the handshake");
        Some(HandshakeResponse::Redirect {
            location: self.config.login_redirect_path().to_string(),
        })
    }

    async fn authorize(
        &self,
        request: &HandshakeRequest,
    ) -> Result<HandshakeResponse, HandshakeError> {
        let Some(shop) = shop_param(request) else {
            return Ok(HandshakeResponse::Redirect {
                location: self.return_address(request),
            });
        };

        // Shopify calls back with the canonical domain, so bind that
        let domain = ShopDomain::new(shop).map_err(|_| PlatformError::InvalidShopDomain {
            domain: shop.to_string(),
        })?;
        let shop: &str = domain.as_ref();

        if self.config.dev_mode() {
            tracing::debug!(shop, "Development mode; skipping Shopify");
            let state = self.codec.encode(shop, NonceCodec::ttl());
            return Ok(self
                .complete(request, shop, &state, Some(DEV_MODE_TOKEN.to_string()))
                .await);
        }

        let authorization = build_authorization_url(
            &*self.platform,
            &self.codec,
            shop,
            self.config.scopes(),
            &self.config.finalize_url(),
        )?;

        tracing::debug!(
            step = %HandshakeStep::AuthorizationRedirect,
            shop,
            embedded = self.config.is_embedded(),
            "Redirecting to permission page"
        );

        let location = authorization.url;
        Ok(if self.config.is_embedded() {
            HandshakeResponse::ScriptRedirect { location }
        } else {
            HandshakeResponse::Redirect { location }
        })
    }

    async fn complete(
        &self,
        request: &HandshakeRequest,
        shop: &str,
        state: &str,
        preset_token: Option<String>,
    ) -> HandshakeResponse {
        if let Err(error) = validate_callback(&self.codec, shop, state) {
            tracing::warn!(shop, error = %error, "Rejecting callback");
            return HandshakeResponse::Unauthorized {
                message: error.message(),
            };
        }

        let params = request.callback_params();
        let exchanged = match exchange_token(&*self.platform, shop, &params, preset_token).await {
            Ok(exchanged) => exchanged,
            Err(failure) => {
                tracing::warn!(
                    shop,
                    error = %failure.source,
                    "Token exchange failed; restarting handshake"
                );
                return HandshakeResponse::Redirect {
                    location: self.config.login_path().to_string(),
                };
            }
        };

        establish_session(
            &*self.identity,
            &*self.login,
            request,
            &exchanged.shop_domain,
            &exchanged.access_token,
        )
        .await;

        let location = self.return_address(request);
        tracing::info!(
            step = %HandshakeStep::Done,
            shop = %exchanged.shop_domain,
            location = %location,
            "Handshake complete"
        );
        HandshakeResponse::Redirect { location }
    }
}

impl fmt::Debug for Handshake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handshake")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

// Verify Handshake is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Handshake>();
};

fn shop_param(request: &HandshakeRequest) -> Option<&str> {
    request.param("shop").filter(|shop| !shop.is_empty())
}

fn is_safe_return_address(next: &str, host: &HostUrl) -> bool {
    if next.is_empty() || next.contains('\\') || next.chars().any(char::is_control) {
        return false;
    }
    if next.starts_with('/') {
        return !next.starts_with("//");
    }
    HostUrl::new(next).is_ok_and(|url| url.origin() == host.origin())
}

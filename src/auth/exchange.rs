//! Code-for-token exchange.
//!
//! A [`PendingSession`] is the platform-side session for one shop during a
//! single finalize call. It starts without a token and carries one once the
//! exchange succeeds. A session created with a token already set (the
//! development bypass) returns it without contacting the platform.

use crate::auth::error::ExchangeFailure;
use crate::config::ShopDomain;
use crate::platform::{CallbackParams, PlatformError, RemotePlatform};

/// The result of a successful exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangedToken {
    /// The canonical domain of the shop.
    pub shop_domain: ShopDomain,
    /// The access token granted by the platform.
    pub access_token: String,
}

/// A shop's platform session while its token is being requested.
#[derive(Clone, Debug)]
pub struct PendingSession {
    shop: ShopDomain,
    access_token: Option<String>,
}

impl PendingSession {
    /// Opens a session for `shop`, optionally with a token already known.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidShopDomain`] if `shop` is malformed.
    pub fn new(shop: &str, access_token: Option<String>) -> Result<Self, PlatformError> {
        let shop = ShopDomain::new(shop).map_err(|_| PlatformError::InvalidShopDomain {
            domain: shop.to_string(),
        })?;
        Ok(Self { shop, access_token })
    }

    /// Returns the shop this session belongs to.
    #[must_use]
    pub const fn shop(&self) -> &ShopDomain {
        &self.shop
    }

    /// Returns the access token, once there is one.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Obtains the access token, asking the platform only if none is held.
    ///
    /// # Errors
    ///
    /// Whatever [`RemotePlatform::request_token`] reports.
    pub async fn request_token(
        &mut self,
        platform: &dyn RemotePlatform,
        params: &CallbackParams,
    ) -> Result<&str, PlatformError> {
        if self.access_token.is_none() {
            let token = platform.request_token(&self.shop, params).await?;
            self.access_token = Some(token);
        }
        Ok(self.access_token.as_deref().unwrap_or_default())
    }

    fn into_exchanged(self) -> Option<ExchangedToken> {
        Some(ExchangedToken {
            shop_domain: self.shop,
            access_token: self.access_token?,
        })
    }
}

/// Exchanges the callback's code for an access token for `shop`.
///
/// `preset_token` short-circuits the exchange; it is `None` for every real
/// handshake.
///
/// # Errors
///
/// Every failure, from a malformed shop through a rejected code to a
/// network error, is returned as an [`ExchangeFailure`].
///
/// # Example
///
/// ```rust,ignore
/// use shopify_auth::auth::exchange_token;
///
/// match exchange_token(&client, &shop, &callback_params, None).await {
///     Ok(exchanged) => login(exchanged.shop_domain, exchanged.access_token),
///     Err(failure) => restart_handshake(failure),
/// }
/// ```
pub async fn exchange_token(
    platform: &dyn RemotePlatform,
    shop: &str,
    params: &CallbackParams,
    preset_token: Option<String>,
) -> Result<ExchangedToken, ExchangeFailure> {
    let mut session = PendingSession::new(shop, preset_token)?;
    session.request_token(platform, params).await?;

    session.into_exchanged().ok_or_else(|| {
        ExchangeFailure::from(PlatformError::TokenExchangeFailed {
            status: 0,
            message: "No access token was issued".to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthScopes;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPlatform {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RemotePlatform for CountingPlatform {
        fn create_permission_url(
            &self,
            _shop: &str,
            _scope: &AuthScopes,
            _redirect_uri: &str,
        ) -> Result<String, PlatformError> {
            unreachable!("not used by the exchanger")
        }

        async fn request_token(
            &self,
            shop: &ShopDomain,
            _params: &CallbackParams,
        ) -> Result<String, PlatformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PlatformError::InvalidHmac);
            }
            Ok(format!("token-for-{}", shop.shop_name()))
        }
    }

    #[tokio::test]
    async fn test_exchange_returns_canonical_domain_and_token() {
        let platform = CountingPlatform::default();

        let exchanged = exchange_token(&platform, "test-shop", &CallbackParams::new(), None)
            .await
            .unwrap();

        assert_eq!(exchanged.shop_domain.as_ref(), "test-shop.myshopify.com");
        assert_eq!(exchanged.access_token, "token-for-test-shop");
        assert_eq!(platform.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_preset_token_skips_platform() {
        let platform = CountingPlatform::default();

        let exchanged = exchange_token(
            &platform,
            "test-shop.myshopify.com",
            &CallbackParams::new(),
            Some("preset".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(exchanged.access_token, "preset");
        assert_eq!(platform.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_platform_failure_becomes_exchange_failure() {
        let platform = CountingPlatform {
            fail: true,
            ..CountingPlatform::default()
        };

        let result = exchange_token(&platform, "test-shop", &CallbackParams::new(), None).await;

        let failure = result.unwrap_err();
        assert!(matches!(failure.source, PlatformError::InvalidHmac));
    }

    #[tokio::test]
    async fn test_malformed_shop_is_an_exchange_failure() {
        let platform = CountingPlatform::default();

        let result = exchange_token(&platform, "evil.example.com", &CallbackParams::new(), None)
            .await;

        assert!(matches!(
            result.unwrap_err().source,
            PlatformError::InvalidShopDomain { .. }
        ));
        assert_eq!(platform.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pending_session_keeps_token_after_request() {
        let platform = CountingPlatform::default();
        let mut session = PendingSession::new("test-shop", None).unwrap();
        assert!(session.access_token().is_none());

        session
            .request_token(&platform, &CallbackParams::new())
            .await
            .unwrap();
        session
            .request_token(&platform, &CallbackParams::new())
            .await
            .unwrap();

        assert_eq!(session.access_token(), Some("token-for-test-shop"));
        assert_eq!(session.shop().shop_name(), "test-shop");
        assert_eq!(platform.calls.load(Ordering::SeqCst), 1);
    }
}

//! `reqwest`-backed [`RemotePlatform`] talking to Shopify's OAuth endpoints.

use crate::auth::AuthScopes;
use crate::config::{ApiKey, ApiSecretKey, AuthConfig, ShopDomain};
use crate::platform::hmac::validate_hmac;
use crate::platform::{CallbackParams, PlatformError, RemotePlatform};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Callbacks older than this are rejected even with a valid signature.
const CALLBACK_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// Request body for the code exchange.
#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    #[serde(default)]
    scope: Option<String>,
}

/// Shopify's OAuth endpoints.
///
/// Before exchanging a code, the client verifies the callback's HMAC with
/// the API secret key (then the old key, if one is configured) and
/// rejects callbacks older than a day.
///
/// No timeout is set by default. Supply a configured `reqwest::Client`
/// through [`with_http_client`](Self::with_http_client) to add one.
#[derive(Clone, Debug)]
pub struct ShopifyClient {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    http: reqwest::Client,
    base_url: Option<String>,
}

impl ShopifyClient {
    /// Creates a client using the credentials in `config`.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            api_key: config.api_key().clone(),
            api_secret_key: config.api_secret_key().clone(),
            old_api_secret_key: config.old_api_secret_key().cloned(),
            http: reqwest::Client::new(),
            base_url: None,
        }
    }

    /// Replaces the underlying HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Sends every admin request to `base_url` instead of `https://{shop}`.
    ///
    /// Intended for pointing the client at a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn admin_url(&self, shop: &ShopDomain, path: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}{path}", base.trim_end_matches('/')),
            None => format!("https://{}{path}", shop.as_ref()),
        }
    }

    /// Checks that callback parameters are fresh and signed by Shopify.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::StaleCallback`] if `timestamp` is missing,
    ///   unparseable, or more than a day before `now`
    /// - [`PlatformError::InvalidHmac`] if the signature does not match
    pub fn validate_params(
        &self,
        params: &CallbackParams,
        now: DateTime<Utc>,
    ) -> Result<(), PlatformError> {
        let timestamp = params.get("timestamp").unwrap_or_default();
        let fresh = timestamp
            .parse::<i64>()
            .is_ok_and(|ts| ts >= now.timestamp() - CALLBACK_MAX_AGE_SECS);
        if !fresh {
            return Err(PlatformError::StaleCallback {
                timestamp: timestamp.to_string(),
            });
        }

        let secrets = std::iter::once(self.api_secret_key.as_ref())
            .chain(self.old_api_secret_key.as_ref().map(AsRef::as_ref));
        if !validate_hmac(params, secrets) {
            return Err(PlatformError::InvalidHmac);
        }

        Ok(())
    }
}

#[async_trait]
impl RemotePlatform for ShopifyClient {
    fn create_permission_url(
        &self,
        shop: &str,
        scope: &AuthScopes,
        redirect_uri: &str,
    ) -> Result<String, PlatformError> {
        let shop = ShopDomain::new(shop).map_err(|_| PlatformError::InvalidShopDomain {
            domain: shop.to_string(),
        })?;

        let params = [
            ("client_id", self.api_key.as_ref().to_string()),
            ("scope", scope.to_string()),
            ("redirect_uri", redirect_uri.to_string()),
        ];
        let query_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!(
            "{}?{query_string}",
            self.admin_url(&shop, "/admin/oauth/authorize")
        ))
    }

    async fn request_token(
        &self,
        shop: &ShopDomain,
        params: &CallbackParams,
    ) -> Result<String, PlatformError> {
        self.validate_params(params, Utc::now())?;

        let signed_shop = params.get("shop").unwrap_or_default();
        if ShopDomain::new(signed_shop).ok().as_ref() != Some(shop) {
            return Err(PlatformError::ShopMismatch {
                expected: shop.to_string(),
                signed: signed_shop.to_string(),
            });
        }

        let code = params
            .get("code")
            .filter(|code| !code.is_empty())
            .ok_or(PlatformError::MissingParameter { name: "code" })?;

        let request_body = AccessTokenRequest {
            client_id: self.api_key.as_ref(),
            client_secret: self.api_secret_key.as_ref(),
            code,
        };

        let response = self
            .http
            .post(self.admin_url(shop, "/admin/oauth/access_token"))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| PlatformError::TokenExchangeFailed {
                status: 0,
                message: format!("Network error: {e}"),
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(PlatformError::TokenExchangeFailed {
                status,
                message: error_body,
            });
        }

        let token_response: AccessTokenResponse =
            response
                .json()
                .await
                .map_err(|e| PlatformError::TokenExchangeFailed {
                    status,
                    message: format!("Failed to parse token response: {e}"),
                })?;

        tracing::debug!(
            shop = %shop,
            scope = token_response.scope.as_deref().unwrap_or_default(),
            "Access token granted"
        );

        Ok(token_response.access_token)
    }
}

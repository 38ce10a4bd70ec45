//! Configuration for the login handshake.
//!
//! # Overview
//!
//! - [`AuthConfig`]: every setting the handshake reads, passed explicitly
//!   to the orchestrator at construction time
//! - [`AuthConfigBuilder`]: fluent builder for [`AuthConfig`]
//! - [`ApiKey`], [`ApiSecretKey`]: the app's Shopify credentials
//! - [`SigningSecret`]: the process-wide key for state nonces
//! - [`ShopDomain`], [`HostUrl`]: validated domain values
//!
//! # Example
//!
//! ```rust
//! use shopify_auth::{AuthConfig, ApiKey, ApiSecretKey, HostUrl, SigningSecret};
//!
//! let config = AuthConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .signing_secret(SigningSecret::new("django-style-secret").unwrap())
//!     .host(HostUrl::new("https://myapp.example.com").unwrap())
//!     .scopes("read_products".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.finalize_path(), "/login/finalize/");
//! ```

mod newtypes;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain, SigningSecret};

use crate::auth::AuthScopes;
use crate::error::ConfigError;

const DEFAULT_APP_NAME: &str = "Shopify App";
const DEFAULT_LOGIN_REDIRECT_PATH: &str = "/";
const DEFAULT_LOGIN_PATH: &str = "/login/";
const DEFAULT_FINALIZE_PATH: &str = "/login/finalize/";

/// Configuration for the login handshake.
///
/// `AuthConfig` is `Clone`, `Send`, and `Sync`; build it once at startup
/// and share it between requests.
///
/// # Key Rotation
///
/// `old_api_secret_key` lets callbacks signed with the previous Shopify
/// secret still validate while a rotation is in flight.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    signing_secret: SigningSecret,
    app_name: String,
    scopes: AuthScopes,
    host: HostUrl,
    is_embedded: bool,
    dev_mode: bool,
    login_redirect_path: String,
    login_path: String,
    finalize_path: String,
}

impl AuthConfig {
    /// Creates a new builder for constructing an `AuthConfig`.
    #[must_use]
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::new()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the previous API secret key, if configured.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the secret that signs state nonces.
    #[must_use]
    pub const fn signing_secret(&self) -> &SigningSecret {
        &self.signing_secret
    }

    /// Returns the display name shown on the shop prompt.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the scopes requested on the permission page.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the application's public origin.
    #[must_use]
    pub const fn host(&self) -> &HostUrl {
        &self.host
    }

    /// Returns whether the app runs inside the Shopify admin iframe.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.is_embedded
    }

    /// Returns whether remote calls are bypassed with a sentinel token.
    #[must_use]
    pub const fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    /// Returns the default destination after login.
    #[must_use]
    pub fn login_redirect_path(&self) -> &str {
        &self.login_redirect_path
    }

    /// Returns the path of the entry (login) step.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Returns the path of the finalize step.
    #[must_use]
    pub fn finalize_path(&self) -> &str {
        &self.finalize_path
    }

    /// Returns the absolute URL Shopify redirects back to.
    #[must_use]
    pub fn finalize_url(&self) -> String {
        self.host.join(&self.finalize_path)
    }
}

// Verify AuthConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthConfig>();
};

/// Builder for [`AuthConfig`].
///
/// Required: `api_key`, `api_secret_key`, `signing_secret`, `host`.
///
/// # Defaults
///
/// - `app_name`: `"Shopify App"`
/// - `scopes`: empty
/// - `is_embedded`: `true`
/// - `dev_mode`: `false`
/// - `login_redirect_path`: `/`
/// - `login_path`: `/login/`
/// - `finalize_path`: `/login/finalize/`
#[derive(Debug, Default)]
pub struct AuthConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    signing_secret: Option<SigningSecret>,
    app_name: Option<String>,
    scopes: Option<AuthScopes>,
    host: Option<HostUrl>,
    is_embedded: Option<bool>,
    dev_mode: Option<bool>,
    login_redirect_path: Option<String>,
    login_path: Option<String>,
    finalize_path: Option<String>,
}

impl AuthConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the previous API secret key for rotation.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the nonce signing secret (required).
    #[must_use]
    pub fn signing_secret(mut self, secret: SigningSecret) -> Self {
        self.signing_secret = Some(secret);
        self
    }

    /// Sets the display name shown on the shop prompt.
    #[must_use]
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the application's public origin (required).
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets whether the app is embedded in the Shopify admin.
    #[must_use]
    pub const fn is_embedded(mut self, embedded: bool) -> Self {
        self.is_embedded = Some(embedded);
        self
    }

    /// Enables the development bypass.
    ///
    /// Never enable this where real merchants can reach the app: any shop
    /// name is then logged in without contacting Shopify.
    #[must_use]
    pub const fn dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = Some(enabled);
        self
    }

    /// Sets the default destination after login.
    #[must_use]
    pub fn login_redirect_path(mut self, path: impl Into<String>) -> Self {
        self.login_redirect_path = Some(path.into());
        self
    }

    /// Sets the path of the entry step.
    #[must_use]
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    /// Sets the path of the finalize step.
    #[must_use]
    pub fn finalize_path(mut self, path: impl Into<String>) -> Self {
        self.finalize_path = Some(path.into());
        self
    }

    /// Builds the [`AuthConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if a required field is
    /// unset, or [`ConfigError::InvalidPath`] if a path does not start with
    /// a single `/`.
    pub fn build(self) -> Result<AuthConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;
        let signing_secret = self
            .signing_secret
            .ok_or(ConfigError::MissingRequiredField {
                field: "signing_secret",
            })?;
        let host = self
            .host
            .ok_or(ConfigError::MissingRequiredField { field: "host" })?;

        let login_redirect_path = local_path(
            "login_redirect_path",
            self.login_redirect_path,
            DEFAULT_LOGIN_REDIRECT_PATH,
        )?;
        let login_path = local_path("login_path", self.login_path, DEFAULT_LOGIN_PATH)?;
        let finalize_path = local_path("finalize_path", self.finalize_path, DEFAULT_FINALIZE_PATH)?;

        Ok(AuthConfig {
            api_key,
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            signing_secret,
            app_name: self
                .app_name
                .unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            scopes: self.scopes.unwrap_or_default(),
            host,
            is_embedded: self.is_embedded.unwrap_or(true),
            dev_mode: self.dev_mode.unwrap_or(false),
            login_redirect_path,
            login_path,
            finalize_path,
        })
    }
}

fn local_path(
    field: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<String, ConfigError> {
    let path = value.unwrap_or_else(|| default.to_string());
    if path.starts_with('/') && !path.starts_with("//") {
        Ok(path)
    } else {
        Err(ConfigError::InvalidPath { field, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_builder() -> AuthConfigBuilder {
        AuthConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .signing_secret(SigningSecret::new("signing").unwrap())
            .host(HostUrl::new("https://myapp.example.com").unwrap())
    }

    #[test]
    fn test_builder_requires_signing_secret() {
        let result = AuthConfigBuilder::new()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .host(HostUrl::new("https://myapp.example.com").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "signing_secret"
            })
        ));
    }

    #[test]
    fn test_builder_requires_host() {
        let result = AuthConfigBuilder::new()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .signing_secret(SigningSecret::new("signing").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "host" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = base_builder().build().unwrap();

        assert_eq!(config.app_name(), "Shopify App");
        assert!(config.scopes().is_empty());
        assert!(config.is_embedded());
        assert!(!config.dev_mode());
        assert_eq!(config.login_redirect_path(), "/");
        assert_eq!(config.login_path(), "/login/");
        assert_eq!(config.finalize_path(), "/login/finalize/");
        assert!(config.old_api_secret_key().is_none());
    }

    #[test]
    fn test_finalize_url_is_absolute() {
        let config = base_builder()
            .host(HostUrl::new("https://myapp.example.com/").unwrap())
            .finalize_path("/auth/finalize/")
            .build()
            .unwrap();

        assert_eq!(
            config.finalize_url(),
            "https://myapp.example.com/auth/finalize/"
        );
    }

    #[test]
    fn test_builder_rejects_non_local_paths() {
        let result = base_builder().login_path("login/").build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPath {
                field: "login_path",
                ..
            })
        ));

        let result = base_builder()
            .login_redirect_path("//evil.example.com")
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidPath { .. })));
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = base_builder()
            .old_api_secret_key(ApiSecretKey::new("old-secret").unwrap())
            .app_name("Inventory Helper")
            .scopes("read_products,write_orders".parse().unwrap())
            .is_embedded(false)
            .dev_mode(true)
            .login_redirect_path("/dashboard/")
            .build()
            .unwrap();

        assert_eq!(config.app_name(), "Inventory Helper");
        assert_eq!(config.scopes().len(), 2);
        assert!(!config.is_embedded());
        assert!(config.dev_mode());
        assert_eq!(config.login_redirect_path(), "/dashboard/");
        assert_eq!(config.old_api_secret_key().unwrap().as_ref(), "old-secret");
    }
}

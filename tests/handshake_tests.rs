//! Integration tests for the full handshake.
//!
//! Shopify's token endpoint is served by a `wiremock` server; everything
//! else runs exactly as in production.

use async_trait::async_trait;
use chrono::Utc;
use shopify_auth::auth::{IdentityBackend, LoginSession, NonceCodec, Principal, ShopUserBackend};
use shopify_auth::handshake::DEV_MODE_TOKEN;
use shopify_auth::platform::hmac::{compute_signature, signable_string};
use shopify_auth::platform::{CallbackParams, ShopifyClient};
use shopify_auth::{
    ApiKey, ApiSecretKey, AuthConfig, Handshake, HandshakeRequest, HandshakeResponse, HostUrl,
    ShopDomain, SigningSecret,
};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHOP: &str = "test-shop.myshopify.com";
const API_SECRET: &str = "test-secret";

#[derive(Default)]
struct RecordingLogin {
    started: Mutex<Vec<Principal>>,
}

#[async_trait]
impl LoginSession for RecordingLogin {
    async fn start(&self, _request: &HandshakeRequest, principal: &Principal) {
        self.started.lock().unwrap().push(principal.clone());
    }
}

struct NobodyBackend;

#[async_trait]
impl IdentityBackend for NobodyBackend {
    async fn resolve(&self, _shop: &ShopDomain, _access_token: &str) -> Option<Principal> {
        None
    }
}

fn create_config(embedded: bool, dev_mode: bool) -> AuthConfig {
    AuthConfig::builder()
        .api_key(ApiKey::new("test-api-key").unwrap())
        .api_secret_key(ApiSecretKey::new(API_SECRET).unwrap())
        .signing_secret(SigningSecret::new("nonce-signing-secret").unwrap())
        .host(HostUrl::new("https://myapp.example.com").unwrap())
        .scopes("read_products,write_orders".parse().unwrap())
        .is_embedded(embedded)
        .dev_mode(dev_mode)
        .build()
        .unwrap()
}

fn create_handshake(
    config: AuthConfig,
    mock_server: &MockServer,
    identity: Arc<dyn IdentityBackend>,
    sessions: Arc<RecordingLogin>,
) -> Handshake {
    let client = ShopifyClient::new(&config).with_base_url(mock_server.uri());
    Handshake::new(config, Arc::new(client), identity, sessions)
}

/// Builds the query Shopify appends to the finalize redirect.
fn signed_callback(state: &str, code: &str, secret: &str) -> HandshakeRequest {
    let mut params = CallbackParams::new();
    params.insert("code", code);
    params.insert("shop", SHOP);
    params.insert("state", state);
    params.insert("timestamp", Utc::now().timestamp().to_string());
    let hmac = compute_signature(&signable_string(&params), secret);
    params.insert("hmac", hmac);

    HandshakeRequest::from_query(params.iter())
}

fn state_from(location: &str) -> String {
    let (_, state) = location
        .split_once("&state=")
        .expect("permission URL carries a state parameter");
    urlencoding::decode(state).unwrap().into_owned()
}

async fn mount_token_endpoint(mock_server: &MockServer, code: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .and(body_json(serde_json::json!({
            "client_id": "test-api-key",
            "client_secret": API_SECRET,
            "code": code
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "shpat_from_shopify",
            "scope": "read_products,write_orders"
        })))
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_complete_handshake_logs_shop_user_in() {
    let mock_server = MockServer::start().await;
    mount_token_endpoint(&mock_server, "auth-code-123", 1).await;

    let users = Arc::new(ShopUserBackend::new());
    let sessions = Arc::new(RecordingLogin::default());
    let handshake = create_handshake(
        create_config(false, false),
        &mock_server,
        users.clone(),
        sessions.clone(),
    );

    // Entry with a shop goes straight to the permission page
    let entry = handshake
        .login(&HandshakeRequest::new().with_form("shop", SHOP))
        .await
        .unwrap();
    assert_eq!(entry.status_code(), 302);
    let location = entry.location().unwrap();
    assert!(location.starts_with(&format!("{}/admin/oauth/authorize?", mock_server.uri())));
    assert!(location.contains("client_id=test-api-key"));
    assert!(location.contains("scope=read_products%2Cwrite_orders"));

    // Shopify redirects back with a signed code
    let state = state_from(location);
    let callback = signed_callback(&state, "auth-code-123", API_SECRET);
    let done = handshake.finalize(&callback).await;

    assert_eq!(done, HandshakeResponse::Redirect { location: "/".to_string() });
    let shop = ShopDomain::new(SHOP).unwrap();
    assert_eq!(users.get(&shop).unwrap().access_token, "shpat_from_shopify");
    let started = sessions.started.lock().unwrap();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].shop, shop);
}

#[tokio::test]
async fn test_embedded_entry_returns_script_redirect() {
    let mock_server = MockServer::start().await;
    let handshake = create_handshake(
        create_config(true, false),
        &mock_server,
        Arc::new(ShopUserBackend::new()),
        Arc::new(RecordingLogin::default()),
    );

    let response = handshake
        .login(&HandshakeRequest::new().with_query("shop", "test-shop"))
        .await
        .unwrap();

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.location(), None);
    let HandshakeResponse::ScriptRedirect { location } = &response else {
        panic!("Expected ScriptRedirect, got {response:?}");
    };
    let body = response.body().unwrap();
    assert!(body.contains("window.top.location.href"));
    assert!(body.contains("/admin/oauth/authorize?"));

    // Shopify calls back with the full domain, which is what the nonce binds
    let nonce = handshake.codec().decode(&state_from(location)).unwrap();
    assert_eq!(nonce.shop, SHOP);
}

#[tokio::test]
async fn test_tampered_callback_restarts_handshake() {
    let mock_server = MockServer::start().await;
    mount_token_endpoint(&mock_server, "auth-code-123", 0).await;

    let sessions = Arc::new(RecordingLogin::default());
    let handshake = create_handshake(
        create_config(false, false),
        &mock_server,
        Arc::new(ShopUserBackend::new()),
        sessions.clone(),
    );
    let state = handshake.codec().encode(SHOP, NonceCodec::ttl());

    let callback = signed_callback(&state, "auth-code-123", "not-the-app-secret");
    let response = handshake.finalize(&callback).await;

    assert_eq!(response.location(), Some("/login/"));
    assert!(sessions.started.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_code_restarts_handshake() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_request",
            "error_description": "The authorization code was not found or was already used"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sessions = Arc::new(RecordingLogin::default());
    let handshake = create_handshake(
        create_config(false, false),
        &mock_server,
        Arc::new(ShopUserBackend::new()),
        sessions.clone(),
    );
    let state = handshake.codec().encode(SHOP, NonceCodec::ttl());

    let response = handshake
        .finalize(&signed_callback(&state, "used-code", API_SECRET))
        .await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.location(), Some("/login/"));
    assert!(sessions.started.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unresolved_principal_still_completes() {
    let mock_server = MockServer::start().await;
    mount_token_endpoint(&mock_server, "auth-code-123", 1).await;

    let sessions = Arc::new(RecordingLogin::default());
    let handshake = create_handshake(
        create_config(false, false),
        &mock_server,
        Arc::new(NobodyBackend),
        sessions.clone(),
    );
    let state = handshake.codec().encode(SHOP, NonceCodec::ttl());

    let callback = signed_callback(&state, "auth-code-123", API_SECRET);
    let response = handshake.finalize(&callback).await;

    assert_eq!(response.location(), Some("/"));
    assert!(sessions.started.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dev_mode_never_contacts_shopify() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let users = Arc::new(ShopUserBackend::new());
    let sessions = Arc::new(RecordingLogin::default());
    let handshake = create_handshake(
        create_config(false, true),
        &mock_server,
        users.clone(),
        sessions.clone(),
    );

    let response = handshake
        .login(&HandshakeRequest::new().with_form("shop", SHOP))
        .await
        .unwrap();

    assert_eq!(response.location(), Some("/"));
    let shop = ShopDomain::new(SHOP).unwrap();
    assert_eq!(users.get(&shop).unwrap().access_token, DEV_MODE_TOKEN);
    assert_eq!(sessions.started.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_finalize_honors_next_query_param() {
    let mock_server = MockServer::start().await;
    mount_token_endpoint(&mock_server, "auth-code-123", 1).await;

    let handshake = create_handshake(
        create_config(false, false),
        &mock_server,
        Arc::new(ShopUserBackend::new()),
        Arc::new(RecordingLogin::default()),
    );
    let state = handshake.codec().encode(SHOP, NonceCodec::ttl());

    // Only reaches finalize if the app adds it to the redirect URI itself
    let mut params = CallbackParams::new();
    params.insert("code", "auth-code-123");
    params.insert("next", "/orders/42/");
    params.insert("shop", SHOP);
    params.insert("state", state);
    params.insert("timestamp", Utc::now().timestamp().to_string());
    let hmac = compute_signature(&signable_string(&params), API_SECRET);
    params.insert("hmac", hmac);

    let response = handshake
        .finalize(&HandshakeRequest::from_query(params.iter()))
        .await;

    assert_eq!(response.location(), Some("/orders/42/"));
}

#[tokio::test]
async fn test_authenticated_caller_is_sent_to_default_destination() {
    let mock_server = MockServer::start().await;
    mount_token_endpoint(&mock_server, "auth-code-123", 0).await;

    let sessions = Arc::new(RecordingLogin::default());
    let handshake = create_handshake(
        create_config(false, false),
        &mock_server,
        Arc::new(ShopUserBackend::new()),
        sessions.clone(),
    );
    let state = handshake.codec().encode(SHOP, NonceCodec::ttl());
    let callback = signed_callback(&state, "auth-code-123", API_SECRET).authenticated(true);

    let login = handshake.login(&callback).await.unwrap();
    let finalize = handshake.finalize(&callback).await;

    assert_eq!(login.location(), Some("/"));
    assert_eq!(finalize.location(), Some("/"));
    assert!(sessions.started.lock().unwrap().is_empty());
}

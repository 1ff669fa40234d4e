mod auth_support;

use std::time::Duration;

use chrono::Utc;
use contract::auth::discovery::ProviderMetadata;
use contract::auth::oidc::{http_client, OidcConnector, OidcDeviceClient, DEFAULT_SCOPES};
use contract::auth::{
    AuthError, DeviceAuthorizer, DeviceAuthorizerFactory, DeviceCodePoll,
    DeviceFlowAuthenticator, FileTokenStore, TokenStore, TokenStoreConfig,
};
use contract::network::Network;
use serde_json::json;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_support::session;

fn network_for(server: &MockServer) -> Network {
    Network::builder()
        .name("staging")
        .api(format!("{}/api", server.uri()))
        .url(server.uri())
        .client_id("client-1")
        .domain("staging.example.com")
        .issuer(server.uri())
        .discovery_endpoint(format!("{}/.well-known/openid-configuration", server.uri()))
        .build()
}

fn metadata_for(server: &MockServer) -> ProviderMetadata {
    ProviderMetadata {
        issuer: server.uri(),
        token_endpoint: format!("{}/oauth/v2/token", server.uri()),
        device_authorization_endpoint: Some(format!(
            "{}/oauth/v2/device_authorization",
            server.uri()
        )),
    }
}

async fn mount_discovery(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": server.uri(),
            "authorization_endpoint": format!("{}/oauth/v2/authorize", server.uri()),
            "token_endpoint": format!("{}/oauth/v2/token", server.uri()),
            "device_authorization_endpoint": format!("{}/oauth/v2/device_authorization", server.uri()),
        })))
        .mount(server)
        .await;
}

fn device_client(server: &MockServer) -> OidcDeviceClient {
    OidcDeviceClient::new(
        http_client().unwrap(),
        &network_for(server),
        &metadata_for(server),
        DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
    )
    .unwrap()
}

async fn poll_with_response(response: ResponseTemplate) -> Result<DeviceCodePoll, AuthError> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/token"))
        .and(body_string_contains("device_code=device-code-1"))
        .and(body_string_contains("client_id=client-1"))
        .respond_with(response)
        .expect(1)
        .mount(&server)
        .await;

    device_client(&server)
        .poll_device_code(&session(Duration::from_secs(5)))
        .await
}

#[tokio::test]
async fn connector_discovers_and_starts_device_code() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/device_authorization"))
        .and(header("accept", "application/json"))
        .and(body_string_contains("client_id=client-1"))
        .and(body_string_contains("offline_access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "device-123",
            "user_code": "WXYZ-1234",
            "verification_uri": "https://auth.example.com/device",
            "verification_uri_complete": "https://auth.example.com/device?user_code=WXYZ-1234",
            "expires_in": 300
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connector = OidcConnector::with_client(http_client().unwrap());
    let authorizer = connector.connect(&network_for(&server)).await.unwrap();
    let session = authorizer.start_device_code().await.unwrap();

    assert_eq!(session.network, "staging");
    assert_eq!(session.device_code, "device-123");
    assert_eq!(session.user_code, "WXYZ-1234");
    assert_eq!(session.interval, Duration::from_secs(5));
    assert_eq!(
        session.direct_uri(),
        "https://auth.example.com/device?user_code=WXYZ-1234"
    );
    assert!(session.expires_at > Utc::now());
}

#[tokio::test]
async fn device_authorization_rejection_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/device_authorization"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "client not found"
        })))
        .mount(&server)
        .await;

    let err = device_client(&server).start_device_code().await.unwrap_err();
    match err {
        AuthError::DeviceAuthRequest(message) => {
            assert!(message.contains("invalid_client: client not found"))
        }
        other => panic!("expected DeviceAuthRequest, got {other:?}"),
    }
}

#[tokio::test]
async fn issuer_mismatch_fails_provider_init() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": "https://someone-else.example.com",
            "token_endpoint": format!("{}/oauth/v2/token", server.uri()),
            "device_authorization_endpoint": format!("{}/oauth/v2/device_authorization", server.uri()),
        })))
        .mount(&server)
        .await;

    let connector = OidcConnector::with_client(http_client().unwrap());
    let err = connector.connect(&network_for(&server)).await.err().unwrap();
    assert!(matches!(err, AuthError::ProviderInit(message) if message.contains("issuer mismatch")));
}

#[tokio::test]
async fn provider_without_device_endpoint_fails_provider_init() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issuer": server.uri(),
            "token_endpoint": format!("{}/oauth/v2/token", server.uri()),
        })))
        .mount(&server)
        .await;

    let connector = OidcConnector::with_client(http_client().unwrap());
    let err = connector.connect(&network_for(&server)).await.err().unwrap();
    assert!(matches!(err, AuthError::ProviderInit(_)));
}

#[tokio::test]
async fn unreachable_discovery_fails_provider_init() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let connector = OidcConnector::with_client(http_client().unwrap());
    let err = connector.connect(&network_for(&server)).await.err().unwrap();
    assert!(matches!(err, AuthError::ProviderInit(_)));
}

#[tokio::test]
async fn empty_client_id_fails_before_discovery() {
    let server = MockServer::start().await;
    let mut network = network_for(&server);
    network.client_id = String::new();

    let connector = OidcConnector::with_client(http_client().unwrap());
    let err = connector.connect(&network).await.err().unwrap();
    assert!(matches!(err, AuthError::ProviderInit(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn pending_and_slow_down_are_not_errors() {
    let pending = poll_with_response(
        ResponseTemplate::new(400).set_body_json(json!({"error": "authorization_pending"})),
    )
    .await
    .unwrap();
    assert!(matches!(pending, DeviceCodePoll::Pending));

    let slow = poll_with_response(
        ResponseTemplate::new(400).set_body_json(json!({"error": "slow_down"})),
    )
    .await
    .unwrap();
    assert!(matches!(slow, DeviceCodePoll::SlowDown));
}

#[tokio::test]
async fn denied_and_expired_are_terminal_outcomes() {
    let denied = poll_with_response(
        ResponseTemplate::new(400).set_body_json(json!({"error": "access_denied"})),
    )
    .await
    .unwrap();
    assert!(matches!(denied, DeviceCodePoll::AccessDenied));

    let expired = poll_with_response(
        ResponseTemplate::new(400).set_body_json(json!({"error": "expired_token"})),
    )
    .await
    .unwrap();
    assert!(matches!(expired, DeviceCodePoll::Expired));
}

#[tokio::test]
async fn unknown_token_error_is_invalid_response() {
    let err = poll_with_response(ResponseTemplate::new(400).set_body_json(json!({
        "error": "invalid_grant",
        "error_description": "device code already used"
    })))
    .await
    .unwrap_err();
    assert!(
        matches!(err, AuthError::InvalidResponse(message) if message.contains("invalid_grant"))
    );
}

#[tokio::test]
async fn issued_token_carries_expiry() {
    let before = Utc::now();
    let poll = poll_with_response(ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "access-abc",
        "token_type": "Bearer",
        "refresh_token": "refresh-abc",
        "id_token": "id-abc",
        "expires_in": 3600,
        "scope": "openid offline_access email profile"
    })))
    .await
    .unwrap();

    let DeviceCodePoll::Authorized { token } = poll else {
        panic!("expected Authorized, got {poll:?}");
    };
    assert_eq!(token.access_token, "access-abc");
    assert_eq!(token.refresh_token.as_deref(), Some("refresh-abc"));
    assert_eq!(token.id_token.as_deref(), Some("id-abc"));
    assert_eq!(token.expires_in, Some(3600));
    let expires_at = token.expires_at.expect("expiry computed");
    assert!(expires_at >= before + chrono::Duration::seconds(3600));
}

#[tokio::test]
async fn huge_token_lifetime_is_accepted_without_expiry() {
    let poll = poll_with_response(ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "a",
        "expires_in": 9223372036854775807u64
    })))
    .await
    .unwrap();

    let DeviceCodePoll::Authorized { token } = poll else {
        panic!("expected Authorized, got {poll:?}");
    };
    assert_eq!(token.access_token, "a");
    assert_eq!(token.expires_in, Some(9223372036854775807));
    assert_eq!(token.expires_at, None);
}

#[tokio::test]
async fn login_end_to_end_writes_token_file() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/device_authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "device-e2e",
            "user_code": "E2E-CODE",
            "verification_uri": "https://auth.example.com/device",
            "expires_in": 300,
            "interval": 0
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/token"))
        .and(body_string_contains("device_code=device-e2e"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "authorization_pending"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/token"))
        .and(body_string_contains("device_code=device-e2e"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-e2e",
            "token_type": "Bearer",
            "expires_in": 600
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = FileTokenStore::new(TokenStoreConfig::new(dir.path().to_path_buf()));
    let authenticator =
        DeviceFlowAuthenticator::new(OidcConnector::with_client(http_client().unwrap()));

    let token = authenticator
        .login(&network_for(&server), &store, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(token.access_token, "access-e2e");
    assert!(dir.path().join(".staging").join("token.json").exists());
    assert_eq!(store.load("staging").unwrap(), token);
}

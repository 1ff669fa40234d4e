//! HTTP relying party for the device authorization grant (RFC 8628).

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use super::device_code::{DeviceCodePoll, DeviceCodeSession, DEFAULT_POLL_INTERVAL};
use super::discovery::{discover, ProviderMetadata};
use super::error::AuthError;
use super::flow::{DeviceAuthorizer, DeviceAuthorizerFactory};
use super::token::Token;
use crate::network::Network;

const USER_AGENT: &str = concat!("contract-cli/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_DEVICE_CODE_LIFETIME_SECS: u64 = 24 * 60 * 60;
const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Scopes requested on every login.
pub const DEFAULT_SCOPES: [&str; 4] = ["openid", "offline_access", "email", "profile"];

/// HTTP client used for discovery and the device flow.
pub fn http_client() -> Result<reqwest::Client, AuthError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(|err| AuthError::ProviderInit(format!("failed to create HTTP client: {err}")))
}

/// Builds an [`OidcDeviceClient`] per network by running OIDC discovery.
#[derive(Debug, Clone)]
pub struct OidcConnector {
    client: reqwest::Client,
    scopes: Vec<String>,
}

impl OidcConnector {
    pub fn new() -> Result<Self, AuthError> {
        Ok(Self::with_client(http_client()?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl DeviceAuthorizerFactory for OidcConnector {
    async fn connect(&self, network: &Network) -> Result<Box<dyn DeviceAuthorizer>, AuthError> {
        if network.client_id.trim().is_empty() {
            return Err(AuthError::ProviderInit(format!(
                "network {} has no client ID",
                network.name
            )));
        }
        let metadata = discover(&self.client, network).await?;
        let client = OidcDeviceClient::new(
            self.client.clone(),
            network,
            &metadata,
            self.scopes.clone(),
        )?;
        Ok(Box::new(client))
    }
}

/// Relying party bound to one network's provider endpoints.
///
/// # Example
/// ```no_run
/// use contract::auth::discovery::ProviderMetadata;
/// use contract::auth::oidc::{http_client, OidcDeviceClient, DEFAULT_SCOPES};
/// use contract::network::Network;
///
/// let metadata = ProviderMetadata {
///     issuer: "https://auth.decombine.com".to_string(),
///     token_endpoint: "https://auth.decombine.com/oauth/v2/token".to_string(),
///     device_authorization_endpoint: Some(
///         "https://auth.decombine.com/oauth/v2/device_authorization".to_string(),
///     ),
/// };
/// let client = OidcDeviceClient::new(
///     http_client()?,
///     &Network::built_in(),
///     &metadata,
///     DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
/// )?;
/// # Ok::<(), contract::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct OidcDeviceClient {
    client: reqwest::Client,
    network: String,
    client_id: String,
    scopes: Vec<String>,
    device_authorization_endpoint: String,
    token_endpoint: String,
}

impl OidcDeviceClient {
    pub fn new(
        client: reqwest::Client,
        network: &Network,
        metadata: &ProviderMetadata,
        scopes: Vec<String>,
    ) -> Result<Self, AuthError> {
        let device_authorization_endpoint = metadata
            .device_authorization_endpoint
            .clone()
            .ok_or_else(|| {
                AuthError::ProviderInit(format!(
                    "provider {} does not advertise a device authorization endpoint",
                    metadata.issuer
                ))
            })?;
        Ok(Self {
            client,
            network: network.name.clone(),
            client_id: network.client_id.clone(),
            scopes,
            device_authorization_endpoint,
            token_endpoint: metadata.token_endpoint.clone(),
        })
    }
}

#[async_trait]
impl DeviceAuthorizer for OidcDeviceClient {
    async fn start_device_code(&self) -> Result<DeviceCodeSession, AuthError> {
        let scope = self.scopes.join(" ");
        let resp = self
            .client
            .post(&self.device_authorization_endpoint)
            .header("Accept", "application/json")
            .form(&[("client_id", self.client_id.as_str()), ("scope", scope.as_str())])
            .send()
            .await
            .map_err(|err| AuthError::DeviceAuthRequest(err.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|err| AuthError::DeviceAuthRequest(err.to_string()))?;
        if !status.is_success() {
            return Err(AuthError::DeviceAuthRequest(format!(
                "status {status}: {}",
                describe_error_body(&body)
            )));
        }
        let payload: DeviceAuthorizationResponse = serde_json::from_str(&body).map_err(|err| {
            AuthError::DeviceAuthRequest(format!("invalid device authorization response: {err}"))
        })?;

        let interval = payload
            .interval
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        let lifetime = payload.expires_in.min(MAX_DEVICE_CODE_LIFETIME_SECS);
        let expires_at = Utc::now() + chrono::Duration::seconds(lifetime as i64);
        tracing::debug!(
            network = %self.network,
            interval_secs = interval.as_secs(),
            expires_in = payload.expires_in,
            "device code issued"
        );
        Ok(DeviceCodeSession {
            network: self.network.clone(),
            verification_uri: payload.verification_uri,
            verification_uri_complete: payload.verification_uri_complete,
            user_code: payload.user_code,
            device_code: payload.device_code,
            interval,
            expires_at,
        })
    }

    async fn poll_device_code(
        &self,
        session: &DeviceCodeSession,
    ) -> Result<DeviceCodePoll, AuthError> {
        let resp = self
            .client
            .post(&self.token_endpoint)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", DEVICE_CODE_GRANT_TYPE),
                ("device_code", session.device_code.as_str()),
                ("client_id", self.client_id.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let received_at = Utc::now();
        let body = resp.text().await?;
        let payload: TokenEndpointResponse = serde_json::from_str(&body).map_err(|_| {
            AuthError::InvalidResponse(format!(
                "token endpoint returned status {status} with an unreadable body"
            ))
        })?;

        if status.is_success() {
            if let Some(access_token) = payload.access_token {
                let mut token = Token::new(access_token);
                if let Some(token_type) = payload.token_type {
                    token.token_type = token_type;
                }
                token.refresh_token = payload.refresh_token;
                token.id_token = payload.id_token;
                token.scope = payload.scope;
                if let Some(expires_in) = payload.expires_in {
                    token = token.with_expires_in(expires_in, received_at);
                }
                return Ok(DeviceCodePoll::Authorized { token });
            }
        }

        match payload.error.as_deref() {
            Some("authorization_pending") => Ok(DeviceCodePoll::Pending),
            Some("slow_down") => Ok(DeviceCodePoll::SlowDown),
            Some("access_denied") => Ok(DeviceCodePoll::AccessDenied),
            Some("expired_token") => Ok(DeviceCodePoll::Expired),
            Some(other) => Err(AuthError::InvalidResponse(match payload.error_description {
                Some(description) => format!("device token error {other}: {description}"),
                None => format!("device token error {other}"),
            })),
            None => Err(AuthError::InvalidResponse(format!(
                "token endpoint returned status {status} without a token or error"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeviceAuthorizationResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    #[serde(default)]
    verification_uri_complete: Option<String>,
    expires_in: u64,
    #[serde(default)]
    interval: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    refresh_token: Option<String>,
    id_token: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    error_description: Option<String>,
}

fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(OAuthErrorBody {
            error,
            error_description: Some(description),
        }) => format!("{error}: {description}"),
        Ok(OAuthErrorBody { error, .. }) => error,
        Err(_) if body.trim().is_empty() => "empty response".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

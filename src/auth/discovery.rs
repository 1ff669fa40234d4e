//! OIDC discovery: turning a [`Network`] into provider endpoints.

use reqwest::Url;
use serde::Deserialize;

use super::error::AuthError;
use crate::network::Network;

const WELL_KNOWN_PATH: &str = ".well-known/openid-configuration";

/// The subset of the OIDC discovery document the device flow needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub token_endpoint: String,
    #[serde(default)]
    pub device_authorization_endpoint: Option<String>,
}

/// Discovery document URL for `network`: the configured discovery endpoint,
/// else the issuer's well-known path.
pub fn discovery_url(network: &Network) -> Result<Url, AuthError> {
    let raw = if !network.discovery_endpoint.trim().is_empty() {
        network.discovery_endpoint.trim().to_string()
    } else if !network.issuer.trim().is_empty() {
        format!(
            "{}/{WELL_KNOWN_PATH}",
            network.issuer.trim().trim_end_matches('/')
        )
    } else {
        return Err(AuthError::ProviderInit(format!(
            "network {} has neither an issuer nor a discovery endpoint",
            network.name
        )));
    };
    Url::parse(&raw)
        .map_err(|err| AuthError::ProviderInit(format!("invalid discovery URL {raw}: {err}")))
}

/// Fetch and validate the discovery document for `network`.
pub async fn discover(
    client: &reqwest::Client,
    network: &Network,
) -> Result<ProviderMetadata, AuthError> {
    let url = discovery_url(network)?;
    tracing::debug!(network = %network.name, url = %url, "fetching OIDC discovery document");

    let resp = client
        .get(url.clone())
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|err| AuthError::ProviderInit(format!("discovery request failed: {err}")))?;
    if !resp.status().is_success() {
        return Err(AuthError::ProviderInit(format!(
            "discovery request to {url} failed with status {}",
            resp.status()
        )));
    }
    let body = resp
        .text()
        .await
        .map_err(|err| AuthError::ProviderInit(format!("discovery response unreadable: {err}")))?;
    let metadata: ProviderMetadata = serde_json::from_str(&body)
        .map_err(|err| AuthError::ProviderInit(format!("invalid discovery document: {err}")))?;

    validate_metadata(network, &metadata)?;
    Ok(metadata)
}

fn validate_metadata(network: &Network, metadata: &ProviderMetadata) -> Result<(), AuthError> {
    let configured = network.issuer.trim().trim_end_matches('/');
    if !configured.is_empty() && configured != metadata.issuer.trim_end_matches('/') {
        tracing::warn!(
            network = %network.name,
            expected = configured,
            reported = %metadata.issuer,
            "discovery issuer mismatch"
        );
        return Err(AuthError::ProviderInit(format!(
            "issuer mismatch: network {} expects {configured}, provider reports {}",
            network.name, metadata.issuer
        )));
    }
    if metadata
        .device_authorization_endpoint
        .as_deref()
        .map_or(true, |endpoint| endpoint.trim().is_empty())
    {
        return Err(AuthError::ProviderInit(format!(
            "provider {} does not advertise a device authorization endpoint",
            metadata.issuer
        )));
    }
    Ok(())
}

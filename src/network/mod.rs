//! Named remote endpoints and their OIDC parameters.

pub mod registry;

pub use registry::NetworkRegistry;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{ContractError, Result};

/// Reserved name of the built-in network.
pub const BUILT_IN_NETWORK_NAME: &str = "decombine";

/// A named platform endpoint plus the parameters needed to log in to it.
///
/// # Example
/// ```
/// use contract::network::Network;
///
/// let staging = Network::builder()
///     .name("staging")
///     .api("https://api.staging.example.com")
///     .url("https://staging.example.com")
///     .client_id("cli")
///     .domain("staging.example.com")
///     .discovery_endpoint("https://auth.staging.example.com/.well-known/openid-configuration")
///     .build();
/// assert!(staging.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub name: String,
    #[serde(default)]
    #[builder(default)]
    pub api: String,
    #[serde(default)]
    #[builder(default)]
    pub url: String,
    #[serde(default)]
    #[builder(default)]
    pub client_id: String,
    #[serde(default)]
    #[builder(default)]
    pub domain: String,
    #[serde(default)]
    #[builder(default)]
    pub issuer: String,
    #[serde(default)]
    #[builder(default)]
    pub discovery_endpoint: String,
}

impl Network {
    /// The platform's own network; always present and never removable.
    pub fn built_in() -> Self {
        Self {
            name: BUILT_IN_NETWORK_NAME.to_string(),
            api: "https://api.decombine.com".to_string(),
            url: "https://decombine.com".to_string(),
            client_id: "314914854450233349".to_string(),
            domain: String::new(),
            issuer: "https://auth.decombine.com".to_string(),
            discovery_endpoint: "https://auth.decombine.com/.well-known/openid-configuration"
                .to_string(),
        }
    }

    pub fn is_built_in(&self) -> bool {
        self.name == BUILT_IN_NETWORK_NAME
    }

    /// Check the fields a user-added network must carry, reporting the
    /// first one that is empty.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("api", &self.api),
            ("url", &self.url),
            ("client id", &self.client_id),
            ("domain", &self.domain),
            ("discovery endpoint", &self.discovery_endpoint),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ContractError::validation(field));
            }
        }
        Ok(())
    }
}

//! Contract: Smart Legal Contract CLI core
//!
//! Manages the registry of named contract networks, logs in to a network
//! with the OAuth 2.0 device authorization grant, and stores the resulting
//! token per network.
//!
//! # Quick Start
//!
//! ```no_run
//! use contract::auth::{DeviceFlowAuthenticator, FileTokenStore};
//! use contract::auth::oidc::OidcConnector;
//! use contract::config::{ConfigLocation, ConfigStore};
//! use contract::network::NetworkRegistry;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> contract::error::Result<()> {
//! let registry = NetworkRegistry::new(ConfigStore::new(ConfigLocation::resolve(None)));
//! let network = registry.resolve("staging")?;
//! let authenticator = DeviceFlowAuthenticator::new(OidcConnector::new()?);
//! authenticator
//!     .login(&network, &FileTokenStore::new_default(), &CancellationToken::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod network;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub mod logging;

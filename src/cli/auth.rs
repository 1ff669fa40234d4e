//! CLI auth command handlers for login, status, and logout.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use super::{LoginArgs, LogoutArgs, StatusArgs};
use crate::auth::oidc::OidcConnector;
use crate::auth::{
    AuthError, DeviceFlowAuthenticator, DeviceFlowEvent, DeviceFlowState, FileTokenStore, Token,
    TokenStore,
};
use crate::error::{ContractError, Result};
use crate::network::{Network, NetworkRegistry};

/// Handle `contract login`.
pub async fn handle_login(
    registry: &NetworkRegistry,
    store: &FileTokenStore,
    args: &LoginArgs,
) -> Result<()> {
    if !args.device_flow {
        return Err(ContractError::Unsupported(
            "only the device flow is available for login".to_string(),
        ));
    }
    let network = login_network(registry, args.network.as_deref())?;

    let cancel = CancellationToken::new();
    // tokio keeps its SIGINT handler installed after this task is aborted, so
    // Ctrl-C stops killing the process once login returns.
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let authenticator = DeviceFlowAuthenticator::new(OidcConnector::new()?)
        .with_event_sink(Arc::new(|event: DeviceFlowEvent| {
            if let Some(text) = describe_event(&event) {
                println!("{text}");
            }
        }));
    let result = authenticator.login(&network, store, &cancel).await;
    interrupt.abort();

    match result {
        Ok(_) => {
            println!("✅ Success! Logged in to {}", network.name);
            println!(
                "   Token saved to {}",
                store.token_path(&network.name).display()
            );
            Ok(())
        }
        Err(AuthError::Cancelled) => {
            eprintln!("Login cancelled.");
            Err(AuthError::Cancelled.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Pick the network to log in to: an explicit name, else the configured
/// default, else the built-in network when there is no config file at all.
pub fn login_network(registry: &NetworkRegistry, name: Option<&str>) -> Result<Network> {
    match name {
        Some(name) => registry.resolve(name),
        None => match registry.resolve_default() {
            Err(ContractError::ConfigMissing { .. }) => registry.resolve(""),
            other => other,
        },
    }
}

/// Terminal rendering of a device-flow event, if it needs one.
pub fn describe_event(event: &DeviceFlowEvent) -> Option<String> {
    match event {
        DeviceFlowEvent::StateChanged {
            state: DeviceFlowState::Requesting,
        } => Some("Starting device flow authentication...".to_string()),
        DeviceFlowEvent::CodeIssued {
            verification_uri,
            direct_uri,
            user_code,
            ..
        } => Some(format!(
            "\n🔗 Please browse to {verification_uri} and enter code {user_code}\n   Or open {direct_uri}\n⏳ Waiting for authentication..."
        )),
        DeviceFlowEvent::StateChanged {
            state: DeviceFlowState::Denied,
        } => Some("❌ Authorization denied".to_string()),
        DeviceFlowEvent::StateChanged {
            state: DeviceFlowState::Expired,
        } => Some("❌ Device code expired, please try again".to_string()),
        DeviceFlowEvent::SlowDown { interval } => {
            tracing::debug!(interval_secs = interval.as_secs(), "provider asked to slow down");
            None
        }
        _ => None,
    }
}

/// Handle `contract logout`.
pub fn handle_logout(store: &dyn TokenStore, args: &LogoutArgs) -> Result<()> {
    store.delete(&args.network)?;
    println!("✅ Logged out from {}", args.network);
    Ok(())
}

/// Handle `contract status`.
pub fn handle_status(
    registry: &NetworkRegistry,
    store: &dyn TokenStore,
    args: &StatusArgs,
) -> Result<()> {
    let networks = match &args.network {
        Some(name) => vec![registry.resolve(name)?],
        None => registry.list(),
    };

    println!("🔐 Authentication Status\n");
    let now = Utc::now();
    for network in networks {
        let status = status_line(store.load(&network.name), now);
        println!("  {}: {status}", network.name);
    }
    Ok(())
}

/// One-line login status for a stored token lookup.
pub fn status_line(token: std::result::Result<Token, AuthError>, now: DateTime<Utc>) -> String {
    match token {
        Ok(token) => match token.expires_at {
            Some(expires) if token.is_expired(now) => {
                format!("⚠️  Token expired ({})", expires.format("%Y-%m-%d %H:%M"))
            }
            Some(expires) => format!("✅ Logged in (expires {})", expires.format("%Y-%m-%d %H:%M")),
            None => "✅ Logged in".to_string(),
        },
        Err(AuthError::TokenNotFound { .. }) => "❌ Not logged in".to_string(),
        Err(err) => format!("⚠️  Error: {err}"),
    }
}

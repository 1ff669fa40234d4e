//! The OAuth 2.0 Device Authorization Grant as an event-emitting state
//! machine.
//!
//! ```text
//! Idle -> Requesting -> AwaitingUser -> Polling -> {Succeeded, Denied, Expired, Failed}
//! ```
//!
//! The machine never prints. Presentation code subscribes through a
//! [`DeviceFlowEventSink`] and renders whatever it likes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use strum::Display;
use tokio_util::sync::CancellationToken;

use super::device_code::{DeviceCodePoll, DeviceCodeSession, SLOW_DOWN_INCREMENT};
use super::error::AuthError;
use super::oidc::OidcConnector;
use super::store::TokenStore;
use super::token::Token;
use crate::network::Network;

/// One relying-party context bound to a network's provider.
#[async_trait]
pub trait DeviceAuthorizer: Send + Sync {
    /// Issue the device authorization request.
    async fn start_device_code(&self) -> Result<DeviceCodeSession, AuthError>;
    /// Poll the token endpoint once.
    async fn poll_device_code(
        &self,
        session: &DeviceCodeSession,
    ) -> Result<DeviceCodePoll, AuthError>;
}

/// Builds a [`DeviceAuthorizer`] for a network (discovery, client setup).
#[async_trait]
pub trait DeviceAuthorizerFactory: Send + Sync {
    async fn connect(&self, network: &Network) -> Result<Box<dyn DeviceAuthorizer>, AuthError>;
}

/// States of a single login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DeviceFlowState {
    Idle,
    Requesting,
    AwaitingUser,
    Polling,
    Succeeded,
    Denied,
    Expired,
    Failed,
}

impl DeviceFlowState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Denied | Self::Expired | Self::Failed
        )
    }

    fn terminal_for(result: &Result<Token, AuthError>) -> Self {
        match result {
            Ok(_) => Self::Succeeded,
            Err(AuthError::AccessDenied) => Self::Denied,
            Err(AuthError::Expired) => Self::Expired,
            Err(_) => Self::Failed,
        }
    }
}

/// Observable progress of the device flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFlowEvent {
    StateChanged {
        state: DeviceFlowState,
    },
    /// The user must visit `verification_uri` and enter `user_code`.
    CodeIssued {
        verification_uri: String,
        direct_uri: String,
        user_code: String,
        expires_at: DateTime<Utc>,
    },
    PollAttempt {
        attempt: u32,
    },
    SlowDown {
        interval: Duration,
    },
}

pub type DeviceFlowEventSink = Arc<dyn Fn(DeviceFlowEvent) + Send + Sync>;

/// Drives one device-flow login per call.
///
/// # Example
/// ```no_run
/// use contract::auth::flow::DeviceFlowAuthenticator;
/// use contract::auth::oidc::OidcConnector;
/// use contract::auth::FileTokenStore;
/// use contract::network::Network;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), contract::auth::AuthError> {
/// let authenticator = DeviceFlowAuthenticator::new(OidcConnector::new()?);
/// let store = FileTokenStore::new_default();
/// let token = authenticator
///     .login(&Network::built_in(), &store, &CancellationToken::new())
///     .await?;
/// println!("logged in, expires {:?}", token.expires_at);
/// # Ok(())
/// # }
/// ```
pub struct DeviceFlowAuthenticator<F = OidcConnector> {
    factory: F,
    event_sink: Option<DeviceFlowEventSink>,
}

impl<F: DeviceAuthorizerFactory> DeviceFlowAuthenticator<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            event_sink: None,
        }
    }

    pub fn with_event_sink(mut self, sink: DeviceFlowEventSink) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Run the flow to a terminal state. Only `Succeeded` yields a token;
    /// cancellation ends in `Failed` with [`AuthError::Cancelled`].
    pub async fn run(
        &self,
        network: &Network,
        cancel: &CancellationToken,
    ) -> Result<Token, AuthError> {
        tracing::debug!(network = %network.name, issuer = %network.issuer, "starting device flow");
        let result = self.drive(network, cancel).await;
        let terminal = DeviceFlowState::terminal_for(&result);
        self.emit_state(terminal);
        match &result {
            Ok(_) => tracing::info!(network = %network.name, "device flow succeeded"),
            Err(err) => tracing::debug!(network = %network.name, state = %terminal, error = %err, "device flow ended"),
        }
        result
    }

    /// Run the flow and persist the token. Nothing is written unless the
    /// flow succeeded and was not cancelled.
    pub async fn login(
        &self,
        network: &Network,
        store: &dyn TokenStore,
        cancel: &CancellationToken,
    ) -> Result<Token, AuthError> {
        let token = self.run(network, cancel).await?;
        if cancel.is_cancelled() {
            return Err(AuthError::Cancelled);
        }
        store.save(&network.name, &token)?;
        Ok(token)
    }

    async fn drive(
        &self,
        network: &Network,
        cancel: &CancellationToken,
    ) -> Result<Token, AuthError> {
        self.emit_state(DeviceFlowState::Requesting);
        let authorizer = cancellable(cancel, self.factory.connect(network)).await?;
        let session = cancellable(cancel, authorizer.start_device_code()).await?;

        self.emit(DeviceFlowEvent::CodeIssued {
            verification_uri: session.verification_uri.clone(),
            direct_uri: session.direct_uri(),
            user_code: session.user_code.clone(),
            expires_at: session.expires_at,
        });
        self.emit_state(DeviceFlowState::AwaitingUser);

        self.poll_until_terminal(authorizer.as_ref(), &session, cancel)
            .await
    }

    async fn poll_until_terminal(
        &self,
        authorizer: &dyn DeviceAuthorizer,
        session: &DeviceCodeSession,
        cancel: &CancellationToken,
    ) -> Result<Token, AuthError> {
        self.emit_state(DeviceFlowState::Polling);
        let mut interval = session.interval;
        let mut attempt: u32 = 0;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                _ = tokio::time::sleep(interval) => {}
            }

            if session.is_expired(Utc::now()) {
                return Err(AuthError::Expired);
            }

            attempt += 1;
            self.emit(DeviceFlowEvent::PollAttempt { attempt });

            match cancellable(cancel, authorizer.poll_device_code(session)).await? {
                DeviceCodePoll::Pending => {
                    tracing::debug!(attempt, "authorization pending");
                }
                DeviceCodePoll::SlowDown => {
                    interval += SLOW_DOWN_INCREMENT;
                    tracing::debug!(attempt, interval_secs = interval.as_secs(), "provider asked to slow down");
                    self.emit(DeviceFlowEvent::SlowDown { interval });
                }
                DeviceCodePoll::Authorized { token } => return Ok(token),
                DeviceCodePoll::AccessDenied => return Err(AuthError::AccessDenied),
                DeviceCodePoll::Expired => return Err(AuthError::Expired),
            }
        }
    }

    fn emit_state(&self, state: DeviceFlowState) {
        self.emit(DeviceFlowEvent::StateChanged { state });
    }

    fn emit(&self, event: DeviceFlowEvent) {
        if let Some(sink) = &self.event_sink {
            sink(event);
        }
    }
}

/// Race `fut` against cancellation; cancellation always wins.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, AuthError>>,
) -> Result<T, AuthError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AuthError::Cancelled),
        result = fut => result,
    }
}

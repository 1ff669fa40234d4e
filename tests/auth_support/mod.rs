#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use contract::auth::{
    AuthError, DeviceAuthorizer, DeviceAuthorizerFactory, DeviceCodePoll, DeviceCodeSession,
    DeviceFlowEvent, DeviceFlowEventSink, Token, TokenStore,
};
use contract::network::Network;
use tokio::time::Instant;

/// Network-keyed in-memory store that counts writes.
#[derive(Default)]
pub struct SpyTokenStore {
    tokens: Mutex<HashMap<String, Token>>,
    saves: AtomicUsize,
}

impl SpyTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn get(&self, network: &str) -> Option<Token> {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .get(network)
            .cloned()
    }
}

impl TokenStore for SpyTokenStore {
    fn save(&self, network: &str, token: &Token) -> Result<(), AuthError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .insert(network.to_string(), token.clone());
        Ok(())
    }

    fn load(&self, network: &str) -> Result<Token, AuthError> {
        self.get(network).ok_or_else(|| AuthError::TokenNotFound {
            network: network.to_string(),
        })
    }

    fn delete(&self, network: &str) -> Result<(), AuthError> {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .remove(network)
            .map(|_| ())
            .ok_or_else(|| AuthError::TokenNotFound {
                network: network.to_string(),
            })
    }
}

/// Device authorizer that replays a fixed list of poll outcomes. Once the
/// script runs out, polls never complete.
#[derive(Clone)]
pub struct ScriptedAuthorizer {
    session: DeviceCodeSession,
    script: Arc<Mutex<VecDeque<Result<DeviceCodePoll, AuthError>>>>,
    polls: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedAuthorizer {
    pub fn new(interval: Duration, script: Vec<Result<DeviceCodePoll, AuthError>>) -> Self {
        Self {
            session: session(interval),
            script: Arc::new(Mutex::new(script.into())),
            polls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_session(mut self, session: DeviceCodeSession) -> Self {
        self.session = session;
        self
    }

    /// When each poll reached the authorizer, on the tokio clock.
    pub fn poll_times(&self) -> Vec<Instant> {
        self.polls.lock().expect("poll lock poisoned").clone()
    }

    pub fn poll_count(&self) -> usize {
        self.poll_times().len()
    }
}

#[async_trait]
impl DeviceAuthorizer for ScriptedAuthorizer {
    async fn start_device_code(&self) -> Result<DeviceCodeSession, AuthError> {
        Ok(self.session.clone())
    }

    async fn poll_device_code(
        &self,
        _session: &DeviceCodeSession,
    ) -> Result<DeviceCodePoll, AuthError> {
        self.polls
            .lock()
            .expect("poll lock poisoned")
            .push(Instant::now());
        let next = self.script.lock().expect("script lock poisoned").pop_front();
        match next {
            Some(outcome) => outcome,
            None => std::future::pending().await,
        }
    }
}

/// Hands out the same [`ScriptedAuthorizer`] for every network.
pub struct ScriptedFactory {
    authorizer: ScriptedAuthorizer,
}

impl ScriptedFactory {
    pub fn new(authorizer: ScriptedAuthorizer) -> Self {
        Self { authorizer }
    }
}

#[async_trait]
impl DeviceAuthorizerFactory for ScriptedFactory {
    async fn connect(&self, _network: &Network) -> Result<Box<dyn DeviceAuthorizer>, AuthError> {
        Ok(Box::new(self.authorizer.clone()))
    }
}

/// Factory whose provider cannot be initialised.
pub struct FailingFactory;

#[async_trait]
impl DeviceAuthorizerFactory for FailingFactory {
    async fn connect(&self, network: &Network) -> Result<Box<dyn DeviceAuthorizer>, AuthError> {
        Err(AuthError::ProviderInit(format!(
            "no provider for {}",
            network.name
        )))
    }
}

pub fn session(interval: Duration) -> DeviceCodeSession {
    DeviceCodeSession {
        network: "staging".to_string(),
        verification_uri: "https://auth.example.com/device".to_string(),
        verification_uri_complete: None,
        user_code: "ABCD-EFGH".to_string(),
        device_code: "device-code-1".to_string(),
        interval,
        expires_at: Utc::now() + chrono::Duration::minutes(10),
    }
}

pub fn staging_network() -> Network {
    Network::builder()
        .name("staging")
        .api("https://api.staging.example.com")
        .url("https://staging.example.com")
        .client_id("client-1")
        .domain("staging.example.com")
        .discovery_endpoint("https://auth.staging.example.com/.well-known/openid-configuration")
        .build()
}

/// Event sink that records everything it receives.
pub fn recording_sink() -> (DeviceFlowEventSink, Arc<Mutex<Vec<DeviceFlowEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink_events = events.clone();
    let sink: DeviceFlowEventSink = Arc::new(move |event: DeviceFlowEvent| {
        sink_events.lock().expect("event lock poisoned").push(event);
    });
    (sink, events)
}

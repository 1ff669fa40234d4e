use std::time::Duration;

use chrono::{DateTime, Utc};

use super::Token;

/// Interval RFC 8628 prescribes when the provider does not send one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Amount the interval grows by on every `slow_down` response.
pub const SLOW_DOWN_INCREMENT: Duration = Duration::from_secs(5);

/// In-memory state of one device authorization; never persisted.
///
/// # Example
/// ```no_run
/// use contract::auth::DeviceCodeSession;
///
/// let session = DeviceCodeSession {
///     network: "decombine".to_string(),
///     verification_uri: "https://auth.decombine.com/device".to_string(),
///     verification_uri_complete: None,
///     user_code: "ABCD-EFGH".to_string(),
///     device_code: "device-code".to_string(),
///     interval: std::time::Duration::from_secs(5),
///     expires_at: chrono::Utc::now() + chrono::Duration::minutes(10),
/// };
/// assert_eq!(
///     session.direct_uri(),
///     "https://auth.decombine.com/device?user_code=ABCD-EFGH"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct DeviceCodeSession {
    pub network: String,
    pub verification_uri: String,
    pub verification_uri_complete: Option<String>,
    pub user_code: String,
    pub device_code: String,
    pub interval: Duration,
    pub expires_at: DateTime<Utc>,
}

impl DeviceCodeSession {
    /// Link that pre-fills the user code.
    pub fn direct_uri(&self) -> String {
        match &self.verification_uri_complete {
            Some(uri) => uri.clone(),
            None => format!("{}?user_code={}", self.verification_uri, self.user_code),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Outcome of one poll of the token endpoint.
#[derive(Debug, Clone)]
pub enum DeviceCodePoll {
    Pending,
    SlowDown,
    Authorized { token: Token },
    AccessDenied,
    Expired,
}

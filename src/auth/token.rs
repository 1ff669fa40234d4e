use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Token set returned by a successful device-flow login.
///
/// Mirrors the provider's access-token response and adds `expires_at`,
/// computed when the response was received.
///
/// # Example
/// ```no_run
/// use contract::auth::Token;
///
/// let token = Token::new("access")
///     .with_refresh_token("refresh")
///     .with_expires_in(3600, chrono::Utc::now());
/// assert!(!token.is_expired(chrono::Utc::now()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            refresh_token: None,
            id_token: None,
            expires_in: None,
            scope: None,
            expires_at: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    /// Record the provider-reported lifetime relative to `received_at`.
    /// A lifetime too large to represent leaves `expires_at` unset.
    pub fn with_expires_in(mut self, expires_in: u64, received_at: DateTime<Utc>) -> Self {
        self.expires_in = Some(expires_in);
        self.expires_at = i64::try_from(expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| received_at.checked_add_signed(lifetime));
        self
    }

    /// A token without a known expiry never reports itself expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

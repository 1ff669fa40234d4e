use thiserror::Error;

use crate::error::ErrorKind;

/// Normalized authentication and token-storage errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to initialize OIDC provider: {0}")]
    ProviderInit(String),
    #[error("Device authorization request failed: {0}")]
    DeviceAuthRequest(String),
    #[error("Access denied")]
    AccessDenied,
    #[error("Device code expired, please try again")]
    Expired,
    #[error("Login cancelled")]
    Cancelled,
    #[error("No token stored for network {network}")]
    TokenNotFound { network: String },
    #[error("Token storage error: {0}")]
    TokenIo(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProviderInit(_) => ErrorKind::ProviderInitFailure,
            Self::DeviceAuthRequest(_) => ErrorKind::DeviceAuthRequestFailure,
            Self::AccessDenied => ErrorKind::AuthorizationDenied,
            Self::Expired => ErrorKind::AuthorizationExpired,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::TokenNotFound { .. } => ErrorKind::TokenNotFound,
            Self::TokenIo(_) => ErrorKind::TokenIoFailure,
            Self::InvalidResponse(_) | Self::Network(_) => ErrorKind::Other,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::TokenIo(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::TokenIo(error.to_string())
    }
}

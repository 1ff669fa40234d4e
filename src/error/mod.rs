//! Error types for the contract CLI core.

pub mod unified;

pub use unified::{ErrorKind, RecoverySuggestion};

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for configuration, registry and login operations.
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("No configuration file found{}", describe_path(.path.as_deref()))]
    ConfigMissing { path: Option<PathBuf> },

    #[error("Failed to parse configuration file {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("Failed to write configuration file {}: {source}", .path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration file already exists at {}", .path.display())]
    ConfigExists { path: PathBuf },

    #[error("Network {0} not found")]
    NetworkNotFound(String),

    #[error("Default network {0} is not present in the configured networks")]
    DefaultNetworkNotFound(String),

    #[error("Cannot remove the built-in network {0}")]
    ProtectedNetwork(String),

    #[error("Network {0} already exists")]
    DuplicateNetwork(String),

    #[error("{field} is required")]
    Validation { field: &'static str },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

fn describe_path(path: Option<&Path>) -> String {
    match path {
        Some(path) => format!(" at {}", path.display()),
        None => String::new(),
    }
}

impl ContractError {
    pub fn validation(field: &'static str) -> Self {
        Self::Validation { field }
    }

    /// Classify this error into the CLI's error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigMissing { .. } => ErrorKind::ConfigMissing,
            Self::ConfigParse { .. } => ErrorKind::ConfigParseFailure,
            Self::ConfigWrite { .. } | Self::ConfigExists { .. } => ErrorKind::ConfigWriteFailure,
            Self::NetworkNotFound(_) => ErrorKind::NetworkNotFound,
            Self::DefaultNetworkNotFound(_) => ErrorKind::DefaultNetworkInconsistent,
            Self::ProtectedNetwork(_) => ErrorKind::ProtectedNetworkRemoval,
            Self::DuplicateNetwork(_) => ErrorKind::DuplicateNetwork,
            Self::Validation { .. } => ErrorKind::ValidationFailure,
            Self::Unsupported(_) => ErrorKind::Other,
            Self::Auth(err) => err.kind(),
        }
    }

    /// Suggest what the user should do next.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.kind() {
            ErrorKind::ConfigMissing | ErrorKind::ConfigParseFailure => {
                RecoverySuggestion::InitializeConfig
            }
            ErrorKind::NetworkNotFound | ErrorKind::DefaultNetworkInconsistent => {
                RecoverySuggestion::ListNetworks
            }
            ErrorKind::AuthorizationDenied
            | ErrorKind::AuthorizationExpired
            | ErrorKind::TokenNotFound => RecoverySuggestion::Login,
            ErrorKind::ProviderInitFailure | ErrorKind::DeviceAuthRequestFailure => {
                RecoverySuggestion::CheckNetworkSettings
            }
            _ => RecoverySuggestion::None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ContractError>;

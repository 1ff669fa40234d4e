//! Unified error classification and recovery hints.

use strum::Display;

/// Machine-readable error classification shared by every failure the core
/// can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    ConfigMissing,
    ConfigParseFailure,
    ConfigWriteFailure,
    NetworkNotFound,
    DefaultNetworkInconsistent,
    ProtectedNetworkRemoval,
    ValidationFailure,
    DuplicateNetwork,
    ProviderInitFailure,
    DeviceAuthRequestFailure,
    AuthorizationDenied,
    AuthorizationExpired,
    Cancelled,
    TokenNotFound,
    TokenIoFailure,
    Other,
}

/// Suggested next step for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    InitializeConfig,
    ListNetworks,
    Login,
    CheckNetworkSettings,
    None,
}

impl RecoverySuggestion {
    /// One-line hint rendered under an error, if any.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::InitializeConfig => Some("Run `contract init` to create a configuration file."),
            Self::ListNetworks => Some("Run `contract network list` to see configured networks."),
            Self::Login => Some("Run `contract login -n <network>` to authenticate."),
            Self::CheckNetworkSettings => {
                Some("Check the network's issuer, client ID and discovery endpoint.")
            }
            Self::None => None,
        }
    }
}

use std::fs;
use std::path::PathBuf;

use super::error::AuthError;
use super::token::Token;
use crate::util::fs::atomic_write;

const TOKEN_FILE_NAME: &str = "token.json";
const TOKEN_DIR_ENV: &str = "CONTRACT_TOKEN_DIR";

/// Storage abstraction for persisted login tokens, one per network.
pub trait TokenStore: Send + Sync {
    /// Overwrite the token stored for `network`.
    fn save(&self, network: &str, token: &Token) -> Result<(), AuthError>;
    /// Fails with [`AuthError::TokenNotFound`] if nothing is stored.
    fn load(&self, network: &str) -> Result<Token, AuthError>;
    /// Fails with [`AuthError::TokenNotFound`] if nothing is stored.
    fn delete(&self, network: &str) -> Result<(), AuthError>;
}

/// Configuration for file-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStoreConfig {
    pub base_dir: PathBuf,
}

impl TokenStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// `CONTRACT_TOKEN_DIR`, else `~/.config/contract`.
    pub fn default_dir() -> PathBuf {
        std::env::var_os(TOKEN_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_contract_dir)
    }
}

/// File-backed token store writing `<base>/.<network>/token.json`.
///
/// # Example
/// ```no_run
/// use contract::auth::{FileTokenStore, Token, TokenStore};
///
/// let store = FileTokenStore::new_default();
/// store.save("decombine", &Token::new("access"))?;
/// # Ok::<(), contract::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    base_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(config: TokenStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: TokenStoreConfig::default_dir(),
        }
    }

    pub fn token_path(&self, network: &str) -> PathBuf {
        self.base_dir
            .join(format!(".{}", sanitize_network_name(network)))
            .join(TOKEN_FILE_NAME)
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, network: &str, token: &Token) -> Result<(), AuthError> {
        let path = self.token_path(network);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(parent, fs::Permissions::from_mode(0o700))?;
            }
        }
        let serialized = serde_json::to_vec_pretty(token)?;
        atomic_write(&path, &serialized, 0o600)?;
        tracing::debug!(network, path = %path.display(), "token stored");
        Ok(())
    }

    fn load(&self, network: &str) -> Result<Token, AuthError> {
        let path = self.token_path(network);
        let raw = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::TokenNotFound {
                    network: network.to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&raw)?)
    }

    fn delete(&self, network: &str) -> Result<(), AuthError> {
        let path = self.token_path(network);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(network, path = %path.display(), "token removed");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(AuthError::TokenNotFound {
                    network: network.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub(crate) fn default_contract_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("contract"))
        .unwrap_or_else(|| PathBuf::from(".config").join("contract"))
}

/// Collapse a network name into a single safe path component.
fn sanitize_network_name(value: &str) -> String {
    let trimmed = value.trim();
    let out: String = trimmed
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect();
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}

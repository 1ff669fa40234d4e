//! The CLI configuration document and its on-disk store.
//!
//! Resolution order for the document path:
//! 1. An explicit path (the `--config` flag)
//! 2. The `CONTRACT_CONFIG` environment variable
//! 3. `~/.config/contract/contract.yaml`

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::auth::store::default_contract_dir;
use crate::error::{ContractError, Result};
use crate::network::{Network, BUILT_IN_NETWORK_NAME};
use crate::util::fs::atomic_write;

const CONFIG_ENV: &str = "CONTRACT_CONFIG";
const CONFIG_FILE_NAME: &str = "contract.yaml";
const CONFIG_FILE_MODE: u32 = 0o644;

/// File format used when generating new contracts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContractFileType {
    #[default]
    Json,
    Toml,
    Yaml,
}

/// The single persisted CLI configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub default_contract_file_type: ContractFileType,
    #[serde(default)]
    pub default_network: String,
    #[serde(default)]
    pub networks: Vec<Network>,
}

impl Default for Config {
    /// The document written by `init`: only the built-in network, which is
    /// also the default.
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            default_contract_file_type: ContractFileType::Json,
            default_network: BUILT_IN_NETWORK_NAME.to_string(),
            networks: vec![Network::built_in()],
        }
    }
}

impl Config {
    pub fn find_network(&self, name: &str) -> Option<&Network> {
        self.networks.iter().find(|network| network.name == name)
    }
}

/// Where the configuration document lives, fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    path: Option<PathBuf>,
}

impl ConfigLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A location that resolves to nothing; every load fails.
    pub fn unresolved() -> Self {
        Self { path: None }
    }

    /// Resolve the document path from an explicit override, the
    /// environment, or the per-user default directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
            return Self::new(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Self::new(path);
        }
        Self::default_location()
    }

    pub fn default_location() -> Self {
        match directories::UserDirs::new() {
            Some(_) => Self::new(default_contract_dir().join(CONFIG_FILE_NAME)),
            None => Self::unresolved(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn require_path(&self) -> Result<&Path> {
        self.path
            .as_deref()
            .ok_or(ContractError::ConfigMissing { path: None })
    }
}

/// Whether `init` may replace an existing document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitMode {
    #[default]
    Overwrite,
    KeepExisting,
}

/// Loads and saves the configuration document. Holds no cached state:
/// every call goes to the filesystem.
///
/// # Example
/// ```no_run
/// use contract::config::{ConfigLocation, ConfigStore};
///
/// let store = ConfigStore::new(ConfigLocation::resolve(None));
/// let config = store.load()?;
/// println!("default network: {}", config.default_network);
/// # Ok::<(), contract::error::ContractError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigStore {
    location: ConfigLocation,
}

impl ConfigStore {
    pub fn new(location: ConfigLocation) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &ConfigLocation {
        &self.location
    }

    /// Read the document from the resolved location.
    pub fn load(&self) -> Result<Config> {
        let path = self.location.require_path()?;
        load_from_path(path)
    }

    /// Write `config` back to the resolved location.
    pub fn save(&self, config: &Config) -> Result<()> {
        let path = self.location.require_path()?;
        save_to_path(path, config)
    }

    /// Write a fresh default document to the resolved location.
    pub fn init(&self, mode: InitMode) -> Result<Config> {
        let path = self.location.require_path()?;
        init_at_path(path, mode)
    }
}

/// Read and decode the document at `path`.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ContractError::ConfigMissing {
                path: Some(path.to_path_buf()),
            })
        }
        Err(err) => {
            return Err(ContractError::ConfigParse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
        }
    };
    serde_yaml::from_str(&raw).map_err(|err| ContractError::ConfigParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Serialize `config` and replace the file at `path` in one step.
pub fn save_to_path(path: &Path, config: &Config) -> Result<()> {
    let serialized = serde_yaml::to_string(config).map_err(|err| ContractError::ConfigWrite {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
    })?;
    atomic_write(path, serialized.as_bytes(), CONFIG_FILE_MODE).map_err(|source| {
        ContractError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::debug!(path = %path.display(), networks = config.networks.len(), "configuration saved");
    Ok(())
}

/// Create the default document at `path`.
pub fn init_at_path(path: &Path, mode: InitMode) -> Result<Config> {
    if mode == InitMode::KeepExisting && path.exists() {
        return Err(ContractError::ConfigExists {
            path: path.to_path_buf(),
        });
    }
    let config = Config::default();
    save_to_path(path, &config)?;
    Ok(config)
}

use crate::config::ConfigStore;
use crate::error::{ContractError, Result};

use super::{Network, BUILT_IN_NETWORK_NAME};

/// Add/remove/list/set-default over the configured networks.
///
/// Every operation reloads the document through [`ConfigStore`]; nothing is
/// cached between calls.
///
/// # Example
/// ```no_run
/// use contract::config::{ConfigLocation, ConfigStore};
/// use contract::network::NetworkRegistry;
///
/// let registry = NetworkRegistry::new(ConfigStore::new(ConfigLocation::resolve(None)));
/// let network = registry.resolve("")?;
/// assert!(network.is_built_in());
/// # Ok::<(), contract::error::ContractError>(())
/// ```
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    store: ConfigStore,
}

impl NetworkRegistry {
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// The configured networks, or just the built-in network when there is
    /// no usable configuration document.
    pub fn list(&self) -> Vec<Network> {
        match self.store.load() {
            Ok(config) => config.networks,
            Err(ContractError::ConfigMissing { .. }) => vec![Network::built_in()],
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable configuration, using built-in network");
                vec![Network::built_in()]
            }
        }
    }

    /// Look up a network by exact name; the empty name means the built-in
    /// network.
    pub fn resolve(&self, name: &str) -> Result<Network> {
        if name.is_empty() {
            return Ok(Network::built_in());
        }
        self.list()
            .into_iter()
            .find(|network| network.name == name)
            .ok_or_else(|| ContractError::NetworkNotFound(name.to_string()))
    }

    /// The network named by `defaultNetwork`. A default that is missing from
    /// the list is reported, not repaired.
    pub fn resolve_default(&self) -> Result<Network> {
        let config = self.store.load()?;
        config
            .find_network(&config.default_network)
            .cloned()
            .ok_or(ContractError::DefaultNetworkNotFound(config.default_network))
    }

    pub fn add(&self, network: Network) -> Result<()> {
        network.validate()?;
        let mut config = self.store.load()?;
        if config.find_network(&network.name).is_some() {
            return Err(ContractError::DuplicateNetwork(network.name));
        }
        tracing::debug!(network = %network.name, "adding network");
        config.networks.push(network);
        self.store.save(&config)
    }

    /// Remove the first network called `name`. The default network is left
    /// untouched even when it is the one removed.
    pub fn remove(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ContractError::validation("network name"));
        }
        if name == BUILT_IN_NETWORK_NAME {
            return Err(ContractError::ProtectedNetwork(name.to_string()));
        }
        let mut config = self.store.load()?;
        let index = config
            .networks
            .iter()
            .position(|network| network.name == name)
            .ok_or_else(|| ContractError::NetworkNotFound(name.to_string()))?;
        config.networks.remove(index);
        if config.default_network == name {
            tracing::warn!(network = name, "removed the default network; defaultNetwork now dangles");
        }
        self.store.save(&config)
    }

    pub fn set_default(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ContractError::validation("network name"));
        }
        if !self.list().iter().any(|network| network.name == name) {
            return Err(ContractError::NetworkNotFound(name.to_string()));
        }
        let mut config = self.store.load()?;
        config.default_network = name.to_string();
        self.store.save(&config)
    }
}

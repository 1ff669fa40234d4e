//! CLI handlers for `contract network`.

use super::{AddNetworkArgs, NetworkNameArgs};
use crate::error::Result;
use crate::network::{Network, NetworkRegistry};

impl AddNetworkArgs {
    /// Unset flags become empty fields so validation names the first one
    /// missing.
    pub fn into_network(self) -> Network {
        Network::builder()
            .name(self.name.unwrap_or_default())
            .api(self.api.unwrap_or_default())
            .url(self.url.unwrap_or_default())
            .client_id(self.client_id.unwrap_or_default())
            .domain(self.domain.unwrap_or_default())
            .discovery_endpoint(self.discovery_endpoint.unwrap_or_default())
            .issuer(self.issuer.unwrap_or_default())
            .build()
    }
}

/// Handle `contract network add`.
pub fn handle_add(registry: &NetworkRegistry, args: AddNetworkArgs) -> Result<()> {
    let network = args.into_network();
    let name = network.name.clone();
    registry.add(network)?;
    println!("✅ Added network {name}");
    Ok(())
}

/// Handle `contract network remove`.
pub fn handle_remove(registry: &NetworkRegistry, args: &NetworkNameArgs) -> Result<()> {
    let name = args.network.as_deref().unwrap_or_default();
    registry.remove(name)?;
    println!("✅ Removed network {name}");
    Ok(())
}

/// Handle `contract network set`.
pub fn handle_set(registry: &NetworkRegistry, args: &NetworkNameArgs) -> Result<()> {
    let name = args.network.as_deref().unwrap_or_default();
    registry.set_default(name)?;
    println!("✅ Default network set to {name}");
    Ok(())
}

/// Handle `contract network list`.
pub fn handle_list(registry: &NetworkRegistry) -> Result<()> {
    let networks = registry.list();
    if networks.is_empty() {
        println!("No networks configured.");
        return Ok(());
    }
    for network in &networks {
        println!("{}", render_network(network));
    }
    Ok(())
}

/// Multi-line description of one network for `network list`.
pub fn render_network(network: &Network) -> String {
    let mut lines = vec![
        format!("Network: {}", network.name),
        format!("  API: {}", network.api),
        format!("  URL: {}", network.url),
        format!("  Client ID: {}", network.client_id),
    ];
    if !network.domain.is_empty() {
        lines.push(format!("  Domain: {}", network.domain));
    }
    if !network.issuer.is_empty() {
        lines.push(format!("  Issuer: {}", network.issuer));
    }
    if !network.discovery_endpoint.is_empty() {
        lines.push(format!("  Discovery: {}", network.discovery_endpoint));
    }
    lines.join("\n")
}

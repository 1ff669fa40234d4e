//! CLI entry point for Contract.

pub mod auth;
pub mod config;
pub mod network;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::auth::FileTokenStore;
use crate::config::{ConfigLocation, ConfigStore};
use crate::error::{ContractError, Result};
use crate::network::{NetworkRegistry, BUILT_IN_NETWORK_NAME};

/// Smart Legal Contract CLI
#[derive(Parser, Debug)]
#[command(
    name = "contract",
    version,
    about = "Contract: manage Smart Legal Contract networks and logins"
)]
pub struct Cli {
    /// Config file (default is $HOME/.config/contract/contract.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new Contract CLI configuration file
    Init(InitArgs),
    /// Show the Contract CLI configuration
    Config,
    /// Configure Smart Legal Contract networks
    Network(NetworkArgs),
    /// Login to a Contract network
    Login(LoginArgs),
    /// Logout from a Contract network
    Logout(LogoutArgs),
    /// Show which networks have a stored login
    Status(StatusArgs),
    /// Print the version number of Contract
    Version,
}

/// Arguments for `contract init`.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Where to write the file (default: the resolved config path)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Fail instead of overwriting an existing file
    #[arg(long)]
    pub keep_existing: bool,
}

/// Arguments for the `network` subcommand group.
#[derive(Parser, Debug)]
pub struct NetworkArgs {
    #[command(subcommand)]
    pub command: NetworkCommands,
}

/// Network subcommands.
#[derive(Subcommand, Debug)]
pub enum NetworkCommands {
    /// Add a Smart Legal Contract network
    Add(AddNetworkArgs),
    /// Remove a Smart Legal Contract network
    Remove(NetworkNameArgs),
    /// Set the default Smart Legal Contract network
    Set(NetworkNameArgs),
    /// List Smart Legal Contract networks
    List,
}

/// Arguments for `contract network add`.
#[derive(Parser, Debug)]
pub struct AddNetworkArgs {
    /// The name of the network
    #[arg(short = 'n', long = "network")]
    pub name: Option<String>,
    /// The API for the network
    #[arg(short = 'p', long)]
    pub api: Option<String>,
    /// The URL of the network
    #[arg(short, long)]
    pub url: Option<String>,
    /// The client ID for the network
    #[arg(short, long)]
    pub client_id: Option<String>,
    /// The domain for the network
    #[arg(short, long)]
    pub domain: Option<String>,
    /// The OIDC discovery endpoint for the network
    #[arg(short = 'a', long = "oidc")]
    pub discovery_endpoint: Option<String>,
    /// The OIDC issuer for the network
    #[arg(short, long)]
    pub issuer: Option<String>,
}

/// A single `-n/--network` argument.
#[derive(Parser, Debug)]
pub struct NetworkNameArgs {
    /// The name of the network
    #[arg(short, long)]
    pub network: Option<String>,
}

/// Arguments for `contract login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// The name of the network to login to (default: the configured default)
    #[arg(short, long)]
    pub network: Option<String>,

    /// Use device flow for authentication
    #[arg(
        short = 'd',
        long = "device-flow",
        default_value_t = true,
        default_missing_value = "true",
        num_args = 0..=1,
        action = ArgAction::Set
    )]
    pub device_flow: bool,
}

/// Arguments for `contract logout`.
#[derive(Parser, Debug)]
pub struct LogoutArgs {
    /// Network to logout from
    #[arg(short, long, default_value = BUILT_IN_NETWORK_NAME)]
    pub network: String,
}

/// Arguments for `contract status`.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Only report this network
    #[arg(short, long)]
    pub network: Option<String>,
}

/// Dispatch a parsed command against the resolved configuration location.
pub async fn run(command: Commands, location: ConfigLocation) -> Result<()> {
    if let Some(path) = location.path() {
        tracing::debug!(path = %path.display(), "using config file");
    }
    let registry = NetworkRegistry::new(ConfigStore::new(location.clone()));
    let tokens = FileTokenStore::new_default();

    match command {
        Commands::Init(args) => config::handle_init(&location, &args),
        Commands::Config => config::handle_config(registry.store()),
        Commands::Network(args) => match args.command {
            NetworkCommands::Add(args) => network::handle_add(&registry, args),
            NetworkCommands::Remove(args) => network::handle_remove(&registry, &args),
            NetworkCommands::Set(args) => network::handle_set(&registry, &args),
            NetworkCommands::List => network::handle_list(&registry),
        },
        Commands::Login(args) => auth::handle_login(&registry, &tokens, &args).await,
        Commands::Logout(args) => auth::handle_logout(&tokens, &args),
        Commands::Status(args) => auth::handle_status(&registry, &tokens, &args),
        Commands::Version => {
            println!("Contract v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Render an error with an actionable hint when one applies.
pub fn format_error_help(err: &ContractError) -> String {
    match err.recovery_suggestion().hint() {
        Some(hint) => format!("{err}\n{hint}"),
        None => err.to_string(),
    }
}

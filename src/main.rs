//! Contract CLI binary entry point.

use clap::Parser;
use contract::cli::{format_error_help, Cli};
use contract::config::ConfigLocation;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    contract::logging::init(cli.verbose);

    let location = ConfigLocation::resolve(cli.config);
    if let Err(err) = contract::cli::run(cli.command, location).await {
        tracing::debug!(kind = %err.kind(), "command failed");
        eprintln!("Error: {}", format_error_help(&err));
        std::process::exit(1);
    }
}

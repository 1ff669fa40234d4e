//! Tracing subscriber setup for the binary.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives; `RUST_LOG` is the
/// fallback.
pub const LOG_ENV_VAR: &str = "CONTRACT_LOG";

const VERBOSE_DIRECTIVE: &str = "contract=debug";

/// Install a stderr fmt subscriber. `verbose` raises this crate to `debug`
/// unless the environment already says otherwise.
pub fn init(verbose: bool) {
    let filter = env_filter(verbose);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn env_filter(verbose: bool) -> EnvFilter {
    let mut directives = std::env::var(LOG_ENV_VAR)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .unwrap_or_default();
    if verbose && directives.trim().is_empty() {
        directives = VERBOSE_DIRECTIVE.to_string();
    }
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives)
}

//! CLI handlers for `contract init` and `contract config`.

use std::path::PathBuf;

use super::InitArgs;
use crate::config::{init_at_path, Config, ConfigLocation, ConfigStore, InitMode};
use crate::error::{ContractError, Result};

/// Handle `contract init`.
pub fn handle_init(location: &ConfigLocation, args: &InitArgs) -> Result<()> {
    let path = match (&args.path, location.path()) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) => path.to_path_buf(),
        (None, None) => return Err(ContractError::ConfigMissing { path: None }),
    };
    let mode = if args.keep_existing {
        InitMode::KeepExisting
    } else {
        InitMode::Overwrite
    };
    init_at_path(&path, mode)?;
    println!("✅ Configuration written to {}", path.display());
    Ok(())
}

/// Handle `contract config`.
pub fn handle_config(store: &ConfigStore) -> Result<()> {
    let config = store.load()?;
    let path = store
        .location()
        .path()
        .map(|path| path.to_path_buf())
        .unwrap_or_default();
    print!("{}", render_config(&config, path)?);
    Ok(())
}

fn render_config(config: &Config, path: PathBuf) -> Result<String> {
    serde_yaml::to_string(config).map_err(|err| ContractError::ConfigParse {
        path,
        message: err.to_string(),
    })
}

//! Configuration file management.

use std::path::PathBuf;

use anyhow::Result;
use dsbridge_filter::BridgeConfig;

use super::ConfigCommands;
use crate::error::CliError;
use crate::output;

pub async fn execute(cmd: &ConfigCommands, json: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Init { path, force } => init(path.clone(), *force, json).await,
        ConfigCommands::Show { path } => show(path.clone(), json).await,
    }
}

fn resolve(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => BridgeConfig::default_config_path(),
    }
}

async fn init(path: Option<PathBuf>, force: bool, json: bool) -> Result<()> {
    let path = resolve(path)?;
    if !force && tokio::fs::try_exists(&path).await? {
        return Err(CliError::InvalidConfiguration(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        ))
        .into());
    }

    let config = BridgeConfig::default();
    config.save_to_path(&path).await?;
    output::print_config(&path, &config, json)
}

async fn show(path: Option<PathBuf>, json: bool) -> Result<()> {
    let path = resolve(path)?;
    let config = BridgeConfig::load_from_path(&path)
        .await
        .map_err(|e| CliError::InvalidConfiguration(format!("{e:#}")))?;
    output::print_config(&path, &config, json)
}

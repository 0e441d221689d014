pub mod cli;
pub mod core;
pub mod providers;

// Re-export for easier access from main.rs
pub use crate::core::config;

use anyhow::Result;
use tracing::{debug, info};

/// A command the binary dispatches to the library. Setup is handled by the
/// binary itself because it must not require an existing config.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Compare { fund_ids: Vec<String>, json: bool },
    Overlap { fund_ids: Vec<String>, json: bool },
}

fn load_config(config_path: Option<&str>) -> Result<config::AppConfig> {
    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fundlens starting...");

    let config = load_config(config_path)?;
    let resolver = providers::resolver_from_config(&config)?;

    match command {
        AppCommand::Compare { fund_ids, json } => {
            cli::compare::run(resolver.as_ref(), fund_ids, json).await
        }
        AppCommand::Overlap { fund_ids, json } => {
            cli::overlap::run(resolver.as_ref(), fund_ids, json).await
        }
    }
}

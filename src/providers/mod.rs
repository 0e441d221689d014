pub mod file_provider;
pub mod http_provider;
pub mod util;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::resolver::FundResolver;
use anyhow::{Result, bail};
use file_provider::FileFundResolver;
use http_provider::HttpFundResolver;
use std::sync::Arc;
use tracing::debug;

/// Builds the resolver named by the config. A data file wins over the API.
pub fn resolver_from_config(config: &AppConfig) -> Result<Box<dyn FundResolver>> {
    if let Some(file) = &config.providers.file {
        debug!("Using fund data file {}", file.path);
        return Ok(Box::new(FileFundResolver::from_path(&file.path)?));
    }
    if let Some(api) = &config.providers.api {
        debug!("Using fund API at {}", api.base_url);
        return Ok(Box::new(HttpFundResolver::new(
            &api.base_url,
            Arc::new(Cache::new()),
        )?));
    }
    bail!("No fund data provider configured. Set providers.file or providers.api in the config file")
}

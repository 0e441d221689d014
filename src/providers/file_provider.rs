use crate::core::fund::Fund;
use crate::core::resolver::FundResolver;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Resolves funds from a local JSON or YAML array of fund records, loaded once.
pub struct FileFundResolver {
    funds: Vec<Fund>,
}

impl FileFundResolver {
    pub fn new(funds: Vec<Fund>) -> Self {
        Self { funds }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fund data file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let funds: Vec<Fund> = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse fund data file: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse fund data file: {}", path.display()))?
        };

        debug!("Loaded {} funds from {}", funds.len(), path.display());
        Ok(Self::new(funds))
    }
}

#[async_trait]
impl FundResolver for FileFundResolver {
    async fn resolve_funds(&self, ids: &[String]) -> Result<Vec<Fund>> {
        let mut resolved: Vec<Fund> = Vec::new();
        for id in ids {
            match self.funds.iter().find(|f| f.matches(id)) {
                Some(fund) if !resolved.iter().any(|r| r.fund_id == fund.fund_id) => {
                    resolved.push(fund.clone())
                }
                Some(_) => debug!("Fund {id} requested more than once"),
                None => debug!("Fund {id} not found in data file"),
            }
        }
        Ok(resolved)
    }
}

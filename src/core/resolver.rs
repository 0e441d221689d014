//! Fund lookup abstraction

use crate::core::fund::Fund;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait FundResolver: Send + Sync {
    /// Returns the records found for `ids`. Unknown ids are dropped, so the
    /// result may be shorter than the request.
    async fn resolve_funds(&self, ids: &[String]) -> Result<Vec<Fund>>;
}

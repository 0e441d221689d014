//! Request handling around the engines: validation, lookup, and the
//! response envelope.
//!
//! Validation and not-found handling happen here, strictly before an engine
//! runs. The engines themselves never fail.
use crate::core::comparison::{FundComparison, compare_funds};
use crate::core::error::AnalysisError;
use crate::core::fund::{Fund, FundProfile, normalize_all};
use crate::core::overlap::{OverlapAnalysis, analyze_overlap};
use crate::core::resolver::FundResolver;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

pub const MIN_FUNDS: usize = 2;
pub const MAX_FUNDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundAnalysisRequest {
    pub fund_ids: Vec<String>,
}

impl FundAnalysisRequest {
    pub fn new(fund_ids: Vec<String>) -> Result<Self, AnalysisError> {
        if fund_ids.len() < MIN_FUNDS {
            return Err(AnalysisError::Validation(format!(
                "At least {MIN_FUNDS} fund IDs are required"
            )));
        }
        if fund_ids.len() > MAX_FUNDS {
            return Err(AnalysisError::Validation(format!(
                "Maximum {MAX_FUNDS} funds can be analyzed at once"
            )));
        }
        Ok(Self { fund_ids })
    }

    /// Parses a `{ "fundIds": [...] }` request body.
    pub fn from_json(body: &str) -> Result<Self, AnalysisError> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| AnalysisError::Validation(format!("Malformed request body: {e}")))?;

        let not_an_array = || AnalysisError::Validation("fundIds must be an array".to_string());
        let fund_ids = value
            .get("fundIds")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(not_an_array)?
            .iter()
            .map(|id| id.as_str().map(str::to_string))
            .collect::<Option<Vec<String>>>()
            .ok_or_else(not_an_array)?;

        Self::new(fund_ids)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    /// Requested ids the resolver returned nothing for.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved_ids: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    fn new(data: T, unresolved_ids: Vec<String>) -> Self {
        Self {
            success: true,
            data,
            unresolved_ids,
            generated_at: Utc::now(),
        }
    }
}

/// Keeps the first record per fund id.
fn dedupe(funds: Vec<Fund>) -> Vec<Fund> {
    let mut seen = HashSet::new();
    funds
        .into_iter()
        .filter(|f| seen.insert(f.fund_id.clone()))
        .collect()
}

async fn resolve_profiles(
    resolver: &dyn FundResolver,
    request: &FundAnalysisRequest,
) -> Result<(Vec<FundProfile>, Vec<String>), AnalysisError> {
    debug!("Resolving funds: {:?}", request.fund_ids);
    let funds = resolver
        .resolve_funds(&request.fund_ids)
        .await
        .map_err(AnalysisError::Resolver)?;
    let funds = dedupe(funds);

    if funds.is_empty() {
        return Err(AnalysisError::NotFound);
    }

    let unresolved: Vec<String> = request
        .fund_ids
        .iter()
        .filter(|id| !funds.iter().any(|f| f.matches(id)))
        .cloned()
        .collect();
    if !unresolved.is_empty() {
        info!(
            "Resolved {} of {} requested funds, missing: {:?}",
            funds.len(),
            request.fund_ids.len(),
            unresolved
        );
    }

    Ok((normalize_all(&funds), unresolved))
}

/// Ranks the requested funds.
pub async fn compare(
    resolver: &dyn FundResolver,
    request: &FundAnalysisRequest,
) -> Result<ApiResponse<FundComparison>, AnalysisError> {
    let (profiles, unresolved) = resolve_profiles(resolver, request).await?;
    let comparison = compare_funds(&profiles);
    info!("Compared {} funds successfully", profiles.len());
    Ok(ApiResponse::new(comparison, unresolved))
}

/// Holdings and sector overlap across the requested funds.
pub async fn overlap(
    resolver: &dyn FundResolver,
    request: &FundAnalysisRequest,
) -> Result<ApiResponse<OverlapAnalysis>, AnalysisError> {
    let (profiles, unresolved) = resolve_profiles(resolver, request).await?;
    let analysis = analyze_overlap(&profiles);
    info!("Calculated overlap for {} funds", profiles.len());
    Ok(ApiResponse::new(analysis, unresolved))
}

pub mod compare;
pub mod overlap;
pub mod setup;
pub mod ui;

use crate::core::error::{AnalysisError, ErrorResponse};
use crate::core::resolver::FundResolver;
use crate::core::service::{ApiResponse, FundAnalysisRequest};
use anyhow::Result;
use serde::Serialize;
use std::future::Future;

/// Prints any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Validates the ids, then runs `analysis` behind a spinner. In JSON mode a
/// failure is also printed as an error body before being returned.
async fn run_analysis<'a, T, F, Fut>(
    resolver: &'a dyn FundResolver,
    fund_ids: Vec<String>,
    json: bool,
    analysis: F,
) -> Result<ApiResponse<T>>
where
    F: FnOnce(&'a dyn FundResolver, FundAnalysisRequest) -> Fut,
    Fut: Future<Output = Result<ApiResponse<T>, AnalysisError>>,
{
    let result = match FundAnalysisRequest::new(fund_ids) {
        Ok(request) => {
            let spinner = ui::new_spinner("Analyzing funds...");
            let result = analysis(resolver, request).await;
            spinner.finish_and_clear();
            result
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => Ok(response),
        Err(e) => {
            if json {
                print_json(&ErrorResponse::from(&e))?;
            }
            Err(e.into())
        }
    }
}

/// Lists requested ids that matched no fund.
fn print_unresolved(unresolved_ids: &[String]) {
    if !unresolved_ids.is_empty() {
        println!(
            "{}",
            ui::style_text(
                &format!("Not found: {}", unresolved_ids.join(", ")),
                ui::StyleType::Error
            )
        );
    }
}

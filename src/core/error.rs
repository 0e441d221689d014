//! Request-level error taxonomy.
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Validation(String),

    #[error("No funds found with the provided IDs")]
    NotFound,

    #[error("fund lookup failed: {0:#}")]
    Resolver(#[source] anyhow::Error),
}

impl AnalysisError {
    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::Validation(_) => 400,
            AnalysisError::NotFound => 404,
            AnalysisError::Resolver(_) => 500,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisError::Validation(_) => "Invalid request",
            AnalysisError::NotFound => "Funds not found",
            AnalysisError::Resolver(_) => "Internal server error",
        }
    }
}

/// Body returned alongside a non-200 status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl From<&AnalysisError> for ErrorResponse {
    fn from(err: &AnalysisError) -> Self {
        ErrorResponse {
            success: false,
            error: err.label().to_string(),
            message: err.to_string(),
        }
    }
}

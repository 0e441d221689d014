//! Core business logic and abstractions

pub mod cache;
pub mod comparison;
pub mod config;
pub mod error;
pub mod fund;
pub mod log;
pub mod overlap;
pub mod recommendation;
pub mod resolver;
pub mod sector;
pub mod service;

// Re-export main types for cleaner imports
pub use error::AnalysisError;
pub use fund::{Fund, FundProfile, RiskLevel};
pub use resolver::FundResolver;

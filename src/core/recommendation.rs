//! Rule-based advice derived from an overlap analysis.
use crate::core::overlap::{HoldingsOverlap, OverlapLevel};
use crate::core::sector::SectorOverlap;
use std::fmt::Display;

/// Common holdings beyond which a concentration review is suggested.
const COMMON_HOLDINGS_REVIEW_THRESHOLD: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    HighOverlap,
    ModerateOverlap,
    LowOverlap,
    ReviewConcentration { common_holdings: usize },
    SectorConcentration { sector: String },
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::HighOverlap => write!(
                f,
                "High overlap detected (>50%). Consider diversifying across different funds or categories."
            ),
            Recommendation::ModerateOverlap => write!(
                f,
                "Moderate overlap (30-50%). Your portfolio has some redundancy but is reasonably diversified."
            ),
            Recommendation::LowOverlap => write!(
                f,
                "Low overlap (<30%). Your portfolio is well-diversified across different holdings."
            ),
            Recommendation::ReviewConcentration { common_holdings } => write!(
                f,
                "You have {common_holdings} common holdings. Review if this concentration aligns with your risk profile."
            ),
            Recommendation::SectorConcentration { sector } => write!(
                f,
                "All funds have exposure to {sector}. Consider adding funds from other sectors for better diversification."
            ),
        }
    }
}

/// Applies the rules in order. The overlap-level advice is always first.
pub fn recommendations_for(
    holdings: &HoldingsOverlap,
    sectors: &[SectorOverlap],
    fund_count: usize,
) -> Vec<Recommendation> {
    let mut recommendations = vec![match OverlapLevel::from_average(holdings.average_overlap) {
        OverlapLevel::High => Recommendation::HighOverlap,
        OverlapLevel::Moderate => Recommendation::ModerateOverlap,
        OverlapLevel::Low => Recommendation::LowOverlap,
    }];

    let common_holdings = holdings.common_holdings.len();
    if common_holdings > COMMON_HOLDINGS_REVIEW_THRESHOLD {
        recommendations.push(Recommendation::ReviewConcentration { common_holdings });
    }

    if let Some(top) = sectors.first()
        && fund_count > 0
        && top.funds_with_sector == fund_count
    {
        recommendations.push(Recommendation::SectorConcentration {
            sector: top.sector.clone(),
        });
    }

    recommendations
}

//! Sector exposure shared across funds.
use crate::core::fund::{FundProfile, mean, round2};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorShare {
    pub fund_id: String,
    pub fund_name: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorOverlap {
    pub sector: String,
    /// Mean allocation over every compared fund; funds without the sector count as 0.
    pub average_allocation: f64,
    pub funds_with_sector: usize,
    pub allocations: Vec<SectorShare>,
}

/// Per-sector allocation across funds, most widely held sectors first.
pub fn calculate_sector_overlap(funds: &[FundProfile]) -> Vec<SectorOverlap> {
    let mut sectors: Vec<(&str, Vec<f64>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for (fund_index, fund) in funds.iter().enumerate() {
        for allocation in &fund.sector_allocation {
            let sector = allocation.sector.as_str();
            let position = *positions.entry(sector).or_insert_with(|| {
                sectors.push((sector, vec![0.0; funds.len()]));
                sectors.len() - 1
            });
            sectors[position].1[fund_index] = allocation.percentage;
        }
    }

    let mut overlap: Vec<SectorOverlap> = sectors
        .into_iter()
        .map(|(sector, allocations)| SectorOverlap {
            sector: sector.to_string(),
            average_allocation: round2(mean(allocations.iter().copied())),
            funds_with_sector: allocations.iter().filter(|pct| **pct > 0.0).count(),
            allocations: funds
                .iter()
                .zip(allocations)
                .map(|(fund, percentage)| SectorShare {
                    fund_id: fund.fund_id.clone(),
                    fund_name: fund.name.clone(),
                    percentage,
                })
                .collect(),
        })
        .collect();

    overlap.sort_by(|a, b| b.funds_with_sector.cmp(&a.funds_with_sector));
    overlap
}

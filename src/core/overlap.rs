//! Holdings overlap diagnostics for a set of funds.
//!
//! Securities are matched by identity key (ticker, else name), so funds that
//! spell the same security differently are not recognised as overlapping.
use crate::core::fund::{FundProfile, mean, round2};
use crate::core::recommendation::recommendations_for;
use crate::core::sector::{SectorOverlap, calculate_sector_overlap};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Display;
use tracing::debug;

/// Summed weight across funds above which a security counts as duplicated
/// exposure.
const DUPLICATE_EXPOSURE_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingShare {
    pub fund_id: String,
    pub fund_name: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonHolding {
    pub name: String,
    pub sector: String,
    pub appears_in: usize,
    pub funds: Vec<HoldingShare>,
    pub average_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueHoldings {
    pub fund_id: String,
    pub fund_name: String,
    pub holdings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairwiseOverlap {
    pub fund1: String,
    pub fund2: String,
    pub fund1_id: String,
    pub fund2_id: String,
    /// Jaccard similarity of the two funds' holding keys, in percent.
    pub overlap_percentage: f64,
    pub common_stocks: usize,
    /// Sum of the smaller weight of each shared holding.
    pub weighted_overlap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapInsights {
    pub most_overlapping_pair: PairwiseOverlap,
    pub least_overlapping_pair: PairwiseOverlap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateExposure {
    pub name: String,
    pub total_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsOverlap {
    pub overlap_percentage: f64,
    pub common_holdings: Vec<CommonHolding>,
    pub unique_holdings: Vec<UniqueHoldings>,
    pub pairwise_overlaps: Vec<PairwiseOverlap>,
    pub average_overlap: f64,
    pub insights: Option<OverlapInsights>,
    pub duplicate_exposure: Vec<DuplicateExposure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverlapLevel {
    Low,
    Moderate,
    High,
}

impl OverlapLevel {
    pub fn from_average(average_overlap: f64) -> Self {
        if average_overlap > 50.0 {
            OverlapLevel::High
        } else if average_overlap > 30.0 {
            OverlapLevel::Moderate
        } else {
            OverlapLevel::Low
        }
    }
}

impl Display for OverlapLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                OverlapLevel::Low => "LOW",
                OverlapLevel::Moderate => "MODERATE",
                OverlapLevel::High => "HIGH",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSummary {
    pub fund_id: String,
    pub name: String,
    pub category: String,
    pub holdings_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapSummary {
    pub total_funds: usize,
    pub average_overlap: f64,
    pub overlap_level: OverlapLevel,
    pub diversification_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapAnalysis {
    pub funds: Vec<FundSummary>,
    pub holdings_overlap: HoldingsOverlap,
    pub sector_overlap: Vec<SectorOverlap>,
    pub recommendations: Vec<String>,
    pub summary: OverlapSummary,
}

/// Maps each identity key to the funds holding it, in first-seen key order.
struct HoldingIndex<'a> {
    keys: Vec<(&'a str, BTreeSet<usize>)>,
    positions: HashMap<&'a str, usize>,
}

impl<'a> HoldingIndex<'a> {
    fn build(funds: &'a [FundProfile]) -> Self {
        let mut index = HoldingIndex {
            keys: Vec::new(),
            positions: HashMap::new(),
        };
        for (fund_index, fund) in funds.iter().enumerate() {
            for holding in &fund.holdings {
                let key = holding.key.as_str();
                if key.is_empty() {
                    continue;
                }
                let position = *index.positions.entry(key).or_insert_with(|| {
                    index.keys.push((key, BTreeSet::new()));
                    index.keys.len() - 1
                });
                index.keys[position].1.insert(fund_index);
            }
        }
        index
    }
}

fn key_set(fund: &FundProfile) -> HashSet<&str> {
    fund.holdings
        .iter()
        .map(|h| h.key.as_str())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Weight of the first position in `fund` matching `key`.
fn weight_of(fund: &FundProfile, key: &str) -> f64 {
    fund.holdings
        .iter()
        .find(|h| h.key == key)
        .map_or(0.0, |h| h.percentage)
}

fn pairwise_overlap(a: &FundProfile, b: &FundProfile) -> PairwiseOverlap {
    let keys_a = key_set(a);
    let keys_b = key_set(b);
    let shared: Vec<&str> = keys_a.intersection(&keys_b).copied().collect();
    let union = keys_a.union(&keys_b).count();

    let jaccard = if union == 0 {
        0.0
    } else {
        shared.len() as f64 / union as f64 * 100.0
    };
    let weighted: f64 = shared
        .iter()
        .map(|key| weight_of(a, key).min(weight_of(b, key)))
        .sum();

    PairwiseOverlap {
        fund1: a.name.clone(),
        fund2: b.name.clone(),
        fund1_id: a.fund_id.clone(),
        fund2_id: b.fund_id.clone(),
        overlap_percentage: round2(jaccard),
        common_stocks: shared.len(),
        weighted_overlap: round2(weighted),
    }
}

fn insights_for(pairs: &[PairwiseOverlap]) -> Option<OverlapInsights> {
    let first = pairs.first()?;
    let (most, least) = pairs.iter().skip(1).fold((first, first), |(most, least), p| {
        (
            if p.overlap_percentage > most.overlap_percentage { p } else { most },
            if p.overlap_percentage < least.overlap_percentage { p } else { least },
        )
    });
    Some(OverlapInsights {
        most_overlapping_pair: most.clone(),
        least_overlapping_pair: least.clone(),
    })
}

fn duplicate_exposure(funds: &[FundProfile]) -> Vec<DuplicateExposure> {
    let mut totals: Vec<DuplicateExposure> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for holding in funds.iter().flat_map(|f| &f.holdings) {
        if holding.key.is_empty() {
            continue;
        }
        match positions.get(holding.key.as_str()) {
            Some(&i) => totals[i].total_weight += holding.percentage,
            None => {
                positions.insert(holding.key.as_str(), totals.len());
                totals.push(DuplicateExposure {
                    name: holding.key.clone(),
                    total_weight: holding.percentage,
                });
            }
        }
    }

    let mut duplicates: Vec<DuplicateExposure> = totals
        .into_iter()
        .filter(|d| d.total_weight > DUPLICATE_EXPOSURE_THRESHOLD)
        .map(|d| DuplicateExposure {
            total_weight: round2(d.total_weight),
            ..d
        })
        .collect();
    duplicates.sort_by(|a, b| b.total_weight.total_cmp(&a.total_weight));
    duplicates
}

/// Common, unique and pairwise holdings overlap across `funds`.
pub fn calculate_holdings_overlap(funds: &[FundProfile]) -> HoldingsOverlap {
    let index = HoldingIndex::build(funds);

    let mut common_holdings = Vec::new();
    let mut unique_holdings: Vec<UniqueHoldings> = funds
        .iter()
        .map(|f| UniqueHoldings {
            fund_id: f.fund_id.clone(),
            fund_name: f.name.clone(),
            holdings: Vec::new(),
        })
        .collect();

    for (key, holders) in &index.keys {
        if holders.len() > 1 {
            let shares: Vec<HoldingShare> = holders
                .iter()
                .map(|&i| HoldingShare {
                    fund_id: funds[i].fund_id.clone(),
                    fund_name: funds[i].name.clone(),
                    percentage: weight_of(&funds[i], key),
                })
                .collect();
            let sector = holders
                .first()
                .and_then(|&i| funds[i].holdings.iter().find(|h| h.key == *key))
                .map(|h| h.sector.clone())
                .unwrap_or_default();
            common_holdings.push(CommonHolding {
                name: key.to_string(),
                sector,
                appears_in: holders.len(),
                average_percentage: round2(mean(shares.iter().map(|s| s.percentage))),
                funds: shares,
            });
        } else if let Some(&only) = holders.first() {
            unique_holdings[only].holdings.push(key.to_string());
        }
    }
    common_holdings.sort_by(|a, b| b.appears_in.cmp(&a.appears_in));

    let total_keys = index.keys.len();
    let overlap_percentage = if total_keys == 0 {
        0.0
    } else {
        round2(common_holdings.len() as f64 / total_keys as f64 * 100.0)
    };

    let mut pairwise_overlaps = Vec::new();
    for i in 0..funds.len() {
        for j in (i + 1)..funds.len() {
            pairwise_overlaps.push(pairwise_overlap(&funds[i], &funds[j]));
        }
    }
    let average_overlap = round2(mean(pairwise_overlaps.iter().map(|p| p.overlap_percentage)));

    debug!(
        "Holdings overlap: {} distinct keys, {} common, average overlap {average_overlap}",
        total_keys,
        common_holdings.len()
    );

    HoldingsOverlap {
        overlap_percentage,
        common_holdings,
        unique_holdings,
        insights: insights_for(&pairwise_overlaps),
        pairwise_overlaps,
        average_overlap,
        duplicate_exposure: duplicate_exposure(funds),
    }
}

/// 100 minus the average pairwise overlap, clamped to [0, 100].
pub fn diversification_score(average_overlap: f64) -> f64 {
    round2((100.0 - average_overlap).clamp(0.0, 100.0))
}

/// Full overlap analysis: holdings, sectors, recommendations and summary.
pub fn analyze_overlap(funds: &[FundProfile]) -> OverlapAnalysis {
    let holdings_overlap = calculate_holdings_overlap(funds);
    let sector_overlap = calculate_sector_overlap(funds);
    let recommendations = recommendations_for(&holdings_overlap, &sector_overlap, funds.len())
        .iter()
        .map(ToString::to_string)
        .collect();

    let average_overlap = holdings_overlap.average_overlap;
    let summary = OverlapSummary {
        total_funds: funds.len(),
        average_overlap,
        overlap_level: OverlapLevel::from_average(average_overlap),
        diversification_score: diversification_score(average_overlap),
    };

    OverlapAnalysis {
        funds: funds
            .iter()
            .map(|f| FundSummary {
                fund_id: f.fund_id.clone(),
                name: f.name.clone(),
                category: f.category.clone(),
                holdings_count: f.holdings.len(),
            })
            .collect(),
        holdings_overlap,
        sector_overlap,
        recommendations,
        summary,
    }
}

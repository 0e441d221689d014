//! Weighted multi-criteria ranking across a small set of funds.
//!
//! Scores are relative to the compared set only: a fund earns a criterion's
//! points when it exactly matches the best value among the funds supplied.
use crate::core::fund::{FundProfile, PeriodReturns, RiskLevel, mean, round2};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

const ONE_YEAR_POINTS: u32 = 15;
const THREE_YEAR_POINTS: u32 = 15;
const FIVE_YEAR_POINTS: u32 = 10;
const EXPENSE_RATIO_POINTS: u32 = 30;
const AUM_POINTS: u32 = 20;
const TOP_PERFORMER_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criterion {
    OneYearReturn,
    ThreeYearReturn,
    FiveYearReturn,
    ExpenseRatio,
    Aum,
    Risk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub criterion: Criterion,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedFund {
    pub fund_id: String,
    pub name: String,
    pub category: String,
    pub sub_category: String,
    pub fund_house: String,
    pub current_nav: f64,
    pub nav_date: Option<NaiveDate>,
    pub returns: PeriodReturns,
    pub expense_ratio: f64,
    pub aum: f64,
    pub risk_level: RiskLevel,
    pub comparison_score: u32,
    pub is_top_performer: bool,
    pub score_breakdown: Vec<ScoreComponent>,
}

/// Best-in-class values across the compared set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMetrics {
    pub best_one_year_return: f64,
    pub best_three_year_return: f64,
    pub best_five_year_return: f64,
    /// Lowest expense ratio among funds reporting one; zero means unknown.
    pub lowest_expense_ratio: Option<f64>,
    #[serde(rename = "highestAUM")]
    pub highest_aum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub total_funds: usize,
    pub top_performer: Option<String>,
    pub average_expense_ratio: f64,
    pub average_one_year_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundComparison {
    pub funds: Vec<RankedFund>,
    pub metrics: ComparisonMetrics,
    pub summary: ComparisonSummary,
}

fn max_of(funds: &[FundProfile], field: impl Fn(&FundProfile) -> f64) -> f64 {
    funds.iter().map(field).fold(0.0, f64::max)
}

impl ComparisonMetrics {
    pub fn from_funds(funds: &[FundProfile]) -> Self {
        let lowest_expense_ratio = funds
            .iter()
            .map(|f| f.expense_ratio)
            .filter(|er| *er > 0.0)
            .reduce(f64::min);

        ComparisonMetrics {
            best_one_year_return: max_of(funds, |f| f.returns.one_year),
            best_three_year_return: max_of(funds, |f| f.returns.three_year),
            best_five_year_return: max_of(funds, |f| f.returns.five_year),
            lowest_expense_ratio,
            highest_aum: max_of(funds, |f| f.aum),
        }
    }
}

/// Criteria the fund earned against `metrics`, in scoring order.
pub fn score_fund(fund: &FundProfile, metrics: &ComparisonMetrics) -> Vec<ScoreComponent> {
    let checks = [
        (
            Criterion::OneYearReturn,
            fund.returns.one_year == metrics.best_one_year_return,
            ONE_YEAR_POINTS,
        ),
        (
            Criterion::ThreeYearReturn,
            fund.returns.three_year == metrics.best_three_year_return,
            THREE_YEAR_POINTS,
        ),
        (
            Criterion::FiveYearReturn,
            fund.returns.five_year == metrics.best_five_year_return,
            FIVE_YEAR_POINTS,
        ),
        (
            Criterion::ExpenseRatio,
            metrics.lowest_expense_ratio == Some(fund.expense_ratio),
            EXPENSE_RATIO_POINTS,
        ),
        (Criterion::Aum, fund.aum == metrics.highest_aum, AUM_POINTS),
        (Criterion::Risk, true, fund.risk_level.score()),
    ];

    checks
        .into_iter()
        .filter(|(_, earned, _)| *earned)
        .map(|(criterion, _, points)| ScoreComponent { criterion, points })
        .collect()
}

/// Ranks the funds by comparison score, highest first. Equal scores keep
/// their input order.
pub fn compare_funds(funds: &[FundProfile]) -> FundComparison {
    let metrics = ComparisonMetrics::from_funds(funds);
    debug!("Comparison metrics: {metrics:?}");

    let mut ranked: Vec<RankedFund> = funds
        .iter()
        .map(|fund| {
            let score_breakdown = score_fund(fund, &metrics);
            let comparison_score = score_breakdown.iter().map(|c| c.points).sum();
            debug!("Fund {} scored {comparison_score}", fund.fund_id);
            RankedFund {
                fund_id: fund.fund_id.clone(),
                name: fund.name.clone(),
                category: fund.category.clone(),
                sub_category: fund.sub_category.clone(),
                fund_house: fund.fund_house.clone(),
                current_nav: fund.current_nav,
                nav_date: fund.nav_date,
                returns: fund.returns.clone(),
                expense_ratio: fund.expense_ratio,
                aum: fund.aum,
                risk_level: fund.risk_level,
                comparison_score,
                is_top_performer: comparison_score >= TOP_PERFORMER_THRESHOLD,
                score_breakdown,
            }
        })
        .collect();

    // sort_by is stable, which gives the documented tie-break
    ranked.sort_by(|a, b| b.comparison_score.cmp(&a.comparison_score));

    let summary = ComparisonSummary {
        total_funds: funds.len(),
        top_performer: ranked.first().map(|f| f.name.clone()),
        average_expense_ratio: round2(mean(funds.iter().map(|f| f.expense_ratio))),
        average_one_year_return: round2(mean(funds.iter().map(|f| f.returns.one_year))),
    };

    FundComparison {
        funds: ranked,
        metrics,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(
        id: &str,
        one_year: f64,
        expense_ratio: f64,
        aum: f64,
        risk: RiskLevel,
    ) -> FundProfile {
        FundProfile {
            fund_id: id.to_string(),
            name: format!("Fund {id}"),
            category: "equity".to_string(),
            sub_category: "Large Cap".to_string(),
            fund_house: "Rust AMC".to_string(),
            current_nav: 100.0,
            nav_date: None,
            returns: PeriodReturns {
                one_year,
                three_year: 0.0,
                five_year: 0.0,
            },
            expense_ratio,
            aum,
            risk_level: risk,
            holdings: Vec::new(),
            sector_allocation: Vec::new(),
        }
    }

    #[test]
    fn test_two_fund_scoring() {
        let a = profile("A", 42.5, 0.68, 45000.0, RiskLevel::High);
        let b = profile("B", 35.2, 0.52, 38000.0, RiskLevel::Medium);

        let result = compare_funds(&[a, b]);

        // A: 1Y(15) + AUM(20) + HIGH(4) + tied zero 3Y/5Y (15 + 10) = 64
        // B: expense(30) + MEDIUM(7) + tied zero 3Y/5Y (15 + 10) = 62
        assert_eq!(result.funds[0].fund_id, "A");
        assert_eq!(result.funds[0].comparison_score, 64);
        assert_eq!(result.funds[1].fund_id, "B");
        assert_eq!(result.funds[1].comparison_score, 62);
        assert!(result.funds.iter().all(|f| f.is_top_performer));

        assert_eq!(result.metrics.best_one_year_return, 42.5);
        assert_eq!(result.metrics.lowest_expense_ratio, Some(0.52));
        assert_eq!(result.metrics.highest_aum, 45000.0);

        assert_eq!(result.summary.total_funds, 2);
        assert_eq!(result.summary.top_performer.as_deref(), Some("Fund A"));
        assert_eq!(result.summary.average_expense_ratio, 0.6);
        assert_eq!(result.summary.average_one_year_return, 38.85);
    }

    #[test]
    fn test_breakdown_explains_score() {
        let mut a = profile("A", 42.5, 0.68, 45000.0, RiskLevel::High);
        a.returns.three_year = 12.0;
        let mut b = profile("B", 35.2, 0.52, 38000.0, RiskLevel::Medium);
        b.returns.five_year = 14.0;

        let result = compare_funds(&[a, b]);
        let fund_a = result.funds.iter().find(|f| f.fund_id == "A").unwrap();
        let fund_b = result.funds.iter().find(|f| f.fund_id == "B").unwrap();

        let criteria_a: Vec<Criterion> = fund_a
            .score_breakdown
            .iter()
            .map(|c| c.criterion)
            .collect();
        assert_eq!(
            criteria_a,
            vec![
                Criterion::OneYearReturn,
                Criterion::ThreeYearReturn,
                Criterion::Aum,
                Criterion::Risk
            ]
        );
        assert_eq!(fund_a.comparison_score, 15 + 15 + 20 + 4);
        assert_eq!(fund_b.comparison_score, 10 + 30 + 7);
        for fund in &result.funds {
            let total: u32 = fund.score_breakdown.iter().map(|c| c.points).sum();
            assert_eq!(total, fund.comparison_score);
        }
    }

    #[test]
    fn test_all_zero_expense_ratios_earn_no_credit() {
        let a = profile("A", 10.0, 0.0, 100.0, RiskLevel::Low);
        let b = profile("B", 12.0, 0.0, 200.0, RiskLevel::Low);

        let result = compare_funds(&[a, b]);

        assert_eq!(result.metrics.lowest_expense_ratio, None);
        assert!(result.funds.iter().all(|f| {
            !f.score_breakdown
                .iter()
                .any(|c| c.criterion == Criterion::ExpenseRatio)
        }));
    }

    #[test]
    fn test_zero_expense_ratio_is_not_lowest() {
        let a = profile("A", 10.0, 0.0, 100.0, RiskLevel::Low);
        let b = profile("B", 10.0, 1.2, 100.0, RiskLevel::Low);

        let result = compare_funds(&[a, b]);

        assert_eq!(result.metrics.lowest_expense_ratio, Some(1.2));
        assert_eq!(result.funds[0].fund_id, "B");
        assert_eq!(result.funds[0].comparison_score, 100);
        assert_eq!(result.funds[1].comparison_score, 70);
    }

    #[test]
    fn test_identical_funds_score_equally_and_keep_order() {
        let funds: Vec<FundProfile> = ["C", "A", "B"]
            .iter()
            .map(|id| profile(id, 11.0, 0.9, 500.0, RiskLevel::Medium))
            .collect();

        let result = compare_funds(&funds);

        assert!(result.funds.iter().all(|f| f.comparison_score == 97));
        let order: Vec<&str> = result.funds.iter().map(|f| f.fund_id.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_scores_bounded_for_all_set_sizes() {
        let risks = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];
        for n in 2..=5 {
            let funds: Vec<FundProfile> = (0..n)
                .map(|i| {
                    profile(
                        &format!("F{i}"),
                        i as f64 * 3.5,
                        0.5 + i as f64 * 0.1,
                        1000.0 - i as f64 * 50.0,
                        risks[i % 3],
                    )
                })
                .collect();

            let result = compare_funds(&funds);
            assert_eq!(result.funds.len(), n);
            assert!(result.funds.iter().all(|f| f.comparison_score <= 100));
            assert!(
                result
                    .funds
                    .windows(2)
                    .all(|w| w[0].comparison_score >= w[1].comparison_score)
            );
        }
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let funds = vec![
            profile("A", 42.5, 0.68, 45000.0, RiskLevel::High),
            profile("B", 35.2, 0.52, 38000.0, RiskLevel::Medium),
            profile("C", 35.2, 0.52, 45000.0, RiskLevel::Low),
        ];
        assert_eq!(compare_funds(&funds), compare_funds(&funds));
    }

    #[test]
    fn test_empty_input_degrades_to_defaults() {
        let result = compare_funds(&[]);
        assert!(result.funds.is_empty());
        assert_eq!(result.summary.top_performer, None);
        assert_eq!(result.summary.average_expense_ratio, 0.0);
        assert_eq!(result.metrics.highest_aum, 0.0);
    }
}

//! Fund records as supplied by resolvers, and their normalized form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    /// Points awarded by the comparison ranking.
    pub fn score(&self) -> u32 {
        match self {
            RiskLevel::Low => 10,
            RiskLevel::Medium => 7,
            RiskLevel::High => 4,
        }
    }
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RiskLevel::Low => "LOW",
                RiskLevel::Medium => "MEDIUM",
                RiskLevel::High => "HIGH",
            }
        )
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            _ => Err(anyhow::anyhow!("Invalid risk level: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Returns {
    pub one_year: Option<f64>,
    pub three_year: Option<f64>,
    pub five_year: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub name: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub sector: Option<String>,
}

impl Holding {
    /// Identity used to match the same security across funds: ticker if
    /// present, else name. A blank ticker counts as absent.
    pub fn key(&self) -> &str {
        match self.ticker.as_deref().map(str::trim) {
            Some(ticker) if !ticker.is_empty() => ticker,
            _ => self.name.trim(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorAllocation {
    pub sector: String,
    #[serde(default)]
    pub percentage: Option<f64>,
}

/// A fund record exactly as a resolver returns it. Anything beyond the id and
/// name may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub fund_id: String,
    #[serde(default)]
    pub amfi_code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub fund_house: Option<String>,
    #[serde(default)]
    pub current_nav: Option<f64>,
    #[serde(default)]
    pub nav_date: Option<NaiveDate>,
    #[serde(default)]
    pub returns: Option<Returns>,
    #[serde(default)]
    pub expense_ratio: Option<f64>,
    #[serde(default)]
    pub aum: Option<f64>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub holdings: Vec<Holding>,
    #[serde(default)]
    pub sector_allocation: Vec<SectorAllocation>,
}

impl Fund {
    /// True if `identifier` names this fund by id or AMFI code.
    pub fn matches(&self, identifier: &str) -> bool {
        self.fund_id == identifier || self.amfi_code.as_deref() == Some(identifier)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReturns {
    pub one_year: f64,
    pub three_year: f64,
    pub five_year: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPosition {
    pub key: String,
    pub name: String,
    pub ticker: Option<String>,
    pub percentage: f64,
    pub sector: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorWeight {
    pub sector: String,
    pub percentage: f64,
}

/// A fund with every optional field resolved to its default. Both engines
/// operate only on this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundProfile {
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
    #[serde(skip)]
    pub holdings: Vec<HoldingPosition>,
    #[serde(skip)]
    pub sector_allocation: Vec<SectorWeight>,
}

/// Clamps missing, negative and non-finite values to zero.
pub fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean, 0 for an empty sequence.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

fn parse_risk_level(fund_id: &str, raw: Option<&str>) -> RiskLevel {
    match raw {
        None => RiskLevel::default(),
        Some(value) => value.parse().unwrap_or_else(|e| {
            debug!("Fund {fund_id}: {e}, defaulting to MEDIUM");
            RiskLevel::default()
        }),
    }
}

impl From<&Fund> for FundProfile {
    fn from(fund: &Fund) -> Self {
        let returns = fund.returns.clone().unwrap_or_default();

        let holdings = fund
            .holdings
            .iter()
            .map(|h| HoldingPosition {
                key: h.key().to_string(),
                name: h.name.clone(),
                ticker: h
                    .ticker
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
                percentage: non_negative(h.percentage),
                sector: h.sector.clone().unwrap_or_default(),
            })
            .collect();

        let sector_allocation = fund
            .sector_allocation
            .iter()
            .map(|s| SectorWeight {
                sector: s.sector.clone(),
                percentage: non_negative(s.percentage),
            })
            .collect();

        FundProfile {
            fund_id: fund.fund_id.clone(),
            name: fund.name.clone(),
            category: fund.category.clone().unwrap_or_default(),
            sub_category: fund.sub_category.clone().unwrap_or_default(),
            fund_house: fund.fund_house.clone().unwrap_or_default(),
            current_nav: non_negative(fund.current_nav),
            nav_date: fund.nav_date,
            returns: PeriodReturns {
                one_year: non_negative(returns.one_year),
                three_year: non_negative(returns.three_year),
                five_year: non_negative(returns.five_year),
            },
            expense_ratio: non_negative(fund.expense_ratio),
            aum: non_negative(fund.aum),
            risk_level: parse_risk_level(&fund.fund_id, fund.risk_level.as_deref()),
            holdings,
            sector_allocation,
        }
    }
}

/// Normalizes every fund once at engine entry.
pub fn normalize_all(funds: &[Fund]) -> Vec<FundProfile> {
    funds.iter().map(FundProfile::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_fund(id: &str) -> Fund {
        Fund {
            fund_id: id.to_string(),
            amfi_code: None,
            name: format!("Fund {id}"),
            category: None,
            sub_category: None,
            fund_house: None,
            current_nav: None,
            nav_date: None,
            returns: None,
            expense_ratio: None,
            aum: None,
            risk_level: None,
            holdings: Vec::new(),
            sector_allocation: Vec::new(),
        }
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let profile = FundProfile::from(&bare_fund("F1"));

        assert_eq!(profile.current_nav, 0.0);
        assert_eq!(profile.returns.one_year, 0.0);
        assert_eq!(profile.returns.three_year, 0.0);
        assert_eq!(profile.returns.five_year, 0.0);
        assert_eq!(profile.expense_ratio, 0.0);
        assert_eq!(profile.aum, 0.0);
        assert_eq!(profile.risk_level, RiskLevel::Medium);
        assert_eq!(profile.category, "");
        assert!(profile.holdings.is_empty());
        assert!(profile.sector_allocation.is_empty());
    }

    #[test]
    fn test_negative_and_nan_values_clamped() {
        let mut fund = bare_fund("F1");
        fund.aum = Some(-5.0);
        fund.expense_ratio = Some(f64::NAN);
        fund.returns = Some(Returns {
            one_year: Some(-12.3),
            three_year: Some(8.0),
            five_year: None,
        });

        let profile = FundProfile::from(&fund);
        assert_eq!(profile.aum, 0.0);
        assert_eq!(profile.expense_ratio, 0.0);
        assert_eq!(profile.returns.one_year, 0.0);
        assert_eq!(profile.returns.three_year, 8.0);
    }

    #[test]
    fn test_risk_level_parsing() {
        let mut fund = bare_fund("F1");
        fund.risk_level = Some("low".to_string());
        assert_eq!(FundProfile::from(&fund).risk_level, RiskLevel::Low);

        fund.risk_level = Some(" High ".to_string());
        assert_eq!(FundProfile::from(&fund).risk_level, RiskLevel::High);

        fund.risk_level = Some("VERY_HIGH".to_string());
        assert_eq!(FundProfile::from(&fund).risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_holding_key_prefers_ticker() {
        let with_ticker = Holding {
            name: "Tata Consultancy Services".to_string(),
            ticker: Some("TCS".to_string()),
            percentage: Some(5.0),
            sector: None,
        };
        let empty_ticker = Holding {
            ticker: Some(String::new()),
            ..with_ticker.clone()
        };
        let no_ticker = Holding {
            ticker: None,
            ..with_ticker.clone()
        };

        assert_eq!(with_ticker.key(), "TCS");
        assert_eq!(empty_ticker.key(), "Tata Consultancy Services");
        assert_eq!(no_ticker.key(), "Tata Consultancy Services");
    }

    #[test]
    fn test_blank_ticker_falls_back_to_name() {
        let holding = Holding {
            name: " Infosys ".to_string(),
            ticker: Some("  ".to_string()),
            percentage: Some(5.0),
            sector: None,
        };
        assert_eq!(holding.key(), "Infosys");

        let padded = Holding {
            ticker: Some(" INFY ".to_string()),
            ..holding.clone()
        };
        assert_eq!(padded.key(), "INFY");

        let fund: Fund = serde_json::from_str(
            r#"{ "fundId": "A", "name": "Fund A", "holdings": [ { "name": "Infosys", "ticker": "  ", "percentage": 5 } ] }"#,
        )
        .unwrap();
        let profile = FundProfile::from(&fund);
        assert_eq!(profile.holdings[0].key, "Infosys");
        assert_eq!(profile.holdings[0].ticker, None);
    }

    #[test]
    fn test_fund_deserialization_from_camel_case() {
        let json = r#"{
            "fundId": "INF179K01BB8",
            "amfiCode": "119551",
            "name": "HDFC Top 100 Fund",
            "subCategory": "Large Cap",
            "currentNav": 1043.5,
            "navDate": "2025-06-30",
            "returns": { "oneYear": 18.2, "threeYear": 21.4 },
            "expenseRatio": 1.05,
            "riskLevel": "HIGH",
            "holdings": [
                { "name": "HDFC Bank", "ticker": "HDFCBANK", "percentage": 9.8, "sector": "Financials" }
            ],
            "sectorAllocation": [ { "sector": "Financials", "percentage": 32.1 } ]
        }"#;

        let fund: Fund = serde_json::from_str(json).unwrap();
        assert!(fund.matches("INF179K01BB8"));
        assert!(fund.matches("119551"));
        assert!(!fund.matches("HDFC"));

        let profile = FundProfile::from(&fund);
        assert_eq!(profile.sub_category, "Large Cap");
        assert_eq!(profile.returns.five_year, 0.0);
        assert_eq!(profile.holdings[0].key, "HDFCBANK");
        assert_eq!(profile.sector_allocation[0].percentage, 32.1);
        assert_eq!(
            profile.nav_date,
            Some(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap())
        );
    }

    #[test]
    fn test_numeric_helpers() {
        assert_eq!(round2(42.857142), 42.86);
        assert_eq!(mean(Vec::<f64>::new()), 0.0);
        assert_eq!(mean([10.0, 20.0, 30.0]), 20.0);
        assert_eq!(non_negative(Some(f64::INFINITY)), 0.0);
    }
}

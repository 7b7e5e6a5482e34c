use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::advisor::AdvisorBriefing;

/// JSON consumed by the dashboard front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardPayload {
    pub assets: Vec<AssetEntry>,
    pub holdings: Vec<HoldingEntry>,
    pub chart_data: Vec<ChartDatum>,
    /// Formatted `#,##0.00`.
    pub total_balance: String,
    /// `%Y-%m-%d %H:%M:%S`, local time of generation.
    pub last_updated: String,
    pub insights: Vec<Insight>,
    pub performance: Performance,
    pub advisor_briefing: AdvisorBriefing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingEntry {
    pub symbol: String,
    pub quantity: Decimal,
    pub price_usd: Decimal,
    pub market_value_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDatum {
    pub date: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub asset: String,
    pub text: String,
}

/// NAV changes formatted `+0.00%`; `N/A` when the base NAV is not positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    #[serde(rename = "1d")]
    pub one_day: String,
    #[serde(rename = "7d")]
    pub seven_day: String,
    #[serde(rename = "30d")]
    pub thirty_day: String,
    pub summary: String,
}

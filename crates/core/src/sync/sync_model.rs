//! Workbook sync domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::constants::NAV_PRECISION;

/// Bucket a position's value is grouped into on the Daily sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetCategory {
    #[serde(alias = "Cash USD")]
    Cash,
    #[serde(alias = "Gold USD")]
    Gold,
    #[serde(alias = "US Stocks")]
    Stocks,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 3] = [
        AssetCategory::Cash,
        AssetCategory::Gold,
        AssetCategory::Stocks,
    ];

    /// Display label used by the dashboard and the grouped totals.
    pub fn label(&self) -> &'static str {
        match self {
            AssetCategory::Cash => "Cash USD",
            AssetCategory::Gold => "Gold USD",
            AssetCategory::Stocks => "US Stocks",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-category USD totals.
pub type GroupedTotals = BTreeMap<AssetCategory, Decimal>;

/// Fresh values for one Holdings row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingUpdate {
    pub symbol: String,
    pub quantity: Decimal,
    pub price_usd: Decimal,
    pub market_value_usd: Decimal,
}

impl HoldingUpdate {
    /// Symbols are matched trimmed and upper-cased.
    pub fn normalized_symbol(&self) -> String {
        normalize_symbol(&self.symbol)
    }
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// One typed row of the Holdings sheet as currently stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingRow {
    pub row_idx: u32,
    pub symbol: String,
    pub quantity: Decimal,
    pub price_usd: Decimal,
    pub market_value_usd: Decimal,
}

/// Everything one sync run writes into the workbook.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub sync_time: NaiveDateTime,
    pub holding_updates: Vec<HoldingUpdate>,
    pub grouped_totals: GroupedTotals,
    pub total_balance: Decimal,
}

impl SyncRequest {
    pub fn category_total(&self, category: AssetCategory) -> Decimal {
        self.grouped_totals
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Result of a successful sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    pub backup_path: PathBuf,
    pub last_daily_date: String,
    pub daily_count: usize,
}

/// One typed row of the Daily sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRow {
    /// 1-indexed sheet row this was read from.
    pub row_idx: u32,
    /// Normalized `YYYY-MM-DD`, or the raw text when it did not parse.
    pub date: String,
    pub cash_usd: Decimal,
    pub gold_usd: Decimal,
    pub stocks_usd: Decimal,
    pub total_usd: Decimal,
    pub nav: Decimal,
    pub note: String,
}

impl DailyRow {
    pub fn parts_total(&self) -> Decimal {
        self.cash_usd + self.gold_usd + self.stocks_usd
    }

    /// The Chart row this Daily row is mirrored as.
    pub fn chart_point(&self) -> ChartPoint {
        ChartPoint {
            date: self.date.clone(),
            nav: self.nav.round_dp(NAV_PRECISION),
        }
    }
}

/// One `(date, nav)` pair of the Chart mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub nav: Decimal,
}

/// Summary of a read-only audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub daily_count: usize,
    pub first_date: String,
    pub last_date: String,
    pub last_total_usd: Decimal,
    pub last_nav: Decimal,
    pub chart_count: usize,
    pub holdings_count: usize,
}

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::errors::{Error, Result, ValidationError};
use crate::sync::{normalize_symbol, AssetCategory, GroupedTotals, HoldingUpdate, SyncRequest};

/// One tracked position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionConfig {
    /// Holdings sheet symbol.
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub quantity: Decimal,
    pub category: AssetCategory,
    /// Symbol to price against when it differs from `symbol` (e.g. gold
    /// grams priced from an ETF).
    #[serde(default)]
    pub quote_symbol: Option<String>,
    /// Multiplier from the quoted price to the price of one unit held.
    #[serde(default)]
    pub unit_factor: Option<Decimal>,
}

impl PositionConfig {
    pub fn is_cash(&self) -> bool {
        self.category == AssetCategory::Cash
    }

    /// Symbol the price provider is asked for.
    pub fn price_symbol(&self) -> String {
        normalize_symbol(self.quote_symbol.as_deref().unwrap_or(&self.symbol))
    }

    pub fn unit_factor(&self) -> Decimal {
        self.unit_factor.unwrap_or(Decimal::ONE)
    }
}

/// The positions a sync values, loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioConfig {
    pub positions: Vec<PositionConfig>,
}

impl PortfolioConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PortfolioConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigIO(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Rejects empty portfolios, duplicate symbols, negative quantities and
    /// non-positive unit factors.
    pub fn validate(&self) -> Result<()> {
        if self.positions.is_empty() {
            return Err(invalid("portfolio has no positions"));
        }
        let mut seen = HashSet::new();
        for position in &self.positions {
            let symbol = normalize_symbol(&position.symbol);
            if symbol.is_empty() {
                return Err(ValidationError::MissingField("symbol".to_string()).into());
            }
            if !seen.insert(symbol.clone()) {
                return Err(invalid(&format!("duplicate position symbol {}", symbol)));
            }
            if position.quantity < Decimal::ZERO {
                return Err(invalid(&format!("{} has a negative quantity", symbol)));
            }
            if position.unit_factor() <= Decimal::ZERO {
                return Err(invalid(&format!("{} unit factor must be positive", symbol)));
            }
        }
        Ok(())
    }

    /// Distinct symbols that need a market price.
    pub fn quote_symbols(&self) -> Vec<String> {
        self.positions
            .iter()
            .filter(|p| !p.is_cash())
            .map(PositionConfig::price_symbol)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn invalid(message: &str) -> Error {
    ValidationError::InvalidInput(message.to_string()).into()
}

/// A valued portfolio, shaped as the synchronizer's inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioValuation {
    pub holding_updates: Vec<HoldingUpdate>,
    pub grouped_totals: GroupedTotals,
    pub total_balance: Decimal,
}

impl PortfolioValuation {
    pub fn into_sync_request(self, sync_time: NaiveDateTime) -> SyncRequest {
        SyncRequest {
            sync_time,
            holding_updates: self.holding_updates,
            grouped_totals: self.grouped_totals,
            total_balance: self.total_balance,
        }
    }

    pub fn category_total(&self, category: AssetCategory) -> Decimal {
        self.grouped_totals
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

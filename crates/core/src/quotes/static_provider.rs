use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;

use super::{PriceProvider, QuoteError};
use crate::sync::normalize_symbol;

/// Fixed prices, typically loaded from a `{"SYMBOL": price}` JSON file.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceProvider {
    prices: HashMap<String, Decimal>,
}

impl StaticPriceProvider {
    pub fn new(prices: HashMap<String, Decimal>) -> Self {
        Self {
            prices: prices
                .into_iter()
                .map(|(symbol, price)| (normalize_symbol(&symbol), price))
                .collect(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let prices: HashMap<String, Decimal> = serde_json::from_str(json)?;
        Ok(Self::new(prices))
    }

    pub fn from_path(path: &Path) -> Result<Self, QuoteError> {
        let price_file_error = |message: String| QuoteError::PriceFile {
            path: path.display().to_string(),
            message,
        };
        let json = std::fs::read_to_string(path).map_err(|e| price_file_error(e.to_string()))?;
        Self::from_json_str(&json).map_err(|e| price_file_error(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[async_trait]
impl PriceProvider for StaticPriceProvider {
    fn id(&self) -> &'static str {
        "STATIC"
    }

    async fn latest_price(&self, symbol: &str) -> Result<Decimal, QuoteError> {
        self.prices
            .get(&normalize_symbol(symbol))
            .copied()
            .ok_or_else(|| QuoteError::SymbolNotFound(symbol.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::fetch_prices;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let provider = StaticPriceProvider::from_json_str(r#"{"nvda": 182.81, "GLD": 310.2}"#).unwrap();
        assert_eq!(provider.len(), 2);
        assert_eq!(provider.latest_price(" NVDA ").await.unwrap(), dec!(182.81));
        assert_eq!(
            provider.latest_price("TSLA").await.unwrap_err(),
            QuoteError::SymbolNotFound("TSLA".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_prices_dedupes_and_validates() {
        let provider =
            StaticPriceProvider::from_json_str(r#"{"NVDA": 182.81, "GLD": 310.2, "BAD": 0}"#)
                .unwrap();

        let symbols = vec!["nvda".to_string(), "NVDA".to_string(), "GLD".to_string()];
        let prices = fetch_prices(&provider, &symbols).await.unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices["GLD"], dec!(310.2));

        let err = fetch_prices(&provider, &["bad".to_string()]).await.unwrap_err();
        assert_eq!(
            err,
            QuoteError::InvalidPrice {
                symbol: "BAD".to_string(),
                price: Decimal::ZERO,
            }
        );

        let err = fetch_prices(&provider, &["QQQ".to_string()]).await.unwrap_err();
        assert_eq!(err, QuoteError::SymbolNotFound("QQQ".to_string()));
    }

    #[test]
    fn test_from_path_reports_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("prices.json");
        assert!(matches!(
            StaticPriceProvider::from_path(&missing).unwrap_err(),
            QuoteError::PriceFile { .. }
        ));

        std::fs::write(&missing, "[1, 2]").unwrap();
        assert!(matches!(
            StaticPriceProvider::from_path(&missing).unwrap_err(),
            QuoteError::PriceFile { .. }
        ));
    }
}

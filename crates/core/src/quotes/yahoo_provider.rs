use async_trait::async_trait;
use log::warn;
use rust_decimal::Decimal;
use yahoo_finance_api as yahoo;

use super::{PriceProvider, QuoteError};

const PROVIDER_ID: &str = "YAHOO";

/// Latest daily close from Yahoo Finance.
pub struct YahooPriceProvider {
    connector: yahoo::YahooConnector,
}

impl YahooPriceProvider {
    pub fn new() -> Result<Self, QuoteError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| {
            QuoteError::provider(
                PROVIDER_ID,
                format!("Failed to initialize Yahoo connector: {}", e),
            )
        })?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl PriceProvider for YahooPriceProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn latest_price(&self, symbol: &str) -> Result<Decimal, QuoteError> {
        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| {
                if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
                    QuoteError::SymbolNotFound(symbol.to_string())
                } else {
                    QuoteError::provider(PROVIDER_ID, e.to_string())
                }
            })?;

        let quote = response.last_quote().map_err(|e| {
            warn!("No quotes returned for {}: {}", symbol, e);
            QuoteError::SymbolNotFound(symbol.to_string())
        })?;

        Decimal::from_f64_retain(quote.close)
            .map(|close| close.round_dp(4))
            .ok_or_else(|| QuoteError::provider(
                PROVIDER_ID,
                format!("Failed to convert close price {} to Decimal", quote.close),
            ))
    }
}

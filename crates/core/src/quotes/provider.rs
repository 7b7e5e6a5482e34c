//! Price provider seam.

use async_trait::async_trait;
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};

use super::QuoteError;
use crate::sync::normalize_symbol;

/// Source of latest USD prices.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Short identifier used in logs and errors, e.g. "YAHOO".
    fn id(&self) -> &'static str;

    /// Latest price for `symbol`.
    async fn latest_price(&self, symbol: &str) -> Result<Decimal, QuoteError>;
}

/// Fetches each distinct symbol once. Fails on the first missing or
/// non-positive price; the map is keyed by normalized symbol.
pub async fn fetch_prices(
    provider: &dyn PriceProvider,
    symbols: &[String],
) -> Result<HashMap<String, Decimal>, QuoteError> {
    let distinct: BTreeSet<String> = symbols
        .iter()
        .map(|s| normalize_symbol(s))
        .filter(|s| !s.is_empty())
        .collect();
    info!(
        "Fetching {} prices from {}",
        distinct.len(),
        provider.id()
    );

    let mut prices = HashMap::with_capacity(distinct.len());
    for symbol in distinct {
        let price = provider.latest_price(&symbol).await?;
        if price <= Decimal::ZERO {
            return Err(QuoteError::InvalidPrice { symbol, price });
        }
        debug!("{} {} = {}", provider.id(), symbol, price);
        prices.insert(symbol, price);
    }
    Ok(prices)
}

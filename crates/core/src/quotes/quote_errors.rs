use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while looking up prices.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    /// The provider has no quote for this symbol.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider answered with a price that cannot be used.
    #[error("Invalid price for {symbol}: {price}")]
    InvalidPrice { symbol: String, price: Decimal },

    #[error("Provider error: {provider} - {message}")]
    ProviderError { provider: String, message: String },

    /// A static price file could not be read or parsed.
    #[error("Failed to load prices from {path}: {message}")]
    PriceFile { path: String, message: String },
}

impl QuoteError {
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

//! Latest-price lookups feeding the portfolio valuation.

mod provider;
mod quote_errors;
mod static_provider;
mod yahoo_provider;

pub use provider::{fetch_prices, PriceProvider};
pub use quote_errors::QuoteError;
pub use static_provider::StaticPriceProvider;
pub use yahoo_provider::YahooPriceProvider;

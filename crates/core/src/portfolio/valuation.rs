use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::{PortfolioConfig, PortfolioValuation};
use crate::constants::{MONEY_PRECISION, PRICE_PRECISION};
use crate::errors::Result;
use crate::quotes::QuoteError;
use crate::sync::{AssetCategory, GroupedTotals, HoldingUpdate};

/// Prices every position and groups market values by category.
///
/// Cash is valued at 1 per unit. Other positions use the quote for their
/// price symbol times the unit factor; a missing quote is an error.
pub fn value_portfolio(
    config: &PortfolioConfig,
    prices: &HashMap<String, Decimal>,
) -> Result<PortfolioValuation> {
    let mut grouped: GroupedTotals = AssetCategory::ALL
        .iter()
        .map(|category| (*category, Decimal::ZERO))
        .collect();
    let mut holding_updates = Vec::with_capacity(config.positions.len());

    for position in &config.positions {
        let price_usd = if position.is_cash() {
            Decimal::ONE
        } else {
            let symbol = position.price_symbol();
            let quote = prices
                .get(&symbol)
                .copied()
                .ok_or(QuoteError::SymbolNotFound(symbol))?;
            (quote * position.unit_factor()).round_dp(PRICE_PRECISION)
        };
        let market_value_usd = (position.quantity * price_usd).round_dp(MONEY_PRECISION);
        debug!(
            "{} {} x {} = {}",
            position.symbol, position.quantity, price_usd, market_value_usd
        );

        *grouped.entry(position.category).or_insert(Decimal::ZERO) += market_value_usd;
        holding_updates.push(HoldingUpdate {
            symbol: position.symbol.clone(),
            quantity: position.quantity,
            price_usd,
            market_value_usd,
        });
    }

    let total_balance = grouped.values().copied().sum();
    Ok(PortfolioValuation {
        holding_updates,
        grouped_totals: grouped,
        total_balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use rust_decimal_macros::dec;

    const CONFIG: &str = r#"{
        "positions": [
            {"symbol": "USD", "name": "Cash", "quantity": 571.73, "category": "CASH"},
            {"symbol": "XAU", "name": "Gold (g)", "quantity": 140, "category": "GOLD",
             "quoteSymbol": "GLD", "unitFactor": 0.3215074657},
            {"symbol": "NVDA", "quantity": 10, "category": "STOCKS"},
            {"symbol": "QQQ", "quantity": 2.5, "category": "STOCKS"}
        ]
    }"#;

    fn prices() -> HashMap<String, Decimal> {
        HashMap::from([
            ("GLD".to_string(), dec!(310.20)),
            ("NVDA".to_string(), dec!(182.81)),
            ("QQQ".to_string(), dec!(520.00)),
        ])
    }

    #[test]
    fn test_values_and_groups_positions() {
        let config = PortfolioConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.quote_symbols(), vec!["GLD", "NVDA", "QQQ"]);

        let valuation = value_portfolio(&config, &prices()).unwrap();

        let gold = &valuation.holding_updates[1];
        // 310.20 / 0.1 / 31.1034768 per gram
        assert_eq!(gold.price_usd, dec!(99.7316));
        assert_eq!(gold.market_value_usd, dec!(13962.42));

        assert_eq!(valuation.category_total(AssetCategory::Cash), dec!(571.73));
        assert_eq!(valuation.category_total(AssetCategory::Stocks), dec!(3128.10));
        assert_eq!(
            valuation.total_balance,
            dec!(571.73) + dec!(13962.42) + dec!(3128.10)
        );
    }

    #[test]
    fn test_missing_quote_is_an_error() {
        let config = PortfolioConfig::from_json_str(CONFIG).unwrap();
        let mut partial = prices();
        partial.remove("QQQ");
        assert!(matches!(
            value_portfolio(&config, &partial).unwrap_err(),
            Error::Quote(QuoteError::SymbolNotFound(symbol)) if symbol == "QQQ"
        ));
    }

    #[test]
    fn test_every_category_is_present_even_when_unused() {
        let config = PortfolioConfig::from_json_str(
            r#"{"positions": [{"symbol": "USD", "quantity": 10, "category": "CASH"}]}"#,
        )
        .unwrap();
        let valuation = value_portfolio(&config, &HashMap::new()).unwrap();
        assert_eq!(valuation.grouped_totals.len(), 3);
        assert_eq!(valuation.category_total(AssetCategory::Gold), Decimal::ZERO);
        assert_eq!(valuation.total_balance, dec!(10));
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        for json in [
            r#"{"positions": []}"#,
            r#"{"positions": [{"symbol": "A", "quantity": 1, "category": "STOCKS"},
                              {"symbol": "a", "quantity": 2, "category": "STOCKS"}]}"#,
            r#"{"positions": [{"symbol": "A", "quantity": -1, "category": "STOCKS"}]}"#,
            r#"{"positions": [{"symbol": "A", "quantity": 1, "category": "STOCKS", "unitFactor": 0}]}"#,
            r#"{"positions": [{"symbol": " ", "quantity": 1, "category": "STOCKS"}]}"#,
        ] {
            assert!(
                matches!(PortfolioConfig::from_json_str(json), Err(Error::Validation(_))),
                "expected validation error for {}",
                json
            );
        }
    }
}

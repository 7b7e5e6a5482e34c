use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::Performance;
use crate::constants::MONEY_PRECISION;
use crate::sync::DailyRow;

const NOT_AVAILABLE: &str = "N/A";

/// Percent change of the last NAV against the NAV `lookback` rows earlier,
/// or against the first NAV when the history is shorter than that.
pub fn nav_change(navs: &[Decimal], lookback: usize) -> Option<Decimal> {
    let current = *navs.last()?;
    let base = if navs.len() > lookback {
        navs[navs.len() - 1 - lookback]
    } else {
        navs[0]
    };
    if base <= Decimal::ZERO {
        return None;
    }
    Some((current / base - Decimal::ONE) * dec!(100))
}

/// Signed percent with two decimals, e.g. `+1.25%` or `-0.40%`.
pub fn format_percent(change: Option<Decimal>) -> String {
    match change {
        Some(value) => {
            let rounded = value.round_dp(MONEY_PRECISION);
            let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
                "-"
            } else {
                "+"
            };
            format!("{}{:.2}%", sign, rounded.abs())
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn compute_performance(rows: &[DailyRow]) -> Performance {
    let navs: Vec<Decimal> = rows.iter().map(|r| r.nav).collect();
    let summary = match rows.last() {
        Some(last) => format!("NAV {} as of {}", last.nav.round_dp(4).normalize(), last.date),
        None => NOT_AVAILABLE.to_string(),
    };
    Performance {
        one_day: format_percent(nav_change(&navs, 1)),
        seven_day: format_percent(nav_change(&navs, 7)),
        thirty_day: format_percent(nav_change(&navs, 30)),
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_uses_first_nav_for_short_history() {
        let navs = [dec!(1.00), dec!(1.10), dec!(1.21)];
        assert_eq!(nav_change(&navs, 1).unwrap().round_dp(2), dec!(10.00));
        assert_eq!(nav_change(&navs, 7).unwrap().round_dp(2), dec!(21.00));
        assert_eq!(nav_change(&[], 1), None);
    }

    #[test]
    fn test_lookback_picks_row_counted_from_the_end() {
        let navs: Vec<Decimal> = (1..=10).map(Decimal::from).collect();
        // current 10 vs 8 rows back (value 3)
        assert_eq!(
            nav_change(&navs, 7).unwrap().round_dp(4),
            dec!(233.3333)
        );
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(format_percent(Some(dec!(1.254))), "+1.25%");
        assert_eq!(format_percent(Some(dec!(-0.4))), "-0.40%");
        assert_eq!(format_percent(Some(dec!(-0.001))), "+0.00%");
        assert_eq!(format_percent(Some(Decimal::ZERO)), "+0.00%");
        assert_eq!(format_percent(None), "N/A");
    }

    #[test]
    fn test_zero_base_is_not_available() {
        assert_eq!(nav_change(&[Decimal::ZERO, dec!(1.2)], 1), None);
    }
}

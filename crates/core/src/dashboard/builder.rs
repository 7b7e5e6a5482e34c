use chrono::NaiveDateTime;
use log::{error, info};
use rust_decimal::Decimal;
use std::path::PathBuf;

use super::performance::compute_performance;
use super::{AssetEntry, ChartDatum, DashboardPayload, HoldingEntry, Insight, InsightKind};
use crate::advisor::{Action, AdvisorBriefing, Verdict};
use crate::constants::{DAILY_SHEET, HOLDINGS_SHEET, MONEY_PRECISION};
use crate::errors::{PersistenceError, Result};
use crate::sync::normalizer::{read_daily_rows, read_holdings_rows};
use crate::sync::schema::{DailyColumns, HoldingsColumns};
use crate::sync::{AssetCategory, WorkbookSyncError};
use crate::utils::fs_utils::atomic_write_bytes;
use crate::workbook::{Sheet, Workbook};

const DEFAULT_INSIGHT: &str = "Portfolio synchronized from the local workbook.";

fn sheet<'a>(workbook: &'a Workbook, name: &str) -> Result<&'a Sheet> {
    Ok(workbook
        .sheet(name)
        .ok_or_else(|| WorkbookSyncError::MissingSheets(vec![name.to_string()]))?)
}

/// Current Holdings rows, shaped for the payload and the briefing input.
pub fn read_dashboard_holdings(workbook: &Workbook) -> Result<Vec<HoldingEntry>> {
    let holdings = sheet(workbook, HOLDINGS_SHEET)?;
    let cols = HoldingsColumns::resolve(holdings)?;
    Ok(read_holdings_rows(holdings, &cols)
        .into_iter()
        .map(|row| HoldingEntry {
            symbol: row.symbol,
            quantity: row.quantity,
            price_usd: row.price_usd,
            market_value_usd: row.market_value_usd,
        })
        .collect())
}

/// Builds the dashboard payload from the workbook as stored.
pub fn build_dashboard(
    workbook: &Workbook,
    generated_at: NaiveDateTime,
    briefing: AdvisorBriefing,
) -> Result<DashboardPayload> {
    let daily = sheet(workbook, DAILY_SHEET)?;
    let cols = DailyColumns::resolve(daily)?;
    let rows = read_daily_rows(daily, &cols)?;
    let holdings = read_dashboard_holdings(workbook)?;

    let latest = rows
        .last()
        .ok_or_else(|| WorkbookSyncError::EmptyDaily(daily.name.clone()))?;
    let assets = AssetCategory::ALL
        .iter()
        .map(|category| AssetEntry {
            label: category.label().to_string(),
            value: format_money(match category {
                AssetCategory::Cash => latest.cash_usd,
                AssetCategory::Gold => latest.gold_usd,
                AssetCategory::Stocks => latest.stocks_usd,
            }),
        })
        .collect();

    let chart_data = rows
        .iter()
        .map(|row| ChartDatum {
            date: row.date.clone(),
            value: row.nav,
        })
        .collect();

    Ok(DashboardPayload {
        assets,
        holdings,
        chart_data,
        total_balance: format_money(latest.total_usd),
        last_updated: generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        insights: insights_from(&briefing),
        performance: compute_performance(&rows),
        advisor_briefing: briefing,
    })
}

/// One insight per briefing suggestion, or a single neutral portfolio note.
pub fn insights_from(briefing: &AdvisorBriefing) -> Vec<Insight> {
    if briefing.suggestions.is_empty() {
        let kind = match briefing.verdict {
            Verdict::Bullish => InsightKind::Bullish,
            Verdict::Bearish => InsightKind::Bearish,
            Verdict::Neutral => InsightKind::Neutral,
        };
        return vec![Insight {
            kind,
            asset: "Portfolio".to_string(),
            text: DEFAULT_INSIGHT.to_string(),
        }];
    }
    briefing
        .suggestions
        .iter()
        .map(|s| Insight {
            kind: match s.action {
                Action::Buy => InsightKind::Bullish,
                Action::Sell => InsightKind::Bearish,
                Action::Hold => InsightKind::Neutral,
            },
            asset: s.asset.clone(),
            text: s.rationale.clone(),
        })
        .collect()
}

/// Writes the payload as pretty JSON to every path, each atomically.
pub fn write_dashboard(payload: &DashboardPayload, paths: &[PathBuf]) -> Result<()> {
    let mut json = serde_json::to_vec_pretty(payload)?;
    json.push(b'\n');
    for path in paths {
        atomic_write_bytes(path, &json).map_err(|e| {
            error!("Failed to write dashboard {}: {}", path.display(), e);
            PersistenceError::commit_failed(path, e.to_string())
        })?;
        info!("Dashboard written to {}", path.display());
    }
    Ok(())
}

/// `#,##0.00` rendering of an amount.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(MONEY_PRECISION);
    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{fallback_briefing, Suggestion};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(0)), "0.00");
        assert_eq!(format_money(dec!(571.731)), "571.73");
        assert_eq!(format_money(dec!(1234.5)), "1,234.50");
        assert_eq!(format_money(dec!(17662.25)), "17,662.25");
        assert_eq!(format_money(dec!(1234567.899)), "1,234,567.90");
        assert_eq!(format_money(dec!(-9876.1)), "-9,876.10");
    }

    #[test]
    fn test_insights_follow_suggestions() {
        let now = Utc.with_ymd_and_hms(2026, 2, 23, 8, 0, 0).unwrap();
        let mut briefing = fallback_briefing(now);
        let default = insights_from(&briefing);
        assert_eq!(default.len(), 1);
        assert_eq!(default[0].asset, "Portfolio");
        assert_eq!(default[0].kind, InsightKind::Neutral);

        briefing.suggestions = vec![
            Suggestion {
                asset: "NVDA".to_string(),
                action: Action::Sell,
                rationale: "Trim".to_string(),
            },
            Suggestion {
                asset: "XAU".to_string(),
                action: Action::Hold,
                rationale: "Keep".to_string(),
            },
        ];
        let insights = insights_from(&briefing);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].kind, InsightKind::Bearish);
        assert_eq!(insights[1].asset, "XAU");
        assert_eq!(
            serde_json::to_value(&insights[0]).unwrap()["type"],
            "bearish"
        );
    }
}

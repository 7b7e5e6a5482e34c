use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::{Map, Value};

use super::{
    fallback_briefing, Action, AdvisorBriefing, BriefingInput, NewsItem, Suggestion, Verdict,
    DEFAULT_DISCLAIMER, DEFAULT_SOURCE,
};
use crate::errors::Result;

const UNTITLED: &str = "Untitled update";
const UNKNOWN_SOURCE: &str = "Unknown Source";
const MAX_SUGGESTIONS: usize = 3;

const BEARISH_TOKENS: [&str; 7] = [
    "selloff",
    "recession",
    "inflation",
    "downgrade",
    "risk",
    "war",
    "volatility",
];
const BULLISH_TOKENS: [&str; 6] = [
    "growth",
    "upgrade",
    "rally",
    "expansion",
    "breakthrough",
    "recovery",
];

/// Produces a raw briefing. Output is untrusted until
/// [`generate_briefing`] has validated it.
#[async_trait]
pub trait BriefingGenerator: Send + Sync {
    fn id(&self) -> &'static str;

    async fn generate(&self, input: &BriefingInput, now: DateTime<Utc>) -> Result<Value>;
}

/// Qualitative briefing built from headlines alone; never invents figures.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateBriefingGenerator;

#[async_trait]
impl BriefingGenerator for TemplateBriefingGenerator {
    fn id(&self) -> &'static str {
        "TEMPLATE"
    }

    async fn generate(&self, input: &BriefingInput, now: DateTime<Utc>) -> Result<Value> {
        let news_context = normalize_news(&input.news_context, now);
        let global_context = normalize_news(&input.global_context, now);
        let headlines: Vec<&str> = news_context
            .iter()
            .chain(global_context.iter())
            .map(|item| item.headline.as_str())
            .collect();

        let suggestions = input
            .holdings
            .iter()
            .take(MAX_SUGGESTIONS)
            .enumerate()
            .map(|(idx, holding)| Suggestion {
                asset: asset_label(holding, idx),
                action: Action::Hold,
                rationale: "No verified valuation inputs were provided, so this suggestion remains qualitative and focuses on risk-aware position discipline.".to_string(),
            })
            .collect();

        let briefing = AdvisorBriefing {
            generated_at: now.to_rfc3339(),
            source: DEFAULT_SOURCE.to_string(),
            headline: "Portfolio Briefing: Qualitative Signal Review".to_string(),
            macro_summary: "This briefing summarizes provided portfolio and macro news context without inferring unverified valuation or performance figures.".to_string(),
            verdict: infer_verdict(&headlines),
            suggestions,
            risks: vec![
                "Narrative risk can shift quickly as new headlines emerge.".to_string(),
                "Missing valuation inputs limit conviction and sizing confidence.".to_string(),
            ],
            news_context,
            global_context,
            disclaimer: DEFAULT_DISCLAIMER.to_string(),
        };
        Ok(serde_json::to_value(briefing)?)
    }
}

/// Runs `generator` and validates its output, substituting the fallback
/// briefing on any failure.
pub async fn generate_briefing(
    generator: &dyn BriefingGenerator,
    input: &BriefingInput,
    now: DateTime<Utc>,
) -> AdvisorBriefing {
    let raw = match generator.generate(input, now).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("{} briefing generation failed: {}", generator.id(), e);
            return fallback_briefing(now);
        }
    };
    match serde_json::from_value::<AdvisorBriefing>(raw) {
        Ok(briefing) => {
            debug!("{} briefing verdict {}", generator.id(), briefing.verdict);
            briefing
        }
        Err(e) => {
            warn!("{} briefing failed validation: {}", generator.id(), e);
            fallback_briefing(now)
        }
    }
}

/// Counts bullish and bearish keywords across all headlines.
pub fn infer_verdict(headlines: &[&str]) -> Verdict {
    let text = headlines.join(" ").to_lowercase();
    let bearish = BEARISH_TOKENS.iter().filter(|t| text.contains(*t)).count();
    let bullish = BULLISH_TOKENS.iter().filter(|t| text.contains(*t)).count();
    match bullish.cmp(&bearish) {
        std::cmp::Ordering::Greater => Verdict::Bullish,
        std::cmp::Ordering::Less => Verdict::Bearish,
        std::cmp::Ordering::Equal => Verdict::Neutral,
    }
}

pub fn normalize_news(items: &[Value], now: DateTime<Utc>) -> Vec<NewsItem> {
    items.iter().map(|item| normalize_news_item(item, now)).collect()
}

/// Maps a loosely shaped news item onto the contract. Accepts
/// `title`/`publisher`/`published_at` as alternates.
pub fn normalize_news_item(item: &Value, now: DateTime<Utc>) -> NewsItem {
    let Value::Object(map) = item else {
        return NewsItem {
            headline: text_of(item).unwrap_or_else(|| UNTITLED.to_string()),
            source: UNKNOWN_SOURCE.to_string(),
            timestamp: now.to_rfc3339(),
            url: None,
            relevance_score: None,
        };
    };
    NewsItem {
        headline: first_text(map, &["headline", "title"]).unwrap_or_else(|| UNTITLED.to_string()),
        source: first_text(map, &["source", "publisher"])
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        timestamp: first_text(map, &["timestamp", "published_at"])
            .unwrap_or_else(|| now.to_rfc3339()),
        url: None,
        relevance_score: map.get("relevance_score").and_then(number_of),
    }
}

fn asset_label(holding: &Value, idx: usize) -> String {
    let label = match holding {
        Value::Object(map) => first_text(map, &["asset", "symbol", "ticker", "name"]),
        other => text_of(other),
    };
    label.unwrap_or_else(|| format!("Asset {}", idx + 1))
}

fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| map.get(*key).and_then(text_of))
}

/// Trimmed text of a scalar; `None` for null, blank, false, zero or
/// containers.
fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

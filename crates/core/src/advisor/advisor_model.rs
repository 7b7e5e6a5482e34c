//! Advisor briefing contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

use crate::errors::{Error, Result};

pub const DEFAULT_SOURCE: &str = "AdvisorAgent";
pub const FALLBACK_SOURCE: &str = "AdvisorAgent_Fallback";
pub const DEFAULT_DISCLAIMER: &str = "This briefing is auto-generated for informational purposes only and does not constitute financial advice.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Bullish,
    Bearish,
    Neutral,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Bullish => "BULLISH",
            Verdict::Bearish => "BEARISH",
            Verdict::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Suggestion {
    pub asset: String,
    pub action: Action,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewsItem {
    pub headline: String,
    pub source: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

/// The briefing embedded in the dashboard payload.
///
/// Deserialization is strict: unknown keys and out-of-range enum values are
/// rejected, which is what [`validate_briefing`] relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdvisorBriefing {
    pub generated_at: String,
    #[serde(default = "default_source")]
    pub source: String,
    pub headline: String,
    pub macro_summary: String,
    pub verdict: Verdict,
    pub suggestions: Vec<Suggestion>,
    pub risks: Vec<String>,
    pub news_context: Vec<NewsItem>,
    pub global_context: Vec<NewsItem>,
    #[serde(default = "default_disclaimer")]
    pub disclaimer: String,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_disclaimer() -> String {
    DEFAULT_DISCLAIMER.to_string()
}

/// True when `value` conforms to the briefing contract.
pub fn validate_briefing(value: &Value) -> bool {
    serde_json::from_value::<AdvisorBriefing>(value.clone()).is_ok()
}

/// Deterministic briefing used whenever generation or validation fails.
pub fn fallback_briefing(now: DateTime<Utc>) -> AdvisorBriefing {
    AdvisorBriefing {
        generated_at: now.to_rfc3339(),
        source: FALLBACK_SOURCE.to_string(),
        headline: "Portfolio Sync Complete (Advisor Analysis Unavailable)".to_string(),
        macro_summary: "The automated advisory service is currently unavailable. Portfolio holdings have been synced successfully based on the latest market data.".to_string(),
        verdict: Verdict::Neutral,
        suggestions: Vec::new(),
        risks: vec!["Advisory service timeout or validation failure.".to_string()],
        news_context: Vec::new(),
        global_context: Vec::new(),
        disclaimer: "This briefing is a fallback message. It does not constitute financial advice.".to_string(),
    }
}

/// Raw material for a briefing. Items are loose JSON; generators normalize
/// them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BriefingInput {
    #[serde(default)]
    pub holdings: Vec<Value>,
    #[serde(default)]
    pub news_context: Vec<Value>,
    #[serde(default)]
    pub global_context: Vec<Value>,
}

impl BriefingInput {
    /// Loads `news_context`/`global_context` from a JSON file. Holdings in
    /// the file, if any, are kept.
    pub fn from_news_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigIO(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn with_holdings(mut self, holdings: Vec<Value>) -> Self {
        self.holdings = holdings;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "generated_at": "2026-02-23T08:00:00+00:00",
            "source": "AdvisorAgent",
            "headline": "h",
            "macro_summary": "m",
            "verdict": "BULLISH",
            "suggestions": [{"asset": "NVDA", "action": "HOLD", "rationale": "r"}],
            "risks": ["x"],
            "news_context": [{"headline": "a", "source": "b", "timestamp": "c", "relevance_score": 0.5}],
            "global_context": [],
            "disclaimer": "d"
        })
    }

    #[test]
    fn test_valid_briefing_passes() {
        assert!(validate_briefing(&valid()));
    }

    #[test]
    fn test_source_and_disclaimer_have_defaults() {
        let mut value = valid();
        let map = value.as_object_mut().unwrap();
        map.remove("source");
        map.remove("disclaimer");
        let briefing: AdvisorBriefing = serde_json::from_value(value).unwrap();
        assert_eq!(briefing.source, DEFAULT_SOURCE);
        assert_eq!(briefing.disclaimer, DEFAULT_DISCLAIMER);
    }

    #[test]
    fn test_rejects_contract_violations() {
        let mut extra = valid();
        extra["confidence"] = json!(0.9);
        assert!(!validate_briefing(&extra));

        let mut bad_verdict = valid();
        bad_verdict["verdict"] = json!("MIXED");
        assert!(!validate_briefing(&bad_verdict));

        let mut bad_action = valid();
        bad_action["suggestions"][0]["action"] = json!("ACCUMULATE");
        assert!(!validate_briefing(&bad_action));

        let mut missing = valid();
        missing.as_object_mut().unwrap().remove("risks");
        assert!(!validate_briefing(&missing));

        assert!(!validate_briefing(&json!("not an object")));
    }

    #[test]
    fn test_fallback_conforms() {
        let now = Utc.with_ymd_and_hms(2026, 2, 23, 8, 0, 0).unwrap();
        let fallback = fallback_briefing(now);
        assert_eq!(fallback.source, FALLBACK_SOURCE);
        assert_eq!(fallback.verdict, Verdict::Neutral);
        assert_eq!(fallback.generated_at, "2026-02-23T08:00:00+00:00");
        assert!(validate_briefing(&serde_json::to_value(&fallback).unwrap()));
    }
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {name}: {value:?} (expected {expected})")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Yahoo,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub workbook_path: PathBuf,
    pub portfolio_path: PathBuf,
    pub dashboard_paths: Vec<PathBuf>,
    pub news_path: Option<PathBuf>,
    pub price_source: PriceSource,
    pub prices_path: PathBuf,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| get(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let workbook_path = var("AB_WORKBOOK_PATH").unwrap_or_else(|| "assets.xlsx".into());
        let portfolio_path = var("AB_PORTFOLIO_PATH").unwrap_or_else(|| "portfolio.json".into());
        let dashboard_paths = var("AB_DASHBOARD_PATHS")
            .unwrap_or_else(|| "src/data.json,public/data.json".into())
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        let news_path = var("AB_NEWS_PATH").map(PathBuf::from);
        let prices_path = var("AB_PRICES_PATH").unwrap_or_else(|| "prices.json".into());

        let price_source = match var("AB_PRICE_SOURCE") {
            None => PriceSource::Yahoo,
            Some(v) if v.eq_ignore_ascii_case("yahoo") => PriceSource::Yahoo,
            Some(v) if v.eq_ignore_ascii_case("static") => PriceSource::Static,
            Some(value) => {
                return Err(ConfigError::InvalidValue {
                    name: "AB_PRICE_SOURCE",
                    value,
                    expected: "yahoo or static",
                })
            }
        };
        let log_format = match var("AB_LOG_FORMAT") {
            None => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(value) => {
                return Err(ConfigError::InvalidValue {
                    name: "AB_LOG_FORMAT",
                    value,
                    expected: "text or json",
                })
            }
        };

        Ok(Self {
            workbook_path: PathBuf::from(workbook_path),
            portfolio_path: PathBuf::from(portfolio_path),
            dashboard_paths,
            news_path,
            price_source,
            prices_path: PathBuf::from(prices_path),
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.workbook_path, PathBuf::from("assets.xlsx"));
        assert_eq!(config.portfolio_path, PathBuf::from("portfolio.json"));
        assert_eq!(
            config.dashboard_paths,
            vec![
                PathBuf::from("src/data.json"),
                PathBuf::from("public/data.json")
            ]
        );
        assert_eq!(config.news_path, None);
        assert_eq!(config.price_source, PriceSource::Yahoo);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("AB_WORKBOOK_PATH", "/data/book.xlsx"),
            ("AB_DASHBOARD_PATHS", " out/a.json , ,out/b.json"),
            ("AB_NEWS_PATH", "news.json"),
            ("AB_PRICE_SOURCE", "Static"),
            ("AB_LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.workbook_path, PathBuf::from("/data/book.xlsx"));
        assert_eq!(
            config.dashboard_paths,
            vec![PathBuf::from("out/a.json"), PathBuf::from("out/b.json")]
        );
        assert_eq!(config.news_path, Some(PathBuf::from("news.json")));
        assert_eq!(config.price_source, PriceSource::Static);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = config_from(&[("AB_PRICE_SOURCE", "bloomberg")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: "AB_PRICE_SOURCE",
                value: "bloomberg".to_string(),
                expected: "yahoo or static",
            }
        );
        assert!(config_from(&[("AB_LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("AB_WORKBOOK_PATH", "  "), ("AB_NEWS_PATH", "")]).unwrap();
        assert_eq!(config.workbook_path, PathBuf::from("assets.xlsx"));
        assert_eq!(config.news_path, None);
    }
}

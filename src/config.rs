//! Runtime configuration.
//!
//! Layered as: built-in defaults, then an optional TOML file
//! (`$MARKETPULSE_CONFIG`, else `./marketpulse.toml` when present), then
//! environment variables. The binary loads `.env` before any of this.

use crate::domain::error::DomainError;
use crate::domain::values::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "MARKETPULSE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "marketpulse.toml";
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;
pub const MAX_NEWS_WINDOW_HOURS: u32 = 8_760;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsProvider {
    NewsApi,
    None,
}

impl std::str::FromStr for NewsProvider {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newsapi" => Ok(NewsProvider::NewsApi),
            "none" | "noop" => Ok(NewsProvider::None),
            _ => Err(format!("Unknown news provider: {s}. Use 'newsapi' or 'none'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: String,
    pub watchlist: Vec<Symbol>,
    /// Display name → index ticker. Prices only, no news.
    pub indices: BTreeMap<String, Symbol>,
    pub refresh_interval_secs: u64,
    pub lookback_days: u32,
    pub news_window_hours: u32,
    pub news_page_size: u32,
    pub source_timeout_secs: u64,
    /// `None` picks NewsAPI when a key is configured.
    pub news_provider: Option<NewsProvider>,
    #[serde(skip_serializing)]
    pub news_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: "./marketpulse.db".into(),
            watchlist: Symbol::parse_list("AAPL,MSFT,TSLA").unwrap_or_default(),
            indices: [
                ("VIX", "^VIX"),
                ("NIFTY 50", "^NSEI"),
                ("SENSEX", "^BSESN"),
                ("S&P 500", "^GSPC"),
                ("NASDAQ", "^IXIC"),
            ]
            .into_iter()
            .filter_map(|(name, t)| Some((name.to_string(), Symbol::new(t).ok()?)))
            .collect(),
            refresh_interval_secs: 24 * 60 * 60,
            lookback_days: 30,
            news_window_hours: 48,
            news_page_size: 5,
            source_timeout_secs: 15,
            news_provider: None,
            news_api_key: None,
        }
    }
}

impl AppConfig {
    /// Load from the process environment and the config file it points to.
    pub fn load() -> Result<Self, DomainError> {
        let path = std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from);
        let file = match &path {
            Some(p) => Some(read_file(p)?),
            None => {
                let p = Path::new(DEFAULT_CONFIG_PATH);
                if p.exists() {
                    Some(read_file(p)?)
                } else {
                    None
                }
            }
        };
        Self::from_sources(file.as_deref(), |k| std::env::var(k).ok())
    }

    /// Build from optional TOML text and an environment lookup.
    pub fn from_sources(
        toml_text: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, DomainError> {
        let mut cfg: AppConfig = match toml_text {
            Some(text) => toml::from_str(text)
                .map_err(|e| DomainError::Config(format!("Invalid config file: {e}")))?,
            None => AppConfig::default(),
        };

        if let Some(v) = env("MARKETPULSE_DB") {
            cfg.db_path = v;
        }
        if let Some(v) = env("MARKETPULSE_WATCHLIST") {
            cfg.watchlist = Symbol::parse_list(&v).map_err(DomainError::Config)?;
        }
        if let Some(v) = env("MARKETPULSE_INTERVAL_SECS") {
            cfg.refresh_interval_secs = parse_num("MARKETPULSE_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = env("MARKETPULSE_LOOKBACK_DAYS") {
            cfg.lookback_days = parse_num("MARKETPULSE_LOOKBACK_DAYS", &v)?;
        }
        if let Some(v) = env("MARKETPULSE_NEWS_WINDOW_HOURS") {
            cfg.news_window_hours = parse_num("MARKETPULSE_NEWS_WINDOW_HOURS", &v)?;
        }
        if let Some(v) = env("MARKETPULSE_NEWS_PAGE_SIZE") {
            cfg.news_page_size = parse_num("MARKETPULSE_NEWS_PAGE_SIZE", &v)?;
        }
        if let Some(v) = env("MARKETPULSE_SOURCE_TIMEOUT_SECS") {
            cfg.source_timeout_secs = parse_num("MARKETPULSE_SOURCE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = env("MARKETPULSE_NEWS_PROVIDER") {
            cfg.news_provider = Some(v.parse().map_err(DomainError::Config)?);
        }
        if let Some(v) = env("NEWSAPI_KEY") {
            cfg.news_api_key = Some(v);
        }
        cfg.news_api_key = cfg.news_api_key.filter(|k| !k.trim().is_empty());

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.refresh_interval_secs == 0 {
            return Err(DomainError::Config("refresh_interval_secs must be > 0".into()));
        }
        if self.source_timeout_secs == 0 {
            return Err(DomainError::Config("source_timeout_secs must be > 0".into()));
        }
        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(DomainError::Config(format!(
                "lookback_days must be at most {MAX_LOOKBACK_DAYS}, got {}",
                self.lookback_days
            )));
        }
        if !(1..=MAX_NEWS_WINDOW_HOURS).contains(&self.news_window_hours) {
            return Err(DomainError::Config(format!(
                "news_window_hours must be between 1 and {MAX_NEWS_WINDOW_HOURS}, got {}",
                self.news_window_hours
            )));
        }
        if !(1..=100).contains(&self.news_page_size) {
            return Err(DomainError::Config(format!(
                "news_page_size must be between 1 and 100, got {}",
                self.news_page_size
            )));
        }
        if self.effective_news_provider() == NewsProvider::NewsApi && self.news_api_key.is_none() {
            return Err(DomainError::Config(
                "news_provider is 'newsapi' but NEWSAPI_KEY is not set".into(),
            ));
        }
        Ok(())
    }

    pub fn effective_news_provider(&self) -> NewsProvider {
        self.news_provider.unwrap_or(if self.news_api_key.is_some() {
            NewsProvider::NewsApi
        } else {
            NewsProvider::None
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }

    pub fn index_symbols(&self) -> Vec<Symbol> {
        self.indices.values().cloned().collect()
    }
}

fn read_file(path: &Path) -> Result<String, DomainError> {
    std::fs::read_to_string(path)
        .map_err(|e| DomainError::Config(format!("Reading {}: {e}", path.display())))
}

fn parse_num<T: std::str::FromStr>(key: &str, v: &str) -> Result<T, DomainError>
where
    T::Err: std::fmt::Display,
{
    v.trim()
        .parse()
        .map_err(|e| DomainError::Config(format!("{key}: {e}")))
}

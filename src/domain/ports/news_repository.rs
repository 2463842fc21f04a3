use crate::domain::entities::news_item::{NewsItem, NewsKey};
use crate::domain::error::DomainError;
use crate::domain::ports::price_repository::UpsertOutcome;
use crate::domain::values::date_range::DateRange;
use crate::domain::values::symbol::Symbol;
use chrono::NaiveDate;
use serde::Serialize;

/// Average polarity of the headlines published on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub average: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentBreakdown {
    pub symbol: Symbol,
    pub count: usize,
    /// `None` when no headlines are stored for the symbol.
    pub average: Option<f64>,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

/// Persistent news table keyed by `(symbol, headline, published_at)`.
pub trait NewsRepository: Send + Sync {
    fn upsert_news(&self, item: &NewsItem) -> Result<UpsertOutcome, DomainError>;
    fn news_exists(&self, key: &NewsKey) -> Result<bool, DomainError>;
    fn read_news(&self, symbol: &Symbol, range: DateRange) -> Result<Vec<NewsItem>, DomainError>;
    /// Per-day averages, across all symbols when `symbol` is `None`.
    fn daily_sentiment(
        &self,
        symbol: Option<&Symbol>,
        range: DateRange,
    ) -> Result<Vec<DailySentiment>, DomainError>;
    fn sentiment_breakdown(&self, symbol: &Symbol) -> Result<SentimentBreakdown, DomainError>;
    fn count(&self) -> Result<usize, DomainError>;
}

use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::price_record::PriceRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::news_repository::{DailySentiment, NewsRepository, SentimentBreakdown};
use crate::domain::ports::price_repository::PriceRepository;
use crate::domain::values::date_range::DateRange;
use crate::domain::values::symbol::Symbol;
use std::sync::Arc;

/// Read-side queries for whatever renders the stored data.
pub struct QueryUseCase {
    prices: Arc<dyn PriceRepository>,
    news: Arc<dyn NewsRepository>,
}

impl QueryUseCase {
    pub fn new(prices: Arc<dyn PriceRepository>, news: Arc<dyn NewsRepository>) -> Self {
        Self { prices, news }
    }

    pub fn prices(&self, symbol: &Symbol, range: DateRange) -> Result<Vec<PriceRecord>, DomainError> {
        self.prices.read_prices(symbol, range)
    }

    pub fn news(&self, symbol: &Symbol, range: DateRange) -> Result<Vec<NewsItem>, DomainError> {
        self.news.read_news(symbol, range)
    }

    pub fn daily_sentiment(
        &self,
        symbol: Option<&Symbol>,
        range: DateRange,
    ) -> Result<Vec<DailySentiment>, DomainError> {
        self.news.daily_sentiment(symbol, range)
    }

    /// Average polarity and label distribution per symbol, in watch-list order.
    pub fn summary(&self, watchlist: &[Symbol]) -> Result<Vec<SentimentBreakdown>, DomainError> {
        watchlist
            .iter()
            .map(|s| self.news.sentiment_breakdown(s))
            .collect()
    }
}

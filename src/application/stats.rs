use crate::domain::error::DomainError;
use crate::domain::ports::news_repository::NewsRepository;
use crate::domain::ports::price_repository::{PriceRepository, SymbolCoverage};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub price_rows: usize,
    pub news_rows: usize,
    pub symbols: Vec<SymbolCoverage>,
}

pub struct StatsUseCase {
    prices: Arc<dyn PriceRepository>,
    news: Arc<dyn NewsRepository>,
}

impl StatsUseCase {
    pub fn new(prices: Arc<dyn PriceRepository>, news: Arc<dyn NewsRepository>) -> Self {
        Self { prices, news }
    }

    pub fn stats(&self) -> Result<StoreStats, DomainError> {
        Ok(StoreStats {
            price_rows: self.prices.count()?,
            news_rows: self.news.count()?,
            symbols: self.prices.coverage()?,
        })
    }
}

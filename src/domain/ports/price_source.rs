use crate::domain::entities::price_record::PriceRecord;
use crate::domain::error::SourceError;
use crate::domain::values::date_range::DateRange;
use crate::domain::values::symbol::Symbol;
use async_trait::async_trait;

/// Daily OHLCV bars for a symbol.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Source name for logging (e.g. "yahoo").
    fn name(&self) -> &str;

    /// Bars for `symbol` within `range`, ordered by trading date.
    /// One attempt; no retries.
    async fn fetch(&self, symbol: &Symbol, range: DateRange) -> Result<Vec<PriceRecord>, SourceError>;
}

use crate::domain::entities::news_item::Headline;
use crate::domain::error::SourceError;
use crate::domain::values::date_range::TimeWindow;
use crate::domain::values::symbol::Symbol;
use async_trait::async_trait;

/// Recent headlines mentioning a symbol.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Source name for logging (e.g. "newsapi").
    fn name(&self) -> &str;

    /// Headlines about `symbol` published within `window`. One attempt; no retries.
    async fn fetch(&self, symbol: &Symbol, window: TimeWindow) -> Result<Vec<Headline>, SourceError>;
}

use crate::domain::entities::news_item::Headline;
use crate::domain::error::SourceError;
use crate::domain::ports::news_source::NewsSource;
use crate::domain::values::date_range::TimeWindow;
use crate::domain::values::symbol::Symbol;

/// News source used when no provider is configured.
pub struct NoopNewsSource;

#[async_trait::async_trait]
impl NewsSource for NoopNewsSource {
    fn name(&self) -> &str {
        "none"
    }

    async fn fetch(&self, _symbol: &Symbol, _window: TimeWindow) -> Result<Vec<Headline>, SourceError> {
        Ok(vec![])
    }
}

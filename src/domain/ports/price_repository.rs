use crate::domain::entities::price_record::PriceRecord;
use crate::domain::error::DomainError;
use crate::domain::values::date_range::DateRange;
use crate::domain::values::symbol::Symbol;
use chrono::NaiveDate;
use serde::Serialize;

/// Result of an insert-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Inserted,
    /// A row with the same key already existed; nothing was written.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolCoverage {
    pub symbol: Symbol,
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Persistent price table keyed by `(symbol, trading_date)`.
///
/// There is no update method: stored bars are immutable.
pub trait PriceRepository: Send + Sync {
    fn upsert_price(&self, record: &PriceRecord) -> Result<UpsertOutcome, DomainError>;
    fn latest_price_date(&self, symbol: &Symbol) -> Result<Option<NaiveDate>, DomainError>;
    fn read_prices(&self, symbol: &Symbol, range: DateRange) -> Result<Vec<PriceRecord>, DomainError>;
    fn count(&self) -> Result<usize, DomainError>;
    fn coverage(&self) -> Result<Vec<SymbolCoverage>, DomainError>;
}

use crate::domain::values::symbol::Symbol;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar. Keyed by `(symbol, trading_date)`; never updated once
/// stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub symbol: Symbol,
    pub trading_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceRecord {
    pub fn new(
        symbol: Symbol,
        trading_date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            symbol,
            trading_date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, v) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(format!(
                    "{} {}: invalid {name} price {v}",
                    self.symbol, self.trading_date
                ));
            }
        }
        if self.high < self.low {
            return Err(format!(
                "{} {}: high {} below low {}",
                self.symbol, self.trading_date, self.high, self.low
            ));
        }
        Ok(())
    }
}

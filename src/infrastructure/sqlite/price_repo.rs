use crate::domain::entities::price_record::PriceRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::price_repository::*;
use crate::domain::values::date_range::DateRange;
use crate::domain::values::symbol::Symbol;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

const DATE_FMT: &str = "%Y-%m-%d";

pub struct SqlitePriceRepo {
    conn: Mutex<Connection>,
}

impl SqlitePriceRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn parse_date(s: &str) -> Result<NaiveDate, rusqlite::Error> {
        NaiveDate::parse_from_str(s, DATE_FMT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<PriceRecord, rusqlite::Error> {
        let symbol_str: String = row.get(0)?;
        let date_str: String = row.get(1)?;
        let volume: i64 = row.get(6)?;

        Ok(PriceRecord {
            symbol: Symbol::new(&symbol_str)
                .map_err(|_| rusqlite::Error::InvalidParameterName(symbol_str.clone()))?,
            trading_date: Self::parse_date(&date_str)?,
            open: row.get(2)?,
            high: row.get(3)?,
            low: row.get(4)?,
            close: row.get(5)?,
            volume: u64::try_from(volume).unwrap_or(0),
        })
    }
}

impl PriceRepository for SqlitePriceRepo {
    fn upsert_price(&self, record: &PriceRecord) -> Result<UpsertOutcome, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let volume = i64::try_from(record.volume)
            .map_err(|_| DomainError::StoreWrite(format!("Volume out of range: {}", record.volume)))?;
        let rows = conn.execute(
            "INSERT OR IGNORE INTO prices (symbol, trading_date, open, high, low, close, volume)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.symbol.as_str(),
                record.trading_date.format(DATE_FMT).to_string(),
                record.open,
                record.high,
                record.low,
                record.close,
                volume,
            ],
        ).map_err(|e| DomainError::StoreWrite(format!("Failed to write price {} {}: {e}", record.symbol, record.trading_date)))?;
        Ok(if rows == 0 {
            UpsertOutcome::Skipped
        } else {
            UpsertOutcome::Inserted
        })
    }

    fn latest_price_date(&self, symbol: &Symbol) -> Result<Option<NaiveDate>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let latest: Option<String> = conn
            .query_row(
                "SELECT MAX(trading_date) FROM prices WHERE symbol = ?1",
                params![symbol.as_str()],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        latest
            .map(|s| {
                NaiveDate::parse_from_str(&s, DATE_FMT)
                    .map_err(|e| DomainError::Database(format!("Bad trading_date '{s}': {e}")))
            })
            .transpose()
    }

    fn read_prices(&self, symbol: &Symbol, range: DateRange) -> Result<Vec<PriceRecord>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn.prepare(
            "SELECT symbol, trading_date, open, high, low, close, volume FROM prices
             WHERE symbol = ?1 AND trading_date >= ?2 AND trading_date <= ?3
             ORDER BY trading_date ASC",
        )?;
        let records = stmt
            .query_map(
                params![
                    symbol.as_str(),
                    range.start.format(DATE_FMT).to_string(),
                    range.end.format(DATE_FMT).to_string(),
                ],
                Self::row_to_record,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn count(&self) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM prices", [], |r| r.get(0))?;
        Ok(n as usize)
    }

    fn coverage(&self) -> Result<Vec<SymbolCoverage>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn.prepare(
            "SELECT symbol, COUNT(*), MIN(trading_date), MAX(trading_date) FROM prices
             GROUP BY symbol ORDER BY symbol",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let symbol_str: String = row.get(0)?;
                let rows: i64 = row.get(1)?;
                let first: String = row.get(2)?;
                let last: String = row.get(3)?;
                Ok(SymbolCoverage {
                    symbol: Symbol::new(&symbol_str)
                        .map_err(|_| rusqlite::Error::InvalidParameterName(symbol_str.clone()))?,
                    rows: rows as usize,
                    first_date: Self::parse_date(&first)?,
                    last_date: Self::parse_date(&last)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

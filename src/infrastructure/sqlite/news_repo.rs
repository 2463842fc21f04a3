use crate::domain::entities::news_item::{NewsItem, NewsKey};
use crate::domain::error::DomainError;
use crate::domain::ports::news_repository::*;
use crate::domain::ports::price_repository::UpsertOutcome;
use crate::domain::values::date_range::DateRange;
use crate::domain::values::polarity::Polarity;
use crate::domain::values::sentiment_label::NEUTRAL_BAND;
use crate::domain::values::symbol::Symbol;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::sync::Mutex;

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so that string
/// comparison matches chronological order and the key is byte-stable.
fn ts(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub struct SqliteNewsRepo {
    conn: Mutex<Connection>,
}

impl SqliteNewsRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_item(row: &rusqlite::Row) -> Result<NewsItem, rusqlite::Error> {
        let symbol_str: String = row.get(0)?;
        let published_str: String = row.get(2)?;
        let polarity: f64 = row.get(4)?;

        Ok(NewsItem {
            symbol: Symbol::new(&symbol_str)
                .map_err(|_| rusqlite::Error::InvalidParameterName(symbol_str.clone()))?,
            headline: row.get(1)?,
            published_at: DateTime::parse_from_rfc3339(&published_str)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
                })?,
            source_name: row.get(3)?,
            polarity: Polarity::new(polarity).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Real, e.into())
            })?,
        })
    }
}

impl NewsRepository for SqliteNewsRepo {
    fn upsert_news(&self, item: &NewsItem) -> Result<UpsertOutcome, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let key = item.key();
        let rows = conn.execute(
            "INSERT OR IGNORE INTO news (symbol, headline, published_at, source_name, polarity)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                key.symbol.as_str(),
                key.headline,
                ts(&key.published_at),
                item.source_name,
                item.polarity.value(),
            ],
        ).map_err(|e| DomainError::StoreWrite(format!("Failed to write news for {}: {e}", key.symbol)))?;
        Ok(if rows == 0 {
            UpsertOutcome::Skipped
        } else {
            UpsertOutcome::Inserted
        })
    }

    fn news_exists(&self, key: &NewsKey) -> Result<bool, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM news WHERE symbol = ?1 AND headline = ?2 AND published_at = ?3)",
            params![key.symbol.as_str(), key.headline, ts(&key.published_at)],
            |r| r.get(0),
        )?;
        Ok(exists)
    }

    fn read_news(&self, symbol: &Symbol, range: DateRange) -> Result<Vec<NewsItem>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn.prepare(
            "SELECT symbol, headline, published_at, source_name, polarity FROM news
             WHERE symbol = ?1 AND published_at >= ?2 AND published_at < ?3
             ORDER BY published_at ASC, headline ASC",
        )?;
        let items = stmt
            .query_map(
                params![
                    symbol.as_str(),
                    ts(&range.start_instant()),
                    ts(&range.end_instant_exclusive()),
                ],
                Self::row_to_item,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn daily_sentiment(
        &self,
        symbol: Option<&Symbol>,
        range: DateRange,
    ) -> Result<Vec<DailySentiment>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut sql = String::from(
            "SELECT substr(published_at, 1, 10) AS day, AVG(polarity), COUNT(*) FROM news
             WHERE published_at >= ?1 AND published_at < ?2",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
            Box::new(ts(&range.start_instant())),
            Box::new(ts(&range.end_instant_exclusive())),
        ];
        if let Some(sym) = symbol {
            sql.push_str(&format!(" AND symbol = ?{}", param_values.len() + 1));
            param_values.push(Box::new(sym.as_str().to_string()));
        }
        sql.push_str(" GROUP BY day ORDER BY day");

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let series = stmt
            .query_map(params_refs.as_slice(), |row| {
                let day: String = row.get(0)?;
                let count: i64 = row.get(2)?;
                Ok(DailySentiment {
                    date: NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
                    })?,
                    average: row.get(1)?,
                    count: count as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(series)
    }

    fn sentiment_breakdown(&self, symbol: &Symbol) -> Result<SentimentBreakdown, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let breakdown = conn.query_row(
            "SELECT COUNT(*), AVG(polarity),
                    COALESCE(SUM(CASE WHEN polarity > ?2 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN polarity < -?2 THEN 1 ELSE 0 END), 0)
             FROM news WHERE symbol = ?1",
            params![symbol.as_str(), NEUTRAL_BAND],
            |row| {
                let count: i64 = row.get(0)?;
                let positive: i64 = row.get(2)?;
                let negative: i64 = row.get(3)?;
                Ok(SentimentBreakdown {
                    symbol: symbol.clone(),
                    count: count as usize,
                    average: row.get(1)?,
                    positive: positive as usize,
                    neutral: (count - positive - negative) as usize,
                    negative: negative as usize,
                })
            },
        )?;
        Ok(breakdown)
    }

    fn count(&self) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM news", [], |r| r.get(0))?;
        Ok(n as usize)
    }
}

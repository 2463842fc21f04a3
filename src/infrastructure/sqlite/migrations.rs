use crate::domain::error::DomainError;
use rusqlite::Connection;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS prices (
            symbol TEXT NOT NULL,
            trading_date TEXT NOT NULL,
            open REAL NOT NULL,
            high REAL NOT NULL,
            low REAL NOT NULL,
            close REAL NOT NULL,
            volume INTEGER NOT NULL,
            PRIMARY KEY (symbol, trading_date)
        );

        CREATE TABLE IF NOT EXISTS news (
            symbol TEXT NOT NULL,
            headline TEXT NOT NULL,
            published_at TEXT NOT NULL,
            source_name TEXT NOT NULL,
            polarity REAL NOT NULL CHECK (polarity BETWEEN -1.0 AND 1.0),
            PRIMARY KEY (symbol, headline, published_at)
        );

        CREATE INDEX IF NOT EXISTS idx_news_published ON news(published_at);
        CREATE INDEX IF NOT EXISTS idx_news_symbol_published ON news(symbol, published_at);
        "
    ).map_err(|e| DomainError::Database(format!("Migration failed: {e}")))
}

/// Open a connection in WAL mode with the schema in place.
pub fn open_connection(db_path: &str) -> Result<Connection, DomainError> {
    let conn = Connection::open(db_path).map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| DomainError::Database(format!("Busy timeout error: {e}")))?;
    run_migrations(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('prices', 'news')",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(n, 2);
    }
}

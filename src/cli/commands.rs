use crate::domain::values::date_range::DateRange;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "marketpulse", about = "Market price and news sentiment tracker")]
pub struct Cli {
    /// Emit logs as JSON lines instead of the compact format
    #[arg(long, global = true)]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one ingestion cycle for the watch-list and indices
    Ingest {
        /// Comma-separated symbols overriding the configured watch-list
        #[arg(long)]
        symbols: Option<String>,
        /// Treat this instant as "now" (YYYY-MM-DD or RFC3339)
        #[arg(long)]
        as_of: Option<String>,
        /// Skip the market indices
        #[arg(long)]
        no_indices: bool,
    },
    /// Ingest on a fixed interval until interrupted
    Watch {
        /// Seconds between cycles (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
        /// Wait one interval before the first cycle
        #[arg(long)]
        no_immediate: bool,
    },
    /// Stored daily prices for a symbol
    Prices {
        symbol: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Stored scored headlines for a symbol
    News {
        symbol: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Daily average sentiment, for one symbol or all of them
    Sentiment {
        #[arg(long)]
        symbol: Option<String>,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Per-symbol sentiment breakdown for the watch-list
    Summary {
        /// Comma-separated symbols overriding the configured watch-list
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Normalized index closes against daily sentiment
    Compare {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Show database statistics
    Stats,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Start of date range (YYYY-MM-DD or RFC3339)
    #[arg(long, conflicts_with = "last")]
    pub from: Option<String>,
    /// End of date range (YYYY-MM-DD or RFC3339)
    #[arg(long)]
    pub to: Option<String>,
    /// Relative time window (e.g. 30d, 48h, 90m)
    #[arg(long)]
    pub last: Option<String>,
}

impl RangeArgs {
    /// Resolve to an inclusive date range. With no bounds at all the range
    /// covers the `default_days` up to `now`.
    pub fn resolve(&self, now: DateTime<Utc>, default_days: u32) -> Result<DateRange, String> {
        let end = match &self.to {
            Some(s) => parse_date(s)?,
            None => now,
        };
        let start = match (&self.last, &self.from) {
            (Some(last), _) => end
                .checked_sub_signed(parse_last(last)?)
                .ok_or_else(|| format!("Relative window {last} reaches before the earliest date"))?,
            (None, Some(from)) => parse_date(from)?,
            (None, None) => end
                .checked_sub_signed(Duration::days(i64::from(default_days)))
                .ok_or_else(|| format!("Default window of {default_days} days is out of range"))?,
        };
        DateRange::new(start.date_naive(), end.date_naive())
    }
}

/// `YYYY-MM-DD` (midnight UTC) or RFC3339.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    Err(format!("Invalid date format: {s}. Use YYYY-MM-DD or RFC3339"))
}

/// `Nd`, `Nh` or `Nm`.
pub fn parse_last(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let invalid = || format!("Invalid relative window: {s}. Use e.g. 30d, 48h or 90m");
    let unit = s.chars().last().ok_or_else(invalid)?;
    let n: i64 = s[..s.len() - unit.len_utf8()].parse().map_err(|_| invalid())?;
    if n <= 0 {
        return Err(invalid());
    }
    let window = match unit {
        'd' => Duration::try_days(n),
        'h' => Duration::try_hours(n),
        'm' => Duration::try_minutes(n),
        _ => return Err(invalid()),
    };
    window.ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 15, 30, 0).unwrap()
    }

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-01").unwrap().date_naive(), day(3, 1));
        let dt = parse_date("2025-03-01T23:30:00-05:00").unwrap();
        assert_eq!(dt.date_naive(), day(3, 2));
        assert!(parse_date("03/01/2025").is_err());
    }

    #[test]
    fn test_parse_last() {
        assert_eq!(parse_last("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_last("48h").unwrap(), Duration::hours(48));
        assert_eq!(parse_last("90m").unwrap(), Duration::minutes(90));
        assert!(parse_last("d").is_err());
        assert!(parse_last("0d").is_err());
        assert!(parse_last("5w").is_err());
        assert!(parse_last("-3d").is_err());
        assert!(parse_last("").is_err());
        assert!(parse_last("5é").is_err());
    }

    #[test]
    fn test_resolve_default_window() {
        let range = RangeArgs::default().resolve(now(), 30).unwrap();
        assert_eq!(range.start, day(2, 8));
        assert_eq!(range.end, day(3, 10));
    }

    #[test]
    fn test_resolve_last_and_explicit() {
        let last = RangeArgs {
            last: Some("48h".into()),
            ..Default::default()
        };
        assert_eq!(last.resolve(now(), 30).unwrap().start, day(3, 8));

        let explicit = RangeArgs {
            from: Some("2025-01-01".into()),
            to: Some("2025-01-31".into()),
            last: None,
        };
        let range = explicit.resolve(now(), 30).unwrap();
        assert_eq!((range.start, range.end), (day(1, 1), day(1, 31)));
    }

    #[test]
    fn test_huge_windows_are_errors() {
        assert!(parse_last("99999999999999999d").is_err());
        assert!(parse_last("9223372036854775807m").is_err());
        let args = RangeArgs {
            last: Some("999999999d".into()),
            ..Default::default()
        };
        assert!(args.resolve(now(), 30).is_err());
    }

    #[test]
    fn test_resolve_rejects_inverted() {
        let args = RangeArgs {
            from: Some("2025-02-01".into()),
            to: Some("2025-01-01".into()),
            last: None,
        };
        assert!(args.resolve(now(), 30).is_err());
    }
}

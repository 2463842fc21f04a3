use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = String;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if start > end {
            return Err(format!("Date range start {start} is after end {end}"));
        }
        Ok(Self { start, end })
    }

    /// `[end - days, end]`, or `None` when the start falls off the calendar.
    pub fn lookback(end: NaiveDate, days: u32) -> Option<Self> {
        let start = end.checked_sub_days(Days::new(u64::from(days)))?;
        Some(Self { start, end })
    }

    /// Dates strictly after `latest` up to and including `end`, or `None`
    /// when `latest` already covers `end`.
    pub fn after(latest: NaiveDate, end: NaiveDate) -> Option<Self> {
        let start = latest.succ_opt()?;
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, inclusive of both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// First instant of `start` (UTC).
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// First instant after `end` (UTC), i.e. the exclusive upper bound.
    pub fn end_instant_exclusive(&self) -> DateTime<Utc> {
        match self.end.succ_opt() {
            Some(next) => next.and_time(chrono::NaiveTime::MIN).and_utc(),
            None => DateTime::<Utc>::MAX_UTC,
        }
    }
}

/// Closed window of instants, `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// `[to - hours, to]`, or `None` when the start is not representable.
    pub fn ending_at(to: DateTime<Utc>, hours: u32) -> Option<Self> {
        let from = to.checked_sub_signed(Duration::try_hours(i64::from(hours))?)?;
        Some(Self { from, to })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

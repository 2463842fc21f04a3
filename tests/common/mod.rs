//! Shared test helpers: in-memory setup and scripted collaborators.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use marketpulse::application::ingest::IngestSettings;
use marketpulse::domain::entities::news_item::Headline;
use marketpulse::domain::entities::price_record::PriceRecord;
use marketpulse::domain::error::SourceError;
use marketpulse::domain::ports::clock::Clock;
use marketpulse::domain::ports::news_source::NewsSource;
use marketpulse::domain::ports::price_source::PriceSource;
use marketpulse::domain::ports::sentiment_scorer::SentimentScorer;
use marketpulse::domain::values::date_range::{DateRange, TimeWindow};
use marketpulse::domain::values::symbol::Symbol;
use marketpulse::{MarketPulse, Providers};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn sym(s: &str) -> Symbol {
    Symbol::new(s).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Noon UTC on the given day.
pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn bar(symbol: &str, day: NaiveDate, close: f64) -> PriceRecord {
    PriceRecord::new(sym(symbol), day, close - 1.0, close + 1.0, close - 2.0, close, 1_000)
}

/// One bar per calendar day in `[first, first + n)`.
pub fn bars(symbol: &str, first: NaiveDate, n: i64) -> Vec<PriceRecord> {
    (0..n)
        .map(|i| bar(symbol, first + ChronoDuration::days(i), 100.0 + i as f64))
        .collect()
}

/// Price source backed by a fixed set of bars per symbol. Returns the bars
/// that fall inside the requested range and records every request.
#[derive(Default)]
pub struct ScriptedPriceSource {
    bars: Mutex<HashMap<Symbol, Vec<PriceRecord>>>,
    failing: Mutex<HashSet<Symbol>>,
    ignore_range: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    pub calls: Mutex<Vec<(Symbol, DateRange)>>,
}

impl ScriptedPriceSource {
    pub fn with_bars(&self, records: Vec<PriceRecord>) {
        let mut map = self.bars.lock().unwrap();
        for r in records {
            map.entry(r.symbol.clone()).or_default().push(r);
        }
    }

    pub fn fail_for(&self, symbol: &str) {
        self.failing.lock().unwrap().insert(sym(symbol));
    }

    /// Return every scripted bar, whatever range was asked for.
    pub fn ignore_range(&self) {
        *self.ignore_range.lock().unwrap() = true;
    }

    pub fn delay(&self, d: Duration) {
        *self.delay.lock().unwrap() = Some(d);
    }

    pub fn requests(&self) -> Vec<(Symbol, DateRange)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests_for(&self, symbol: &str) -> Vec<DateRange> {
        self.requests()
            .into_iter()
            .filter(|(s, _)| s.as_str() == symbol)
            .map(|(_, r)| r)
            .collect()
    }
}

#[async_trait]
impl PriceSource for ScriptedPriceSource {
    fn name(&self) -> &str {
        "scripted-prices"
    }

    async fn fetch(&self, symbol: &Symbol, range: DateRange) -> Result<Vec<PriceRecord>, SourceError> {
        self.calls.lock().unwrap().push((symbol.clone(), range));
        let delay = *self.delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        if self.failing.lock().unwrap().contains(symbol) {
            return Err(SourceError::Unavailable(format!("{symbol}: connection refused")));
        }
        let ignore_range = *self.ignore_range.lock().unwrap();
        Ok(self
            .bars
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|r| ignore_range || range.contains(r.trading_date))
            .collect())
    }
}

/// News source returning the same scripted headlines on every call.
#[derive(Default)]
pub struct ScriptedNewsSource {
    headlines: Mutex<HashMap<Symbol, Vec<Headline>>>,
    failing: Mutex<HashSet<Symbol>>,
    pub calls: Mutex<Vec<(Symbol, TimeWindow)>>,
}

impl ScriptedNewsSource {
    pub fn with_headlines(&self, symbol: &str, items: Vec<Headline>) {
        self.headlines
            .lock()
            .unwrap()
            .entry(sym(symbol))
            .or_default()
            .extend(items);
    }

    pub fn fail_for(&self, symbol: &str) {
        self.failing.lock().unwrap().insert(sym(symbol));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NewsSource for ScriptedNewsSource {
    fn name(&self) -> &str {
        "scripted-news"
    }

    async fn fetch(&self, symbol: &Symbol, window: TimeWindow) -> Result<Vec<Headline>, SourceError> {
        self.calls.lock().unwrap().push((symbol.clone(), window));
        if self.failing.lock().unwrap().contains(symbol) {
            return Err(SourceError::Malformed("unexpected payload".into()));
        }
        Ok(self
            .headlines
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or_default())
    }
}

/// Scorer returning a fixed value per keyword (0.0 otherwise) and counting
/// how often it was asked.
#[derive(Default)]
pub struct CountingScorer {
    keywords: Mutex<Vec<(String, f64)>>,
    failing_on: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl CountingScorer {
    pub fn score_keyword(&self, keyword: &str, value: f64) {
        self.keywords.lock().unwrap().push((keyword.to_lowercase(), value));
    }

    pub fn fail_on(&self, keyword: &str) {
        *self.failing_on.lock().unwrap() = Some(keyword.to_lowercase());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentScorer for CountingScorer {
    fn name(&self) -> &str {
        "counting"
    }

    async fn score(&self, text: &str) -> Result<f64, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lower = text.to_lowercase();
        if let Some(k) = self.failing_on.lock().unwrap().as_deref() {
            if lower.contains(k) {
                return Err(SourceError::Unavailable("scorer offline".into()));
            }
        }
        Ok(self
            .keywords
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| lower.contains(k.as_str()))
            .map(|(_, v)| *v)
            .unwrap_or(0.0))
    }
}

/// Clock whose `sleep` returns at once and moves `now` forward.
pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
    pub sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn slept(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let step = ChronoDuration::from_std(duration).unwrap();
        *self.now.lock().unwrap() += step;
        tokio::task::yield_now().await;
    }
}

pub struct Harness {
    pub mp: MarketPulse,
    pub prices: Arc<ScriptedPriceSource>,
    pub news: Arc<ScriptedNewsSource>,
    pub scorer: Arc<CountingScorer>,
    pub clock: Arc<FakeClock>,
}

pub fn settings() -> IngestSettings {
    IngestSettings {
        lookback_days: 30,
        news_window_hours: 48,
        source_timeout: Duration::from_secs(5),
    }
}

pub fn setup() -> Harness {
    setup_with(":memory:", settings())
}

pub fn setup_with(db_path: &str, settings: IngestSettings) -> Harness {
    let prices = Arc::new(ScriptedPriceSource::default());
    let news = Arc::new(ScriptedNewsSource::default());
    let scorer = Arc::new(CountingScorer::default());
    let clock = Arc::new(FakeClock::new(at(2025, 3, 10)));

    let mp = MarketPulse::with_providers(
        db_path,
        settings,
        Providers {
            prices: prices.clone(),
            news: news.clone(),
            scorer: scorer.clone(),
            clock: clock.clone(),
        },
    )
    .unwrap();

    Harness {
        mp,
        prices,
        news,
        scorer,
        clock,
    }
}

use crate::application::scheduler::Job;
use crate::domain::entities::news_item::{NewsItem, NewsKey};
use crate::domain::error::{DomainError, SourceError};
use crate::domain::ports::news_repository::NewsRepository;
use crate::domain::ports::news_source::NewsSource;
use crate::domain::ports::price_repository::{PriceRepository, UpsertOutcome};
use crate::domain::ports::price_source::PriceSource;
use crate::domain::ports::sentiment_scorer::SentimentScorer;
use crate::domain::values::date_range::{DateRange, TimeWindow};
use crate::domain::values::polarity::Polarity;
use crate::domain::values::symbol::Symbol;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct IngestSettings {
    /// Window fetched for a symbol with no stored prices.
    pub lookback_days: u32,
    /// How far back from `as_of` to ask for news.
    pub news_window_hours: u32,
    /// Upper bound on any single source call.
    pub source_timeout: Duration,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            news_window_hours: 48,
            source_timeout: Duration::from_secs(15),
        }
    }
}

/// Outcome of one ingestion cycle for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    pub symbol: Symbol,
    /// Dates requested from the price source; `None` when already current.
    pub price_range: Option<DateRange>,
    pub prices_fetched: usize,
    pub prices_added: usize,
    pub prices_skipped: usize,
    pub news_fetched: usize,
    pub news_added: usize,
    pub news_skipped: usize,
    pub news_scored: usize,
    pub errors: Vec<String>,
}

impl SymbolReport {
    fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            price_range: None,
            prices_fetched: 0,
            prices_added: 0,
            prices_skipped: 0,
            news_fetched: 0,
            news_added: 0,
            news_skipped: 0,
            news_scored: 0,
            errors: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub run_id: Uuid,
    pub as_of: DateTime<Utc>,
    pub symbols: Vec<SymbolReport>,
}

impl IngestReport {
    pub fn prices_added(&self) -> usize {
        self.symbols.iter().map(|s| s.prices_added).sum()
    }

    pub fn news_added(&self) -> usize {
        self.symbols.iter().map(|s| s.news_added).sum()
    }

    pub fn error_count(&self) -> usize {
        self.symbols.iter().map(|s| s.errors.len()).sum()
    }

    pub fn symbol(&self, symbol: &str) -> Option<&SymbolReport> {
        self.symbols.iter().find(|s| s.symbol.as_str() == symbol)
    }
}

/// Pulls new prices and headlines for a watch-list, scores the headlines and
/// writes everything with insert-if-absent semantics.
///
/// Nothing in here fails the whole cycle: source and store errors are logged
/// and recorded against the symbol (or record) they belong to.
pub struct IngestUseCase {
    prices: Arc<dyn PriceRepository>,
    news: Arc<dyn NewsRepository>,
    price_source: Arc<dyn PriceSource>,
    news_source: Arc<dyn NewsSource>,
    scorer: Arc<dyn SentimentScorer>,
    settings: IngestSettings,
}

impl IngestUseCase {
    pub fn new(
        prices: Arc<dyn PriceRepository>,
        news: Arc<dyn NewsRepository>,
        price_source: Arc<dyn PriceSource>,
        news_source: Arc<dyn NewsSource>,
        scorer: Arc<dyn SentimentScorer>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            prices,
            news,
            price_source,
            news_source,
            scorer,
            settings,
        }
    }

    /// Prices and news for every symbol in `watchlist`.
    pub async fn run_once(&self, watchlist: &[Symbol], as_of: DateTime<Utc>) -> IngestReport {
        self.run_cycle(watchlist, &[], as_of).await
    }

    /// Prices only, for market index tickers.
    pub async fn refresh_indices(&self, indices: &[Symbol], as_of: DateTime<Utc>) -> IngestReport {
        self.run_cycle(&[], indices, as_of).await
    }

    /// One full cycle: the watch-list with news, then indices without.
    pub async fn run_cycle(
        &self,
        watchlist: &[Symbol],
        indices: &[Symbol],
        as_of: DateTime<Utc>,
    ) -> IngestReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("ingest", %run_id);

        async {
            let mut reports = Vec::new();
            let mut seen: Vec<&Symbol> = Vec::new();

            let jobs = watchlist
                .iter()
                .map(|s| (s, true))
                .chain(indices.iter().map(|s| (s, false)));
            for (symbol, with_news) in jobs {
                if seen.contains(&symbol) {
                    continue;
                }
                seen.push(symbol);
                reports.push(self.ingest_symbol(symbol, as_of, with_news).await);
            }

            let report = IngestReport {
                run_id,
                as_of,
                symbols: reports,
            };
            tracing::info!(
                symbols = report.symbols.len(),
                prices_added = report.prices_added(),
                news_added = report.news_added(),
                errors = report.error_count(),
                "ingest cycle finished"
            );
            report
        }
        .instrument(span)
        .await
    }

    async fn ingest_symbol(&self, symbol: &Symbol, as_of: DateTime<Utc>, with_news: bool) -> SymbolReport {
        let mut report = SymbolReport::new(symbol.clone());

        // The two stages are independent: a price outage still lets news in.
        self.ingest_prices(symbol, as_of, &mut report).await;
        if with_news {
            self.ingest_news(symbol, as_of, &mut report).await;
        }

        if report.is_clean() {
            tracing::debug!(
                %symbol,
                prices_added = report.prices_added,
                news_added = report.news_added,
                "symbol ingested"
            );
        } else {
            tracing::warn!(%symbol, errors = report.errors.len(), "symbol ingested with errors");
        }
        report
    }

    /// Dates not yet covered for `symbol`, or `None` when nothing is missing.
    pub fn missing_range(&self, symbol: &Symbol, as_of: DateTime<Utc>) -> Result<Option<DateRange>, DomainError> {
        let end = as_of.date_naive();
        Ok(match self.prices.latest_price_date(symbol)? {
            Some(latest) => DateRange::after(latest, end),
            None => {
                let days = self.settings.lookback_days;
                Some(DateRange::lookback(end, days).ok_or_else(|| {
                    DomainError::InvalidInput(format!("lookback of {days} days from {end} is out of range"))
                })?)
            }
        })
    }

    async fn ingest_prices(&self, symbol: &Symbol, as_of: DateTime<Utc>, report: &mut SymbolReport) {
        let range = match self.missing_range(symbol, as_of) {
            Ok(Some(range)) => range,
            Ok(None) => {
                tracing::debug!(%symbol, "prices already current");
                return;
            }
            Err(e) => {
                record_error(report, "prices", &e);
                return;
            }
        };
        report.price_range = Some(range);

        let fetched = match self
            .bounded(self.price_source.name(), self.price_source.fetch(symbol, range))
            .await
        {
            Ok(records) => records,
            Err(e) => {
                record_error(report, "prices", &e);
                return;
            }
        };
        report.prices_fetched = fetched.len();

        for record in fetched {
            if record.symbol != *symbol {
                let e = SourceError::Malformed(format!("bar for {} returned for {symbol}", record.symbol));
                record_error(report, "prices", &e);
                continue;
            }
            if let Err(msg) = record.validate() {
                record_error(report, "prices", &SourceError::Malformed(msg));
                continue;
            }
            match self.prices.upsert_price(&record) {
                Ok(UpsertOutcome::Inserted) => report.prices_added += 1,
                Ok(UpsertOutcome::Skipped) => {
                    tracing::debug!(%symbol, date = %record.trading_date, "price already stored");
                    report.prices_skipped += 1;
                }
                Err(e) => record_error(report, "prices", &e),
            }
        }
    }

    async fn ingest_news(&self, symbol: &Symbol, as_of: DateTime<Utc>, report: &mut SymbolReport) {
        let hours = self.settings.news_window_hours;
        let Some(window) = TimeWindow::ending_at(as_of, hours) else {
            let e = DomainError::InvalidInput(format!("news window of {hours}h before {as_of} is out of range"));
            record_error(report, "news", &e);
            return;
        };
        let headlines = match self
            .bounded(self.news_source.name(), self.news_source.fetch(symbol, window))
            .await
        {
            Ok(h) => h,
            Err(e) => {
                record_error(report, "news", &e);
                return;
            }
        };
        report.news_fetched = headlines.len();

        for h in headlines {
            let key = NewsKey::new(symbol.clone(), &h.headline, h.published_at);
            if key.headline.is_empty() {
                record_error(report, "news", &SourceError::Malformed("empty headline".into()));
                continue;
            }

            match self.news.news_exists(&key) {
                Ok(true) => {
                    tracing::debug!(%symbol, headline = %key.headline, "headline already scored");
                    report.news_skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    record_error(report, "news", &e);
                    continue;
                }
            }

            let score = match self.bounded(self.scorer.name(), self.scorer.score(&key.headline)).await {
                Ok(s) => s,
                Err(e) => {
                    record_error(report, "sentiment", &e);
                    continue;
                }
            };
            let polarity = match Polarity::new(score) {
                Ok(p) => p,
                Err(msg) => {
                    record_error(report, "sentiment", &SourceError::Malformed(msg));
                    continue;
                }
            };
            report.news_scored += 1;

            match self.news.upsert_news(&NewsItem::new(key, h.source_name, polarity)) {
                Ok(UpsertOutcome::Inserted) => report.news_added += 1,
                Ok(UpsertOutcome::Skipped) => report.news_skipped += 1,
                Err(e) => record_error(report, "news", &e),
            }
        }
    }

    async fn bounded<T>(
        &self,
        source: &str,
        call: impl Future<Output = Result<T, SourceError>>,
    ) -> Result<T, SourceError> {
        match tokio::time::timeout(self.settings.source_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Unavailable(format!(
                "{source} timed out after {:?}",
                self.settings.source_timeout
            ))),
        }
    }
}

fn record_error(report: &mut SymbolReport, stage: &str, e: &dyn std::fmt::Display) {
    tracing::warn!(symbol = %report.symbol, stage, error = %e, "ingest failure");
    report.errors.push(format!("{stage}: {e}"));
}

/// Scheduler job running one full cycle at the clock's current time.
pub struct IngestJob {
    use_case: Arc<IngestUseCase>,
    watchlist: Vec<Symbol>,
    indices: Vec<Symbol>,
}

impl IngestJob {
    pub fn new(use_case: Arc<IngestUseCase>, watchlist: Vec<Symbol>, indices: Vec<Symbol>) -> Self {
        Self {
            use_case,
            watchlist,
            indices,
        }
    }
}

#[async_trait::async_trait]
impl Job for IngestJob {
    fn name(&self) -> &str {
        "ingest"
    }

    async fn run(&self, fired_at: DateTime<Utc>) -> Result<(), DomainError> {
        self.use_case
            .run_cycle(&self.watchlist, &self.indices, fired_at)
            .await;
        Ok(())
    }
}

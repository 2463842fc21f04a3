pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::compare::{CompareUseCase, Comparison};
use crate::application::ingest::{IngestJob, IngestReport, IngestSettings, IngestUseCase};
use crate::application::query::QueryUseCase;
use crate::application::scheduler::Scheduler;
use crate::application::stats::{StatsUseCase, StoreStats};
use crate::config::{AppConfig, NewsProvider};
use crate::domain::entities::news_item::NewsItem;
use crate::domain::entities::price_record::PriceRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::clock::Clock;
use crate::domain::ports::news_repository::{DailySentiment, NewsRepository, SentimentBreakdown};
use crate::domain::ports::news_source::NewsSource;
use crate::domain::ports::price_repository::PriceRepository;
use crate::domain::ports::price_source::PriceSource;
use crate::domain::ports::sentiment_scorer::SentimentScorer;
use crate::domain::values::date_range::DateRange;
use crate::domain::values::symbol::Symbol;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::sentiment::lexicon::LexiconScorer;
use crate::infrastructure::sources::newsapi::NewsApiSource;
use crate::infrastructure::sources::noop::NoopNewsSource;
use crate::infrastructure::sources::yahoo::YahooPriceSource;
use crate::infrastructure::sqlite::migrations::open_connection;
use crate::infrastructure::sqlite::news_repo::SqliteNewsRepo;
use crate::infrastructure::sqlite::price_repo::SqlitePriceRepo;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// External collaborators of the ingest pipeline.
pub struct Providers {
    pub prices: Arc<dyn PriceSource>,
    pub news: Arc<dyn NewsSource>,
    pub scorer: Arc<dyn SentimentScorer>,
    pub clock: Arc<dyn Clock>,
}

pub struct MarketPulse {
    ingest_uc: Arc<IngestUseCase>,
    query_uc: QueryUseCase,
    compare_uc: CompareUseCase,
    stats_uc: StatsUseCase,
    clock: Arc<dyn Clock>,
}

impl MarketPulse {
    /// Wire the real sources described by `config`.
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let timeout = config.source_timeout();
        let news: Arc<dyn NewsSource> = match (config.effective_news_provider(), &config.news_api_key) {
            (NewsProvider::NewsApi, Some(key)) => {
                Arc::new(NewsApiSource::new(key.clone(), config.news_page_size, timeout))
            }
            (NewsProvider::NewsApi, None) => {
                return Err(DomainError::Config("NEWSAPI_KEY is required for the newsapi provider".into()))
            }
            (NewsProvider::None, _) => {
                tracing::warn!("no news provider configured, only prices will be ingested");
                Arc::new(NoopNewsSource)
            }
        };

        let providers = Providers {
            prices: Arc::new(YahooPriceSource::new(timeout)),
            news,
            scorer: Arc::new(LexiconScorer::new()),
            clock: Arc::new(SystemClock),
        };
        Self::with_providers(&config.db_path, settings_from(config), providers)
    }

    pub fn with_providers(
        db_path: &str,
        settings: IngestSettings,
        providers: Providers,
    ) -> Result<Self, DomainError> {
        // One connection per repository; migrations run on each so that
        // ":memory:" databases get their schema too.
        let price_repo: Arc<dyn PriceRepository> = Arc::new(SqlitePriceRepo::new(open_connection(db_path)?));
        let news_repo: Arc<dyn NewsRepository> = Arc::new(SqliteNewsRepo::new(open_connection(db_path)?));

        Ok(Self {
            ingest_uc: Arc::new(IngestUseCase::new(
                price_repo.clone(),
                news_repo.clone(),
                providers.prices,
                providers.news,
                providers.scorer,
                settings,
            )),
            query_uc: QueryUseCase::new(price_repo.clone(), news_repo.clone()),
            compare_uc: CompareUseCase::new(price_repo.clone(), news_repo.clone()),
            stats_uc: StatsUseCase::new(price_repo, news_repo),
            clock: providers.clock,
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // Ingest side

    pub async fn run_once(&self, watchlist: &[Symbol], as_of: DateTime<Utc>) -> IngestReport {
        self.ingest_uc.run_once(watchlist, as_of).await
    }

    pub async fn run_cycle(
        &self,
        watchlist: &[Symbol],
        indices: &[Symbol],
        as_of: DateTime<Utc>,
    ) -> IngestReport {
        self.ingest_uc.run_cycle(watchlist, indices, as_of).await
    }

    pub fn scheduler(&self, interval: Duration) -> Result<Scheduler, DomainError> {
        Scheduler::new(interval, self.clock.clone())
    }

    pub fn ingest_job(&self, watchlist: Vec<Symbol>, indices: Vec<Symbol>) -> IngestJob {
        IngestJob::new(self.ingest_uc.clone(), watchlist, indices)
    }

    /// Run the scheduler for `max_ticks` cycles, or forever when `None`.
    pub async fn watch(
        &self,
        watchlist: Vec<Symbol>,
        indices: Vec<Symbol>,
        interval: Duration,
        run_immediately: bool,
        max_ticks: Option<u64>,
    ) -> Result<u64, DomainError> {
        let scheduler = self.scheduler(interval)?.run_immediately(run_immediately);
        let job = self.ingest_job(watchlist, indices);
        Ok(scheduler.run(&job, max_ticks).await)
    }

    // Read side

    pub fn prices(&self, symbol: &Symbol, range: DateRange) -> Result<Vec<PriceRecord>, DomainError> {
        self.query_uc.prices(symbol, range)
    }

    pub fn news(&self, symbol: &Symbol, range: DateRange) -> Result<Vec<NewsItem>, DomainError> {
        self.query_uc.news(symbol, range)
    }

    pub fn daily_sentiment(
        &self,
        symbol: Option<&Symbol>,
        range: DateRange,
    ) -> Result<Vec<DailySentiment>, DomainError> {
        self.query_uc.daily_sentiment(symbol, range)
    }

    pub fn summary(&self, watchlist: &[Symbol]) -> Result<Vec<SentimentBreakdown>, DomainError> {
        self.query_uc.summary(watchlist)
    }

    pub fn compare(
        &self,
        indices: &BTreeMap<String, Symbol>,
        range: DateRange,
    ) -> Result<Comparison, DomainError> {
        self.compare_uc.execute(indices, range)
    }

    pub fn stats(&self) -> Result<StoreStats, DomainError> {
        self.stats_uc.stats()
    }
}

pub fn settings_from(config: &AppConfig) -> IngestSettings {
    IngestSettings {
        lookback_days: config.lookback_days,
        news_window_hours: config.news_window_hours,
        source_timeout: config.source_timeout(),
    }
}

//! Market indices against news sentiment.
//!
//! Each index close series and the all-symbol daily average sentiment are
//! inner-joined on date and min-max scaled to [0, 1], so that series with
//! very different units can share one chart.

use crate::domain::error::DomainError;
use crate::domain::ports::news_repository::NewsRepository;
use crate::domain::ports::price_repository::PriceRepository;
use crate::domain::values::date_range::DateRange;
use crate::domain::values::symbol::Symbol;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub const SENTIMENT_SERIES: &str = "Sentiment";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub dates: Vec<NaiveDate>,
    pub series: Vec<Series>,
}

impl Comparison {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

type Column = (String, BTreeMap<NaiveDate, f64>);

pub struct CompareUseCase {
    prices: Arc<dyn PriceRepository>,
    news: Arc<dyn NewsRepository>,
}

impl CompareUseCase {
    pub fn new(prices: Arc<dyn PriceRepository>, news: Arc<dyn NewsRepository>) -> Self {
        Self { prices, news }
    }

    pub fn execute(
        &self,
        indices: &BTreeMap<String, Symbol>,
        range: DateRange,
    ) -> Result<Comparison, DomainError> {
        let mut columns: Vec<Column> = Vec::new();

        for (name, symbol) in indices {
            let closes: BTreeMap<NaiveDate, f64> = self
                .prices
                .read_prices(symbol, range)?
                .into_iter()
                .map(|r| (r.trading_date, r.close))
                .collect();
            if closes.is_empty() {
                tracing::debug!(%symbol, "no stored closes for index, leaving it out");
                continue;
            }
            columns.push((name.clone(), closes));
        }

        let sentiment: BTreeMap<NaiveDate, f64> = self
            .news
            .daily_sentiment(None, range)?
            .into_iter()
            .map(|d| (d.date, d.average))
            .collect();
        columns.push((SENTIMENT_SERIES.to_string(), sentiment));

        Ok(join_and_normalize(columns))
    }
}

/// Inner join on date, then min-max scale every column.
fn join_and_normalize(columns: Vec<Column>) -> Comparison {
    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for (_, col) in &columns {
        let keys: BTreeSet<NaiveDate> = col.keys().copied().collect();
        common = Some(match common {
            None => keys,
            Some(acc) => acc.intersection(&keys).copied().collect(),
        });
    }
    let dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();

    let series = columns
        .into_iter()
        .map(|(name, col)| {
            let raw: Vec<f64> = dates.iter().filter_map(|d| col.get(d).copied()).collect();
            Series {
                name,
                values: min_max(&raw),
            }
        })
        .collect();

    Comparison { dates, series }
}

/// Scale to [0, 1]. A constant column maps to all zeros.
fn min_max(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|v| if span > 0.0 { (v - min) / span } else { 0.0 })
        .collect()
}

use super::{classify, http_client};
use crate::domain::entities::price_record::PriceRecord;
use crate::domain::error::SourceError;
use crate::domain::ports::price_source::PriceSource;
use crate::domain::values::date_range::DateRange;
use crate::domain::values::symbol::Symbol;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate};
use std::collections::BTreeMap;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Daily bars from the Yahoo Finance v8 chart API (no auth required).
pub struct YahooPriceSource {
    base_url: String,
    client: reqwest::Client,
}

impl YahooPriceSource {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), timeout)
    }

    pub fn with_base_url(base_url: String, timeout: Duration) -> Self {
        Self {
            base_url,
            client: http_client(timeout),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, serde::Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartData {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, serde::Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Turn a chart payload into bars within `range`, one per trading date,
/// ordered by date. Bars with any null field (halts, partial sessions) are
/// dropped.
pub(crate) fn parse_chart(
    symbol: &Symbol,
    body: &str,
    range: DateRange,
) -> Result<Vec<PriceRecord>, SourceError> {
    let data: ChartResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    if let Some(err) = data.chart.error {
        if !err.is_null() {
            return Err(SourceError::Malformed(format!("Yahoo error for {symbol}: {err}")));
        }
    }

    let results = data
        .chart
        .result
        .ok_or_else(|| SourceError::Malformed(format!("No chart results for {symbol}")))?;
    let chart = results
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::Malformed(format!("Empty chart results for {symbol}")))?;

    if chart.timestamp.is_empty() {
        return Ok(vec![]);
    }

    let quote = chart.indicators.quote.into_iter().next().unwrap_or_default();
    let n = chart.timestamp.len();
    if [quote.open.len(), quote.high.len(), quote.low.len(), quote.close.len(), quote.volume.len()]
        .iter()
        .any(|&len| len != n)
    {
        return Err(SourceError::Malformed(format!(
            "Quote arrays for {symbol} do not match {n} timestamps"
        )));
    }

    let gmtoffset = chart.meta.gmtoffset;
    let offset = ChronoDuration::try_seconds(gmtoffset)
        .ok_or_else(|| SourceError::Malformed(format!("Bad gmtoffset {gmtoffset} for {symbol}")))?;
    let mut by_date: BTreeMap<NaiveDate, PriceRecord> = BTreeMap::new();
    for (i, &ts) in chart.timestamp.iter().enumerate() {
        let Some(at) = DateTime::from_timestamp(ts, 0) else {
            return Err(SourceError::Malformed(format!("Bad timestamp {ts} for {symbol}")));
        };
        let trading_date = at
            .checked_add_signed(offset)
            .ok_or_else(|| SourceError::Malformed(format!("Bad gmtoffset {gmtoffset} for {symbol}")))?
            .date_naive();
        if !range.contains(trading_date) {
            continue;
        }
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            quote.open[i],
            quote.high[i],
            quote.low[i],
            quote.close[i],
            quote.volume[i],
        ) else {
            continue;
        };
        by_date.insert(
            trading_date,
            PriceRecord::new(symbol.clone(), trading_date, open, high, low, close, volume),
        );
    }

    Ok(by_date.into_values().collect())
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, symbol: &Symbol, range: DateRange) -> Result<Vec<PriceRecord>, SourceError> {
        let url = format!("{}/{}", self.base_url, symbol);
        let period1 = range.start_instant().timestamp().to_string();
        let period2 = range.end_instant_exclusive().timestamp().to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("events", "history"),
            ])
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        let body = resp.text().await.map_err(classify)?;

        // Unknown tickers come back as 404 with a chart.error body.
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::Unavailable(format!(
                "Yahoo API returned {status} for {symbol}"
            )));
        }

        parse_chart(symbol, &body, range)
    }
}

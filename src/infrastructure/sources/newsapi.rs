use super::{classify, http_client};
use crate::domain::entities::news_item::Headline;
use crate::domain::error::SourceError;
use crate::domain::ports::news_source::NewsSource;
use crate::domain::values::date_range::TimeWindow;
use crate::domain::values::symbol::Symbol;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/everything";

/// Placeholder title NewsAPI uses for articles pulled by the publisher.
const REMOVED_TITLE: &str = "[Removed]";

/// Headlines from newsapi.org `/v2/everything`, queried as `"<SYMBOL> stock"`.
pub struct NewsApiSource {
    api_key: String,
    page_size: u32,
    base_url: String,
    client: reqwest::Client,
}

impl NewsApiSource {
    pub fn new(api_key: String, page_size: u32, timeout: Duration) -> Self {
        Self::with_base_url(api_key, page_size, DEFAULT_BASE_URL.to_string(), timeout)
    }

    pub fn with_base_url(api_key: String, page_size: u32, base_url: String, timeout: Duration) -> Self {
        Self {
            api_key,
            page_size,
            base_url,
            client: http_client(timeout),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    #[serde(default)]
    source: Option<ArticleSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ArticleSource {
    #[serde(default)]
    name: Option<String>,
}

/// Parse an `/everything` payload. Articles without a usable title or
/// timestamp are dropped; a payload-level error maps to the source taxonomy.
pub(crate) fn parse_everything(symbol: &Symbol, body: &str) -> Result<Vec<Headline>, SourceError> {
    let data: EverythingResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    if data.status != "ok" {
        let code = data.code.unwrap_or_default();
        let message = data.message.unwrap_or_default();
        return Err(SourceError::Unavailable(format!(
            "NewsAPI {code} for {symbol}: {message}"
        )));
    }

    let headlines = data
        .articles
        .into_iter()
        .filter_map(|a| {
            let title = a.title?.trim().to_string();
            if title.is_empty() || title == REMOVED_TITLE {
                return None;
            }
            let published_at = DateTime::parse_from_rfc3339(a.published_at.as_deref()?)
                .ok()?
                .with_timezone(&Utc);
            let source_name = a
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "unknown".to_string());
            Some(Headline::new(title, published_at, source_name))
        })
        .collect();

    Ok(headlines)
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn fetch(&self, symbol: &Symbol, window: TimeWindow) -> Result<Vec<Headline>, SourceError> {
        let query = format!("{symbol} stock");
        let from = window.from.to_rfc3339_opts(SecondsFormat::Secs, true);
        let to = window.to.to_rfc3339_opts(SecondsFormat::Secs, true);
        let page_size = self.page_size.to_string();

        let resp = self
            .client
            .get(&self.base_url)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query.as_str()),
                ("language", "en"),
                ("sortBy", "relevancy"),
                ("pageSize", page_size.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
            ])
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        let body = resp.text().await.map_err(classify)?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(SourceError::Unavailable(format!(
                "NewsAPI returned {status} for {symbol}"
            )));
        }

        // 4xx responses still carry a JSON error body worth reporting.
        let headlines = parse_everything(symbol, &body)?;
        Ok(headlines
            .into_iter()
            .filter(|h| window.contains(h.published_at))
            .collect())
    }
}

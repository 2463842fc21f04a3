use crate::domain::values::polarity::Polarity;
use crate::domain::values::sentiment_label::SentimentLabel;
use crate::domain::values::symbol::Symbol;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A headline as returned by a news source, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub headline: String,
    pub published_at: DateTime<Utc>,
    pub source_name: String,
}

impl Headline {
    pub fn new(headline: impl Into<String>, published_at: DateTime<Utc>, source_name: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            published_at,
            source_name: source_name.into(),
        }
    }
}

/// Unique key of a stored [`NewsItem`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewsKey {
    pub symbol: Symbol,
    pub headline: String,
    pub published_at: DateTime<Utc>,
}

impl NewsKey {
    /// Normalizes the parts so that the same article fetched twice produces
    /// the same key: trimmed headline, whole-second timestamp.
    pub fn new(symbol: Symbol, headline: &str, published_at: DateTime<Utc>) -> Self {
        Self {
            symbol,
            headline: headline.trim().to_string(),
            published_at: published_at.trunc_subsecs(0),
        }
    }
}

/// A scored headline for one symbol. Never updated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub symbol: Symbol,
    pub headline: String,
    pub published_at: DateTime<Utc>,
    pub source_name: String,
    pub polarity: Polarity,
}

impl NewsItem {
    pub fn new(key: NewsKey, source_name: String, polarity: Polarity) -> Self {
        Self {
            symbol: key.symbol,
            headline: key.headline,
            published_at: key.published_at,
            source_name,
            polarity,
        }
    }

    pub fn key(&self) -> NewsKey {
        NewsKey::new(self.symbol.clone(), &self.headline, self.published_at)
    }

    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_score(self.polarity.value())
    }
}

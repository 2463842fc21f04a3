use crate::domain::error::SourceError;
use async_trait::async_trait;

/// Maps a snippet of text to a polarity score.
///
/// Implementations must return a value in [-1, 1]. The ingest pipeline checks
/// this and treats anything else as a malformed response.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    fn name(&self) -> &str;

    async fn score(&self, text: &str) -> Result<f64, SourceError>;
}

pub mod newsapi;
pub mod noop;
pub mod yahoo;

use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/120.0.0.0 Safari/537.36";

/// Shared HTTP client settings for the source adapters.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Map a transport error into the source taxonomy. Body decoding problems are
/// the server's fault, everything else is treated as unavailability.
pub(crate) fn classify(e: reqwest::Error) -> crate::domain::error::SourceError {
    use crate::domain::error::SourceError;
    if e.is_decode() {
        SourceError::Malformed(e.to_string())
    } else {
        SourceError::Unavailable(e.to_string())
    }
}

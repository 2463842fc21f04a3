pub mod clock;
pub mod news_repository;
pub mod news_source;
pub mod price_repository;
pub mod price_source;
pub mod sentiment_scorer;

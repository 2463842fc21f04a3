pub mod migrations;
pub mod news_repo;
pub mod price_repo;

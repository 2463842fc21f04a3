pub mod news_item;
pub mod price_record;

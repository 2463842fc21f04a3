pub mod date_range;
pub mod polarity;
pub mod sentiment_label;
pub mod symbol;

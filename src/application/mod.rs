pub mod compare;
pub mod ingest;
pub mod query;
pub mod scheduler;
pub mod stats;

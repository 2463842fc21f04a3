pub mod clock;
pub mod sentiment;
pub mod sources;
pub mod sqlite;

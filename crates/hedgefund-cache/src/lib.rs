pub mod error;
pub mod reader;
pub mod source;
pub mod sqlite;

pub use error::CacheError;
pub use reader::CacheReader;
pub use source::{CandleSource, SnapshotSource};
pub use sqlite::SqliteReader;

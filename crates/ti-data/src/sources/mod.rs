//! Data sources that produce the raw record set

pub mod csv_source;
pub mod http_source;
pub mod memory_source;

use async_trait::async_trait;

use crate::record::Record;
use crate::DataError;

pub use csv_source::CsvSource;
pub use http_source::HttpSource;
pub use memory_source::MemorySource;

/// Trait for data sources
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the complete record set
    async fn fetch(&self) -> Result<Vec<Record>, DataError>;

    /// Get the source name/path
    fn source_name(&self) -> &str;
}

//! Data handling for the linked-chart dashboard
//!
//! Records arrive once from a [`DataSource`], get classified by
//! [`TypeInference`] and are wrapped in an [`AggregationIndex`] that every
//! chart groups and filters through.

pub mod binning;
pub mod config;
pub mod index;
pub mod key;
pub mod record;
pub mod schema;
pub mod sources;

use tokio::task::JoinError;
use thiserror::Error;

// Re-exports
pub use binning::{AnnotationBinner, AnnotationGroup, BinnedAnnotations};
pub use config::{ChartKind, DashboardConfig, GridSize, NullConfig, PanelSpec};
pub use index::{AggregationIndex, Dimension, DimensionKey};
pub use key::{AggregationKey, Bucket, CompositeKey};
pub use record::{Record, Value};
pub use schema::{FieldKind, FieldSchema, FieldSpec, TypeInference};
pub use sources::{CsvSource, DataSource, HttpSource, MemorySource};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with status {0}")]
    Status(u16),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No annotation field configured")]
    NoAnnotationField,

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

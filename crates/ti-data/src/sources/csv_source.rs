use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::ReaderBuilder;

use super::DataSource;
use crate::config::NullConfig;
use crate::record::{Record, Value};
use crate::DataError;

/// Local CSV file used in place of the data endpoint
pub struct CsvSource {
    /// Path to the CSV file
    path: PathBuf,
    name: String,
    null_config: NullConfig,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self {
            path,
            name,
            null_config: NullConfig::default(),
        }
    }

    /// Use custom empty-value patterns
    pub fn with_null_config(mut self, null_config: NullConfig) -> Self {
        self.null_config = null_config;
        self
    }

    fn read_records(path: &Path, null_config: &NullConfig) -> Result<Vec<Record>, DataError> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let record = Record::from_pairs(
                headers
                    .iter()
                    .zip(row.iter())
                    .map(|(name, cell)| (name.clone(), Self::parse_cell(cell, null_config))),
            );
            records.push(record);
        }
        Ok(records)
    }

    /// Empty patterns become null, numeric-looking cells become numbers
    fn parse_cell(cell: &str, null_config: &NullConfig) -> Value {
        if null_config.is_null(cell) {
            return Value::Null;
        }
        let trimmed = cell.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(trimmed.to_string()),
        }
    }
}

#[async_trait]
impl DataSource for CsvSource {
    async fn fetch(&self) -> Result<Vec<Record>, DataError> {
        tracing::info!("Loading records from {}", self.name);

        let records = tokio::task::spawn_blocking({
            let path = self.path.clone();
            let null_config = self.null_config.clone();
            move || Self::read_records(&path, &null_config)
        })
        .await??;

        tracing::info!("Loaded {} records from {}", records.len(), self.name);
        Ok(records)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_csv_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "origin,dep_delay,reason").unwrap();
        writeln!(file, "SEA,5,weather").unwrap();
        writeln!(file, "SEA,10,").unwrap();
        writeln!(file, "PDX,N/A,crew").unwrap();
        file.flush().unwrap();

        let source = CsvSource::new(file.path());
        let records = source.fetch().await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("dep_delay"), &Value::Number(5.0));
        assert_eq!(records[0].get("origin"), &Value::from("SEA"));
        assert!(records[1].get("reason").is_null());
        assert!(records[2].get("dep_delay").is_null());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = CsvSource::new("/nonexistent/flights.csv");
        assert!(matches!(source.fetch().await, Err(DataError::Io(_))));
    }
}

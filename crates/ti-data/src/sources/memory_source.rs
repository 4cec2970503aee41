use async_trait::async_trait;

use super::DataSource;
use crate::record::Record;
use crate::DataError;

/// Records already held in memory
pub struct MemorySource {
    name: String,
    records: Vec<Record>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch(&self) -> Result<Vec<Record>, DataError> {
        Ok(self.records.clone())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    #[tokio::test]
    async fn test_memory_source_returns_records() {
        let source = MemorySource::new("fixture", vec![Record::from_pairs([("origin", Value::from("SEA"))])]);
        let records = source.fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(source.source_name(), "fixture");
    }
}

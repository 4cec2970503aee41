use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::DataSource;
use crate::record::Record;
use crate::DataError;

/// Endpoint the dashboard server answers on by default
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/data";

/// Timeout for the record fetch
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Response body of the data endpoint
#[derive(Debug, Deserialize)]
struct DataEnvelope {
    content: Vec<Record>,
}

/// Fetches the record set with a single JSON POST
pub struct HttpSource {
    client: Client,
    endpoint: String,
}

impl HttpSource {
    /// Create a source for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Result<Self, DataError> {
        Self::with_timeout(endpoint, Duration::from_secs(HTTP_TIMEOUT_SECS))
    }

    /// Create a source with a custom request timeout
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DataError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Decode a response body into records
    pub fn parse_body(body: &str) -> Result<Vec<Record>, DataError> {
        let envelope: DataEnvelope = serde_json::from_str(body)?;
        Ok(envelope.content)
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<Record>, DataError> {
        tracing::info!("Fetching records from {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} answered with {}", self.endpoint, status);
            return Err(DataError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let records = Self::parse_body(&body)?;
        tracing::info!("Received {} records from {}", records.len(), self.endpoint);
        Ok(records)
    }

    fn source_name(&self) -> &str {
        &self.endpoint
    }
}

use crate::model::{RawBatch, SourceError};
use crate::source::MarketSource;
use std::path::PathBuf;
use tracing::debug;

/// Reads a `{key: {timestamp, price, demand, competition}}` JSON object on every poll.
pub struct JsonFileSource {
    name: String,
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[async_trait::async_trait]
impl MarketSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<RawBatch, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let batch: RawBatch = serde_json::from_str(&content)?;
        debug!("{}: read {} records from {}", self.name, batch.len(), self.path.display());
        Ok(batch)
    }
}

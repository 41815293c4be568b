use crate::model::{RawBatch, SourceError};

/// Supplies already-fetched market records to the store.
#[async_trait::async_trait]
pub trait MarketSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self) -> Result<RawBatch, SourceError>;
}

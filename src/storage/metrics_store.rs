use crate::analyzer::{trends, MarketAnalyzer};
use crate::model::{
    MarketIndicators, MarketObservation, RawBatch, StoreError, StoreState, TrendReport,
};
use indexmap::IndexMap;
use tracing::{error, info, warn};

/// In-memory market observations keyed by observation key.
///
/// Iteration follows first-insertion order. Re-ingesting an existing key
/// replaces its value but keeps its original position, so trend rates are
/// taken between the earliest-inserted and latest-inserted keys rather than
/// between the oldest and newest timestamps.
#[derive(Debug, Default)]
pub struct MetricsStore {
    observations: IndexMap<String, MarketObservation>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the whole batch, then inserts or overwrites every observation.
    /// Nothing is written unless every record is valid.
    pub fn ingest(&mut self, batch: &RawBatch) -> Result<usize, StoreError> {
        if batch.is_empty() {
            error!("Ingest rejected: batch is empty");
            return Err(StoreError::EmptyBatch);
        }

        let validated = batch
            .iter()
            .map(|(key, record)| record.validate(key))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| error!("Ingest rejected, store unchanged: {}", e))?;

        for observation in validated {
            self.observations.insert(observation.key.clone(), observation);
        }

        info!(
            "Ingested {} market observations ({} held)",
            batch.len(),
            self.observations.len()
        );
        Ok(batch.len())
    }

    /// Average price plus first-to-last price and demand rates over the current snapshot.
    pub fn compute_trends(&self) -> Result<Option<TrendReport>, StoreError> {
        if self.observations.is_empty() {
            warn!("No market data available for trend analysis");
            return Ok(None);
        }

        let snapshot = self.snapshot();
        trends::compute_trends(&snapshot)
            .inspect_err(|e| error!("Trend analysis over {} observations failed: {}", snapshot.len(), e))
    }

    pub fn indicators(&self, window_size: usize) -> Option<MarketIndicators> {
        MarketAnalyzer::analyze(&self.snapshot(), window_size)
    }

    /// Observations in iteration order.
    pub fn snapshot(&self) -> Vec<MarketObservation> {
        self.observations.values().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<&MarketObservation> {
        self.observations.get(key)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn state(&self) -> StoreState {
        if self.observations.is_empty() {
            StoreState::Empty
        } else {
            StoreState::Populated
        }
    }
}

use crate::model::{RawBatch, RawRecord, SourceError};
use crate::source::MarketSource;
use chrono::{DateTime, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

const MIN_PRICE: f64 = 0.01;

struct WalkState {
    rng: StdRng,
    price: f64,
}

/// Stand-in feed emitting one observation per poll.
///
/// Price follows a bounded random walk from `base_price`; demand and
/// competition are jittered around their bases.
pub struct SimulatedSource {
    name: String,
    base_demand: i64,
    base_competition: i64,
    volatility: f64,
    state: Mutex<WalkState>,
}

impl SimulatedSource {
    /// A fixed `seed` replays the same walk; otherwise the OS seeds it.
    pub fn new(
        name: impl Into<String>,
        base_price: f64,
        base_demand: i64,
        base_competition: i64,
        volatility: f64,
        seed: Option<u64>,
    ) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            name: name.into(),
            base_demand: base_demand.max(0),
            base_competition: base_competition.max(0),
            volatility: volatility.abs(),
            state: Mutex::new(WalkState {
                rng,
                price: base_price.max(MIN_PRICE),
            }),
        }
    }

    fn next_record(&self, captured_at: DateTime<Utc>) -> RawRecord {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let step = if self.volatility > 0.0 {
            state.rng.random_range(-self.volatility..=self.volatility)
        } else {
            0.0
        };
        state.price = (state.price * (1.0 + step)).max(MIN_PRICE);

        let demand_jitter = (self.base_demand / 10).max(1);
        let competition_jitter = (self.base_competition / 10).max(1);
        let demand = state.rng.random_range(-demand_jitter..=demand_jitter) + self.base_demand;
        let competition =
            state.rng.random_range(-competition_jitter..=competition_jitter) + self.base_competition;

        RawRecord::new(captured_at, state.price, demand.max(0), competition.max(0))
    }
}

#[async_trait::async_trait]
impl MarketSource for SimulatedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<RawBatch, SourceError> {
        let captured_at = Utc::now();
        let record = self.next_record(captured_at);

        let mut batch = RawBatch::new();
        batch.insert(
            format!("{}@{}", self.name, captured_at.to_rfc3339_opts(SecondsFormat::Nanos, true)),
            record,
        );
        Ok(batch)
    }
}

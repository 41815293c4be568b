mod analyzer;
mod config;
mod model;
mod source;
mod storage;

use config::load_config;
use futures::future::join_all;
use model::{StoreState, TrendReport};
use source::MarketSource;
use storage::MetricsStore;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let sources: Vec<Box<dyn MarketSource>> = config.sources.iter().map(|s| s.build()).collect();
    let mut store = MetricsStore::new();

    info!("market-pulse started with {} source(s)", sources.len());

    loop {
        let was_empty = store.is_empty();
        poll_once(&sources, &mut store).await;
        if was_empty && store.state() == StoreState::Populated {
            info!("Store populated, trend reporting enabled");
        }
        report(&store, config.indicator_window);

        tokio::select! {
            _ = sleep(Duration::from_secs(config.check_interval_seconds)) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested, {} observations held", store.len());
                break;
            }
        }
    }
}

/// Fetches from every source concurrently, then ingests the batches one by one
/// in source order. Returns the number of observations ingested.
async fn poll_once(sources: &[Box<dyn MarketSource>], store: &mut MetricsStore) -> usize {
    let results = join_all(sources.iter().map(|s| s.fetch())).await;

    let mut ingested = 0;
    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(batch) => match store.ingest(&batch) {
                Ok(n) => {
                    ingested += n;
                    if let Some(latest) = batch.keys().last().and_then(|key| store.get(key)) {
                        debug!(
                            "{}: latest {} price {:.2}, demand {}, competition {}",
                            source.name(),
                            latest.key,
                            latest.price,
                            latest.demand,
                            latest.competition
                        );
                    }
                }
                Err(e) => warn!("Skipping batch from {}: {}", source.name(), e),
            },
            Err(e) => warn!("Source {} failed: {}", source.name(), e),
        }
    }
    ingested
}

fn report(store: &MetricsStore, indicator_window: usize) -> Option<TrendReport> {
    let trends = match store.compute_trends() {
        Ok(Some(trends)) => trends,
        Ok(None) => return None,
        Err(e) => {
            warn!("Trend report unavailable: {}", e);
            return None;
        }
    };

    let summary = trends
        .metrics()
        .iter()
        .map(|(name, value)| format!("{} = {:.4}", name, value))
        .collect::<Vec<_>>()
        .join(", ");
    info!("Trends over {} observations: {}", store.len(), summary);

    if let Some(indicators) = store.indicators(indicator_window) {
        info!(
            "Indicators: volatility = {:.4}, RSI = {:.2}, avg competition = {:.2}, price/demand corr = {}",
            indicators.price_volatility,
            indicators.rsi,
            indicators.average_competition,
            indicators
                .price_demand_correlation
                .map(|c| format!("{:.4}", c))
                .unwrap_or_else(|| "n/a".into())
        );
        if let Some(latest) = indicators.demand_moving_average.last() {
            info!("Demand moving average ({}): {:.2}", indicator_window, latest);
        }
    }

    Some(trends)
}

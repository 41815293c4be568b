use crate::model::{MarketObservation, StoreError, TrendReport};

/// Computes the trend report over observations in iteration order.
///
/// Rates compare the last observation against the first one as listed, not
/// sorted by timestamp. Returns `Ok(None)` when there is nothing to analyze.
pub fn compute_trends(observations: &[MarketObservation]) -> Result<Option<TrendReport>, StoreError> {
    let (first, last) = match (observations.first(), observations.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(None),
    };

    let average_price = running_mean(observations.iter().map(|o| o.price));
    let price_change_rate = change_rate(first.price, last.price, "price_change_rate")?;
    let demand_growth_rate = change_rate(
        first.demand as f64,
        last.demand as f64,
        "demand_growth_rate",
    )?;

    Ok(Some(TrendReport {
        average_price,
        price_change_rate,
        demand_growth_rate,
    }))
}

/// Incremental mean, finite for any finite input. Zero for an empty series.
pub fn running_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    values
        .into_iter()
        .enumerate()
        .fold(0.0, |mean, (i, v)| mean + (v - mean) / (i + 1) as f64)
}

/// Relative change from `first` to `last`.
pub fn change_rate(first: f64, last: f64, metric: &'static str) -> Result<f64, StoreError> {
    if first == 0.0 {
        return Err(StoreError::DivisionByZero { metric });
    }
    Ok((last - first) / first)
}

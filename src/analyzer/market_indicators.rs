use crate::analyzer::trends::running_mean;
use crate::model::{MarketIndicators, MarketObservation};

pub struct MarketAnalyzer;

impl MarketAnalyzer {
    /// Builds the supplementary indicators over observations in iteration order.
    /// Returns None when there is nothing to analyze.
    pub fn analyze(observations: &[MarketObservation], window_size: usize) -> Option<MarketIndicators> {
        if observations.is_empty() {
            return None;
        }

        let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();
        let demands: Vec<f64> = observations.iter().map(|o| o.demand as f64).collect();

        Some(MarketIndicators {
            price_volatility: volatility(&prices),
            rsi: relative_strength(&prices),
            price_demand_correlation: correlation(&prices, &demands),
            average_competition: running_mean(observations.iter().map(|o| o.competition as f64)),
            demand_moving_average: rolling_mean(&demands, window_size),
        })
    }
}

/// Population standard deviation, scaled by the largest magnitude so squares stay finite.
fn volatility(series: &[f64]) -> f64 {
    let scale = series.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 {
        return 0.0;
    }
    let mean = running_mean(series.iter().map(|v| v / scale));
    let variance = running_mean(series.iter().map(|v| (v / scale - mean).powi(2)));
    variance.sqrt() * scale
}

/// Share of upward movement in the series, 0..=100. Flat series sit at 50;
/// fewer than two points give 0.
fn relative_strength(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let (up, down) = series.windows(2).fold((0.0, 0.0), |(up, down), pair| {
        let delta = pair[1] - pair[0];
        if delta > 0.0 { (up + delta, down) } else { (up, down - delta) }
    });
    if up + down == 0.0 {
        50.0
    } else {
        100.0 * up / (up + down)
    }
}

/// Pearson coefficient; None for mismatched, empty or constant series.
fn correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.is_empty() {
        return None;
    }
    let mean_x = running_mean(xs.iter().copied());
    let mean_y = running_mean(ys.iter().copied());

    let (cov, var_x, var_y) = xs.iter().zip(ys).fold((0.0, 0.0, 0.0), |(c, vx, vy), (x, y)| {
        let (dx, dy) = (x - mean_x, y - mean_y);
        (c + dx * dy, vx + dx * dx, vy + dy * dy)
    });
    let spread = (var_x * var_y).sqrt();
    (spread != 0.0).then(|| cov / spread)
}

/// Trailing mean over each full window, oldest first.
fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || series.len() < window {
        return Vec::new();
    }
    let mut sum: f64 = series[..window].iter().sum();
    let mut out = Vec::with_capacity(series.len() - window + 1);
    out.push(sum / window as f64);
    for i in window..series.len() {
        sum += series[i] - series[i - window];
        out.push(sum / window as f64);
    }
    out
}

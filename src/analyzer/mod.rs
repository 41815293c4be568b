// Analyzer module: derived metrics over a store snapshot.

pub mod market_indicators;
pub mod trends;

pub use market_indicators::MarketAnalyzer;

use crate::model::ConfigError;
use crate::source::{JsonFileSource, MarketSource, SimulatedSource};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

fn default_volatility() -> f64 {
    0.02
}

fn default_indicator_window() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    File {
        name: String,
        path: PathBuf,
    },
    Simulated {
        name: String,
        base_price: f64,
        base_demand: i64,
        base_competition: i64,
        #[serde(default = "default_volatility")]
        volatility: f64,
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl SourceConfig {
    pub fn build(&self) -> Box<dyn MarketSource> {
        match self {
            SourceConfig::File { name, path } => Box::new(JsonFileSource::new(name.clone(), path.clone())),
            SourceConfig::Simulated {
                name,
                base_price,
                base_demand,
                base_competition,
                volatility,
                seed,
            } => Box::new(SimulatedSource::new(
                name.clone(),
                *base_price,
                *base_demand,
                *base_competition,
                *volatility,
                *seed,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub check_interval_seconds: u64,
    #[serde(default = "default_indicator_window")]
    pub indicator_window: usize,
    pub sources: Vec<SourceConfig>,
}

impl AppConfig {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.check_interval_seconds == 0 {
            return Err(ConfigError::Invalid("check_interval_seconds must be positive".into()));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("at least one source is required".into()));
        }
        Ok(self)
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

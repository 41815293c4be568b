// Core structs: MarketObservation, RawRecord, TrendReport
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One market data point held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketObservation {
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub demand: u64,
    pub competition: u64,
}

/// Record as handed over by a data source, before validation.
///
/// Fields are kept as raw JSON so a wrong type is reported against the
/// record's key at ingest rather than failing the whole batch on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawRecord {
    pub timestamp: Option<Value>,
    pub price: Option<Value>,
    pub demand: Option<Value>,
    pub competition: Option<Value>,
}

/// Batch keyed by observation key, in the order the source listed them.
pub type RawBatch = IndexMap<String, RawRecord>;

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(fields) => fields,
            _ => return Self::default(),
        };
        let mut take = |name: &str| fields.remove(name).filter(|v| !v.is_null());

        Self {
            timestamp: take("timestamp"),
            price: take("price"),
            demand: take("demand"),
            competition: take("competition"),
        }
    }
}

impl RawRecord {
    /// Typed constructor for sources that already hold parsed values.
    pub fn new(timestamp: DateTime<Utc>, price: f64, demand: i64, competition: i64) -> Self {
        Self {
            timestamp: Some(Value::String(timestamp.to_rfc3339())),
            price: Some(Value::from(price)),
            demand: Some(Value::from(demand)),
            competition: Some(Value::from(competition)),
        }
    }

    /// Checks every required field and builds the observation stored under `key`.
    pub fn validate(&self, key: &str) -> Result<MarketObservation, StoreError> {
        let malformed = |reason: String| StoreError::MalformedRecord {
            key: key.to_string(),
            reason,
        };
        let required = |field: &'static str, value: &Option<Value>| {
            value
                .clone()
                .ok_or_else(|| malformed(format!("missing field `{}`", field)))
        };

        let timestamp = match required("timestamp", &self.timestamp)? {
            Value::String(text) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| malformed(format!("invalid field `timestamp`: {}", e)))?,
            other => return Err(malformed(format!("invalid field `timestamp`: {}", other))),
        };

        let price = required("price", &self.price)?;
        let price = match price.as_f64() {
            Some(p) if p.is_finite() && p >= 0.0 => p,
            _ => return Err(malformed(format!("invalid field `price`: {}", price))),
        };

        let demand = count("demand", required("demand", &self.demand)?).map_err(malformed)?;
        let competition =
            count("competition", required("competition", &self.competition)?).map_err(malformed)?;

        Ok(MarketObservation {
            key: key.to_string(),
            timestamp,
            price,
            demand,
            competition,
        })
    }
}

fn count(field: &str, value: Value) -> Result<u64, String> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_i64() {
        Some(n) => Err(format!("negative {} {}", field, n)),
        None => Err(format!("invalid field `{}`: {}", field, value)),
    }
}

/// Derived trend metrics, recomputed on every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendReport {
    pub average_price: f64,
    pub price_change_rate: f64,
    pub demand_growth_rate: f64,
}

impl TrendReport {
    /// Named metrics in report order.
    pub fn metrics(&self) -> [(&'static str, f64); 3] {
        [
            ("average_price", self.average_price),
            ("price_change_rate", self.price_change_rate),
            ("demand_growth_rate", self.demand_growth_rate),
        ]
    }
}

/// Supplementary indicators over the same snapshot as [`TrendReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketIndicators {
    pub price_volatility: f64,
    pub rsi: f64,
    pub price_demand_correlation: Option<f64>,
    pub average_competition: f64,
    pub demand_moving_average: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Empty,
    Populated,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("no observations to ingest")]
    EmptyBatch,
    #[error("malformed record `{key}`: {reason}")]
    MalformedRecord { key: String, reason: String },
    #[error("division by zero computing {metric}: first observation has a zero baseline")]
    DivisionByZero { metric: &'static str },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode batch: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> RawRecord {
        RawRecord::new(Utc::now(), 10.0, 3, 1)
    }

    fn reason_for(record: &RawRecord, key: &str) -> String {
        match record.validate(key) {
            Err(StoreError::MalformedRecord { key: bad, reason }) => {
                assert_eq!(bad, key);
                reason
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn validate_accepts_complete_record() {
        let obs = full_record().validate("k").unwrap();
        assert_eq!(obs.key, "k");
        assert_eq!(obs.price, 10.0);
        assert_eq!(obs.demand, 3);
        assert_eq!(obs.competition, 1);
    }

    #[test]
    fn validate_names_missing_field() {
        let record = RawRecord {
            competition: None,
            ..full_record()
        };
        assert!(reason_for(&record, "k").contains("missing field `competition`"));
    }

    #[test]
    fn validate_rejects_negative_counts_and_prices() {
        let negative_demand = RawRecord {
            demand: Some(json!(-1)),
            ..full_record()
        };
        assert!(reason_for(&negative_demand, "a").contains("negative demand"));

        let negative_price = RawRecord {
            price: Some(json!(-0.5)),
            ..full_record()
        };
        assert!(reason_for(&negative_price, "b").contains("invalid field `price`"));
    }

    #[test]
    fn validate_rejects_wrong_field_types() {
        let text_price = RawRecord {
            price: Some(json!("abc")),
            ..full_record()
        };
        assert!(reason_for(&text_price, "p").contains("invalid field `price`"));

        let fractional_demand = RawRecord {
            demand: Some(json!(5.5)),
            ..full_record()
        };
        assert!(reason_for(&fractional_demand, "d").contains("invalid field `demand`"));

        let bad_timestamp = RawRecord {
            timestamp: Some(json!("yesterday")),
            ..full_record()
        };
        assert!(reason_for(&bad_timestamp, "t").contains("invalid field `timestamp`"));

        let numeric_timestamp = RawRecord {
            timestamp: Some(json!(1_700_000_000)),
            ..full_record()
        };
        assert!(reason_for(&numeric_timestamp, "n").contains("invalid field `timestamp`"));
    }

    #[test]
    fn counts_beyond_i64_are_accepted() {
        let record = RawRecord {
            demand: Some(json!(u64::MAX)),
            ..full_record()
        };
        assert_eq!(record.validate("big").unwrap().demand, u64::MAX);
    }

    #[test]
    fn non_finite_price_cannot_pass() {
        // serde_json has no NaN, so it arrives as a missing value.
        let record = RawRecord::new(Utc::now(), f64::NAN, 1, 1);
        assert!(reason_for(&record, "nan").contains("missing field `price`"));
    }

    #[test]
    fn zero_price_is_accepted_at_validation() {
        let record = RawRecord::new(Utc::now(), 0.0, 5, 1);
        assert!(record.validate("z").is_ok());
    }

    #[test]
    fn decoding_tolerates_bad_records() {
        let json = r#"{
            "wrong": {"timestamp": "2024-01-01T00:00:00Z", "price": "abc", "demand": 1, "competition": 0},
            "scalar": 7,
            "nulls": {"timestamp": null, "price": 1.0}
        }"#;
        let batch: RawBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch["wrong"].price, Some(json!("abc")));
        assert_eq!(batch["scalar"], RawRecord::default());
        assert_eq!(batch["nulls"].timestamp, None);
        assert!(reason_for(&batch["scalar"], "scalar").contains("missing field `timestamp`"));
    }

    #[test]
    fn raw_batch_keeps_document_order() {
        let json = r#"{
            "b": {"timestamp": "2024-01-01T00:00:00Z", "price": 1.0, "demand": 1, "competition": 0},
            "a": {"price": 2.0}
        }"#;
        let batch: RawBatch = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = batch.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(batch["a"].demand, None);
    }

    #[test]
    fn trend_report_serializes_as_mapping() {
        let report = TrendReport {
            average_price: 110.0,
            price_change_rate: 0.2,
            demand_growth_rate: 0.2,
        };
        let value = serde_json::to_value(report).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["average_price"], 110.0);
        assert_eq!(report.metrics()[1].0, "price_change_rate");
    }
}

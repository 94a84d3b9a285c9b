// Decoded telegram value domain models
use chrono::{DateTime, Local};
use serde::Serialize;

/// A value together with its unit of measurement, e.g. `240` + `"s"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: String,
}

/// One decoded line value, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedValue {
    Numeric {
        value: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    Text(String),
    Timestamp(DateTime<Local>),
    #[serde(rename_all = "camelCase")]
    PowerFailureEvent {
        count: i64,
        obis_code: String,
        timestamp: DateTime<Local>,
        duration: Measurement,
    },
    FiveMinuteValue {
        timestamp: DateTime<Local>,
        value: f64,
        unit: String,
    },
}

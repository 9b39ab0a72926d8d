use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A single named measurement inside an entry.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Bench {
    pub name: String,
    pub value: BenchValue,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

impl Bench {
    pub fn new(name: impl Into<String>, value: impl Into<BenchValue>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: unit.into(),
            range: None,
            extra: None,
        }
    }
}

/// Values are numbers in practice, but some tools write them as strings.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(untagged)]
pub enum BenchValue {
    Number(Number),
    Text(String),
}

impl BenchValue {
    /// Non-finite floats have no JSON number form and are kept as text.
    pub fn from_f64(value: f64) -> Self {
        Number::from_f64(value)
            .map(BenchValue::Number)
            .unwrap_or_else(|| BenchValue::Text(value.to_string()))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            BenchValue::Number(number) => number.as_f64(),
            BenchValue::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

impl From<u64> for BenchValue {
    fn from(value: u64) -> Self {
        BenchValue::Number(value.into())
    }
}

impl From<f64> for BenchValue {
    fn from(value: f64) -> Self {
        BenchValue::from_f64(value)
    }
}

impl fmt::Display for BenchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchValue::Number(number) => write!(f, "{number}"),
            BenchValue::Text(text) => f.write_str(text),
        }
    }
}

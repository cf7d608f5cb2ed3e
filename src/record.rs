use std::collections::BTreeMap;

use crate::foundation::error::{ExprError, ExprResult};

/// Per-event data queried by leaf evaluators.
///
/// Evaluators only ever read a record; implementations must be safe to read for the duration of
/// one evaluator call.
pub trait EventRecord {
    /// Named per-event scalar, if present.
    fn scalar(&self, name: &str) -> Option<f64>;

    /// Named per-event vector (one entry per sub-object), if present.
    fn vector(&self, name: &str) -> Option<&[f64]>;
}

/// One value stored in a [`MapRecord`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    /// Single number.
    Scalar(f64),
    /// Ordered numbers.
    Vector(Vec<f64>),
}

/// Name-keyed event record, deserializable from a JSON object such as
/// `{"met": 212.5, "jets_pt": [80.1, 45.0]}`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MapRecord {
    values: BTreeMap<String, RecordValue>,
}

impl MapRecord {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style scalar insertion.
    pub fn with_scalar(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), RecordValue::Scalar(value));
        self
    }

    /// Builder-style vector insertion.
    pub fn with_vector(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.values.insert(name.into(), RecordValue::Vector(values));
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: RecordValue) {
        self.values.insert(name.into(), value);
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse one record from a JSON object.
    pub fn from_json_str(s: &str) -> ExprResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| ExprError::Other(anyhow::anyhow!("invalid event record json: {e}")))
    }

    /// Parse newline-delimited JSON records, skipping blank lines.
    pub fn parse_json_lines(s: &str) -> ExprResult<Vec<Self>> {
        s.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| {
                    ExprError::Other(anyhow::anyhow!("invalid event record on line {}: {e}", i + 1))
                })
            })
            .collect()
    }
}

impl EventRecord for MapRecord {
    fn scalar(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            RecordValue::Scalar(v) => Some(*v),
            RecordValue::Vector(_) => None,
        }
    }

    fn vector(&self, name: &str) -> Option<&[f64]> {
        match self.values.get(name)? {
            RecordValue::Vector(v) => Some(v),
            RecordValue::Scalar(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/record.rs"]
mod tests;

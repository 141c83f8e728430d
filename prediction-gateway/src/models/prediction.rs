use crate::error::PredictError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Fields every prediction request must carry with a truthy value.
pub const REQUIRED_FIELDS: [&str; 2] = ["investment_amount", "risk_tolerance"];

/// Caller payload, kept as raw JSON so the predictor sees it exactly as sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest(Value);

impl PredictionRequest {
    /// Parse a request body. Any JSON value is accepted here; shape checks
    /// happen in [`PredictionRequest::validate`].
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body).map(Self)
    }

    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn validate(&self) -> Result<(), PredictError> {
        let fields = self.0.as_object();
        let complete = REQUIRED_FIELDS.iter().all(|name| {
            fields
                .and_then(|fields| fields.get(*name))
                .is_some_and(is_truthy)
        });

        if complete {
            Ok(())
        } else {
            Err(PredictError::MissingFields)
        }
    }

    /// Exact bytes handed to the predictor on stdin.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.0)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// `null`, `false`, zero and the empty string count as missing.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Predictor output, relayed to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PredictionResult(Map<String, Value>);

impl PredictionResult {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

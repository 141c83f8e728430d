use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("no JSON object found in predictor output")]
    NoJsonObject,

    #[error("invalid JSON in predictor output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Parse the predictor's stdout.
///
/// Everything before the first `{` is treated as a log preamble and skipped;
/// the rest must be exactly one JSON object, optionally followed by
/// whitespace. A preamble that itself contains `{` will fail to parse.
pub fn extract_json(stdout: &str) -> Result<Map<String, Value>, ParseError> {
    let start = stdout.find('{').ok_or(ParseError::NoJsonObject)?;
    Ok(serde_json::from_str(&stdout[start..])?)
}

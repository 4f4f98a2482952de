//! JSON page decoder

use crate::error::{Error, Result};
use crate::types::{Page, Record};
use serde_json::Value;

/// JSON decoder with optional record path extraction
#[derive(Debug, Clone, Default)]
pub struct PageDecoder {
    /// Dot-separated path to the record array
    record_path: Option<String>,
}

impl PageDecoder {
    /// Create a decoder for a top-level JSON array
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder that reads the array under `path`
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            record_path: Some(path.into()),
        }
    }

    /// Configured record path, if any
    pub fn record_path(&self) -> Option<&str> {
        self.record_path.as_deref()
    }

    /// Decode a response body into the page with the given index
    pub fn decode(&self, page: u32, body: &str) -> Result<Page> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::decode(page, format!("invalid JSON: {e}")))?;

        let records = match &self.record_path {
            Some(path) => extract_path(value, path)
                .ok_or_else(|| Error::decode(page, format!("no value at path '{path}'")))?,
            None => value,
        };

        let items = match records {
            Value::Array(items) => items,
            other => {
                return Err(Error::decode(
                    page,
                    format!("expected an array of records, found {}", type_name(&other)),
                ))
            }
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value::<Record>(item)
                    .map_err(|e| Error::decode(page, format!("record {i}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(page, records))
    }
}

/// Walk a dot-separated path of object keys
fn extract_path(value: Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.').filter(|p| !p.is_empty()) {
        match current {
            Value::Object(mut map) => current = map.remove(part)?,
            _ => return None,
        }
    }

    Some(current)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

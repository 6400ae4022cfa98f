//! Dotted key lookup into JSON documents (`a.b.c`).
//!
//! Only objects are traversed; arrays cannot be indexed.

use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};

/// Load a JSON document from disk.
///
/// # Errors
///
/// Returns [`Error::JsonFileNotFound`] if the file cannot be read and
/// [`Error::MalformedJson`] if it does not parse.
pub fn load_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::JsonFileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| Error::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Walk `key` one dot-separated component at a time.
///
/// # Errors
///
/// Returns [`Error::KeyNotFound`] if a component is missing or the value
/// reached so far is not an object.
pub fn lookup<'a>(doc: &'a Value, key: &str) -> Result<&'a Value> {
    key.split('.').try_fold(doc, |value, component| {
        value
            .as_object()
            .and_then(|map| map.get(component))
            .ok_or_else(|| Error::KeyNotFound {
                key: key.to_string(),
            })
    })
}

/// Render a resolved value for printing: strings raw, anything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolve every key against `doc`, in order.
///
/// # Errors
///
/// Fails on the first key that does not resolve; nothing is returned for
/// the keys before it.
pub fn extract_keys(doc: &Value, keys: &[String]) -> Result<Vec<String>> {
    keys.iter()
        .map(|key| lookup(doc, key).map(display_value))
        .collect()
}

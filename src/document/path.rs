//! Dotted key-path access into configuration documents.
//!
//! Paths are sequences of keys, usually written as `a.b.c`. Mapping levels
//! are addressed by key and sequence levels by numeric index.
//!
//! # Rules
//!
//! - A missing key yields `None` from [`get`], never an error
//! - Walking *through* a scalar or null is a [`StructuralMismatch`]
//! - [`set`] only creates the terminal key; intermediate levels must exist
//!
//! [`StructuralMismatch`]: crate::error::WheelhouseError::StructuralMismatch

use serde_yaml::Value;
use tracing::warn;

use crate::error::{Result, WheelhouseError};

/// Split a dotted path into its segments.
///
/// The empty string is the empty path (the document root).
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

/// Get the value at a key path.
///
/// # Errors
///
/// Returns `StructuralMismatch` if a non-terminal segment lands on a value
/// that cannot be indexed by the next key.
pub fn get<'a, S: AsRef<str>>(doc: &'a Value, keys: &[S]) -> Result<Option<&'a Value>> {
    let mut current = doc;

    for (depth, key) in keys.iter().enumerate() {
        let key = key.as_ref();
        let next = match current {
            Value::Mapping(map) => map.get(key),
            Value::Sequence(items) => match key.parse::<usize>() {
                Ok(index) => items.get(index),
                Err(_) => return Err(mismatch(keys, depth, "a sequence")),
            },
            other => return Err(mismatch(keys, depth, kind_name(other))),
        };

        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }

    Ok(Some(current))
}

/// Set the value at a key path.
///
/// The terminal key is created when its parent mapping exists. Returns
/// `Ok(false)` without touching the document when a non-terminal key is
/// missing.
pub fn set<S: AsRef<str>>(doc: &mut Value, keys: &[S], value: Value) -> Result<bool> {
    let Some((last, parents)) = keys.split_last() else {
        *doc = value;
        return Ok(true);
    };

    let mut current = doc;
    for (depth, key) in parents.iter().enumerate() {
        let key = key.as_ref();
        current = match current {
            Value::Mapping(map) => match map.get_mut(key) {
                Some(next) => next,
                None => return Ok(false),
            },
            Value::Sequence(items) => match key.parse::<usize>() {
                Ok(index) => match items.get_mut(index) {
                    Some(next) => next,
                    None => return Ok(false),
                },
                Err(_) => return Err(mismatch(keys, depth, "a sequence")),
            },
            other => return Err(mismatch(keys, depth, kind_name(other))),
        };
    }

    let last = last.as_ref();
    match current {
        Value::Mapping(map) => {
            map.insert(Value::String(last.to_string()), value);
            Ok(true)
        }
        Value::Sequence(items) => match last.parse::<usize>() {
            Ok(index) if index < items.len() => {
                items[index] = value;
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(_) => Err(mismatch(keys, parents.len(), "a sequence")),
        },
        other => Err(mismatch(keys, parents.len(), kind_name(other))),
    }
}

/// Apply flat `path.to.key = value` overrides to a document.
///
/// Overrides are applied in order. Null values are skipped, as are
/// overrides whose parent path does not exist.
pub fn overlay<K, I>(mut doc: Value, overrides: I) -> Result<Value>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, Value)>,
{
    for (path, value) in overrides {
        let path = path.as_ref();
        if value.is_null() {
            continue;
        }

        let keys = split_path(path);
        if !set(&mut doc, &keys, value)? {
            warn!(path, "skipping override: parent path does not exist");
        }
    }

    Ok(doc)
}

/// Parse a `path.to.key=value` override.
///
/// The value is read as a YAML scalar, so `replicas=3` yields a number and
/// `enabled=false` a boolean. An empty value is the empty string.
pub fn parse_override(raw: &str) -> Result<(String, Value)> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| WheelhouseError::InvalidConfig {
            message: format!("Override '{}' is not of the form path=value", raw),
        })?;

    let path = path.trim();
    if path.is_empty() {
        return Err(WheelhouseError::InvalidConfig {
            message: format!("Override '{}' has an empty path", raw),
        });
    }

    let value = value.trim();
    let value = if value.is_empty() {
        Value::String(String::new())
    } else {
        serde_yaml::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
    };
    Ok((path.to_string(), value))
}

/// Human-readable name for the kind of a value.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn mismatch<S: AsRef<str>>(keys: &[S], depth: usize, found: &str) -> WheelhouseError {
    let joined = |parts: &[S]| {
        parts
            .iter()
            .map(|k| k.as_ref())
            .collect::<Vec<_>>()
            .join(".")
    };

    let parent = if depth == 0 {
        "<root>".to_string()
    } else {
        joined(&keys[..depth])
    };

    WheelhouseError::StructuralMismatch {
        path: joined(keys),
        message: format!(
            "'{}' is {}, cannot look up '{}'",
            parent,
            found,
            keys[depth].as_ref()
        ),
    }
}

//! Reference resolution and value cleanup for configuration documents.
//!
//! Three independent passes, each returning a new tree:
//!
//! - [`resolve_references`] replaces `${root.path}` leaves with the value
//!   found at `path`
//! - [`resolve_placeholders`] turns `<unset>` style strings into null
//! - [`strip_empty`] drops empty containers and falsy scalars

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use super::path;
use crate::error::Result;

/// `${root.a.b}`: captures the root segment and the dotted remainder.
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_-]*)((?:\.[^.\s{}]+)+)\s*\}").unwrap()
});

/// A `${root.path}` token found inside a string.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// The leading segment (ignored during lookup).
    pub root: String,
    /// The remaining segments.
    pub path: Vec<String>,
}

/// Find the first reference token in a string.
pub fn find_reference(text: &str) -> Option<Reference> {
    let caps = REFERENCE.captures(text)?;
    let root = caps.get(1)?.as_str().to_string();
    let path = caps
        .get(2)
        .map(|m| {
            m.as_str()
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(Reference { root, path })
}

/// Resolve references in a document against itself.
pub fn resolve_references(doc: &Value) -> Result<Value> {
    resolve_references_against(doc, doc)
}

/// Resolve references in `doc` against `source`.
///
/// Every string leaf holding a reference is replaced as a whole by the
/// target value. Lookups always read `source` as given, so a target that is
/// itself a reference string comes through verbatim. Missing targets become
/// null.
pub fn resolve_references_against(doc: &Value, source: &Value) -> Result<Value> {
    Ok(match doc {
        Value::String(s) => match find_reference(s) {
            Some(reference) => path::get(source, &reference.path)?
                .cloned()
                .unwrap_or(Value::Null),
            None => doc.clone(),
        },
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| resolve_references_against(item, source))
                .collect::<Result<_>>()?,
        ),
        Value::Mapping(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, value) in map {
                out.insert(key.clone(), resolve_references_against(value, source)?);
            }
            Value::Mapping(out)
        }
        other => other.clone(),
    })
}

/// Remove empty containers and falsy scalars.
///
/// Applies recursively; a container emptied by the cleanup is itself removed
/// from its parent. The root is kept even when it ends up empty.
pub fn strip_empty(doc: &Value) -> Value {
    match doc {
        Value::Mapping(_) | Value::Sequence(_) => {
            strip_node(doc).unwrap_or_else(|| match doc {
                Value::Mapping(_) => Value::Mapping(Mapping::new()),
                _ => Value::Sequence(Vec::new()),
            })
        }
        other => other.clone(),
    }
}

fn strip_node(value: &Value) -> Option<Value> {
    match value {
        Value::Mapping(map) => {
            let cleaned: Mapping = map
                .iter()
                .filter_map(|(k, v)| strip_node(v).map(|v| (k.clone(), v)))
                .collect();
            (!cleaned.is_empty()).then_some(Value::Mapping(cleaned))
        }
        Value::Sequence(items) => {
            let cleaned: Vec<Value> = items.iter().filter_map(strip_node).collect();
            (!cleaned.is_empty()).then_some(Value::Sequence(cleaned))
        }
        scalar if is_falsy(scalar) => None,
        scalar => Some(scalar.clone()),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Replace `<...>` placeholder strings with null.
pub fn resolve_placeholders(doc: &Value) -> Value {
    match doc {
        Value::String(s) if is_placeholder(s) => Value::Null,
        Value::Sequence(items) => Value::Sequence(items.iter().map(resolve_placeholders).collect()),
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_placeholders(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn is_placeholder(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('<') && s.ends_with('>')
}

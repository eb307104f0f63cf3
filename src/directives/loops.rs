//! Expansion of `{% for %}` blocks.
//!
//! A loop source is a sequence of single-key mappings. Each entry contributes
//! its key as `${var.__name__}` and its attribute mapping as `${var.attr}`:
//!
//! ```text
//! // {% for port in cfg.ports %}
//! { "name": "${port.__name__}", "port": "${port.number}" },
//! // {% end for %}
//! ```
//!
//! Quoted tokens take the JSON rendering of the value (so `"${port.number}"`
//! becomes `8080`), bare tokens take its plain text.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use regex::{Captures, Regex};

use super::scanner::{self, BlockHeader, DirectiveBlock, DirectiveKind};
use crate::document::{kind_name, path};
use crate::error::{Result, WheelhouseError};

/// One loop iteration's bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopScope<'a> {
    pub var_name: &'a str,
    pub entry_name: String,
    pub attributes: Value,
}

impl LoopScope<'_> {
    /// Look up `attr.path` inside the entry's attributes.
    pub fn lookup(&self, attr_path: &str) -> Result<Option<&Value>> {
        path::get(&self.attributes, &path::split_path(attr_path))
    }
}

struct TokenPatterns {
    name: Regex,
    quoted: Regex,
    bare: Regex,
}

impl TokenPatterns {
    fn for_var(var_name: &str) -> Result<Self> {
        let var = regex::escape(var_name);
        let build = |pattern: String| {
            Regex::new(&pattern).map_err(|e| WheelhouseError::Other(anyhow::Error::new(e)))
        };

        Ok(Self {
            name: build(format!(r"\$\{{\s*{var}\.__name__\s*\}}"))?,
            quoted: build(format!(r#""\$\{{\s*{var}\.([^\s{{}}"]+)\s*\}}""#))?,
            bare: build(format!(r#"\$\{{\s*{var}\.([^\s{{}}"]+)\s*\}}"#))?,
        })
    }
}

/// Expand every loop block in `text`.
pub fn expand_loops(text: &str, doc: &Value) -> Result<String> {
    let blocks = scanner::scan(text, DirectiveKind::Loop)?;
    debug!("Found {} loop blocks", blocks.len());

    scanner::rewrite_blocks(text, &blocks, |_, block| expand_block(text, block, doc))
}

fn expand_block(text: &str, block: &DirectiveBlock, doc: &Value) -> Result<String> {
    let BlockHeader::Loop {
        var_name,
        source_path,
    } = &block.header
    else {
        return Err(WheelhouseError::UnbalancedBlock {
            kind: DirectiveKind::Loop.keyword().to_string(),
            message: format!("block on line {} is not a loop", block.line),
        });
    };

    let scopes = loop_entries(var_name, source_path, block.line, doc)?;
    let patterns = TokenPatterns::for_var(var_name)?;
    let body = block.body_text(text);

    let mut out = String::new();
    for scope in &scopes {
        out.push_str(&render_body(body, scope, &patterns)?);
        out.push('\n');
    }

    debug!(
        line = block.line,
        entries = scopes.len(),
        "expanded loop over {}",
        source_path
    );
    Ok(out)
}

/// Resolve a loop source into per-entry scopes.
///
/// The first segment of `source_path` names the document root and is
/// dropped before lookup.
pub fn loop_entries<'a>(
    var_name: &'a str,
    source_path: &str,
    line: usize,
    doc: &Value,
) -> Result<Vec<LoopScope<'a>>> {
    let invalid = |message: String| WheelhouseError::InvalidLoopSource {
        path: source_path.to_string(),
        line,
        message,
    };

    let keys: Vec<&str> = source_path.split('.').skip(1).collect();
    let source = path::get(doc, &keys)
        .map_err(|e| invalid(e.to_string()))?
        .ok_or_else(|| invalid("path does not exist".to_string()))?;

    let Value::Sequence(entries) = source else {
        return Err(invalid(format!(
            "expected a sequence, found {}",
            kind_name(source)
        )));
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Mapping(map) if map.len() == 1 => {
                let (key, attributes) = map
                    .iter()
                    .next()
                    .ok_or_else(|| invalid(format!("entry {} is empty", index)))?;
                let entry_name = key
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(format!("entry {} has a non-string key", index)))?;
                let attributes = match attributes {
                    Value::Null => Value::Mapping(Mapping::new()),
                    other => other.clone(),
                };

                Ok(LoopScope {
                    var_name,
                    entry_name,
                    attributes,
                })
            }
            other => Err(invalid(format!(
                "entry {} must be a single-key mapping, found {}",
                index,
                kind_name(other)
            ))),
        })
        .collect()
}

fn render_body(body: &str, scope: &LoopScope<'_>, patterns: &TokenPatterns) -> Result<String> {
    let named = patterns
        .name
        .replace_all(body, regex::NoExpand(&scope.entry_name))
        .into_owned();

    let quoted = replace_tokens(&patterns.quoted, &named, |caps| {
        scope.lookup(&caps[1])?.map(format_value).transpose()
    })?;

    replace_tokens(&patterns.bare, &quoted, |caps| {
        scope.lookup(&caps[1])?.map(plain_text).transpose()
    })
}

/// Replace each match with the closure's output; `None` leaves the match as is.
fn replace_tokens<F>(pattern: &Regex, text: &str, mut replace: F) -> Result<String>
where
    F: FnMut(&Captures<'_>) -> Result<Option<String>>,
{
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[cursor..whole.start()]);
        match replace(&caps)? {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(whole.as_str()),
        }
        cursor = whole.end();
    }

    out.push_str(&text[cursor..]);
    Ok(out)
}

/// JSON rendering of a value: containers pretty-printed with a four-space
/// indent, strings quoted, other scalars as written.
pub fn format_value(value: &Value) -> Result<String> {
    let rendered = match value {
        Value::Mapping(_) | Value::Sequence(_) => {
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            value
                .serialize(&mut ser)
                .map_err(|e| WheelhouseError::Other(e.into()))?;
            String::from_utf8(buf).map_err(|e| WheelhouseError::Other(e.into()))?
        }
        scalar => serde_json::to_string(scalar).map_err(|e| WheelhouseError::Other(e.into()))?,
    };
    Ok(rendered)
}

/// Plain rendering of a value: strings as-is, everything else as JSON.
pub fn plain_text(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => format_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn expands_name_and_bare_attributes() {
        let text = "// {% for x in cfg.items %}\n${x.__name__}=${x.value}\n// {% end for %}";
        let doc = yaml("items:\n  - a: {value: 1}\n  - b: {value: 2}");
        assert_eq!(expand_loops(text, &doc).unwrap(), "a=1\nb=2\n");
    }

    #[test]
    fn quoted_tokens_take_json_rendering() {
        let text = "// {% for p in cfg.ports %}\n{\"name\": \"${p.__name__}\", \"port\": \"${p.number}\", \"proto\": \"${p.proto}\"},\n// {% end for %}";
        let doc = yaml("ports:\n  - http: {number: 80, proto: TCP}");
        let out = expand_loops(text, &doc).unwrap();
        assert_eq!(out, "{\"name\": \"http\", \"port\": 80, \"proto\": \"TCP\"},\n");
    }

    #[test]
    fn quoted_container_is_pretty_json() {
        let text = "// {% for c in cfg.containers %}\n\"env\": \"${c.env}\"\n// {% end for %}";
        let doc = yaml("containers:\n  - web:\n      env: {A: '1'}");
        let out = expand_loops(text, &doc).unwrap();
        assert_eq!(out, "\"env\": {\n    \"A\": \"1\"\n}\n");
    }

    #[test]
    fn name_token_tolerates_whitespace() {
        let text = "# {% for x in c.items %}\n${ x.__name__ }\n# {% end for %}";
        let doc = yaml("items:\n  - one: ~");
        assert_eq!(expand_loops(text, &doc).unwrap(), "one\n");
    }

    #[test]
    fn nested_attribute_paths_resolve() {
        let text = "// {% for x in c.items %}\n${x.image.tag}\n// {% end for %}";
        let doc = yaml("items:\n  - web: {image: {tag: v2}}");
        assert_eq!(expand_loops(text, &doc).unwrap(), "v2\n");
    }

    #[test]
    fn missing_attribute_leaves_token() {
        let text = "// {% for x in c.items %}\n${x.nope}\n// {% end for %}";
        let doc = yaml("items:\n  - web: {}");
        assert_eq!(expand_loops(text, &doc).unwrap(), "${x.nope}\n");
    }

    #[test]
    fn other_variables_are_untouched() {
        let text = "// {% for x in c.items %}\n${y.value} ${x.value}\n// {% end for %}";
        let doc = yaml("items:\n  - web: {value: 1}");
        assert_eq!(expand_loops(text, &doc).unwrap(), "${y.value} 1\n");
    }

    #[test]
    fn empty_source_yields_empty_string() {
        let text = "before\n// {% for x in c.items %}\n${x.__name__}\n// {% end for %}after";
        let doc = yaml("items: []");
        assert_eq!(expand_loops(text, &doc).unwrap(), "before\nafter");
    }

    #[test]
    fn non_sequence_source_is_invalid() {
        let text = "// {% for x in c.items %}\nq\n// {% end for %}";
        let err = expand_loops(text, &yaml("items: {a: 1}")).unwrap_err();
        assert!(matches!(err, WheelhouseError::InvalidLoopSource { line: 1, .. }));
    }

    #[test]
    fn missing_source_is_invalid() {
        let text = "x\n// {% for x in c.items %}\nq\n// {% end for %}";
        let err = expand_loops(text, &yaml("other: 1")).unwrap_err();
        assert!(matches!(err, WheelhouseError::InvalidLoopSource { line: 2, .. }));
    }

    #[test]
    fn multi_key_entry_is_invalid() {
        let text = "// {% for x in c.items %}\nq\n// {% end for %}";
        let doc = yaml("items:\n  - {a: 1, b: 2}");
        assert!(matches!(
            expand_loops(text, &doc),
            Err(WheelhouseError::InvalidLoopSource { .. })
        ));
    }

    #[test]
    fn lone_begin_marker_is_unbalanced() {
        let text = "// {% for x in c.items %}\nq";
        assert!(matches!(
            expand_loops(text, &yaml("items: []")),
            Err(WheelhouseError::UnbalancedBlock { .. })
        ));
    }

    #[test]
    fn format_value_scalars() {
        assert_eq!(format_value(&yaml("3")).unwrap(), "3");
        assert_eq!(format_value(&yaml("true")).unwrap(), "true");
        assert_eq!(format_value(&yaml("web")).unwrap(), "\"web\"");
        assert_eq!(format_value(&Value::Null).unwrap(), "null");
        assert_eq!(plain_text(&yaml("web")).unwrap(), "web");
    }

    #[test]
    fn format_value_sequence() {
        assert_eq!(format_value(&yaml("[1, 2]")).unwrap(), "[\n    1,\n    2\n]");
    }
}

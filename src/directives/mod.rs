//! Directive expansion for template text.
//!
//! Templates carry `{% if %}` and `{% for %}` blocks inside line comments.
//! [`expand`] runs the full pipeline on one template:
//!
//! 1. Conditional blocks are kept or dropped ([`conditional`])
//! 2. Loop blocks are repeated per source entry ([`loops`])
//! 3. Commas left dangling before `}` or `]` are removed
//!
//! # Example
//!
//! ```
//! use wheelhouse::directives::expand;
//!
//! let doc: serde_yaml::Value = serde_yaml::from_str("items:\n  - a: {v: 1}\n  - b: {v: 2}").unwrap();
//! let text = "// {% for x in cfg.items %}\n${x.__name__}=${x.v}\n// {% end for %}";
//! assert_eq!(expand(text, &doc).unwrap(), "a=1\nb=2\n");
//! ```

pub mod conditional;
pub mod loops;
pub mod operand;
pub mod scanner;

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use crate::error::Result;

pub use conditional::{evaluate_conditionals, Condition};
pub use loops::{expand_loops, format_value, loop_entries, plain_text, LoopScope};
pub use operand::{Operand, Operator};
pub use scanner::{scan, BlockHeader, DirectiveBlock, DirectiveKind};

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",([ \t\r]*\n\s*[}\]])").unwrap());

/// Remove a comma followed by a line break and a closing `}` or `]`.
pub fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

/// Expand all directives in a template against a document.
///
/// Returns the first error; no partially expanded text is produced.
pub fn expand(text: &str, doc: &Value) -> Result<String> {
    let text = evaluate_conditionals(text, doc)?;
    let text = expand_loops(&text, doc)?;
    Ok(strip_trailing_commas(&text))
}

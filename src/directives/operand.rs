//! Operands and operators of conditional directives.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use crate::document::{kind_name, path};
use crate::error::{Result, WheelhouseError};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(\d+\.?\d*|\.\d+)$").unwrap());

const KEYS_SUFFIX: &str = "__keys__";

/// Comparison operators supported in `{% if %}` markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    In,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::In => "in",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
        }
    }

    /// Apply the operator.
    ///
    /// The error string describes why the operands cannot be combined.
    pub fn evaluate(
        self,
        left: &Operand,
        right: &Operand,
    ) -> std::result::Result<bool, String> {
        match self {
            Operator::In => right.contains(left),
            Operator::Eq => Ok(left.equals(right)),
            Operator::Ne => Ok(!left.equals(right)),
            Operator::Lt => left.compare(right).map(Ordering::is_lt),
            Operator::Gt => left.compare(right).map(Ordering::is_gt),
            Operator::Le => left.compare(right).map(Ordering::is_le),
            Operator::Ge => left.compare(right).map(Ordering::is_ge),
        }
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "in" => Ok(Operator::In),
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            ">" => Ok(Operator::Gt),
            "<=" => Ok(Operator::Le),
            ">=" => Ok(Operator::Ge),
            other => Err(format!("unknown operator: {}", other)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    Number(f64),
    /// Keys of a mapping, from a `path.__keys__` operand.
    Keys(Vec<String>),
    /// Any other document value, including an absent one (null).
    Value(Value),
}

impl Operand {
    /// Resolve a raw operand token against a document.
    ///
    /// Precedence: quoted literal, number literal, `__keys__` path, then
    /// plain path. Path tokens drop their first segment before lookup.
    pub fn parse(token: &str, doc: &Value) -> Result<Self> {
        if let Some(text) = unquote(token) {
            return Ok(Operand::Text(text.to_string()));
        }

        if NUMBER.is_match(token) {
            let number = token
                .parse::<f64>()
                .map_err(|e| resolution_error(token, e.to_string()))?;
            return Ok(Operand::Number(number));
        }

        let segments: Vec<&str> = token.split('.').skip(1).collect();

        if let Some((_, parent)) = segments.split_last().filter(|(last, _)| **last == KEYS_SUFFIX) {
            let target =
                path::get(doc, parent).map_err(|e| resolution_error(token, e.to_string()))?;
            return match target {
                Some(Value::Mapping(map)) => Ok(Operand::Keys(
                    map.keys().map(plain_key).collect(),
                )),
                Some(other) => Err(resolution_error(
                    token,
                    format!("expected a mapping, found {}", kind_name(other)),
                )),
                None => Err(resolution_error(token, "path does not exist".to_string())),
            };
        }

        let value = path::get(doc, &segments).map_err(|e| resolution_error(token, e.to_string()))?;
        Ok(Operand::from_value(value))
    }

    /// Wrap a looked-up value; absent values become null.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Operand::Text(s.clone()),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) => Operand::Number(f),
                None => Operand::Value(Value::Number(n.clone())),
            },
            Some(other) => Operand::Value(other.clone()),
            None => Operand::Value(Value::Null),
        }
    }

    fn equals(&self, other: &Operand) -> bool {
        match (self, other) {
            (Operand::Text(a), Operand::Text(b)) => a == b,
            (Operand::Number(a), Operand::Number(b)) => a == b,
            (Operand::Keys(a), Operand::Keys(b)) => a == b,
            (Operand::Keys(keys), Operand::Value(Value::Sequence(items)))
            | (Operand::Value(Value::Sequence(items)), Operand::Keys(keys)) => {
                keys.len() == items.len()
                    && keys
                        .iter()
                        .zip(items)
                        .all(|(k, v)| v.as_str() == Some(k.as_str()))
            }
            (Operand::Value(a), Operand::Value(b)) => a == b,
            _ => false,
        }
    }

    /// Membership of `needle` in `self`.
    fn contains(&self, needle: &Operand) -> std::result::Result<bool, String> {
        match self {
            Operand::Keys(keys) => Ok(match needle {
                Operand::Text(t) => keys.iter().any(|k| k == t),
                _ => false,
            }),
            Operand::Text(haystack) => match needle {
                Operand::Text(t) => Ok(haystack.contains(t.as_str())),
                other => Err(format!(
                    "cannot look for {} inside a string",
                    other.describe()
                )),
            },
            Operand::Value(Value::Sequence(items)) => Ok(items
                .iter()
                .any(|item| needle.equals(&Operand::from_value(Some(item))))),
            Operand::Value(Value::Mapping(map)) => Ok(map
                .keys()
                .any(|key| needle.equals(&Operand::from_value(Some(key))))),
            other => Err(format!("'in' needs a collection, found {}", other.describe())),
        }
    }

    fn compare(&self, other: &Operand) -> std::result::Result<Ordering, String> {
        match (self, other) {
            (Operand::Number(a), Operand::Number(b)) => a
                .partial_cmp(b)
                .ok_or_else(|| "numbers are not comparable".to_string()),
            (Operand::Text(a), Operand::Text(b)) => Ok(a.cmp(b)),
            (a, b) => Err(format!(
                "cannot order {} against {}",
                a.describe(),
                b.describe()
            )),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Operand::Text(_) => "a string",
            Operand::Number(_) => "a number",
            Operand::Keys(_) => "a key list",
            Operand::Value(v) => kind_name(v),
        }
    }
}

fn unquote(token: &str) -> Option<&str> {
    if token.len() < 2 {
        return None;
    }
    let quoted = (token.starts_with('"') && token.ends_with('"'))
        || (token.starts_with('\'') && token.ends_with('\''));
    quoted.then(|| &token[1..token.len() - 1])
}

fn plain_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn resolution_error(operand: &str, message: String) -> WheelhouseError {
    WheelhouseError::OperandResolutionError {
        operand: operand.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn doc() -> Value {
        yaml("count: 3\nname: web\nlabels:\n  tier: front\n  app: web\nzones: [a, b]\nflag: true")
    }

    #[test]
    fn operator_parses_all_tokens() {
        for token in ["in", "==", "!=", "<", ">", "<=", ">="] {
            let op: Operator = token.parse().unwrap();
            assert_eq!(op.as_str(), token);
        }
        assert!("=~".parse::<Operator>().is_err());
    }

    #[test]
    fn quoted_literals_are_text() {
        let d = doc();
        assert_eq!(Operand::parse("'web'", &d).unwrap(), Operand::Text("web".into()));
        assert_eq!(Operand::parse("\"3\"", &d).unwrap(), Operand::Text("3".into()));
    }

    #[test]
    fn number_literals_are_numbers() {
        let d = doc();
        assert_eq!(Operand::parse("3", &d).unwrap(), Operand::Number(3.0));
        assert_eq!(Operand::parse("2.5", &d).unwrap(), Operand::Number(2.5));
        assert_eq!(Operand::parse("-1", &d).unwrap(), Operand::Number(-1.0));
        assert_eq!(Operand::parse(".5", &d).unwrap(), Operand::Number(0.5));
    }

    #[test]
    fn paths_drop_root_segment() {
        let d = doc();
        assert_eq!(Operand::parse("cfg.count", &d).unwrap(), Operand::Number(3.0));
        assert_eq!(Operand::parse("cfg.name", &d).unwrap(), Operand::Text("web".into()));
        assert_eq!(
            Operand::parse("cfg.flag", &d).unwrap(),
            Operand::Value(Value::Bool(true))
        );
        assert_eq!(
            Operand::parse("cfg.missing", &d).unwrap(),
            Operand::Value(Value::Null)
        );
    }

    #[test]
    fn keys_operand_lists_mapping_keys() {
        let d = doc();
        assert_eq!(
            Operand::parse("cfg.labels.__keys__", &d).unwrap(),
            Operand::Keys(vec!["tier".into(), "app".into()])
        );
    }

    #[test]
    fn keys_of_non_mapping_is_error() {
        let d = doc();
        assert!(matches!(
            Operand::parse("cfg.name.__keys__", &d),
            Err(WheelhouseError::OperandResolutionError { .. })
        ));
        assert!(Operand::parse("cfg.nothing.__keys__", &d).is_err());
    }

    #[test]
    fn path_through_scalar_is_error() {
        let d = doc();
        assert!(matches!(
            Operand::parse("cfg.name.first", &d),
            Err(WheelhouseError::OperandResolutionError { .. })
        ));
    }

    #[test]
    fn equality_compares_numbers_as_floats() {
        let three = Operand::Number(3.0);
        let d = doc();
        let from_doc = Operand::parse("cfg.count", &d).unwrap();
        assert!(Operator::Eq.evaluate(&from_doc, &three).unwrap());
        assert!(Operator::Ne
            .evaluate(&from_doc, &Operand::Text("3".into()))
            .unwrap());
    }

    #[test]
    fn membership_variants() {
        let d = doc();
        let keys = Operand::parse("cfg.labels.__keys__", &d).unwrap();
        let zones = Operand::parse("cfg.zones", &d).unwrap();
        let name = Operand::parse("cfg.name", &d).unwrap();
        let labels = Operand::parse("cfg.labels", &d).unwrap();

        assert!(Operator::In.evaluate(&Operand::Text("tier".into()), &keys).unwrap());
        assert!(Operator::In.evaluate(&Operand::Text("b".into()), &zones).unwrap());
        assert!(!Operator::In.evaluate(&Operand::Text("c".into()), &zones).unwrap());
        assert!(Operator::In.evaluate(&Operand::Text("we".into()), &name).unwrap());
        assert!(Operator::In.evaluate(&Operand::Text("app".into()), &labels).unwrap());
    }

    #[test]
    fn membership_in_scalar_is_error() {
        assert!(Operator::In
            .evaluate(&Operand::Text("a".into()), &Operand::Number(1.0))
            .is_err());
        assert!(Operator::In
            .evaluate(&Operand::Number(1.0), &Operand::Text("1".into()))
            .is_err());
    }

    #[test]
    fn relational_operators_on_numbers() {
        let two = Operand::Number(2.0);
        let three = Operand::Number(3.0);

        assert!(Operator::Lt.evaluate(&two, &three).unwrap());
        assert!(Operator::Gt.evaluate(&three, &two).unwrap());
        assert!(Operator::Le.evaluate(&two, &two).unwrap());
        assert!(Operator::Ge.evaluate(&three, &two).unwrap());
        assert!(!Operator::Le.evaluate(&three, &two).unwrap());
        assert!(!Operator::Ge.evaluate(&two, &three).unwrap());
    }

    #[test]
    fn relational_operators_on_strings() {
        let a = Operand::Text("alpha".into());
        let b = Operand::Text("beta".into());
        assert!(Operator::Lt.evaluate(&a, &b).unwrap());
        assert!(Operator::Ge.evaluate(&b, &a).unwrap());
    }

    #[test]
    fn relational_on_mixed_types_is_error() {
        let err = Operator::Lt
            .evaluate(&Operand::Number(1.0), &Operand::Text("a".into()))
            .unwrap_err();
        assert!(err.contains("a number"));
    }
}

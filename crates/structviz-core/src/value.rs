//! The structured value model produced by the parser.
//!
//! [`Value`] is a closed tagged union over the shapes a user can type into the
//! editor: null, numbers, strings, booleans, sequences and key-ordered
//! mappings. Every later stage (classification, validation, layout) works on
//! this type only.

use std::fmt::{self, Write as _};

use indexmap::IndexMap;
use serde::Serialize;

/// Key-ordered mapping used for [`Value::Mapping`].
pub type Mapping = IndexMap<String, Value>;

/// A parsed, format-agnostic structured value.
///
/// Mappings preserve the insertion order of their keys so that layouts which
/// enumerate entries (hash tables, graph nodes) are stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    /// Returns `true` if this value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this value is a [`Value::Number`].
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns `true` for numbers, strings and booleans.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Number(_) | Value::String(_) | Value::Boolean(_)
        )
    }

    /// Returns the number if this is a [`Value::Number`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is a [`Value::Sequence`].
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a [`Value::Mapping`].
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a mapping.
    ///
    /// Returns `None` both for missing keys and for non-mapping values. An
    /// explicit `null` entry is returned as `Some(&Value::Null)`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Returns `true` if this value is a mapping that contains `key`.
    pub fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns `true` if this is a sequence of exactly two elements.
    pub fn is_pair(&self) -> bool {
        self.as_sequence().is_some_and(|items| items.len() == 2)
    }

    /// Coerces the value into a finite number where that is meaningful.
    ///
    /// Numbers are returned as-is, strings are parsed after trimming (empty
    /// strings are not numeric), booleans map to `1` and `0`. Everything else
    /// yields `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use structviz_core::value::Value;
    ///
    /// assert_eq!(Value::from("  42 ").coerce_number(), Some(42.0));
    /// assert_eq!(Value::from("x").coerce_number(), None);
    /// assert_eq!(Value::Boolean(true).coerce_number(), Some(1.0));
    /// ```
    pub fn coerce_number(&self) -> Option<f64> {
        let number = match self {
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Null | Value::Sequence(_) | Value::Mapping(_) => return None,
        };
        number.is_finite().then_some(number)
    }

    /// A short name of the variant, used in user-facing messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Renders the value the way it is used as a hash-table key.
    ///
    /// Strings are used verbatim, scalars use their literal text, sequences
    /// join their elements with `,` and mappings fall back to compact JSON.
    pub fn to_key_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Sequence(items) => items
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    other => other.to_key_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Mapping(_) => self.to_string(),
        }
    }

    /// Text shown inside a drawn node: strings unquoted, everything else as
    /// compact JSON.
    pub fn label(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Formats a number without a trailing `.0` for integral values.
///
/// # Examples
///
/// ```
/// use structviz_core::value::format_number;
///
/// assert_eq!(format_number(3.0), "3");
/// assert_eq!(format_number(-2.5), "-2.5");
/// ```
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Covers negative zero as well.
        "0".to_string()
    } else if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// Writes `s` as a double-quoted string literal with JSON escapes.
pub fn write_escaped(out: &mut impl fmt::Write, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            '\u{08}' => out.write_str("\\b")?,
            '\u{0C}' => out.write_str("\\f")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

impl fmt::Display for Value {
    /// Compact JSON rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => write_escaped(f, s),
            Value::Sequence(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Value::Mapping(map) => {
                f.write_char('{')?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write_escaped(f, key)?;
                    write!(f, ":{value}")?;
                }
                f.write_char('}')
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Value::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[f64]) -> Value {
        Value::Sequence(values.iter().copied().map(Value::from).collect())
    }

    #[test]
    fn test_display_compact_json() {
        let value: Value = [
            ("name", Value::from("a\"b")),
            ("items", numbers(&[1.0, 2.5])),
            ("next", Value::Null),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            value.to_string(),
            r#"{"name":"a\"b","items":[1,2.5],"next":null}"#
        );
    }

    #[test]
    fn test_mapping_preserves_key_order() {
        let value: Value = [("z", Value::from(1)), ("a", Value::from(2))]
            .into_iter()
            .collect();
        let keys: Vec<&String> = value.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn test_get_distinguishes_explicit_null() {
        let value: Value = [("next", Value::Null)].into_iter().collect();
        assert_eq!(value.get("next"), Some(&Value::Null));
        assert_eq!(value.get("missing"), None);
        assert!(Value::from(3).get("next").is_none());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(Value::from(7).coerce_number(), Some(7.0));
        assert_eq!(Value::from("3.5").coerce_number(), Some(3.5));
        assert_eq!(Value::from("").coerce_number(), None);
        assert_eq!(Value::from(" ").coerce_number(), None);
        assert_eq!(Value::from("abc").coerce_number(), None);
        assert_eq!(Value::from("inf").coerce_number(), None);
        assert_eq!(Value::Boolean(false).coerce_number(), Some(0.0));
        assert_eq!(Value::Null.coerce_number(), None);
        assert_eq!(numbers(&[1.0]).coerce_number(), None);
    }

    #[test]
    fn test_key_string() {
        assert_eq!(Value::from("apple").to_key_string(), "apple");
        assert_eq!(Value::from(10).to_key_string(), "10");
        assert_eq!(Value::from(0.5).to_key_string(), "0.5");
        assert_eq!(Value::Boolean(true).to_key_string(), "true");
        assert_eq!(numbers(&[1.0, 2.0]).to_key_string(), "1,2");
    }

    #[test]
    fn test_label_unquotes_strings() {
        assert_eq!(Value::from("A").label(), "A");
        assert_eq!(Value::from(4).label(), "4");
        assert_eq!(Value::Null.label(), "null");
    }

    #[test]
    fn test_is_pair() {
        assert!(numbers(&[1.0, 2.0]).is_pair());
        assert!(!numbers(&[1.0]).is_pair());
        assert!(!Value::from("ab").is_pair());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(1.25), "1.25");
    }

    #[test]
    fn test_escape_control_characters() {
        let mut out = String::new();
        write_escaped(&mut out, "a\nb\u{01}").unwrap();
        assert_eq!(out, r#""a\nb\u0001""#);
    }
}

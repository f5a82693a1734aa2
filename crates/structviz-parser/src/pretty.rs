//! Indented rendering of values.

use std::fmt::{self, Write};

use structviz_core::value::{Value, format_number, write_escaped};

const INDENT: &str = "  ";

fn write_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) -> fmt::Result {
    match value {
        Value::Sequence(items) if items.is_empty() => out.write_str("[]"),
        Value::Mapping(map) if map.is_empty() => out.write_str("{}"),
        Value::Sequence(items) => {
            out.write_str("[\n")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_str(",\n")?;
                }
                write_indent(out, depth + 1);
                write_value(out, item, depth + 1)?;
            }
            out.write_char('\n')?;
            write_indent(out, depth);
            out.write_char(']')
        }
        Value::Mapping(map) => {
            out.write_str("{\n")?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.write_str(",\n")?;
                }
                write_indent(out, depth + 1);
                write_escaped(out, key)?;
                out.write_str(": ")?;
                write_value(out, item, depth + 1)?;
            }
            out.write_char('\n')?;
            write_indent(out, depth);
            out.write_char('}')
        }
        Value::Number(n) => out.write_str(&format_number(*n)),
        scalar => write!(out, "{scalar}"),
    }
}

/// Renders `value` as JSON text indented by two spaces per level.
///
/// Empty containers stay on one line as `[]` and `{}`.
///
/// # Example
///
/// ```
/// use structviz_core::value::Value;
/// use structviz_parser::to_pretty_string;
///
/// let value = Value::Sequence(vec![Value::from(1), Value::from("a")]);
/// assert_eq!(to_pretty_string(&value), "[\n  1,\n  \"a\"\n]");
/// ```
pub fn to_pretty_string(value: &Value) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_value(&mut out, value, 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(to_pretty_string(&Value::Null), "null");
        assert_eq!(to_pretty_string(&Value::from(true)), "true");
        assert_eq!(to_pretty_string(&Value::from(2.5)), "2.5");
        assert_eq!(to_pretty_string(&Value::from("a\"b")), "\"a\\\"b\"");
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(to_pretty_string(&Value::Sequence(Vec::new())), "[]");
        assert_eq!(
            to_pretty_string(&Value::from_iter(Vec::<(String, Value)>::new())),
            "{}"
        );
    }

    #[test]
    fn test_nested_mapping() {
        let value: Value = [
            ("value", Value::from(1)),
            (
                "children",
                Value::Sequence(vec![Value::from_iter([("value", Value::from(2))])]),
            ),
        ]
        .into_iter()
        .collect();

        let expected = "{\n  \"value\": 1,\n  \"children\": [\n    {\n      \"value\": 2\n    }\n  ]\n}";
        assert_eq!(to_pretty_string(&value), expected);
    }
}

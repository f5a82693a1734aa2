//! Structural validation of a value against the kind it will be drawn as.
//!
//! Validation never stops at the first problem: every violated rule adds a
//! message to the [`ValidationResult`].

use serde::Serialize;

use structviz_core::{kind::StructureKind, value::Value};

/// Outcome of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    /// Returns `true` if no rule was violated.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every violation message, in the order they were found.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Consumes the result, returning its messages.
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// Returns the entry stored under `key`, treating an explicit `null` as absent.
fn present<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

fn validate_graph(value: &Value, result: &mut ValidationResult) {
    let nodes = present(value, "nodes");
    let links = present(value, "links");

    if nodes.is_none() || links.is_none() {
        result.push("Graph must have nodes and links properties");
    }
    if nodes.is_some_and(|nodes| nodes.as_sequence().is_none()) {
        result.push("Nodes must be an array");
    }
    if links.is_some_and(|links| links.as_sequence().is_none()) {
        result.push("Links must be an array");
    }
}

fn validate_grid(value: &Value, result: &mut ValidationResult) {
    let Some(rows) = value.as_sequence().filter(|rows| !rows.is_empty()) else {
        result.push("Grid must be a non-empty array of rows");
        return;
    };

    let widths: Option<Vec<usize>> = if rows.iter().all(|row| row.as_sequence().is_some()) {
        Some(rows.iter().filter_map(Value::as_sequence).map(<[Value]>::len).collect())
    } else if rows.iter().all(|row| row.as_str().is_some()) {
        Some(
            rows.iter()
                .filter_map(Value::as_str)
                .map(|row| row.chars().count())
                .collect(),
        )
    } else {
        None
    };

    match widths {
        None => result.push("Grid rows must all be arrays or all be strings"),
        Some(widths) => {
            if widths.windows(2).any(|pair| pair[0] != pair[1]) {
                result.push("Grid rows must all have the same length");
            }
        }
    }
}

/// Validates `value` as `kind`.
///
/// [`StructureKind::Object`] and [`StructureKind::Unknown`] have no
/// structural rules and always pass; they are rejected later because no
/// layout exists for them.
///
/// # Examples
///
/// ```
/// use structviz::validate::validate;
/// use structviz_core::{kind::StructureKind, value::Value};
///
/// let result = validate(&Value::from(3), StructureKind::Array);
/// assert_eq!(result.errors(), ["Data must be an array"]);
/// ```
pub fn validate(value: &Value, kind: StructureKind) -> ValidationResult {
    let mut result = ValidationResult::default();

    match kind {
        StructureKind::Array => {
            if value.as_sequence().is_none() {
                result.push("Data must be an array");
            }
        }
        StructureKind::Tree => {
            if !value.has_key("value") {
                result.push("Tree must have a value property");
            }
        }
        StructureKind::Graph => validate_graph(value, &mut result),
        StructureKind::Heap => match value.as_sequence() {
            None => result.push("Heap must be an array"),
            Some(items) if !items.iter().all(Value::is_number) => {
                result.push("Heap must contain only numbers")
            }
            Some(_) => {}
        },
        StructureKind::HashTable => match value {
            Value::Sequence(items) => {
                if !items.iter().all(Value::is_pair) {
                    result.push("Hash table array must contain key-value pairs");
                }
            }
            Value::Mapping(_) => {}
            _ => result.push("Hash table must be an object or array of key-value pairs"),
        },
        StructureKind::Grid => validate_grid(value, &mut result),
        StructureKind::LinkedList => {
            if value.as_sequence().is_none() && !value.has_key("value") {
                result.push("Linked list must be an array or a node with a value property");
            }
        }
        StructureKind::Object | StructureKind::Unknown => {}
    }

    result
}

//! Structure classification.
//!
//! A value is classified by walking an ordered list of [`Rule`]s; the first
//! rule that matches decides the [`StructureKind`]. Values no rule accepts
//! are [`StructureKind::Unknown`], so classification is total.
//!
//! [`StructureKind::Grid`] has no rule: a grid is indistinguishable from a
//! nested array and is only laid out when the caller asks for it.

use log::trace;

use structviz_core::{kind::StructureKind, value::Value};

/// Number of parent positions inspected when guessing whether a sequence is
/// a heap.
const HEAP_CHECK_PARENTS: usize = 7;

/// Smallest sequence that may be classified as a heap.
const HEAP_MIN_LEN: usize = 3;

/// A single classification rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    name: &'static str,
    kind: StructureKind,
    matches: fn(&Value) -> bool,
}

impl Rule {
    /// Short description of what the rule accepts.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The kind assigned when the rule matches.
    pub fn kind(&self) -> StructureKind {
        self.kind
    }

    /// Returns `true` if `value` satisfies this rule.
    pub fn matches(&self, value: &Value) -> bool {
        (self.matches)(value)
    }
}

/// Which heap orderings a sequence satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapOrder {
    pub is_max: bool,
    pub is_min: bool,
}

impl HeapOrder {
    /// Returns `true` if either ordering holds.
    pub fn is_heap(self) -> bool {
        self.is_max || self.is_min
    }
}

/// Checks the heap property of `values` for the first `parents` positions.
///
/// Position `i` is compared against its children `2i + 1` and `2i + 2`. A
/// parent smaller than a child clears `is_max`; a parent larger than a child
/// clears `is_min`. Equal values keep both orderings.
///
/// # Examples
///
/// ```
/// use structviz::classify::heap_order;
///
/// let order = heap_order(&[10.0, 8.0, 9.0, 4.0], usize::MAX);
/// assert!(order.is_max && !order.is_min);
/// ```
pub fn heap_order(values: &[f64], parents: usize) -> HeapOrder {
    let mut order = HeapOrder {
        is_max: true,
        is_min: true,
    };

    for (i, parent) in values.iter().enumerate().take(parents) {
        for child in [2 * i + 1, 2 * i + 2] {
            if let Some(child) = values.get(child) {
                if parent < child {
                    order.is_max = false;
                }
                if parent > child {
                    order.is_min = false;
                }
            }
        }
    }

    order
}

fn is_empty_sequence(value: &Value) -> bool {
    value.as_sequence().is_some_and(<[Value]>::is_empty)
}

fn is_sequence_of_pairs(value: &Value) -> bool {
    value
        .as_sequence()
        .is_some_and(|items| !items.is_empty() && items.iter().all(Value::is_pair))
}

fn is_heap_ordered(value: &Value) -> bool {
    let Some(items) = value.as_sequence() else {
        return false;
    };
    if items.len() < HEAP_MIN_LEN {
        return false;
    }

    let numbers: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
    numbers.is_some_and(|numbers| heap_order(&numbers, HEAP_CHECK_PARENTS).is_heap())
}

fn is_sequence(value: &Value) -> bool {
    value.as_sequence().is_some()
}

fn is_graph(value: &Value) -> bool {
    let is_list = |key| value.get(key).is_some_and(|v| v.as_sequence().is_some());
    is_list("nodes") && is_list("links")
}

fn is_tree(value: &Value) -> bool {
    value.has_key("value") && ["left", "right", "children"].iter().any(|key| value.has_key(key))
}

fn is_pointer_chain(value: &Value) -> bool {
    value.has_key("value") && value.has_key("next")
}

fn is_flat_mapping(value: &Value) -> bool {
    value.as_mapping().is_some_and(|map| {
        !map.is_empty()
            && map
                .values()
                .all(|v| matches!(v, Value::Number(_) | Value::String(_) | Value::Boolean(_)))
    })
}

fn is_non_empty_mapping(value: &Value) -> bool {
    value.as_mapping().is_some_and(|map| !map.is_empty())
}

/// Classification rules in priority order.
pub const RULES: [Rule; 9] = [
    Rule {
        name: "empty sequence",
        kind: StructureKind::Array,
        matches: is_empty_sequence,
    },
    Rule {
        name: "sequence of key-value pairs",
        kind: StructureKind::HashTable,
        matches: is_sequence_of_pairs,
    },
    Rule {
        name: "heap-ordered numbers",
        kind: StructureKind::Heap,
        matches: is_heap_ordered,
    },
    Rule {
        name: "sequence",
        kind: StructureKind::Array,
        matches: is_sequence,
    },
    Rule {
        name: "mapping with nodes and links",
        kind: StructureKind::Graph,
        matches: is_graph,
    },
    Rule {
        name: "mapping with value and children",
        kind: StructureKind::Tree,
        matches: is_tree,
    },
    Rule {
        name: "mapping with value and next",
        kind: StructureKind::LinkedList,
        matches: is_pointer_chain,
    },
    Rule {
        name: "mapping of scalars",
        kind: StructureKind::HashTable,
        matches: is_flat_mapping,
    },
    Rule {
        name: "non-empty mapping",
        kind: StructureKind::Object,
        matches: is_non_empty_mapping,
    },
];

/// Returns the rule that decides the kind of `value`, if any.
pub fn matching_rule(value: &Value) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.matches(value))
}

/// Classifies `value`.
///
/// # Examples
///
/// ```
/// use structviz::classify::classify;
/// use structviz_core::{kind::StructureKind, value::Value};
///
/// let pairs = Value::Sequence(vec![
///     Value::Sequence(vec![Value::from("a"), Value::from(1)]),
///     Value::Sequence(vec![Value::from("b"), Value::from(2)]),
/// ]);
/// assert_eq!(classify(&pairs), StructureKind::HashTable);
/// assert_eq!(classify(&Value::Null), StructureKind::Unknown);
/// ```
pub fn classify(value: &Value) -> StructureKind {
    match matching_rule(value) {
        Some(rule) => {
            trace!(rule = rule.name, kind = rule.kind.as_str(); "Classified value");
            rule.kind
        }
        None => StructureKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn numbers(values: &[f64]) -> Value {
        Value::Sequence(values.iter().copied().map(Value::from).collect())
    }

    fn mapping(entries: &[(&str, Value)]) -> Value {
        entries.iter().cloned().collect()
    }

    #[test]
    fn test_heap_order_flags() {
        assert!(heap_order(&[10.0, 8.0, 9.0, 4.0, 7.0, 5.0, 3.0, 2.0, 1.0], usize::MAX).is_max);
        assert!(heap_order(&[1.0, 3.0, 2.0, 4.0], usize::MAX).is_min);
        assert!(!heap_order(&[5.0, 2.0, 8.0, 1.0], usize::MAX).is_heap());

        let equal = heap_order(&[2.0, 2.0, 2.0], usize::MAX);
        assert!(equal.is_max && equal.is_min);
    }

    #[test]
    fn test_heap_check_only_inspects_first_parents() {
        // Position 7 breaks the max ordering but is never inspected as a parent.
        let mut values = vec![100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 1.0, 0.0, 0.0];
        values.extend([0.0; 6]);
        values[15] = 5.0;

        assert!(!heap_order(&values, usize::MAX).is_max);
        assert!(heap_order(&values, HEAP_CHECK_PARENTS).is_max);
        assert_eq!(classify(&numbers(&values)), StructureKind::Heap);
    }

    #[test]
    fn test_sequences() {
        assert_eq!(classify(&Value::Sequence(Vec::new())), StructureKind::Array);
        assert_eq!(
            classify(&numbers(&[10.0, 8.0, 9.0, 4.0, 7.0, 5.0, 3.0, 2.0, 1.0])),
            StructureKind::Heap
        );
        assert_eq!(
            classify(&numbers(&[5.0, 2.0, 8.0, 1.0, 9.0])),
            StructureKind::Array
        );
        // Too short for a heap.
        assert_eq!(classify(&numbers(&[2.0, 1.0])), StructureKind::Array);
        // Numeric strings are not numbers.
        assert_eq!(
            classify(&Value::Sequence(vec![
                Value::from("3"),
                Value::from("2"),
                Value::from("1"),
            ])),
            StructureKind::Array
        );
    }

    #[test]
    fn test_pairs_win_over_heap_and_array() {
        let pairs = Value::Sequence(vec![
            Value::Sequence(vec![Value::from("a"), Value::from(1)]),
            Value::Sequence(vec![Value::from("b"), Value::from(2)]),
        ]);
        assert_eq!(classify(&pairs), StructureKind::HashTable);

        let rows = Value::Sequence(vec![numbers(&[1.0, 2.0, 3.0]), numbers(&[4.0, 5.0, 6.0])]);
        assert_eq!(classify(&rows), StructureKind::Array);
    }

    #[test]
    fn test_mappings() {
        let graph = mapping(&[
            ("nodes", Value::Sequence(Vec::new())),
            ("links", Value::Sequence(Vec::new())),
        ]);
        assert_eq!(classify(&graph), StructureKind::Graph);

        let not_graph = mapping(&[("nodes", Value::Sequence(Vec::new())), ("links", Value::Null)]);
        assert_eq!(classify(&not_graph), StructureKind::Object);

        let tree = mapping(&[("value", Value::from(1)), ("children", Value::Sequence(Vec::new()))]);
        assert_eq!(classify(&tree), StructureKind::Tree);

        let tree_and_list = mapping(&[
            ("value", Value::from(1)),
            ("left", Value::Null),
            ("next", Value::Null),
        ]);
        assert_eq!(classify(&tree_and_list), StructureKind::Tree);

        let list = mapping(&[("value", Value::from(1)), ("next", Value::Null)]);
        assert_eq!(classify(&list), StructureKind::LinkedList);

        let table = mapping(&[("apple", Value::from("fruit")), ("n", Value::from(3))]);
        assert_eq!(classify(&table), StructureKind::HashTable);

        let object = mapping(&[("a", Value::from(1)), ("b", Value::Null)]);
        assert_eq!(classify(&object), StructureKind::Object);

        assert_eq!(classify(&mapping(&[])), StructureKind::Unknown);
    }

    #[test]
    fn test_scalars_are_unknown() {
        for value in [Value::Null, Value::from(1), Value::from("x"), Value::from(true)] {
            assert_eq!(classify(&value), StructureKind::Unknown);
        }
    }

    #[test]
    fn test_grid_is_never_detected() {
        assert!(RULES.iter().all(|rule| rule.kind() != StructureKind::Grid));
    }

    #[test]
    fn test_every_rule_is_reachable() {
        let witnesses = [
            Value::Sequence(Vec::new()),
            Value::Sequence(vec![Value::Sequence(vec![Value::from("k"), Value::from(1)])]),
            numbers(&[3.0, 2.0, 1.0]),
            numbers(&[1.0, 3.0, 2.0, 0.0]),
            mapping(&[("nodes", Value::Sequence(Vec::new())), ("links", Value::Sequence(Vec::new()))]),
            mapping(&[("value", Value::from(1)), ("right", Value::Null)]),
            mapping(&[("value", Value::from(1)), ("next", Value::Null)]),
            mapping(&[("k", Value::from(true))]),
            mapping(&[("k", Value::Null)]),
        ];

        for (rule, witness) in RULES.iter().zip(&witnesses) {
            let decided = matching_rule(witness).map(Rule::name);
            assert_eq!(decided, Some(rule.name()), "witness for `{}`", rule.name());
        }
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Boolean),
            (-100i32..100).prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::Sequence),
                proptest::collection::vec(
                    (
                        prop_oneof![
                            Just("value".to_string()),
                            Just("next".to_string()),
                            Just("left".to_string()),
                            Just("nodes".to_string()),
                            Just("links".to_string()),
                            "[a-z]{1,3}",
                        ],
                        inner
                    ),
                    0..5
                )
                .prop_map(|entries: Vec<(String, Value)>| entries.into_iter().collect::<Value>()),
            ]
        })
    }

    proptest! {
        #[test]
        fn classification_is_total_and_deterministic(value in arb_value()) {
            let kind = classify(&value);
            prop_assert_eq!(kind, classify(&value));
            prop_assert_ne!(kind, StructureKind::Grid);
        }

        #[test]
        fn first_matching_rule_decides(value in arb_value()) {
            let expected = RULES
                .iter()
                .find(|rule| rule.matches(&value))
                .map_or(StructureKind::Unknown, Rule::kind);
            prop_assert_eq!(classify(&value), expected);
        }
    }
}

//! Built-in sample inputs, one per structure kind with a layout.

use structviz_core::kind::StructureKind;

const ARRAY: &str = "[5, 2, 8, 1, 9, 3, 7, 4, 6]";

const GRID: &str = r#"[
  [1, 2, 3, 4, 5],
  [2, 3, 4, 5, 6],
  [3, 4, 9, 6, 7],
  [4, 5, 6, 7, 8],
  [5, 6, 7, 8, 9]
]"#;

const HEAP: &str = "[10, 8, 9, 4, 7, 5, 3, 2, 1]";

const TREE: &str = r#"{
  "value": 1,
  "left": {
    "value": 2,
    "left": { "value": 4 },
    "right": { "value": 5 }
  },
  "right": {
    "value": 3,
    "left": { "value": 6 },
    "right": { "value": 7 }
  }
}"#;

const LINKED_LIST: &str = "[1, 2, 3, 4, 5]";

const HASH_TABLE: &str = r#"{
  "apple": "fruit",
  "carrot": "vegetable",
  "salmon": "fish",
  "bread": "grain",
  "milk": "dairy",
  "chicken": "meat"
}"#;

const GRAPH: &str = r#"{
  "nodes": [
    { "id": 1, "name": "A" },
    { "id": 2, "name": "B" },
    { "id": 3, "name": "C" },
    { "id": 4, "name": "D" },
    { "id": 5, "name": "E" },
    { "id": 6, "name": "F" }
  ],
  "links": [
    { "source": 1, "target": 2 },
    { "source": 1, "target": 3 },
    { "source": 2, "target": 4 },
    { "source": 3, "target": 4 },
    { "source": 4, "target": 5 },
    { "source": 5, "target": 6 },
    { "source": 6, "target": 1 }
  ]
}"#;

/// Returns the sample source text for `kind`, or `None` for kinds that have
/// no layout.
///
/// Samples are meant to be run with `kind` forced: left to the classifier,
/// the linked list sample reads as a min heap and the grid as an array.
pub fn sample(kind: StructureKind) -> Option<&'static str> {
    match kind {
        StructureKind::Array => Some(ARRAY),
        StructureKind::Grid => Some(GRID),
        StructureKind::Heap => Some(HEAP),
        StructureKind::Tree => Some(TREE),
        StructureKind::LinkedList => Some(LINKED_LIST),
        StructureKind::HashTable => Some(HASH_TABLE),
        StructureKind::Graph => Some(GRAPH),
        StructureKind::Object | StructureKind::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    #[test]
    fn test_every_layout_kind_has_a_valid_sample() {
        for kind in StructureKind::ALL {
            let Some(source) = sample(kind) else {
                assert!(!kind.has_layout());
                continue;
            };

            let value = structviz_parser::parse_strict(source).unwrap();
            let result = validate(&value, kind);
            assert!(result.is_valid(), "{kind}: {:?}", result.errors());
        }
    }
}

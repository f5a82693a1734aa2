//! Hash table layout with separate chaining.
//!
//! Entries are hashed into a table sized from the entry count. Each bucket
//! is a row; entries that collide are chained left to right inside it.

use log::debug;
use serde::Serialize;

use structviz_core::{
    geometry::{Insets, Point, Size},
    kind::StructureKind,
    value::Value,
};

use super::{Layout, LayoutEdge, LayoutEngine, LayoutNode, Viewport};
use crate::{config::HashTableConfig, error::LayoutError};

/// Longest key shown in full inside an item box.
const KEY_LABEL_CHARS: usize = 6;

/// A key/value entry of the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashEntry {
    key: String,
    value: Value,
}

impl HashEntry {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// How many entries share a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupancy {
    Empty,
    Single,
    Collision,
}

impl Occupancy {
    fn of(len: usize) -> Self {
        match len {
            0 => Self::Empty,
            1 => Self::Single,
            _ => Self::Collision,
        }
    }
}

/// One row of the table. The position is the top-left corner of the row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    index: usize,
    occupancy: Occupancy,
    #[serde(flatten)]
    position: Point,
    width: f32,
    height: f32,
    items: Vec<HashEntry>,
}

impl Bucket {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn occupancy(&self) -> Occupancy {
        self.occupancy
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn items(&self) -> &[HashEntry] {
        &self.items
    }
}

/// One entry placed inside its bucket. The node position is the top-left
/// corner of the item box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashItem {
    #[serde(flatten)]
    node: LayoutNode,
    key: String,
    bucket: usize,
    slot: usize,
    width: f32,
    height: f32,
}

impl HashItem {
    pub fn node(&self) -> &LayoutNode {
        &self.node
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn bucket(&self) -> usize {
        self.bucket
    }

    /// Position within the bucket's chain.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashTableStats {
    items: usize,
    table_size: usize,
    load_factor: f64,
    collisions: usize,
}

impl HashTableStats {
    pub fn items(&self) -> usize {
        self.items
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Entries that did not get a bucket of their own.
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashTableLayout {
    canvas: Size,
    buckets: Vec<Bucket>,
    #[serde(rename = "nodes")]
    items: Vec<HashItem>,
    edges: Vec<LayoutEdge>,
    stats: HashTableStats,
}

impl HashTableLayout {
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Items in input order; a node's id is its input index.
    pub fn items(&self) -> &[HashItem] {
        &self.items
    }

    /// Chain links between neighboring items of one bucket.
    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub fn stats(&self) -> &HashTableStats {
        &self.stats
    }
}

/// Sum of the UTF-16 code units of `key`, modulo `table_size`.
///
/// # Examples
///
/// ```
/// use structviz::layout::hash_table::hash_key;
///
/// // 'a' + 'b' = 97 + 98
/// assert_eq!(hash_key("ab", 10), 5);
/// assert_eq!(hash_key("", 10), 0);
/// ```
pub fn hash_key(key: &str, table_size: usize) -> usize {
    if table_size == 0 {
        return 0;
    }
    key.encode_utf16()
        .fold(0, |hash, unit| (hash + usize::from(unit)) % table_size)
}

/// Number of buckets for `count` entries: `count * growth_factor` rounded
/// up, but never fewer than `min_size`.
pub fn table_size(count: usize, min_size: usize, growth_factor: f64) -> usize {
    ((count as f64 * growth_factor).ceil() as usize).max(min_size)
}

/// Reads the entries of `value`.
///
/// - A mapping yields its entries in order.
/// - An array whose first element is an array yields `[key, value]` pairs.
/// - An array whose first element is a mapping with a `key` yields the
///   `key`/`value` fields of each element.
/// - Any other array is keyed by element index.
///
/// Elements that do not match the form chosen from the first element fall
/// back to their index as key.
pub fn entries(value: &Value) -> Result<Vec<HashEntry>, LayoutError> {
    match value {
        Value::Mapping(map) => Ok(map
            .iter()
            .map(|(key, value)| HashEntry::new(key.clone(), value.clone()))
            .collect()),
        Value::Sequence(items) => {
            let form: fn(usize, &Value) -> HashEntry = match items.first() {
                Some(Value::Sequence(_)) => |index, item| match item.as_sequence() {
                    Some([key, rest @ ..]) => HashEntry::new(
                        key.to_key_string(),
                        rest.first().cloned().unwrap_or(Value::Null),
                    ),
                    _ => HashEntry::new(index.to_string(), item.clone()),
                },
                Some(first) if first.get("key").is_some() => |index, item| match item.get("key") {
                    Some(key) => HashEntry::new(
                        key.to_key_string(),
                        item.get("value").cloned().unwrap_or(Value::Null),
                    ),
                    None => HashEntry::new(index.to_string(), item.clone()),
                },
                _ => |index, item| HashEntry::new(index.to_string(), item.clone()),
            };
            Ok(items
                .iter()
                .enumerate()
                .map(|(index, item)| form(index, item))
                .collect())
        }
        other => Err(LayoutError::UnexpectedShape {
            kind: StructureKind::HashTable,
            expected: "a mapping or an array of entries",
            found: other.kind_name(),
        }),
    }
}

fn key_label(key: &str) -> String {
    if key.chars().count() > KEY_LABEL_CHARS {
        let prefix: String = key.chars().take(KEY_LABEL_CHARS).collect();
        format!("{prefix}...")
    } else {
        key.to_string()
    }
}

/// Hash table layout engine.
pub struct Engine {
    config: HashTableConfig,
}

impl Engine {
    pub fn new(config: HashTableConfig) -> Self {
        Self { config }
    }

    /// Calculate the hash table layout for `value`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnexpectedShape`] for values that are neither
    /// mappings nor arrays.
    pub fn calculate_layout(
        &self,
        value: &Value,
        viewport: Viewport,
    ) -> Result<HashTableLayout, LayoutError> {
        let entries = entries(value)?;
        let size = table_size(
            entries.len(),
            self.config.min_table_size,
            self.config.growth_factor,
        );

        let margin: Insets = self.config.margin.into();
        let row_pitch = self.config.bucket_height + self.config.bucket_gap;
        let item_height = self.config.bucket_height - 10.0;

        let mut chains: Vec<Vec<usize>> = vec![Vec::new(); size];
        let mut items = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let bucket = hash_key(entry.key(), size);
            let slot = chains[bucket].len();
            chains[bucket].push(index);

            let position = Point::new(
                margin.left() + 5.0 + slot as f32 * self.config.item_spacing,
                margin.top() + bucket as f32 * row_pitch + 5.0,
            );
            items.push(HashItem {
                node: LayoutNode::new(index, entry.value().clone(), position)
                    .with_label(key_label(entry.key())),
                key: entry.key().to_string(),
                bucket,
                slot,
                width: self.config.item_width,
                height: item_height,
            });
        }

        let edges = chains
            .iter()
            .flat_map(|chain| chain.windows(2).map(|pair| LayoutEdge::new(pair[0], pair[1])))
            .collect();

        let buckets: Vec<Bucket> = chains
            .iter()
            .enumerate()
            .map(|(index, chain)| Bucket {
                index,
                occupancy: Occupancy::of(chain.len()),
                position: Point::new(margin.left(), margin.top() + index as f32 * row_pitch),
                width: self.config.bucket_width,
                height: self.config.bucket_height,
                items: chain.iter().map(|&i| entries[i].clone()).collect(),
            })
            .collect();

        let used = chains.iter().filter(|chain| !chain.is_empty()).count();
        let stats = HashTableStats {
            items: entries.len(),
            table_size: size,
            load_factor: entries.len() as f64 / size as f64,
            collisions: entries.len() - used,
        };
        debug!(
            items = stats.items,
            table_size = stats.table_size,
            collisions = stats.collisions;
            "Calculated hash table layout"
        );

        Ok(HashTableLayout {
            canvas: Size::new(
                viewport.width(),
                size as f32 * row_pitch + margin.vertical_sum(),
            ),
            buckets,
            items,
            edges,
            stats,
        })
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, value: &Value, viewport: Viewport) -> Result<Layout, LayoutError> {
        self.calculate_layout(value, viewport).map(Layout::HashTable)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn engine() -> Engine {
        Engine::new(HashTableConfig::default())
    }

    fn foods() -> Value {
        [
            ("apple", Value::from(5)),
            ("banana", Value::from(7)),
            ("orange", Value::from(3)),
            ("grape", Value::from(12)),
            ("melon", Value::from(1)),
            ("kiwi", Value::from(9)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_table_size() {
        assert_eq!(table_size(6, 10, 1.3), 10);
        assert_eq!(table_size(10, 10, 1.3), 13);
        assert_eq!(table_size(0, 10, 1.3), 10);
    }

    #[test]
    fn test_collisions_count_shared_buckets() {
        let layout = engine()
            .calculate_layout(&foods(), Viewport::new(600.0, 400.0))
            .unwrap();
        let stats = layout.stats();

        let distinct: HashSet<usize> = ["apple", "banana", "orange", "grape", "melon", "kiwi"]
            .into_iter()
            .map(|key| hash_key(key, 10))
            .collect();
        assert_eq!(stats.table_size(), 10);
        assert_eq!(stats.collisions(), 6 - distinct.len());
        assert_approx_eq!(f64, stats.load_factor(), 0.6);

        let chained: usize = layout
            .buckets()
            .iter()
            .map(|bucket| bucket.items().len().saturating_sub(1))
            .sum();
        assert_eq!(chained, stats.collisions());
        assert_eq!(layout.edges().len(), stats.collisions());
    }

    #[test]
    fn test_item_geometry() {
        // "a" and "k" both hash to 7 in a table of 10 (97 and 107).
        let value: Value = [("a", Value::from(1)), ("k", Value::from(2))]
            .into_iter()
            .collect();
        let layout = engine()
            .calculate_layout(&value, Viewport::new(600.0, 400.0))
            .unwrap();

        let bucket = &layout.buckets()[7];
        assert_eq!(bucket.occupancy(), Occupancy::Collision);
        assert_eq!(bucket.items()[1].key(), "k");
        assert_approx_eq!(f32, bucket.position().y(), 60.0 + 7.0 * 45.0);

        let second = &layout.items()[1];
        assert_eq!((second.bucket(), second.slot()), (7, 1));
        assert_approx_eq!(f32, second.node().position().x(), 60.0 + 65.0);
        assert_approx_eq!(f32, second.node().position().y(), 60.0 + 315.0 + 5.0);

        assert_eq!(layout.buckets()[0].occupancy(), Occupancy::Empty);
        assert_eq!(layout.edges(), [LayoutEdge::new(0, 1)]);
        assert_approx_eq!(f32, layout.canvas().height(), 450.0 + 100.0);
    }

    #[test]
    fn test_entry_forms() {
        let pairs = Value::Sequence(vec![
            Value::Sequence(vec![Value::from(1), Value::from("one")]),
            Value::Sequence(vec![Value::from("two"), Value::from(2)]),
        ]);
        let keys: Vec<String> = entries(&pairs)
            .unwrap()
            .iter()
            .map(|e| e.key().to_string())
            .collect();
        assert_eq!(keys, ["1", "two"]);

        let records = Value::Sequence(vec![
            [("key", Value::from("x")), ("value", Value::from(1))]
                .into_iter()
                .collect(),
            [("value", Value::from(2))].into_iter().collect(),
        ]);
        let records = entries(&records).unwrap();
        assert_eq!(records[0], HashEntry::new("x", Value::from(1)));
        assert_eq!(records[1].key(), "1");

        let plain = Value::Sequence(vec![Value::from("p"), Value::from("q")]);
        assert_eq!(entries(&plain).unwrap()[1], HashEntry::new("1", Value::from("q")));

        assert!(entries(&Value::from(3)).is_err());
    }

    #[test]
    fn test_long_keys_are_shortened() {
        let value: Value = [("watermelon", Value::from(1))].into_iter().collect();
        let layout = engine()
            .calculate_layout(&value, Viewport::new(600.0, 400.0))
            .unwrap();

        assert_eq!(layout.items()[0].node().label(), "waterm...");
        assert_eq!(layout.items()[0].key(), "watermelon");
    }

    #[test]
    fn test_empty_table() {
        let layout = engine()
            .calculate_layout(&Value::Sequence(Vec::new()), Viewport::new(600.0, 400.0))
            .unwrap();

        assert_eq!(layout.buckets().len(), 10);
        assert!(layout
            .buckets()
            .iter()
            .all(|bucket| bucket.occupancy() == Occupancy::Empty));
        assert_eq!(layout.stats().collisions(), 0);
    }

    proptest! {
        #[test]
        fn hash_is_in_range(key in "\\PC{0,16}", size in 1usize..64) {
            prop_assert!(hash_key(&key, size) < size);
        }

        #[test]
        fn table_never_shrinks_below_minimum(count in 0usize..500) {
            let size = table_size(count, 10, 1.3);
            prop_assert!(size >= 10);
            prop_assert!(size >= count);
        }
    }
}

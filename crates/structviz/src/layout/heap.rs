//! Binary heap layout.
//!
//! Element `i` sits on level `floor(log2(i + 1))`; each level spreads its
//! slots evenly across the content width.

use std::fmt;

use log::debug;
use serde::Serialize;

use structviz_core::{
    geometry::{Insets, Point, Size},
    kind::StructureKind,
    value::Value,
};

use super::{Layout, LayoutEdge, LayoutEngine, LayoutNode, Viewport};
use crate::{classify::heap_order, config::HeapConfig, error::LayoutError};

/// The ordering a heap array satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeapType {
    #[serde(rename = "Max Heap")]
    Max,
    #[serde(rename = "Min Heap")]
    Min,
    #[serde(rename = "Invalid Heap")]
    Invalid,
}

impl HeapType {
    /// Max wins when both orderings hold, as they do for equal elements.
    pub fn of(values: &[f64]) -> Self {
        let order = heap_order(values, usize::MAX);
        if order.is_max {
            Self::Max
        } else if order.is_min {
            Self::Min
        } else {
            Self::Invalid
        }
    }
}

impl fmt::Display for HeapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Max => "Max Heap",
            Self::Min => "Min Heap",
            Self::Invalid => "Invalid Heap",
        })
    }
}

/// One heap element. The node position is the circle center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeapNode {
    #[serde(flatten)]
    node: LayoutNode,
    level: u32,
    slot: usize,
    radius: f32,
}

impl HeapNode {
    pub fn node(&self) -> &LayoutNode {
        &self.node
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Position within the level, counted from the left.
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeapStats {
    #[serde(rename = "type")]
    heap_type: HeapType,
    nodes: usize,
    height: u32,
}

impl HeapStats {
    pub fn heap_type(&self) -> HeapType {
        self.heap_type
    }

    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Number of levels, `floor(log2 n) + 1` for a non-empty heap.
    pub fn height(&self) -> u32 {
        self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeapLayout {
    canvas: Size,
    nodes: Vec<HeapNode>,
    edges: Vec<LayoutEdge>,
    stats: HeapStats,
}

impl HeapLayout {
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn nodes(&self) -> &[HeapNode] {
        &self.nodes
    }

    /// Parent to child edges.
    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub fn stats(&self) -> &HeapStats {
        &self.stats
    }
}

/// Binary heap layout engine.
pub struct Engine {
    config: HeapConfig,
}

impl Engine {
    pub fn new(config: HeapConfig) -> Self {
        Self { config }
    }

    /// Calculate the heap layout for `value`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnexpectedShape`] when `value` is not an array
    /// and [`LayoutError::NonNumericHeap`] when an element is not a number.
    pub fn calculate_layout(
        &self,
        value: &Value,
        viewport: Viewport,
    ) -> Result<HeapLayout, LayoutError> {
        let items = value
            .as_sequence()
            .ok_or_else(|| LayoutError::UnexpectedShape {
                kind: StructureKind::Heap,
                expected: "an array of numbers",
                found: value.kind_name(),
            })?;
        let values = items
            .iter()
            .enumerate()
            .map(|(index, item)| item.as_f64().ok_or(LayoutError::NonNumericHeap { index }))
            .collect::<Result<Vec<f64>, _>>()?;

        let margin: Insets = self.config.margin.into();
        let radius = self.config.node_radius;
        let width = viewport.width() - margin.horizontal_sum();
        let level_width = width - 2.0 * radius;

        let nodes = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let level = (index + 1).ilog2();
                let first_in_level = (1usize << level) - 1;
                let slot = index - first_in_level;
                let slots = (1usize << level) as f32;
                let x = level_width / (slots + 1.0) * (slot as f32 + 1.0) + radius;
                let y = level as f32 * self.config.level_height + radius;
                HeapNode {
                    node: LayoutNode::new(
                        index,
                        item.clone(),
                        Point::new(margin.left() + x, margin.top() + y),
                    ),
                    level,
                    slot,
                    radius,
                }
            })
            .collect();

        let count = values.len();
        let edges = (0..count)
            .flat_map(|parent| {
                [2 * parent + 1, 2 * parent + 2]
                    .into_iter()
                    .filter(move |&child| child < count)
                    .map(move |child| LayoutEdge::new(parent, child))
            })
            .collect();

        let height = if count == 0 { 0 } else { count.ilog2() + 1 };
        let heap_type = HeapType::of(&values);
        debug!(nodes = count, height = height, heap_type:% = heap_type; "Calculated heap layout");

        let content_height = height as f32 * self.config.level_height + 40.0;
        Ok(HeapLayout {
            canvas: Size::new(viewport.width(), content_height + margin.vertical_sum()),
            nodes,
            edges,
            stats: HeapStats {
                heap_type,
                nodes: count,
                height,
            },
        })
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, value: &Value, viewport: Viewport) -> Result<Layout, LayoutError> {
        self.calculate_layout(value, viewport).map(Layout::Heap)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn numbers(values: &[f64]) -> Value {
        Value::Sequence(values.iter().copied().map(Value::from).collect())
    }

    fn layout(values: &[f64]) -> HeapLayout {
        Engine::new(HeapConfig::default())
            .calculate_layout(&numbers(values), Viewport::new(440.0, 600.0))
            .unwrap()
    }

    #[test]
    fn test_max_heap() {
        let layout = layout(&[10.0, 8.0, 9.0, 4.0, 7.0, 5.0, 3.0, 2.0, 1.0]);

        assert_eq!(layout.stats().heap_type(), HeapType::Max);
        assert_eq!(layout.stats().heap_type().to_string(), "Max Heap");
        assert_eq!(layout.stats().nodes(), 9);
        assert_eq!(layout.stats().height(), 4);
        assert_eq!(layout.edges().len(), 8);
        assert_eq!(layout.edges()[7], LayoutEdge::new(3, 8));
        assert_approx_eq!(f32, layout.canvas().height(), 4.0 * 80.0 + 40.0 + 120.0);
    }

    #[test]
    fn test_min_and_invalid_heaps() {
        assert_eq!(layout(&[1.0, 2.0, 3.0]).stats().heap_type(), HeapType::Min);
        assert_eq!(layout(&[2.0, 1.0, 3.0]).stats().heap_type(), HeapType::Invalid);
        assert_eq!(layout(&[4.0, 4.0]).stats().heap_type(), HeapType::Max);
    }

    #[test]
    fn test_node_positions() {
        let layout = layout(&[9.0, 5.0, 7.0, 1.0]);
        let nodes = layout.nodes();

        // Content width 400, level width 350.
        assert_approx_eq!(f32, nodes[0].node().position().x(), 20.0 + 175.0 + 25.0);
        assert_approx_eq!(f32, nodes[0].node().position().y(), 80.0 + 25.0);

        assert_eq!((nodes[2].level(), nodes[2].slot()), (1, 1));
        assert_approx_eq!(f32, nodes[2].node().position().x(), 20.0 + 350.0 / 3.0 * 2.0 + 25.0);
        assert_approx_eq!(f32, nodes[2].node().position().y(), 80.0 + 80.0 + 25.0);

        assert_eq!((nodes[3].level(), nodes[3].slot()), (2, 0));
        assert_approx_eq!(f32, nodes[3].node().position().x(), 20.0 + 70.0 + 25.0);
    }

    #[test]
    fn test_empty_heap() {
        let layout = layout(&[]);

        assert_eq!(layout.stats().height(), 0);
        assert!(layout.nodes().is_empty());
        assert!(layout.edges().is_empty());
    }

    #[test]
    fn test_rejects_non_numbers() {
        let value = Value::Sequence(vec![Value::from(1), Value::from("2")]);

        assert_eq!(
            Engine::new(HeapConfig::default()).calculate_layout(&value, Viewport::new(400.0, 400.0)),
            Err(LayoutError::NonNumericHeap { index: 1 })
        );
    }
}

//! Singly linked list layout: boxes in a row joined by arrows.

use log::{debug, warn};
use serde::Serialize;

use structviz_core::{
    geometry::{Insets, Point, Size},
    kind::StructureKind,
    value::Value,
};

use super::{Layout, LayoutEdge, LayoutEngine, LayoutNode, Viewport};
use crate::{config::LinkedListConfig, error::LayoutError};

/// One list node. The node position is the top-left corner of its box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListNode {
    #[serde(flatten)]
    node: LayoutNode,
    next: Option<usize>,
    width: f32,
    height: f32,
}

impl ListNode {
    pub fn node(&self) -> &LayoutNode {
        &self.node
    }

    /// Index of the following node, `None` for the tail.
    ///
    /// The last node of a truncated chain still points past the end.
    pub fn next(&self) -> Option<usize> {
        self.next
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

/// Start and end of the arrow leaving a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arrow {
    node: usize,
    from: Point,
    to: Point,
}

impl Arrow {
    /// Index of the node the arrow leaves.
    pub fn node(&self) -> usize {
        self.node
    }

    pub fn from(&self) -> Point {
        self.from
    }

    pub fn to(&self) -> Point {
        self.to
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedListStats {
    nodes: usize,
    truncated: bool,
}

impl LinkedListStats {
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Returns `true` when a pointer chain was cut at the hop limit.
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedListLayout {
    canvas: Size,
    nodes: Vec<ListNode>,
    edges: Vec<LayoutEdge>,
    arrows: Vec<Arrow>,
    terminal: Option<Point>,
    stats: LinkedListStats,
}

impl LinkedListLayout {
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn nodes(&self) -> &[ListNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    /// One arrow for every node that has a `next`, drawn to the right of
    /// its box. The tail gets the [`terminal`](Self::terminal) marker instead.
    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    /// Where the `NULL` marker after the tail is drawn.
    pub fn terminal(&self) -> Option<Point> {
        self.terminal
    }

    pub fn stats(&self) -> &LinkedListStats {
        &self.stats
    }
}

/// A node read from the input before positioning.
struct Item {
    value: Value,
    next: Option<usize>,
}

/// Reads `value` as a sequence of list items.
///
/// An array becomes one item per element. A node mapping is followed
/// through its `next` pointers for at most `max_hops` nodes. The second
/// element of the result is `true` when the chain was cut short.
fn items(value: &Value, max_hops: usize) -> Result<(Vec<Item>, bool), LayoutError> {
    match value {
        Value::Sequence(elements) => {
            let count = elements.len();
            let items = elements
                .iter()
                .enumerate()
                .map(|(index, element)| Item {
                    value: element.clone(),
                    next: (index + 1 < count).then_some(index + 1),
                })
                .collect();
            Ok((items, false))
        }
        Value::Mapping(_) => {
            let mut items: Vec<Item> = Vec::new();
            let mut current = Some(value);
            while let Some(node) = current {
                if items.len() == max_hops {
                    break;
                }
                let index = items.len();
                let next = node.get("next").filter(|next| next.as_mapping().is_some());
                items.push(Item {
                    value: node.get("value").cloned().unwrap_or(Value::Null),
                    next: next.map(|_| index + 1),
                });
                current = next;
            }

            let truncated = current.is_some();
            if truncated {
                warn!(max_hops = max_hops; "Linked list chain truncated");
            }
            Ok((items, truncated))
        }
        other => Err(LayoutError::UnexpectedShape {
            kind: StructureKind::LinkedList,
            expected: "an array or a node mapping",
            found: other.kind_name(),
        }),
    }
}

/// Linked list layout engine.
pub struct Engine {
    config: LinkedListConfig,
}

impl Engine {
    pub fn new(config: LinkedListConfig) -> Self {
        Self { config }
    }

    /// Calculate the linked list layout for `value`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnexpectedShape`] for values that are neither
    /// arrays nor mappings.
    pub fn calculate_layout(
        &self,
        value: &Value,
        viewport: Viewport,
    ) -> Result<LinkedListLayout, LayoutError> {
        let (items, truncated) = items(value, self.config.max_hops)?;
        let margin: Insets = self.config.margin.into();
        let (node_width, node_height) = (self.config.node_width, self.config.node_height);
        let spacing = self.config.spacing;
        let gap = spacing - node_width;

        let position = |index: usize| Point::new(margin.left() + index as f32 * spacing, margin.top());
        let mid_y = margin.top() + node_height / 2.0;

        let arrows = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.next.is_some())
            .map(|(index, _)| {
                let x = position(index).x() + node_width;
                Arrow {
                    node: index,
                    from: Point::new(x, mid_y),
                    to: Point::new(x + gap * 0.75, mid_y),
                }
            })
            .collect();
        let terminal = items
            .len()
            .checked_sub(1)
            .map(|last| Point::new(position(last).x() + node_width + gap / 2.0, mid_y));
        let edges = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| item.next.map(|next| (index, next)))
            .filter(|&(_, next)| next < items.len())
            .map(|(index, next)| LayoutEdge::new(index, next))
            .collect();

        let count = items.len();
        let nodes = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| ListNode {
                node: LayoutNode::new(index, item.value, position(index)),
                next: item.next,
                width: node_width,
                height: node_height,
            })
            .collect();

        debug!(nodes = count, truncated = truncated; "Calculated linked list layout");

        let content_width = count as f32 * spacing;
        Ok(LinkedListLayout {
            canvas: Size::new(
                (content_width + margin.horizontal_sum()).max(viewport.width()),
                self.config.height + margin.vertical_sum(),
            ),
            nodes,
            edges,
            arrows,
            terminal,
            stats: LinkedListStats {
                nodes: count,
                truncated,
            },
        })
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, value: &Value, viewport: Viewport) -> Result<Layout, LayoutError> {
        self.calculate_layout(value, viewport).map(Layout::LinkedList)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn chain(length: usize) -> Value {
        (0..length).rev().fold(Value::Null, |next, value| {
            [("value", Value::from(value as i32)), ("next", next)]
                .into_iter()
                .collect()
        })
    }

    fn layout(value: &Value) -> LinkedListLayout {
        Engine::new(LinkedListConfig::default())
            .calculate_layout(value, Viewport::new(400.0, 400.0))
            .unwrap()
    }

    #[test]
    fn test_array_form() {
        let value = Value::Sequence((1..=5).map(Value::from).collect());
        let layout = layout(&value);

        assert_eq!(layout.nodes().len(), 5);
        assert_eq!(layout.nodes()[0].next(), Some(1));
        assert_eq!(layout.nodes()[4].next(), None);
        assert_eq!(layout.edges().len(), 4);

        assert_approx_eq!(f32, layout.nodes()[2].node().position().x(), 20.0 + 240.0);
        assert_approx_eq!(f32, layout.nodes()[2].node().position().y(), 60.0);

        let arrow = layout.arrows()[0];
        assert_approx_eq!(f32, arrow.from().x(), 100.0);
        assert_approx_eq!(f32, arrow.to().x(), 130.0);
        assert_approx_eq!(f32, arrow.to().y(), 80.0);

        let terminal = layout.terminal().unwrap();
        assert_approx_eq!(f32, terminal.x(), 20.0 + 480.0 + 100.0);

        // 5 * 120 + 40 exceeds the 400px viewport.
        assert_approx_eq!(f32, layout.canvas().width(), 640.0);
        assert_approx_eq!(f32, layout.canvas().height(), 320.0);
    }

    #[test]
    fn test_pointer_chain() {
        let layout = layout(&chain(3));

        let labels: Vec<&str> = layout.nodes().iter().map(|n| n.node().label()).collect();
        assert_eq!(labels, ["0", "1", "2"]);
        assert_eq!(layout.nodes()[2].next(), None);
        assert!(!layout.stats().truncated());
    }

    #[test]
    fn test_tail_has_no_arrow() {
        let value = Value::Sequence((1..=3).map(Value::from).collect());
        let layout = layout(&value);

        let sources: Vec<usize> = layout.arrows().iter().map(Arrow::node).collect();
        assert_eq!(sources, [0, 1]);
        assert_eq!(layout.arrows().len(), layout.edges().len());

        let terminal = layout.terminal().unwrap();
        assert!(layout.arrows().iter().all(|arrow| arrow.to().x() < terminal.x()));
        assert_eq!(self::layout(&chain(3)).arrows().len(), 2);
    }

    #[test]
    fn test_long_chain_is_capped() {
        let layout = layout(&chain(25));

        assert_eq!(layout.nodes().len(), 20);
        assert!(layout.stats().truncated());
        assert_eq!(layout.nodes()[19].next(), Some(20));
        assert_eq!(layout.edges().len(), 19);
        assert_eq!(layout.arrows().len(), 20);
        assert!(layout.terminal().is_some());
    }

    #[test]
    fn test_chain_of_exactly_the_cap() {
        let layout = layout(&chain(20));

        assert_eq!(layout.nodes().len(), 20);
        assert!(!layout.stats().truncated());
    }

    #[test]
    fn test_non_mapping_next_ends_chain() {
        let value: Value = [("value", Value::from(1)), ("next", Value::from(2))]
            .into_iter()
            .collect();
        let layout = layout(&value);

        assert_eq!(layout.nodes().len(), 1);
        assert_eq!(layout.nodes()[0].next(), None);
    }

    #[test]
    fn test_empty_array() {
        let layout = layout(&Value::Sequence(Vec::new()));

        assert!(layout.nodes().is_empty());
        assert_eq!(layout.terminal(), None);
        assert_approx_eq!(f32, layout.canvas().width(), 400.0);
    }
}

//! Layout results.
//!
//! Every engine produces a [`Layout`]: the canvas size, positioned nodes,
//! the edges between them and a handful of statistics. Positions are in
//! canvas coordinates, with the engine's margins already applied.

pub mod array;
mod engines;
pub mod graph;
pub mod grid;
pub mod hash_table;
pub mod heap;
pub mod linked_list;
pub mod simulation;
pub mod tree;

use std::fmt;

use serde::Serialize;

use structviz_core::{
    geometry::{Point, Size},
    identifier::Id,
    kind::StructureKind,
    value::Value,
};

pub use engines::{EngineBuilder, LayoutEngine};

/// The drawable area a layout is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    /// Creates a viewport, clamping negative dimensions to zero.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Identifies a node within a single layout.
///
/// Positional structures (arrays, heaps, lists) use the element index; graph
/// nodes keep the identifier the input gave them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum NodeId {
    Index(usize),
    Named(Id),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Named(id) => write!(f, "{id}"),
        }
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Id> for NodeId {
    fn from(id: Id) -> Self {
        Self::Named(id)
    }
}

/// A positioned element of a layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    id: NodeId,
    value: Value,
    label: String,
    #[serde(flatten)]
    position: Point,
}

impl LayoutNode {
    /// Creates a node labelled with the display form of `value`.
    pub fn new(id: impl Into<NodeId>, value: Value, position: Point) -> Self {
        let label = value.label();
        Self {
            id: id.into(),
            value,
            label,
            position,
        }
    }

    /// Replaces the label derived from the value.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> Point {
        self.position
    }
}

/// A directed connection between two nodes of the same layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutEdge {
    source: NodeId,
    target: NodeId,
}

impl LayoutEdge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }
}

/// The result of running a layout engine, tagged with the structure kind.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Layout {
    #[serde(rename = "array")]
    Array(array::ArrayLayout),
    #[serde(rename = "grid")]
    Grid(grid::GridLayout),
    #[serde(rename = "heap")]
    Heap(heap::HeapLayout),
    #[serde(rename = "tree")]
    Tree(tree::TreeLayout),
    #[serde(rename = "linkedlist")]
    LinkedList(linked_list::LinkedListLayout),
    #[serde(rename = "hashtable")]
    HashTable(hash_table::HashTableLayout),
    #[serde(rename = "graph")]
    Graph(graph::GraphLayout),
}

impl Layout {
    /// The structure kind this layout draws.
    pub fn kind(&self) -> StructureKind {
        match self {
            Self::Array(_) => StructureKind::Array,
            Self::Grid(_) => StructureKind::Grid,
            Self::Heap(_) => StructureKind::Heap,
            Self::Tree(_) => StructureKind::Tree,
            Self::LinkedList(_) => StructureKind::LinkedList,
            Self::HashTable(_) => StructureKind::HashTable,
            Self::Graph(_) => StructureKind::Graph,
        }
    }

    /// Size of the canvas the layout occupies.
    pub fn canvas(&self) -> Size {
        match self {
            Self::Array(layout) => layout.canvas(),
            Self::Grid(layout) => layout.canvas(),
            Self::Heap(layout) => layout.canvas(),
            Self::Tree(layout) => layout.canvas(),
            Self::LinkedList(layout) => layout.canvas(),
            Self::HashTable(layout) => layout.canvas(),
            Self::Graph(layout) => layout.canvas(),
        }
    }

    /// Every positioned node, in layout order.
    pub fn nodes(&self) -> Vec<LayoutNode> {
        match self {
            Self::Array(layout) => layout.bars().iter().map(|b| b.node().clone()).collect(),
            Self::Grid(layout) => layout.cells().iter().map(|c| c.node().clone()).collect(),
            Self::Heap(layout) => layout.nodes().iter().map(|n| n.node().clone()).collect(),
            Self::Tree(layout) => layout.nodes().iter().map(|n| n.node().clone()).collect(),
            Self::LinkedList(layout) => layout.nodes().iter().map(|n| n.node().clone()).collect(),
            Self::HashTable(layout) => layout.items().iter().map(|i| i.node().clone()).collect(),
            Self::Graph(layout) => layout.nodes().into_iter().map(|n| n.into_node()).collect(),
        }
    }

    /// Every edge; empty for layouts without connections.
    pub fn edges(&self) -> &[LayoutEdge] {
        match self {
            Self::Array(_) | Self::Grid(_) => &[],
            Self::Heap(layout) => layout.edges(),
            Self::Tree(layout) => layout.edges(),
            Self::LinkedList(layout) => layout.edges(),
            Self::HashTable(layout) => layout.edges(),
            Self::Graph(layout) => layout.edges(),
        }
    }

    /// Returns the graph layout if this layout is animated.
    pub fn as_graph(&self) -> Option<&graph::GraphLayout> {
        match self {
            Self::Graph(layout) => Some(layout),
            _ => None,
        }
    }

    pub fn as_graph_mut(&mut self) -> Option<&mut graph::GraphLayout> {
        match self {
            Self::Graph(layout) => Some(layout),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_clamps_negative_dimensions() {
        let viewport = Viewport::new(-5.0, 300.0);

        assert_eq!(viewport.width(), 0.0);
        assert_eq!(viewport.height(), 300.0);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::Index(3).to_string(), "3");
        assert_eq!(NodeId::from(Id::new("hub")).to_string(), "hub");
    }

    #[test]
    fn test_layout_node_label_override() {
        let node = LayoutNode::new(0, Value::from(4), Point::new(1.0, 2.0));
        assert_eq!(node.label(), "4");

        let node = node.with_label("four");
        assert_eq!(node.label(), "four");
        assert_eq!(node.position(), Point::new(1.0, 2.0));
    }
}

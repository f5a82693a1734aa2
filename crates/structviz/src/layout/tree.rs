//! Tidy tree layout.
//!
//! Nodes are placed with the Reingold-Tilford algorithm in Buchheim's
//! linear-time formulation: siblings sit one unit apart, cousins two units,
//! and subtrees are packed as tightly as those separations allow. The
//! resulting breadth is then stretched over the viewport width and depth over
//! a fixed height.

use log::debug;
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};
use serde::Serialize;

use structviz_core::{
    geometry::{Insets, Point, Size},
    kind::StructureKind,
    value::Value,
};

use super::{Layout, LayoutEdge, LayoutEngine, LayoutNode, Viewport};
use crate::{config::TreeConfig, error::LayoutError};

/// One tree node. The node position is the circle center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    #[serde(flatten)]
    node: LayoutNode,
    depth: usize,
    radius: f32,
}

impl TreeNode {
    pub fn node(&self) -> &LayoutNode {
        &self.node
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeStats {
    nodes: usize,
    height: usize,
    leaves: usize,
}

impl TreeStats {
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Number of levels.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn leaves(&self) -> usize {
        self.leaves
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeLayout {
    canvas: Size,
    nodes: Vec<TreeNode>,
    edges: Vec<LayoutEdge>,
    stats: TreeStats,
}

impl TreeLayout {
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    /// Nodes in pre-order; a node's id is its pre-order index.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Parent to child edges.
    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }
}

/// A node of the hierarchy read from the input.
#[derive(Debug)]
struct Entry {
    value: Value,
    depth: usize,
}

/// Children of a tree node: the `left`/`right` subtrees when either is
/// present, otherwise the mappings in a `children` array.
fn child_values(node: &Value) -> Vec<&Value> {
    let binary: Vec<&Value> = ["left", "right"]
        .into_iter()
        .filter_map(|key| node.get(key))
        .filter(|child| child.as_mapping().is_some())
        .collect();
    if !binary.is_empty() {
        return binary;
    }

    node.get("children")
        .and_then(Value::as_sequence)
        .map(|children| {
            children
                .iter()
                .filter(|child| child.as_mapping().is_some())
                .collect()
        })
        .unwrap_or_default()
}

/// Reads the hierarchy rooted at `root`. Node indices follow pre-order, so
/// siblings always have increasing indices from left to right.
fn hierarchy(root: &Value) -> DiGraph<Entry, ()> {
    let mut graph = DiGraph::new();
    let mut stack = vec![(root, None, 0)];

    while let Some((value, parent, depth)) = stack.pop() {
        let index = graph.add_node(Entry {
            value: value.get("value").cloned().unwrap_or(Value::Null),
            depth,
        });
        if let Some(parent) = parent {
            graph.add_edge(parent, index, ());
        }
        stack.extend(
            child_values(value)
                .into_iter()
                .rev()
                .map(|child| (child, Some(index), depth + 1)),
        );
    }

    graph
}

/// Returns the children of `node` ordered left to right.
fn ordered_children(graph: &DiGraph<Entry, ()>, node: NodeIndex) -> Vec<usize> {
    let mut children: Vec<usize> = graph
        .neighbors_directed(node, Direction::Outgoing)
        .map(NodeIndex::index)
        .collect();
    children.sort_unstable();
    children
}

/// Per-node state of the tidy tree walk.
#[derive(Debug, Clone, Default)]
struct Walk {
    parent: usize,
    children: Vec<usize>,
    /// Position among siblings.
    number: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    ancestor: usize,
    default_ancestor: Option<usize>,
    x: f64,
}

/// Tidy tree over a synthetic root at index 0 whose only child is the real
/// root at index 1.
struct TidyTree {
    nodes: Vec<Walk>,
}

impl TidyTree {
    fn new(graph: &DiGraph<Entry, ()>) -> Self {
        let mut nodes = vec![Walk::default(); graph.node_count() + 1];
        nodes[0].children = vec![1];

        for index in graph.node_indices() {
            let arena = index.index() + 1;
            let children: Vec<usize> = ordered_children(graph, index)
                .into_iter()
                .map(|child| child + 1)
                .collect();
            for (number, &child) in children.iter().enumerate() {
                nodes[child].parent = arena;
                nodes[child].number = number;
            }
            nodes[arena].children = children;
        }
        for (index, node) in nodes.iter_mut().enumerate() {
            node.ancestor = index;
        }

        Self { nodes }
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.nodes[a].parent == self.nodes[b].parent {
            1.0
        } else {
            2.0
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.first().copied().or(self.nodes[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.last().copied().or(self.nodes[v].thread)
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.nodes[vim].ancestor;
        if self.nodes[candidate].parent == self.nodes[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let change = shift / (self.nodes[wp].number as f64 - self.nodes[wm].number as f64);
        self.nodes[wp].change -= change;
        self.nodes[wp].shift += shift;
        self.nodes[wm].change += change;
        self.nodes[wp].prelim += shift;
        self.nodes[wp].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for index in (0..self.nodes[v].children.len()).rev() {
            let w = self.nodes[v].children[index];
            let node = &mut self.nodes[w];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }

    fn first_walk(&mut self, v: usize) {
        let parent = self.nodes[v].parent;
        let number = self.nodes[v].number;
        let left_sibling = number
            .checked_sub(1)
            .map(|index| self.nodes[parent].children[index]);

        let children = &self.nodes[v].children;
        let outer_children = children.first().copied().zip(children.last().copied());
        if let Some((first, last)) = outer_children {
            self.execute_shifts(v);
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            match left_sibling {
                Some(w) => {
                    self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
                    self.nodes[v].modifier = self.nodes[v].prelim - midpoint;
                }
                None => self.nodes[v].prelim = midpoint,
            }
        } else if let Some(w) = left_sibling {
            self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
        }

        let default_ancestor = self.nodes[parent]
            .default_ancestor
            .unwrap_or(self.nodes[parent].children[0]);
        let default_ancestor = self.apportion(v, left_sibling, default_ancestor);
        self.nodes[parent].default_ancestor = Some(default_ancestor);
    }

    fn apportion(&mut self, v: usize, left_sibling: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };

        let parent = self.nodes[v].parent;
        let (mut vip, mut vop) = (v, v);
        let mut vim = w;
        let mut vom = self.nodes[parent].children[0];
        let mut sip = self.nodes[vip].modifier;
        let mut sop = self.nodes[vop].modifier;
        let mut sim = self.nodes[vim].modifier;
        let mut som = self.nodes[vom].modifier;

        let mut next_im = self.next_right(vim);
        let mut next_ip = self.next_left(vip);
        while let (Some(im), Some(ip)) = (next_im, next_ip) {
            let (Some(om), Some(op)) = (self.next_left(vom), self.next_right(vop)) else {
                break;
            };
            vim = im;
            vip = ip;
            vom = om;
            vop = op;

            self.nodes[vop].ancestor = v;
            let shift = self.nodes[vim].prelim + sim - self.nodes[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let wm = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.nodes[vim].modifier;
            sip += self.nodes[vip].modifier;
            som += self.nodes[vom].modifier;
            sop += self.nodes[vop].modifier;

            next_im = self.next_right(vim);
            next_ip = self.next_left(vip);
        }

        if let Some(im) = next_im {
            if self.next_right(vop).is_none() {
                self.nodes[vop].thread = Some(im);
                self.nodes[vop].modifier += sim - sop;
            }
        }
        if let Some(ip) = next_ip {
            if self.next_left(vom).is_none() {
                self.nodes[vom].thread = Some(ip);
                self.nodes[vom].modifier += sip - som;
                ancestor = v;
            }
        }

        ancestor
    }

    fn second_walk(&mut self, v: usize) {
        let parent = self.nodes[v].parent;
        let parent_modifier = self.nodes[parent].modifier;
        let node = &mut self.nodes[v];
        node.x = node.prelim + parent_modifier;
        node.modifier += parent_modifier;
    }

    /// Positions every node and returns the unscaled x of each real node,
    /// indexed like the hierarchy.
    fn run(mut self) -> Vec<f64> {
        if self.nodes.len() < 2 {
            return Vec::new();
        }

        // Post-order, children left to right.
        let mut stack = vec![1];
        let mut visit = Vec::with_capacity(self.nodes.len() - 1);
        while let Some(v) = stack.pop() {
            visit.push(v);
            stack.extend_from_slice(&self.nodes[v].children);
        }
        for &v in visit.iter().rev() {
            self.first_walk(v);
        }

        self.nodes[0].modifier = -self.nodes[1].prelim;

        // Pre-order.
        let mut stack = vec![1];
        while let Some(v) = stack.pop() {
            self.second_walk(v);
            stack.extend(self.nodes[v].children.iter().rev());
        }

        self.nodes.iter().skip(1).map(|node| node.x).collect()
    }
}

/// Tidy tree layout engine.
pub struct Engine {
    config: TreeConfig,
}

impl Engine {
    pub fn new(config: TreeConfig) -> Self {
        Self { config }
    }

    /// Calculate the tree layout for `value`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnexpectedShape`] when `value` is not a mapping.
    pub fn calculate_layout(
        &self,
        value: &Value,
        viewport: Viewport,
    ) -> Result<TreeLayout, LayoutError> {
        if value.as_mapping().is_none() {
            return Err(LayoutError::UnexpectedShape {
                kind: StructureKind::Tree,
                expected: "a node mapping",
                found: value.kind_name(),
            });
        }

        let graph = hierarchy(value);
        let tidy = TidyTree::new(&graph);
        let parents: Vec<usize> = tidy.nodes.iter().skip(1).map(|node| node.parent).collect();
        let xs = tidy.run();

        let margin: Insets = self.config.margin.into();
        let width = (viewport.width() - margin.horizontal_sum()).max(0.0);
        let height = self.config.height - self.config.bottom_reserve;

        let leftmost = extreme(&xs, |candidate, best| candidate < best);
        let rightmost = extreme(&xs, |candidate, best| candidate > best);
        let max_depth = graph.node_weights().map(|e| e.depth).max().unwrap_or(0);

        let (tx, kx) = match (leftmost, rightmost) {
            (Some(left), Some(right)) => {
                let s = if left == right {
                    1.0
                } else if parents[left] == parents[right] {
                    0.5
                } else {
                    1.0
                };
                let tx = s - xs[left];
                (tx, f64::from(width) / (xs[right] + s + tx))
            }
            _ => (0.0, 0.0),
        };
        let ky = f64::from(height) / max_depth.max(1) as f64;

        let nodes: Vec<TreeNode> = graph
            .node_indices()
            .map(|index| {
                let entry = &graph[index];
                let x = ((xs[index.index()] + tx) * kx) as f32;
                let y = (entry.depth as f64 * ky) as f32;
                TreeNode {
                    node: LayoutNode::new(
                        index.index(),
                        entry.value.clone(),
                        Point::new(margin.left() + x, margin.top() + y),
                    ),
                    depth: entry.depth,
                    radius: self.config.node_radius,
                }
            })
            .collect();

        // Edges were added as children were reached, so they follow pre-order.
        let edges: Vec<LayoutEdge> = graph
            .edge_indices()
            .filter_map(|edge| graph.edge_endpoints(edge))
            .map(|(parent, child)| LayoutEdge::new(parent.index(), child.index()))
            .collect();

        let leaves = graph
            .node_indices()
            .filter(|&index| graph.neighbors_directed(index, Direction::Outgoing).next().is_none())
            .count();
        debug!(nodes = nodes.len(), depth = max_depth, leaves = leaves; "Calculated tree layout");

        Ok(TreeLayout {
            canvas: Size::new(viewport.width(), self.config.height + margin.vertical_sum()),
            stats: TreeStats {
                nodes: nodes.len(),
                height: max_depth + 1,
                leaves,
            },
            nodes,
            edges,
        })
    }
}

/// Index of the first value preferred by `better` over all earlier ones.
fn extreme(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<usize>, (index, &value)| match best {
            Some(b) if !better(value, values[b]) => Some(b),
            _ => Some(index),
        })
}

impl LayoutEngine for Engine {
    fn calculate(&self, value: &Value, viewport: Viewport) -> Result<Layout, LayoutError> {
        self.calculate_layout(value, viewport).map(Layout::Tree)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn leaf(value: i32) -> Value {
        [("value", Value::from(value))].into_iter().collect()
    }

    fn binary(value: i32, left: Value, right: Value) -> Value {
        [("value", Value::from(value)), ("left", left), ("right", right)]
            .into_iter()
            .collect()
    }

    fn layout(value: &Value) -> TreeLayout {
        Engine::new(TreeConfig::default())
            .calculate_layout(value, Viewport::new(780.0, 600.0))
            .unwrap()
    }

    fn x_of(layout: &TreeLayout, value: f64) -> f32 {
        layout
            .nodes()
            .iter()
            .find(|node| node.node().value().as_f64() == Some(value))
            .map(|node| node.node().position().x())
            .unwrap()
    }

    #[test]
    fn test_complete_binary_tree() {
        let tree = binary(
            1,
            binary(2, leaf(4), leaf(5)),
            binary(3, leaf(6), leaf(7)),
        );
        let layout = layout(&tree);

        // 600px of breadth: leaves at 1/6, 2/6, 4/6 and 5/6.
        assert_approx_eq!(f32, x_of(&layout, 4.0), 90.0 + 100.0, epsilon = 0.01);
        assert_approx_eq!(f32, x_of(&layout, 5.0), 90.0 + 200.0, epsilon = 0.01);
        assert_approx_eq!(f32, x_of(&layout, 6.0), 90.0 + 400.0, epsilon = 0.01);
        assert_approx_eq!(f32, x_of(&layout, 7.0), 90.0 + 500.0, epsilon = 0.01);
        assert_approx_eq!(f32, x_of(&layout, 2.0), 90.0 + 150.0, epsilon = 0.01);
        assert_approx_eq!(f32, x_of(&layout, 3.0), 90.0 + 450.0, epsilon = 0.01);
        assert_approx_eq!(f32, x_of(&layout, 1.0), 90.0 + 300.0, epsilon = 0.01);

        let root = &layout.nodes()[0];
        assert_eq!(root.depth(), 0);
        assert_approx_eq!(f32, root.node().position().y(), 60.0);
        let leaf = &layout.nodes()[2];
        assert_eq!(leaf.depth(), 2);
        assert_approx_eq!(f32, leaf.node().position().y(), 60.0 + 400.0);

        assert_eq!(layout.stats().nodes(), 7);
        assert_eq!(layout.stats().height(), 3);
        assert_eq!(layout.stats().leaves(), 4);
        assert_eq!(layout.edges().len(), 6);
        assert_approx_eq!(f32, layout.canvas().height(), 590.0);
    }

    #[test]
    fn test_single_node_is_centered() {
        let layout = layout(&leaf(1));

        assert_eq!(layout.nodes().len(), 1);
        assert_approx_eq!(f32, layout.nodes()[0].node().position().x(), 90.0 + 300.0);
        assert_approx_eq!(f32, layout.nodes()[0].node().position().y(), 60.0);
    }

    #[test]
    fn test_nodes_are_in_preorder() {
        let tree = binary(1, binary(2, leaf(3), Value::Null), leaf(4));
        let layout = layout(&tree);

        let values: Vec<String> = layout
            .nodes()
            .iter()
            .map(|node| node.node().label().to_string())
            .collect();
        assert_eq!(values, ["1", "2", "3", "4"]);
        assert_eq!(layout.edges()[0], LayoutEdge::new(0, 1));
        assert_eq!(layout.edges()[2], LayoutEdge::new(0, 3));
    }

    #[test]
    fn test_lone_child_sits_under_parent() {
        let tree = binary(1, leaf(2), Value::Null);
        let layout = layout(&tree);

        assert_approx_eq!(f32, x_of(&layout, 1.0), x_of(&layout, 2.0));
    }

    #[test]
    fn test_siblings_never_overlap() {
        // A deep left subtree forces the right subtree to move over.
        let left = binary(2, binary(4, leaf(8), leaf(9)), binary(5, leaf(10), leaf(11)));
        let tree = binary(1, left, binary(3, leaf(6), leaf(7)));
        let layout = layout(&tree);

        let mut xs: Vec<f32> = layout
            .nodes()
            .iter()
            .filter(|node| node.depth() == 2)
            .map(|node| node.node().position().x())
            .collect();
        let sorted = {
            let mut sorted = xs.clone();
            sorted.sort_by(f32::total_cmp);
            sorted
        };
        assert_eq!(xs, sorted);
        xs.dedup();
        assert_eq!(xs.len(), 4);
    }

    #[test]
    fn test_children_array() {
        let tree: Value = [
            ("value", Value::from("root")),
            (
                "children",
                Value::Sequence(vec![leaf(1), leaf(2), leaf(3)]),
            ),
        ]
        .into_iter()
        .collect();
        let layout = layout(&tree);

        assert_eq!(layout.stats().leaves(), 3);
        assert_approx_eq!(f32, x_of(&layout, 2.0), 90.0 + 300.0, epsilon = 0.01);
    }

    #[test]
    fn test_rejects_non_mapping() {
        let err = Engine::new(TreeConfig::default())
            .calculate_layout(&Value::from(1), Viewport::new(400.0, 400.0))
            .unwrap_err();

        assert!(matches!(err, LayoutError::UnexpectedShape { .. }));
    }
}

//! Force-directed graph layout.
//!
//! The engine reads nodes and links, checks that every link resolves to a
//! node and hands the result to a [`Simulation`]. The returned
//! [`GraphLayout`] owns that simulation: callers advance it with
//! [`GraphLayout::step`] (one tick per frame) or [`GraphLayout::settle`], and
//! steer it with the drag methods.

use std::collections::HashMap;

use log::{debug, trace};
use petgraph::{
    algo::connected_components,
    graph::{DiGraph, NodeIndex},
};
use serde::{Serialize, Serializer, ser::SerializeStruct};

use structviz_core::{
    geometry::{Insets, Point, Size},
    identifier::Id,
    kind::StructureKind,
    value::Value,
};

use super::{
    Layout, LayoutEdge, LayoutEngine, LayoutNode, NodeId, Viewport,
    simulation::Simulation,
};
use crate::{config::GraphConfig, error::LayoutError};

/// Replaces link endpoints given as node mappings with the node's `id`.
///
/// Endpoints that are already plain identifiers, and mappings whose `id`
/// is not a string or number, are left untouched, so normalizing twice
/// gives the same result as normalizing once.
///
/// # Examples
///
/// ```
/// use structviz::layout::graph::normalize_link;
/// use structviz_core::value::Value;
///
/// let node: Value = [("id", Value::from("a"))].into_iter().collect();
/// let link: Value = [("source", node), ("target", Value::from("b"))]
///     .into_iter()
///     .collect();
///
/// let normalized = normalize_link(&link);
/// assert_eq!(normalized.get("source"), Some(&Value::from("a")));
/// assert_eq!(normalize_link(&normalized), normalized);
/// ```
pub fn normalize_link(link: &Value) -> Value {
    let Value::Mapping(map) = link else {
        return link.clone();
    };

    let mut map = map.clone();
    for endpoint in ["source", "target"] {
        if let Some(entry) = map.get_mut(endpoint) {
            let id = entry
                .get("id")
                .filter(|id| matches!(id, Value::String(_) | Value::Number(_)))
                .cloned();
            if let Some(id) = id {
                *entry = id;
            }
        }
    }
    Value::Mapping(map)
}

/// A graph node as it is drawn. The node position is the circle center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    #[serde(flatten)]
    node: LayoutNode,
    vx: f32,
    vy: f32,
    fx: Option<f32>,
    fy: Option<f32>,
    radius: f32,
}

impl GraphNode {
    pub fn node(&self) -> &LayoutNode {
        &self.node
    }

    pub fn into_node(self) -> LayoutNode {
        self.node
    }

    pub fn velocity(&self) -> Point {
        Point::new(self.vx, self.vy)
    }

    /// Returns `true` while the node is held in place by a drag.
    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GraphStats {
    nodes: usize,
    links: usize,
    components: usize,
    alpha: f32,
    ticks: usize,
    running: bool,
}

impl GraphStats {
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    pub fn links(&self) -> usize {
        self.links
    }

    /// Number of weakly connected components.
    pub fn components(&self) -> usize {
        self.components
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn running(&self) -> bool {
        self.running
    }
}

/// A graph node before it is positioned.
#[derive(Debug, Clone)]
struct Vertex {
    id: Id,
    value: Value,
    label: String,
}

/// Animated graph layout.
///
/// Positions live in the simulation in content coordinates; they are shifted
/// by the margin whenever nodes are read or dragged.
#[derive(Debug)]
pub struct GraphLayout {
    vertices: Vec<Vertex>,
    index: HashMap<Id, usize>,
    edges: Vec<LayoutEdge>,
    components: usize,
    simulation: Simulation,
    margin: Insets,
    canvas: Size,
    node_radius: f32,
    drag_alpha_target: f32,
}

impl GraphLayout {
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    /// Current snapshot of every node, in input order.
    pub fn nodes(&self) -> Vec<GraphNode> {
        let origin = self.margin.origin();
        self.vertices
            .iter()
            .zip(self.simulation.particles())
            .map(|(vertex, particle)| GraphNode {
                node: LayoutNode::new(
                    vertex.id,
                    vertex.value.clone(),
                    particle.position().add_point(origin),
                )
                .with_label(vertex.label.clone()),
                vx: particle.vx,
                vy: particle.vy,
                fx: particle.fx.map(|fx| fx + origin.x()),
                fy: particle.fy.map(|fy| fy + origin.y()),
                radius: self.node_radius,
            })
            .collect()
    }

    /// Links in input order.
    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.vertices.len(),
            links: self.edges.len(),
            components: self.components,
            alpha: self.simulation.alpha(),
            ticks: self.simulation.ticks(),
            running: self.simulation.is_running(),
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn is_running(&self) -> bool {
        self.simulation.is_running()
    }

    /// Advances the simulation by one tick. Returns `true` while it keeps
    /// running.
    pub fn step(&mut self) -> bool {
        self.simulation.step()
    }

    /// Runs the simulation until it stops or `max_ticks` ticks were taken.
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        let taken = self.simulation.settle(max_ticks);
        debug!(ticks = taken, alpha = self.simulation.alpha(); "Graph simulation settled");
        taken
    }

    pub fn stop(&mut self) {
        self.simulation.stop();
    }

    /// Updates the canvas and centering targets for a new viewport, keeping
    /// node positions.
    pub fn resize(&mut self, viewport: Viewport, config: &GraphConfig) {
        let frame = Frame::new(viewport, config);
        self.canvas = frame.canvas;
        self.simulation.set_center(frame.center);
    }

    fn position_of(&self, id: &NodeId) -> Option<usize> {
        match id {
            NodeId::Named(name) => self.index.get(name).copied(),
            NodeId::Index(index) => (*index < self.vertices.len()).then_some(*index),
        }
    }

    /// Starts dragging node `id`: reheats the simulation and pins the node
    /// where it is. Returns `false` for an unknown node.
    pub fn drag_start(&mut self, id: &NodeId) -> bool {
        let Some(index) = self.position_of(id) else {
            return false;
        };
        let position = self.simulation.particles()[index].position();
        self.simulation.set_alpha_target(self.drag_alpha_target);
        self.simulation.restart();
        trace!(node:% = id; "Drag started");
        self.simulation.pin(index, position)
    }

    /// Moves the dragged node to `point`, given in canvas coordinates.
    pub fn drag_move(&mut self, id: &NodeId, point: Point) -> bool {
        let Some(index) = self.position_of(id) else {
            return false;
        };
        self.simulation
            .pin(index, point.sub_point(self.margin.origin()))
    }

    /// Releases the dragged node and lets the simulation cool down.
    pub fn drag_end(&mut self, id: &NodeId) -> bool {
        let Some(index) = self.position_of(id) else {
            return false;
        };
        self.simulation.set_alpha_target(0.0);
        trace!(node:% = id; "Drag ended");
        self.simulation.unpin(index)
    }
}

impl Serialize for GraphLayout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GraphLayout", 4)?;
        state.serialize_field("canvas", &self.canvas)?;
        state.serialize_field("nodes", &self.nodes())?;
        state.serialize_field("edges", &self.edges)?;
        state.serialize_field("stats", &self.stats())?;
        state.end()
    }
}

/// Drawable area of a graph for a viewport.
struct Frame {
    canvas: Size,
    center: Point,
}

impl Frame {
    fn new(viewport: Viewport, config: &GraphConfig) -> Self {
        let margin: Insets = config.margin.into();
        let width = (viewport.width() - margin.horizontal_sum()).max(config.min_width);
        let height = (viewport.height() - margin.vertical_sum()).max(config.min_height);
        Self {
            canvas: Size::new(width, height).add_padding(margin),
            center: Point::new(width / 2.0, height / 2.0),
        }
    }
}

/// The node's `name` as a label. A missing, null, `false`, zero or empty
/// name leaves the node labelled by its id.
fn display_name(node: &Value) -> Option<String> {
    match node.get("name")? {
        Value::Null | Value::Boolean(false) => None,
        Value::String(name) if name.is_empty() => None,
        Value::Number(n) if *n == 0.0 => None,
        name => Some(name.label()),
    }
}

/// Reads the endpoint `name` of `link` number `index`.
fn endpoint(link: &Value, index: usize, name: &'static str) -> Result<Id, LayoutError> {
    link.get(name)
        .and_then(Id::from_value)
        .ok_or(LayoutError::MissingEndpoint {
            index,
            endpoint: name,
        })
}

fn sequence<'a>(value: &'a Value, key: &str) -> Result<&'a [Value], LayoutError> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Sequence(items)) => Ok(items),
        Some(other) => Err(LayoutError::UnexpectedShape {
            kind: StructureKind::Graph,
            expected: "`nodes` and `links` arrays",
            found: other.kind_name(),
        }),
    }
}

/// Force-directed graph layout engine.
pub struct Engine {
    config: GraphConfig,
}

impl Engine {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Build the graph layout for `value` with a freshly started simulation.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] when `value` is not a mapping, a node has no
    /// usable `id`, two nodes share an id, or a link endpoint is missing or
    /// names an unknown node.
    pub fn calculate_layout(
        &self,
        value: &Value,
        viewport: Viewport,
    ) -> Result<GraphLayout, LayoutError> {
        if value.as_mapping().is_none() {
            return Err(LayoutError::UnexpectedShape {
                kind: StructureKind::Graph,
                expected: "a mapping with `nodes` and `links`",
                found: value.kind_name(),
            });
        }

        let mut graph: DiGraph<Id, ()> = DiGraph::new();
        let mut index = HashMap::new();
        let mut vertices = Vec::new();
        for (position, node) in sequence(value, "nodes")?.iter().enumerate() {
            let id = node
                .get("id")
                .and_then(Id::from_value)
                .ok_or(LayoutError::MissingNodeId { index: position })?;
            if index.insert(id, graph.add_node(id).index()).is_some() {
                return Err(LayoutError::DuplicateNodeId(id));
            }
            let label = display_name(node).unwrap_or_else(|| id.to_string());
            vertices.push(Vertex {
                id,
                value: node.clone(),
                label,
            });
        }

        let mut links = Vec::new();
        let mut edges = Vec::new();
        for (position, link) in sequence(value, "links")?.iter().enumerate() {
            let link = normalize_link(link);
            let resolve = |name| -> Result<(Id, usize), LayoutError> {
                let id = endpoint(&link, position, name)?;
                let node = index.get(&id).copied().ok_or(LayoutError::UnknownNode {
                    index: position,
                    id,
                })?;
                Ok((id, node))
            };
            let (source_id, source) = resolve("source")?;
            let (target_id, target) = resolve("target")?;

            graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
            links.push((source, target));
            edges.push(LayoutEdge::new(source_id, target_id));
        }

        let components = connected_components(&graph);
        let frame = Frame::new(viewport, &self.config);
        let simulation = Simulation::new(vertices.len(), &links, frame.center, &self.config);
        debug!(
            nodes = vertices.len(),
            links = links.len(),
            components = components;
            "Started graph simulation"
        );

        Ok(GraphLayout {
            vertices,
            index,
            edges,
            components,
            simulation,
            margin: self.config.margin.into(),
            canvas: frame.canvas,
            node_radius: self.config.node_radius,
            drag_alpha_target: self.config.drag_alpha_target,
        })
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, value: &Value, viewport: Viewport) -> Result<Layout, LayoutError> {
        self.calculate_layout(value, viewport).map(Layout::Graph)
    }
}

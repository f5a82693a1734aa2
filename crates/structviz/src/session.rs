//! Interactive visualization session.
//!
//! A [`Session`] holds the run currently on display. Each successful
//! [`Session::run`] replaces it; a failed run leaves it untouched. The
//! session also forwards frame ticks, viewport changes and node drags to a
//! running graph simulation.

use log::{debug, info};

use structviz_core::{geometry::Point, kind::StructureKind};

use crate::{
    StructvizError, Visualization, Visualizer,
    config::AppConfig,
    layout::{Layout, NodeId, Viewport, graph::GraphLayout},
    share::ShareState,
};

/// The run on display together with the input that produced it.
#[derive(Debug)]
struct Run {
    source: String,
    forced: Option<StructureKind>,
    visualization: Visualization,
}

/// Owns the current run and the visualizer that lays runs out.
#[derive(Debug)]
pub struct Session {
    visualizer: Visualizer,
    viewport: Viewport,
    current: Option<Run>,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        let viewport = config.layout().viewport();
        Self {
            visualizer: Visualizer::new(config),
            viewport,
            current: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The run on display, if any.
    pub fn current(&self) -> Option<&Visualization> {
        self.current.as_ref().map(|run| &run.visualization)
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.current().map(Visualization::layout)
    }

    fn graph_mut(&mut self) -> Option<&mut GraphLayout> {
        self.current
            .as_mut()
            .and_then(|run| run.visualization.layout_mut().as_graph_mut())
    }

    /// Parse, classify, validate and lay out `source`, replacing the current
    /// run on success.
    ///
    /// # Errors
    ///
    /// Returns the error of the failing stage; the previous run stays on
    /// display.
    pub fn run(
        &mut self,
        source: &str,
        forced: Option<StructureKind>,
    ) -> Result<&Visualization, StructvizError> {
        let value = self.visualizer.parse(source)?;
        let kind = self.visualizer.resolve_kind(&value, forced);
        self.visualizer.validate(&value, kind)?;
        let layout = self.visualizer.layout(&value, kind, self.viewport)?;

        if let Some(graph) = self.graph_mut() {
            graph.stop();
            debug!("Stopped previous graph simulation");
        }
        info!(kind:% = kind; "Committed new run");

        let run = self.current.insert(Run {
            source: source.to_string(),
            forced,
            visualization: Visualization {
                kind,
                value,
                layout,
            },
        });
        Ok(&run.visualization)
    }

    /// Decode a share token and run its text with its forced type.
    ///
    /// # Errors
    ///
    /// Returns [`StructvizError::ShareToken`] for malformed tokens, otherwise
    /// the errors of [`Session::run`].
    pub fn replay(&mut self, token: &str) -> Result<&Visualization, StructvizError> {
        let (forced, source) = ShareState::decode(token)?.into_parts();
        self.run(&source, forced)
    }

    /// Token that replays the current run, `None` when nothing is shown.
    pub fn share_token(&self) -> Option<String> {
        self.current
            .as_ref()
            .map(|run| ShareState::new(run.forced, run.source.as_str()).encode())
    }

    /// Advance the graph simulation by one frame. Returns `true` while it
    /// keeps running; always `false` for static layouts.
    pub fn tick(&mut self) -> bool {
        self.graph_mut().is_some_and(GraphLayout::step)
    }

    /// Run the graph simulation until it stops or `max_ticks` ticks were
    /// taken. Returns the number of ticks.
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        self.graph_mut().map_or(0, |graph| graph.settle(max_ticks))
    }

    /// Adopt a new viewport.
    ///
    /// Static layouts are recomputed. A graph keeps its node positions and
    /// only moves its centering target.
    ///
    /// # Errors
    ///
    /// Returns [`StructvizError::Layout`] if recomputing a static layout
    /// fails; the old layout is kept in that case.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), StructvizError> {
        self.viewport = viewport;
        let Some(run) = self.current.as_mut() else {
            return Ok(());
        };

        let visualization = &mut run.visualization;
        if let Some(graph) = visualization.layout.as_graph_mut() {
            graph.resize(viewport, self.visualizer.config().layout().graph());
        } else {
            visualization.layout =
                self.visualizer
                    .layout(&visualization.value, visualization.kind, viewport)?;
        }
        debug!(width = viewport.width(), height = viewport.height(); "Resized session");
        Ok(())
    }

    /// Start dragging graph node `id`. Returns `false` when no graph is shown
    /// or the node does not exist.
    pub fn drag_start(&mut self, id: &NodeId) -> bool {
        self.graph_mut().is_some_and(|graph| graph.drag_start(id))
    }

    /// Move the dragged node to `point` in canvas coordinates.
    pub fn drag_move(&mut self, id: &NodeId, point: Point) -> bool {
        self.graph_mut().is_some_and(|graph| graph.drag_move(id, point))
    }

    pub fn drag_end(&mut self, id: &NodeId) -> bool {
        self.graph_mut().is_some_and(|graph| graph.drag_end(id))
    }

    /// Discard the current run, stopping its simulation.
    pub fn clear(&mut self) {
        if let Some(mut run) = self.current.take() {
            if let Some(graph) = run.visualization.layout.as_graph_mut() {
                graph.stop();
            }
            debug!("Cleared session");
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

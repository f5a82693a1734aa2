//! Layout engine factory module
//!
//! Each structure kind that can be drawn has one engine. The
//! [`EngineBuilder`] creates engines lazily from the layout configuration and
//! caches them, so repeated layouts of the same kind reuse one instance.

use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
};

use log::trace;

use structviz_core::{kind::StructureKind, value::Value};

use super::{Layout, Viewport, array, graph, grid, hash_table, heap, linked_list, tree};
use crate::{
    config::{LayoutConfig, StyleConfig},
    error::LayoutError,
};

/// Trait implemented by every layout engine.
pub trait LayoutEngine {
    /// Calculate the layout of `value` for the given viewport.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] when `value` does not have the shape the
    /// engine draws.
    fn calculate(&self, value: &Value, viewport: Viewport) -> Result<Layout, LayoutError>;
}

fn create_engine(
    kind: StructureKind,
    layout: &LayoutConfig,
    style: &StyleConfig,
) -> Option<Box<dyn LayoutEngine>> {
    let engine: Box<dyn LayoutEngine> = match kind {
        StructureKind::Array => Box::new(array::Engine::new(*layout.array())),
        StructureKind::Grid => Box::new(grid::Engine::new(*layout.grid(), style.clone())),
        StructureKind::Heap => Box::new(heap::Engine::new(*layout.heap())),
        StructureKind::Tree => Box::new(tree::Engine::new(*layout.tree())),
        StructureKind::LinkedList => Box::new(linked_list::Engine::new(*layout.linked_list())),
        StructureKind::HashTable => Box::new(hash_table::Engine::new(*layout.hash_table())),
        StructureKind::Graph => Box::new(graph::Engine::new(*layout.graph())),
        StructureKind::Object | StructureKind::Unknown => return None,
    };
    Some(engine)
}

/// Builder and cache for layout engines.
pub struct EngineBuilder {
    engines: HashMap<StructureKind, Box<dyn LayoutEngine>>,
    layout: LayoutConfig,
    style: StyleConfig,
}

impl EngineBuilder {
    /// Create a builder configured with the given layout and style sections.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self {
            engines: HashMap::new(),
            layout,
            style,
        }
    }

    /// Returns `true` once the engine for `kind` has been created.
    pub fn has_engine(&self, kind: StructureKind) -> bool {
        self.engines.contains_key(&kind)
    }

    /// Number of engines created so far.
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Get the engine for `kind`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Unsupported`] for kinds without a layout.
    pub fn engine(&mut self, kind: StructureKind) -> Result<&dyn LayoutEngine, LayoutError> {
        let engine = match self.engines.entry(kind) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let engine = create_engine(kind, &self.layout, &self.style)
                    .ok_or(LayoutError::Unsupported(kind))?;
                trace!(kind:% = kind; "Created layout engine");
                entry.insert(engine)
            }
        };

        Ok(&**engine)
    }

    /// Run the engine for `kind` on `value`.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`LayoutError`], or [`LayoutError::Unsupported`]
    /// for kinds without a layout.
    pub fn calculate(
        &mut self,
        kind: StructureKind,
        value: &Value,
        viewport: Viewport,
    ) -> Result<Layout, LayoutError> {
        self.engine(kind)?.calculate(value, viewport)
    }
}

impl fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("engines", &self.engines.keys().collect::<Vec<_>>())
            .field("layout", &self.layout)
            .field("style", &self.style)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> EngineBuilder {
        EngineBuilder::new(LayoutConfig::default(), StyleConfig::default())
    }

    #[test]
    fn test_unsupported_kinds() {
        let mut builder = builder();

        for kind in [StructureKind::Object, StructureKind::Unknown] {
            assert!(matches!(
                builder.engine(kind),
                Err(LayoutError::Unsupported(k)) if k == kind
            ));
        }
    }

    #[test]
    fn test_engine_matches_kind() {
        let mut builder = builder();
        let viewport = Viewport::new(800.0, 600.0);
        let value = Value::Sequence(vec![Value::from(2), Value::from(1)]);

        for kind in [StructureKind::Array, StructureKind::Heap, StructureKind::LinkedList] {
            let layout = builder.calculate(kind, &value, viewport).unwrap();
            assert_eq!(layout.kind(), kind);
        }
    }
}

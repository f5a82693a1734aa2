//! structviz - Layout engine for data-structure visualizations.
//!
//! Text is parsed into a [`Value`](value::Value), classified as one of the
//! canonical structure kinds, validated against that kind and laid out as
//! positioned nodes, edges and statistics ready for a renderer. Graphs are
//! laid out by a force simulation that keeps running after the first layout.

pub mod classify;
pub mod config;
pub mod layout;
pub mod samples;
pub mod session;
pub mod share;
pub mod validate;

mod error;

pub use structviz_core::{color, geometry, identifier, kind, value};

pub use error::{LayoutError, ShareTokenError, StructvizError};

use log::{debug, info, trace};
use serde::Serialize;

use config::AppConfig;
use kind::StructureKind;
use layout::{EngineBuilder, Layout, Viewport};
use value::Value;

/// The outcome of one run: the parsed value, the kind it was drawn as and
/// its layout.
#[derive(Debug, Serialize)]
pub struct Visualization {
    kind: StructureKind,
    value: Value,
    layout: Layout,
}

impl Visualization {
    pub fn kind(&self) -> StructureKind {
        self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    pub fn into_layout(self) -> Layout {
        self.layout
    }
}

/// Entry point for parsing, classifying, validating and laying out values.
///
/// # Examples
///
/// ```
/// use structviz::{Visualizer, kind::StructureKind};
///
/// let mut visualizer = Visualizer::default();
/// let visualization = visualizer.visualize("[10, 8, 9, 4, 7]", None).unwrap();
///
/// assert_eq!(visualization.kind(), StructureKind::Heap);
/// assert_eq!(visualization.layout().nodes().len(), 5);
/// ```
#[derive(Debug)]
pub struct Visualizer {
    config: AppConfig,
    engines: EngineBuilder,
}

impl Visualizer {
    /// Create a new visualizer with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let engines = EngineBuilder::new(config.layout().clone(), config.style().clone());
        Self { config, engines }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The engines created so far; each kind's engine is built once and
    /// reused by later layouts.
    pub fn engines(&self) -> &EngineBuilder {
        &self.engines
    }

    /// Parse text, falling back to the permissive line reader when the
    /// strict grammar rejects it.
    ///
    /// # Errors
    ///
    /// Returns [`StructvizError::Parse`] for empty input.
    pub fn parse(&self, source: &str) -> Result<Value, StructvizError> {
        let value = structviz_parser::parse(source)
            .map_err(|err| StructvizError::new_parse_error(err, source))?;
        trace!(value:% = value; "Parsed value");
        Ok(value)
    }

    /// Parse text with the strict grammar only.
    ///
    /// # Errors
    ///
    /// Returns [`StructvizError::Parse`] describing the first grammar
    /// violation.
    pub fn parse_strict(&self, source: &str) -> Result<Value, StructvizError> {
        structviz_parser::parse_strict(source)
            .map_err(|err| StructvizError::new_parse_error(err, source))
    }

    /// The kind `value` is drawn as: `forced` when given, otherwise the
    /// classifier's choice.
    pub fn resolve_kind(&self, value: &Value, forced: Option<StructureKind>) -> StructureKind {
        match forced {
            Some(kind) => kind,
            None => classify::classify(value),
        }
    }

    /// Check `value` against the invariants of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`StructvizError::Validation`] with every violation.
    pub fn validate(&self, value: &Value, kind: StructureKind) -> Result<(), StructvizError> {
        let result = validate::validate(value, kind);
        if result.is_valid() {
            Ok(())
        } else {
            debug!(kind:% = kind, errors = result.errors().len(); "Validation failed");
            Err(StructvizError::Validation(result.into_errors()))
        }
    }

    /// Lay `value` out as `kind` in `viewport`.
    ///
    /// # Errors
    ///
    /// Returns [`StructvizError::Layout`] when `kind` has no layout or the
    /// engine rejects the value.
    pub fn layout(
        &mut self,
        value: &Value,
        kind: StructureKind,
        viewport: Viewport,
    ) -> Result<Layout, StructvizError> {
        Ok(self.engines.calculate(kind, value, viewport)?)
    }

    /// Run the whole pipeline on `source` in the configured viewport.
    ///
    /// # Errors
    ///
    /// Returns the first error of the parse, validation or layout stage.
    pub fn visualize(
        &mut self,
        source: &str,
        forced: Option<StructureKind>,
    ) -> Result<Visualization, StructvizError> {
        self.visualize_in(source, forced, self.config.layout().viewport())
    }

    /// Like [`Visualizer::visualize`], with an explicit viewport.
    ///
    /// # Errors
    ///
    /// Returns the first error of the parse, validation or layout stage.
    pub fn visualize_in(
        &mut self,
        source: &str,
        forced: Option<StructureKind>,
        viewport: Viewport,
    ) -> Result<Visualization, StructvizError> {
        let value = self.parse(source)?;
        let kind = self.resolve_kind(&value, forced);
        info!(kind:% = kind, forced = forced.is_some(); "Visualizing value");

        self.validate(&value, kind)?;
        let layout = self.layout(&value, kind, viewport)?;
        debug!(nodes = layout.nodes().len(), edges = layout.edges().len(); "Layout calculated");

        Ok(Visualization {
            kind,
            value,
            layout,
        })
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engines_are_reused_across_layouts() {
        let mut visualizer = Visualizer::default();
        assert!(!visualizer.engines().has_engine(StructureKind::Array));

        visualizer.visualize("[5, 9, 1]", None).unwrap();
        visualizer.visualize("[4, 9, 1, 7]", None).unwrap();

        assert!(visualizer.engines().has_engine(StructureKind::Array));
        assert_eq!(visualizer.engines().len(), 1);
        assert!(!visualizer.engines().has_engine(StructureKind::Heap));
    }

    #[test]
    fn test_unsupported_kind_creates_no_engine() {
        let mut visualizer = Visualizer::default();

        let err = visualizer.visualize(r#"{"a": [1]}"#, None).unwrap_err();

        assert!(matches!(err, StructvizError::Layout(LayoutError::Unsupported(_))));
        assert_eq!(visualizer.engines().len(), 0);
    }
}

//! Error types for structviz operations.
//!
//! [`StructvizError`] is returned by the pipeline entry points and wraps the
//! narrower [`LayoutError`] and [`ShareTokenError`] produced by individual
//! stages.

use std::io;

use thiserror::Error;

use structviz_core::{identifier::Id, kind::StructureKind};
use structviz_parser::error::ParseError;

/// Failure of a single layout engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("no layout is available for {0} data")]
    Unsupported(StructureKind),

    #[error("{kind} layout expects {expected}, found a {found}")]
    UnexpectedShape {
        kind: StructureKind,
        expected: &'static str,
        found: &'static str,
    },

    #[error("grid row {row} has {found} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("heap element {index} is not a number")]
    NonNumericHeap { index: usize },

    #[error("graph node {index} has no usable `id`")]
    MissingNodeId { index: usize },

    #[error("graph node id `{0}` is used more than once")]
    DuplicateNodeId(Id),

    #[error("graph link {index} has no `{endpoint}`")]
    MissingEndpoint { index: usize, endpoint: &'static str },

    #[error("graph link {index} references unknown node `{id}`")]
    UnknownNode { index: usize, id: Id },

    #[error("invalid style: {0}")]
    Style(String),
}

/// Failure to decode a share token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareTokenError {
    #[error("share token has no `data` parameter")]
    MissingData,

    #[error("share token names an unknown type `{0}`")]
    UnknownType(String),
}

/// The main error type for structviz operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the structured parse
/// error so that its spans can be rendered as snippets.
#[derive(Debug, Error)]
pub enum StructvizError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Data validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Share token error: {0}")]
    ShareToken(#[from] ShareTokenError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StructvizError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_joins_errors() {
        let err = StructvizError::Validation(vec![
            "Graph must have nodes and links properties".to_string(),
            "Nodes must be an array".to_string(),
        ]);

        assert_eq!(
            err.to_string(),
            "Data validation failed: Graph must have nodes and links properties, Nodes must be an array"
        );
    }

    #[test]
    fn test_layout_error_messages() {
        let err = LayoutError::UnknownNode {
            index: 2,
            id: Id::new("z"),
        };
        assert_eq!(err.to_string(), "graph link 2 references unknown node `z`");

        let err: StructvizError = LayoutError::Unsupported(StructureKind::Object).into();
        assert_eq!(
            err.to_string(),
            "Layout error: no layout is available for object data"
        );
    }
}

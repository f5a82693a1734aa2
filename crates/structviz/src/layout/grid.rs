//! Grid layout: square cells centered in the viewport.
//!
//! A grid whose cells all read as numbers is drawn as a heatmap over the
//! numeric range; any other grid uses one neutral fill and shows the cell
//! text instead.

use log::debug;
use serde::Serialize;

use structviz_core::{
    color::Color,
    geometry::{Point, Size},
    kind::StructureKind,
    value::Value,
};

use super::{Layout, LayoutEngine, LayoutNode, Viewport};
use crate::{
    config::{GridConfig, StyleConfig},
    error::LayoutError,
};

/// One positioned cell. The node position is the top-left corner of the
/// drawn square.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    #[serde(flatten)]
    node: LayoutNode,
    row: usize,
    col: usize,
    size: f32,
    fill: Color,
    text_visible: bool,
}

impl GridCell {
    pub fn node(&self) -> &LayoutNode {
        &self.node
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Side length of the drawn square.
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    /// Cell text is hidden in heatmaps, where the fill carries the value.
    pub fn text_visible(&self) -> bool {
        self.text_visible
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridStats {
    rows: usize,
    cols: usize,
    numeric: bool,
    min: Option<f64>,
    max: Option<f64>,
}

impl GridStats {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `true` when every cell is numeric and the grid is a heatmap.
    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    /// The heatmap domain, if the grid is numeric.
    pub fn domain(&self) -> Option<(f64, f64)> {
        self.min.zip(self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLayout {
    canvas: Size,
    origin: Point,
    cell_size: f32,
    font_size: f32,
    #[serde(rename = "nodes")]
    cells: Vec<GridCell>,
    stats: GridStats,
}

impl GridLayout {
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    /// Top-left corner of the grid.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Pitch between neighboring cells.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn stats(&self) -> &GridStats {
        &self.stats
    }
}

/// Reads `value` as a rectangular matrix. Rows are either all arrays or all
/// strings; strings are split into one cell per character.
fn matrix(value: &Value) -> Result<Vec<Vec<Value>>, LayoutError> {
    let Some(rows) = value.as_sequence() else {
        return Err(LayoutError::UnexpectedShape {
            kind: StructureKind::Grid,
            expected: "an array of rows",
            found: value.kind_name(),
        });
    };

    let matrix = match rows.first() {
        None => Vec::new(),
        Some(Value::Sequence(_)) => rows
            .iter()
            .map(|row| match row {
                Value::Sequence(cells) => Ok(cells.clone()),
                other => Err(LayoutError::UnexpectedShape {
                    kind: StructureKind::Grid,
                    expected: "rows that are all arrays",
                    found: other.kind_name(),
                }),
            })
            .collect::<Result<_, _>>()?,
        Some(Value::String(_)) => rows
            .iter()
            .map(|row| match row {
                Value::String(text) => Ok(text
                    .chars()
                    .map(|c| Value::String(c.to_string()))
                    .collect()),
                other => Err(LayoutError::UnexpectedShape {
                    kind: StructureKind::Grid,
                    expected: "rows that are all strings",
                    found: other.kind_name(),
                }),
            })
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(LayoutError::UnexpectedShape {
                kind: StructureKind::Grid,
                expected: "rows that are arrays or strings",
                found: other.kind_name(),
            });
        }
    };

    if let Some(first) = matrix.first() {
        let expected = first.len();
        if let Some((row, cells)) = matrix
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != expected)
        {
            return Err(LayoutError::RaggedGrid {
                row,
                expected,
                found: cells.len(),
            });
        }
    }

    Ok(matrix)
}

/// Grid layout engine.
pub struct Engine {
    config: GridConfig,
    style: StyleConfig,
}

impl Engine {
    pub fn new(config: GridConfig, style: StyleConfig) -> Self {
        Self { config, style }
    }

    /// Calculate the grid layout for `value`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnexpectedShape`] or [`LayoutError::RaggedGrid`]
    /// for values that are not rectangular, and [`LayoutError::Style`] when a
    /// configured color is invalid.
    pub fn calculate_layout(
        &self,
        value: &Value,
        viewport: Viewport,
    ) -> Result<GridLayout, LayoutError> {
        let matrix = matrix(value)?;
        let rows = matrix.len();
        let cols = matrix.first().map_or(0, Vec::len);

        let numbers: Option<Vec<f64>> = matrix.iter().flatten().map(Value::coerce_number).collect();
        let numbers = numbers.filter(|numbers| !numbers.is_empty());
        let min = numbers
            .as_ref()
            .and_then(|n| n.iter().copied().reduce(f64::min));
        let max = numbers
            .as_ref()
            .and_then(|n| n.iter().copied().reduce(f64::max));
        let stats = GridStats {
            rows,
            cols,
            numeric: numbers.is_some(),
            min,
            max,
        };

        if rows == 0 || cols == 0 {
            return Ok(GridLayout {
                canvas: viewport.size(),
                origin: Point::default(),
                cell_size: 0.0,
                font_size: self.config.min_font_size,
                cells: Vec::new(),
                stats,
            });
        }

        let inner_width = (viewport.width() - 2.0 * self.config.padding).max(0.0);
        let inner_height = (viewport.height() - 2.0 * self.config.padding).max(0.0);
        let cell_size = (inner_width / cols as f32)
            .min(inner_height / rows as f32)
            .floor();
        let grid_size = Size::new(cell_size * cols as f32, cell_size * rows as f32);
        let origin = Point::new(
            (viewport.width() - grid_size.width()) / 2.0,
            (viewport.height() - grid_size.height()) / 2.0,
        );
        let font_size = (cell_size * self.config.font_scale)
            .floor()
            .max(self.config.min_font_size);

        let scale = match (min, max) {
            (Some(min), Some(max)) => Some(self.style.heatmap(min, max).map_err(LayoutError::Style)?),
            _ => None,
        };
        let neutral = self.style.grid_neutral().map_err(LayoutError::Style)?;

        let inset = self.config.cell_gap / 2.0;
        let cells = matrix
            .into_iter()
            .enumerate()
            .flat_map(|(row, cells)| {
                cells
                    .into_iter()
                    .enumerate()
                    .map(move |(col, cell)| (row, col, cell))
            })
            .map(|(row, col, cell)| {
                let fill = match (&scale, cell.coerce_number()) {
                    (Some(scale), Some(n)) => scale.color_at(n),
                    _ => neutral,
                };
                let position = Point::new(
                    origin.x() + col as f32 * cell_size + inset,
                    origin.y() + row as f32 * cell_size + inset,
                );
                GridCell {
                    node: LayoutNode::new(row * cols + col, cell, position),
                    row,
                    col,
                    size: (cell_size - self.config.cell_gap).max(0.0),
                    fill,
                    text_visible: scale.is_none(),
                }
            })
            .collect();

        debug!(rows = rows, cols = cols, cell_size = cell_size, numeric = stats.numeric; "Calculated grid layout");

        Ok(GridLayout {
            canvas: viewport.size(),
            origin,
            cell_size,
            font_size,
            cells,
            stats,
        })
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, value: &Value, viewport: Viewport) -> Result<Layout, LayoutError> {
        self.calculate_layout(value, viewport).map(Layout::Grid)
    }
}

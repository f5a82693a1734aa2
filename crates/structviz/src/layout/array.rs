//! Bar chart layout for arrays.
//!
//! Bars share a vertical scale whose domain always includes zero, so
//! negative values hang below the baseline and positive values rise above
//! it.

use std::borrow::Cow;

use log::debug;
use serde::Serialize;

use structviz_core::{
    geometry::{Insets, Point, Size},
    value::Value,
};

use super::{Layout, LayoutEngine, LayoutNode, Viewport};
use crate::{config::ArrayConfig, error::LayoutError};

/// One positioned bar. The node position is the top-left corner of the bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    #[serde(flatten)]
    node: LayoutNode,
    width: f32,
    height: f32,
    value_label_y: f32,
    index_label_y: f32,
}

impl Bar {
    pub fn node(&self) -> &LayoutNode {
        &self.node
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Vertical position of the value label drawn above the bar.
    pub fn value_label_y(&self) -> f32 {
        self.value_label_y
    }

    /// Vertical position of the index label drawn under the chart.
    pub fn index_label_y(&self) -> f32 {
        self.index_label_y
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayStats {
    length: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl ArrayStats {
    pub fn length(&self) -> usize {
        self.length
    }

    /// Smallest numeric element, if any element is numeric.
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Largest numeric element, if any element is numeric.
    pub fn max(&self) -> Option<f64> {
        self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayLayout {
    canvas: Size,
    baseline_y: f32,
    #[serde(rename = "nodes")]
    bars: Vec<Bar>,
    stats: ArrayStats,
}

impl ArrayLayout {
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    /// Vertical position of the zero line.
    pub fn baseline_y(&self) -> f32 {
        self.baseline_y
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn stats(&self) -> &ArrayStats {
        &self.stats
    }
}

/// Linear scale from `[lo, hi]` onto `[max_height, 0]`.
struct VerticalScale {
    lo: f64,
    hi: f64,
    max_height: f32,
}

impl VerticalScale {
    fn apply(&self, value: f64) -> f32 {
        if self.hi > self.lo {
            (f64::from(self.max_height) * (self.hi - value) / (self.hi - self.lo)) as f32
        } else {
            self.max_height
        }
    }
}

/// Array layout engine.
pub struct Engine {
    config: ArrayConfig,
}

impl Engine {
    pub fn new(config: ArrayConfig) -> Self {
        Self { config }
    }

    /// Calculate the bar chart for `value`. A non-array value is drawn as a
    /// single bar.
    pub fn calculate_layout(&self, value: &Value, viewport: Viewport) -> ArrayLayout {
        let items: Cow<'_, [Value]> = match value {
            Value::Sequence(items) => Cow::Borrowed(items),
            other => Cow::Owned(vec![other.clone()]),
        };

        let margin: Insets = self.config.margin.into();
        let width = (viewport.width() - margin.horizontal_sum()).max(0.0);
        let numbers: Vec<Option<f64>> = items.iter().map(Value::coerce_number).collect();
        let min = numbers.iter().flatten().copied().reduce(f64::min);
        let max = numbers.iter().flatten().copied().reduce(f64::max);

        let scale = VerticalScale {
            lo: min.unwrap_or(0.0).min(0.0),
            hi: max.unwrap_or(0.0).max(0.0),
            max_height: self.config.max_bar_height,
        };
        let zero_y = scale.apply(0.0);

        let count = items.len();
        let bar_width = if count == 0 {
            0.0
        } else {
            (width / count as f32 * self.config.bar_fill).max(self.config.min_bar_width)
        };
        let spacing = (width - bar_width * count as f32) / (count as f32 + 1.0);
        let index_label_y = margin.top() + self.config.max_bar_height + 20.0;

        let bars = items
            .iter()
            .zip(&numbers)
            .enumerate()
            .map(|(index, (item, number))| {
                let n = number.unwrap_or(0.0);
                let x = margin.left() + spacing + index as f32 * (bar_width + spacing);
                let y = margin.top() + scale.apply(n.max(0.0));
                Bar {
                    node: LayoutNode::new(index, item.clone(), Point::new(x, y)),
                    width: bar_width,
                    height: (scale.apply(n) - zero_y).abs(),
                    value_label_y: y - 5.0,
                    index_label_y,
                }
            })
            .collect();

        debug!(bars = count, bar_width = bar_width; "Calculated array layout");

        ArrayLayout {
            canvas: Size::new(viewport.width(), self.config.height + margin.vertical_sum()),
            baseline_y: margin.top() + zero_y,
            bars,
            stats: ArrayStats {
                length: count,
                min,
                max,
            },
        }
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, value: &Value, viewport: Viewport) -> Result<Layout, LayoutError> {
        Ok(Layout::Array(self.calculate_layout(value, viewport)))
    }
}

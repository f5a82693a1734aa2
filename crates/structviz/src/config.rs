//! Configuration types for structviz layouts.
//!
//! This module provides configuration structures that control how values
//! are laid out and styled. All types implement [`serde::Deserialize`] for
//! flexible loading from external sources; every field falls back to its
//! default when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining layout and style settings.
//! - [`LayoutConfig`] - The default viewport plus one section per layout engine.
//! - [`StyleConfig`] - Colors used by engines that assign fills, such as the grid heatmap.
//!
//! # Example
//!
//! ```
//! # use structviz::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [layout.graph]
//!     charge_strength = -120.0
//!
//!     [style]
//!     grid_low = "navy"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.layout().graph().charge_strength, -120.0);
//! assert!(config.style().grid_low().is_ok());
//! ```

use serde::Deserialize;

use structviz_core::{
    color::{Color, ColorScale},
    geometry::Insets,
};

use crate::layout::Viewport;

/// Top-level application configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style configurations.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Margins around a drawing, in the order used by config files.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margin {
    const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl From<Margin> for Insets {
    fn from(margin: Margin) -> Self {
        Insets::new(margin.top, margin.right, margin.bottom, margin.left)
    }
}

/// Viewport used when the caller does not provide one.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
        }
    }
}

/// Bar chart settings for arrays.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ArrayConfig {
    pub margin: Margin,
    /// Height of the plotting area; the tallest bar spans `max_bar_height`.
    pub height: f32,
    pub max_bar_height: f32,
    pub min_bar_width: f32,
    /// Fraction of the per-element slot taken by the bar.
    pub bar_fill: f32,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            margin: Margin::new(40.0, 40.0, 60.0, 40.0),
            height: 300.0,
            max_bar_height: 200.0,
            min_bar_width: 30.0,
            bar_fill: 0.8,
        }
    }
}

/// Grid and heatmap settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub padding: f32,
    /// Gap left between neighbouring cells.
    pub cell_gap: f32,
    pub min_font_size: f32,
    /// Font size as a fraction of the cell size.
    pub font_scale: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            padding: 12.0,
            cell_gap: 2.0,
            min_font_size: 10.0,
            font_scale: 0.35,
        }
    }
}

/// Binary heap settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HeapConfig {
    pub margin: Margin,
    pub node_radius: f32,
    pub level_height: f32,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            margin: Margin::new(80.0, 20.0, 40.0, 20.0),
            node_radius: 25.0,
            level_height: 80.0,
        }
    }
}

/// Tidy tree settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub margin: Margin,
    pub height: f32,
    /// Vertical space kept free below the deepest level.
    pub bottom_reserve: f32,
    pub node_radius: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            margin: Margin::new(60.0, 90.0, 30.0, 90.0),
            height: 500.0,
            bottom_reserve: 100.0,
            node_radius: 20.0,
        }
    }
}

/// Linked-list settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LinkedListConfig {
    pub margin: Margin,
    pub node_width: f32,
    pub node_height: f32,
    /// Horizontal distance between the left edges of neighbouring nodes.
    pub spacing: f32,
    pub height: f32,
    /// Maximum number of nodes read from a pointer chain.
    pub max_hops: usize,
}

impl Default for LinkedListConfig {
    fn default() -> Self {
        Self {
            margin: Margin::new(60.0, 20.0, 60.0, 20.0),
            node_width: 80.0,
            node_height: 40.0,
            spacing: 120.0,
            height: 200.0,
            max_hops: 20,
        }
    }
}

/// Hash-table settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HashTableConfig {
    pub margin: Margin,
    pub bucket_width: f32,
    pub bucket_height: f32,
    pub bucket_gap: f32,
    pub item_width: f32,
    /// Horizontal distance between chained items of one bucket.
    pub item_spacing: f32,
    pub min_table_size: usize,
    /// Table size relative to the item count.
    pub growth_factor: f64,
}

impl Default for HashTableConfig {
    fn default() -> Self {
        Self {
            margin: Margin::new(60.0, 20.0, 40.0, 60.0),
            bucket_width: 200.0,
            bucket_height: 40.0,
            bucket_gap: 5.0,
            item_width: 55.0,
            item_spacing: 60.0,
            min_table_size: 10,
            growth_factor: 1.3,
        }
    }
}

/// Force simulation settings for graphs.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub margin: Margin,
    pub min_width: f32,
    pub min_height: f32,
    pub node_radius: f32,
    pub link_distance: f32,
    pub charge_strength: f32,
    pub collide_radius: f32,
    /// Strength of the pull toward the viewport center on each axis.
    pub center_pull: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Fraction of velocity lost on every tick.
    pub velocity_decay: f32,
    /// Alpha target while a node is dragged.
    pub drag_alpha_target: f32,
    /// Upper bound on ticks when settling a layout without a scheduler.
    pub max_ticks: usize,
    /// Seed for the initial jitter; random when absent.
    pub seed: Option<u64>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            margin: Margin::new(60.0, 20.0, 20.0, 20.0),
            min_width: 500.0,
            min_height: 400.0,
            node_radius: 20.0,
            link_distance: 100.0,
            charge_strength: -300.0,
            collide_radius: 30.0,
            center_pull: 0.05,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            max_ticks: 300,
            seed: None,
        }
    }
}

/// Layout configuration: default viewport and one section per engine.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    viewport: ViewportConfig,
    array: ArrayConfig,
    grid: GridConfig,
    heap: HeapConfig,
    tree: TreeConfig,
    linked_list: LinkedListConfig,
    hash_table: HashTableConfig,
    graph: GraphConfig,
}

impl LayoutConfig {
    /// Returns the default [`Viewport`].
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport.width, self.viewport.height)
    }

    /// Returns the array engine settings.
    pub fn array(&self) -> &ArrayConfig {
        &self.array
    }

    /// Returns the grid engine settings.
    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Returns the heap engine settings.
    pub fn heap(&self) -> &HeapConfig {
        &self.heap
    }

    /// Returns the tree engine settings.
    pub fn tree(&self) -> &TreeConfig {
        &self.tree
    }

    /// Returns the linked-list engine settings.
    pub fn linked_list(&self) -> &LinkedListConfig {
        &self.linked_list
    }

    /// Returns the hash-table engine settings.
    pub fn hash_table(&self) -> &HashTableConfig {
        &self.hash_table
    }

    /// Returns the graph engine settings.
    pub fn graph(&self) -> &GraphConfig {
        &self.graph
    }

    /// Replaces the graph engine settings.
    pub fn with_graph(mut self, graph: GraphConfig) -> Self {
        self.graph = graph;
        self
    }

    /// Replaces the default viewport.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = ViewportConfig {
            width: viewport.width(),
            height: viewport.height(),
        };
        self
    }
}

/// Visual styling configuration, as color strings.
///
/// The grid heatmap interpolates from `grid_low` through `grid_mid` to
/// `grid_high`; non-numeric grids use `grid_neutral` for every cell.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    grid_low: String,
    grid_mid: String,
    grid_high: String,
    grid_neutral: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            grid_low: "#7f7fd5".to_string(),
            grid_mid: "#e5e7eb".to_string(),
            grid_high: "#86a8e7".to_string(),
            grid_neutral: "#f3f4f6".to_string(),
        }
    }
}

fn parse_style_color(name: &str, value: &str) -> Result<Color, String> {
    Color::new(value).map_err(|err| format!("Invalid {name} in config: {err}"))
}

impl StyleConfig {
    /// Returns the color of the lowest heatmap value.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn grid_low(&self) -> Result<Color, String> {
        parse_style_color("grid_low", &self.grid_low)
    }

    /// Returns the color of the heatmap midpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn grid_mid(&self) -> Result<Color, String> {
        parse_style_color("grid_mid", &self.grid_mid)
    }

    /// Returns the color of the highest heatmap value.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn grid_high(&self) -> Result<Color, String> {
        parse_style_color("grid_high", &self.grid_high)
    }

    /// Returns the fill of cells in non-numeric grids.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn grid_neutral(&self) -> Result<Color, String> {
        parse_style_color("grid_neutral", &self.grid_neutral)
    }

    /// Builds the three-stop heatmap scale over `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three stop colors is invalid.
    pub fn heatmap(&self, min: f64, max: f64) -> Result<ColorScale, String> {
        Ok(ColorScale::new(
            min,
            max,
            self.grid_low()?,
            self.grid_mid()?,
            self.grid_high()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        let layout = config.layout();

        assert_eq!(layout.array().min_bar_width, 30.0);
        assert_eq!(layout.linked_list().max_hops, 20);
        assert_eq!(layout.hash_table().min_table_size, 10);
        assert_eq!(layout.graph().charge_strength, -300.0);
        assert_eq!(layout.graph().seed, None);
        assert_eq!(layout.viewport(), Viewport::new(960.0, 600.0));
    }

    #[test]
    fn test_alpha_decay_reaches_alpha_min_in_300_ticks() {
        let graph = GraphConfig::default();
        let alpha = (1.0 - graph.alpha_decay).powi(300);

        assert_approx_eq!(f32, alpha, graph.alpha_min, epsilon = 1e-5);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [layout.viewport]
            width = 1280.0

            [layout.graph]
            seed = 7

            [layout.linked_list]
            max_hops = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.layout().viewport(), Viewport::new(1280.0, 600.0));
        assert_eq!(config.layout().graph().seed, Some(7));
        assert_eq!(config.layout().graph().link_distance, 100.0);
        assert_eq!(config.layout().linked_list().max_hops, 5);
        assert_eq!(config.layout().linked_list().spacing, 120.0);
    }

    #[test]
    fn test_default_style_colors_parse() {
        let style = StyleConfig::default();

        assert_eq!(style.grid_low().unwrap().to_hex(), "#7f7fd5");
        assert_eq!(style.grid_neutral().unwrap().to_hex(), "#f3f4f6");
        assert!(style.heatmap(1.0, 9.0).is_ok());
    }

    #[test]
    fn test_invalid_style_color() {
        let config: AppConfig = toml::from_str(
            r#"
            [style]
            grid_high = "not-a-color"
            "#,
        )
        .unwrap();

        let err = config.style().grid_high().unwrap_err();
        assert!(err.starts_with("Invalid grid_high in config"));
    }
}

//! Color handling for structviz layouts
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate, and the [`ColorScale`] used to tint numeric grid
//! cells.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::{AlphaColor, DynamicColor, Srgb};
use serde::{Serialize, Serializer};

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a string
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    ///
    /// # Examples
    ///
    /// ```
    /// use structviz_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// let blue = Color::new("blue").unwrap();
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    fn srgb(self) -> AlphaColor<Srgb> {
        self.color.to_alpha_color::<Srgb>()
    }

    /// Linear interpolation in sRGB between `self` (at `t = 0`) and `other`
    /// (at `t = 1`). `t` is clamped to `[0, 1]`.
    pub fn interpolate(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let from = self.srgb().components;
        let to = other.srgb().components;
        let mixed: [f32; 4] = std::array::from_fn(|i| from[i] + (to[i] - from[i]) * t);
        Color {
            color: DynamicColor::from_alpha_color(AlphaColor::<Srgb>::new(mixed)),
        }
    }

    /// Returns the color as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    ///
    /// # Examples
    ///
    /// ```
    /// use structviz_core::color::Color;
    ///
    /// assert_eq!(Color::new("red").unwrap().to_hex(), "#ff0000");
    /// ```
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self
            .srgb()
            .components
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        if a == u8::MAX {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    /// Returns the alpha (transparency) component of this color.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Three-stop linear color scale over `[min, (min + max) / 2, max]`.
///
/// Values below the midpoint blend `low` into `mid`; values at or above it
/// blend `mid` into `high`. A degenerate domain (`min == max`) maps every
/// value halfway between `mid` and `high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    domain: [f64; 3],
    range: [Color; 3],
}

impl ColorScale {
    pub fn new(min: f64, max: f64, low: Color, mid: Color, high: Color) -> Self {
        Self {
            domain: [min, (min + max) / 2.0, max],
            range: [low, mid, high],
        }
    }

    /// The `[min, mid, max]` stops of the scale.
    pub fn domain(&self) -> [f64; 3] {
        self.domain
    }

    pub fn min(&self) -> f64 {
        self.domain[0]
    }

    pub fn max(&self) -> f64 {
        self.domain[2]
    }

    /// Maps `value` onto the scale.
    pub fn color_at(&self, value: f64) -> Color {
        let segment = usize::from(value >= self.domain[1]);
        let (start, end) = (self.domain[segment], self.domain[segment + 1]);
        let span = end - start;
        let t = if span == 0.0 {
            0.5
        } else {
            (value - start) / span
        };
        self.range[segment].interpolate(self.range[segment + 1], t as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(s: &str) -> Color {
        Color::new(s).unwrap()
    }

    #[test]
    fn test_color_new() {
        assert!(Color::new("#ff0000").is_ok());
        assert!(Color::new("not-a-color").is_err());
    }

    #[test]
    fn test_color_default() {
        assert_eq!(Color::default().to_string(), "black");
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(color("#7f7fd5").to_hex(), "#7f7fd5");
        assert_eq!(color("white").to_hex(), "#ffffff");
    }

    #[test]
    fn test_interpolate_endpoints_and_midpoint() {
        let black = color("#000000");
        let white = color("#ffffff");

        assert_eq!(black.interpolate(white, 0.0).to_hex(), "#000000");
        assert_eq!(black.interpolate(white, 1.0).to_hex(), "#ffffff");
        assert_eq!(black.interpolate(white, 0.5).to_hex(), "#808080");
        assert_eq!(black.interpolate(white, 7.0).to_hex(), "#ffffff");
    }

    #[test]
    fn test_scale_stops() {
        let scale = ColorScale::new(
            1.0,
            9.0,
            color("#000000"),
            color("#808080"),
            color("#ffffff"),
        );

        assert_eq!(scale.domain(), [1.0, 5.0, 9.0]);
        assert_eq!(scale.color_at(1.0).to_hex(), "#000000");
        assert_eq!(scale.color_at(5.0).to_hex(), "#808080");
        assert_eq!(scale.color_at(9.0).to_hex(), "#ffffff");
    }

    #[test]
    fn test_scale_degenerate_domain() {
        let scale = ColorScale::new(
            4.0,
            4.0,
            color("#000000"),
            color("#000000"),
            color("#ffffff"),
        );
        assert_eq!(scale.color_at(4.0).to_hex(), "#808080");
    }

    #[test]
    fn test_color_eq_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(color("red"));
        assert!(set.contains(&color("red")));
        assert!(!set.contains(&color("blue")));
    }
}

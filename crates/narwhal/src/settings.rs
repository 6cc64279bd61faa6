use crate::error::Result;
use crate::validate::{StatOptions, validate_stat};
use serde::{Deserialize, Serialize};

/// How midpoints (and, afterwards, leaves) are positioned once leaves sit on the perimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacementMode {
    /// Midpoints head towards their leaf centroid at exactly their scaled edge length, then
    /// leaves are re-anchored so every edge has its scaled length.
    #[default]
    LengthConstrained,
    /// Midpoints sit halfway between their parent and their leaf centroid. No length clamp.
    Spider,
}

/// Perimeter shape onto which leaves are laid out end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum CoordinateGenerator {
    /// Left, bottom and right canvas borders; the top is left open for the roots.
    #[default]
    ThreeSided,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutSettings {
    pub svg_width: f64,
    pub svg_height: f64,
    /// Inset applied on every side of the canvas.
    pub svg_distance_from_edge: f64,
    /// Space reserved for a label on each side of an edge; part of the non-scalable length.
    pub label_minimum_space: f64,
    pub line_width: f64,
    /// Allow the canvas to grow up to 1.5x its height for tall trees.
    pub allow_stretch: bool,
    pub coordinate_generator: CoordinateGenerator,
    pub placement_mode: PlacementMode,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            svg_width: 750.0,
            svg_height: 750.0,
            svg_distance_from_edge: 30.0,
            label_minimum_space: 14.0,
            line_width: 1.5,
            allow_stretch: true,
            coordinate_generator: CoordinateGenerator::ThreeSided,
            placement_mode: PlacementMode::LengthConstrained,
        }
    }
}

impl LayoutSettings {
    /// Non-scalable length every node contributes to a root-to-leaf path.
    pub fn absolute_length_per_node(&self) -> f64 {
        self.label_minimum_space * 2.0 + self.line_width
    }

    pub fn available_width(&self) -> f64 {
        self.svg_width - self.svg_distance_from_edge * 2.0
    }

    pub fn available_height(&self) -> f64 {
        self.svg_height - self.svg_distance_from_edge * 2.0
    }

    pub fn validate(&self) -> Result<()> {
        let positive = StatOptions { above_zero: true };
        validate_stat(self.svg_width, "svgWidth", positive)?;
        validate_stat(self.svg_height, "svgHeight", positive)?;
        validate_stat(
            self.svg_distance_from_edge,
            "svgDistanceFromEdge",
            StatOptions::default(),
        )?;
        validate_stat(
            self.label_minimum_space,
            "labelMinimumSpace",
            StatOptions::default(),
        )?;
        validate_stat(self.line_width, "lineWidth", StatOptions::default())?;
        validate_stat(self.available_width(), "available width", positive)?;
        validate_stat(self.available_height(), "available height", positive)?;
        Ok(())
    }
}

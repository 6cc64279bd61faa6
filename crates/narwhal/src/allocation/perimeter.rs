//! Perimeter segments and the 1D blocks laid along them.

use crate::geom::{LineCoordinates, point};
use crate::settings::CoordinateGenerator;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerimeterBounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Border lines in walking order.
pub fn perimeter_lines(
    generator: CoordinateGenerator,
    bounds: &PerimeterBounds,
) -> Vec<LineCoordinates> {
    let PerimeterBounds {
        left,
        right,
        top,
        bottom,
    } = *bounds;
    match generator {
        CoordinateGenerator::ThreeSided => vec![
            LineCoordinates::new(point(left, top), point(left, bottom)).with_label("left"),
            LineCoordinates::new(point(left, bottom), point(right, bottom)).with_label("bottom"),
            LineCoordinates::new(point(right, bottom), point(right, top)).with_label("right"),
        ],
    }
}

/// Contiguous 1D interval granted to one leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceBlock {
    pub leaf_id: String,
    pub start: f64,
    pub end: f64,
}

impl SpaceBlock {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub line: LineCoordinates,
    /// Position of the line's start in the shared 1D space.
    pub start: f64,
    pub end: f64,
    pub blocks: Vec<SpaceBlock>,
}

impl Segment {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn strictly_contains(&self, offset: f64) -> bool {
        self.start < offset && offset < self.end
    }
}

/// Chains `lines` into one 1D coordinate space.
pub fn lay_end_to_end(lines: Vec<LineCoordinates>) -> Vec<Segment> {
    let mut cursor = 0.0;
    lines
        .into_iter()
        .map(|line| {
            let start = cursor;
            cursor += line.length();
            Segment {
                line,
                start,
                end: cursor,
                blocks: Vec::new(),
            }
        })
        .collect()
}

/// Index of the segment owning `offset`.
///
/// Interior offsets belong to the segment that strictly contains them. An offset on a shared
/// boundary goes to the earlier segment; offsets outside the range clamp to the ends.
pub fn owning_segment(segments: &[Segment], offset: f64) -> Option<usize> {
    if segments.is_empty() {
        return None;
    }
    segments
        .iter()
        .position(|s| s.strictly_contains(offset))
        .or_else(|| segments.iter().position(|s| offset <= s.end))
        .or(Some(segments.len() - 1))
}

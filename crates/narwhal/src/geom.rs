//! Point/vector aliases and the line primitive used by the perimeter walk.

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

/// A straight two-point segment.
#[derive(Debug, Clone, PartialEq)]
pub struct LineCoordinates {
    pub start: Point,
    pub end: Point,
    pub label: Option<String>,
}

impl LineCoordinates {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    /// Point `distance` units from `start` towards `end`. Distances past either end extrapolate.
    pub fn point_at_length(&self, distance: f64) -> Point {
        let length = self.length();
        if length == 0.0 {
            return self.start;
        }
        self.start.lerp(self.end, distance / length)
    }
}

/// Unweighted mean of `points`, or `None` when there are none.
pub fn centroid<I>(points: I) -> Option<Point>
where
    I: IntoIterator<Item = Point>,
{
    let mut count = 0usize;
    let mut sum = vector(0.0, 0.0);
    for p in points {
        sum += p.to_vector();
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some((sum / count as f64).to_point())
}

/// Point `distance` away from `from`, heading towards `towards`.
///
/// When both points coincide there is no direction to follow; the result then sits straight
/// below `from` (positive y), which is where children grow in a top-anchored layout.
pub fn point_towards(from: Point, towards: Point, distance: f64) -> Point {
    let delta = towards - from;
    let length = delta.length();
    let direction = if length > 0.0 && length.is_finite() {
        delta / length
    } else {
        vector(0.0, 1.0)
    };
    from + direction * distance
}

//! Geometry primitives shared by every pipeline stage
//!
//! All orientation tests in the crate go through [`cross`] and [`normalize`] defined
//! here, so that clipping, adjacency and boundary extraction agree on which side of
//! a segment a point lies.

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default tolerance for "same point" / "same edge" comparisons, in world units
pub const DEFAULT_TOLERANCE: f32 = 0.05;

/// Cross product with a fixed evaluation order
#[inline]
pub fn cross(lhs: Vec3, rhs: Vec3) -> Vec3 {
    Vec3::new(
        lhs.y * rhs.z - lhs.z * rhs.y,
        lhs.z * rhs.x - lhs.x * rhs.z,
        lhs.x * rhs.y - lhs.y * rhs.x,
    )
}

/// Normalize a vector, returning zero for zero-length input
#[inline]
pub fn normalize(value: Vec3) -> Vec3 {
    let magnitude = value.length();
    if magnitude == 0.0 || !magnitude.is_finite() {
        Vec3::ZERO
    } else {
        value / magnitude
    }
}

/// Component-wise comparison within `tolerance`
#[inline]
pub fn approximately(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    let delta = (a - b).abs();
    delta.x <= tolerance && delta.y <= tolerance && delta.z <= tolerance
}

/// Signed area of a polygon in the XY plane (shoelace formula)
///
/// Negative for clockwise winding, positive for counter-clockwise.
/// A repeated closing vertex contributes nothing and may be present or not.
pub fn signed_area(points: &[Vec3]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }

    sum * 0.5
}

/// A directed line segment
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

impl Segment {
    #[inline]
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Vector from start to end (not normalized)
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    #[inline]
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    #[inline]
    pub fn vertices(&self) -> [Vec3; 2] {
        [self.start, self.end]
    }

    /// Both endpoints match in the same order within `tolerance`
    #[inline]
    pub fn approx_eq(&self, other: &Segment, tolerance: f32) -> bool {
        approximately(self.start, other.start, tolerance)
            && approximately(self.end, other.end, tolerance)
    }

    /// Same edge regardless of direction
    #[inline]
    pub fn same_as(&self, other: &Segment, tolerance: f32) -> bool {
        self.approx_eq(other, tolerance) || self.approx_eq(&other.reversed(), tolerance)
    }

    /// Which side of the segment's supporting line `point` lies on
    ///
    /// Negative means right of the direction of travel, which is the interior side
    /// of the clockwise cells produced by the cell builder. Zero means collinear.
    #[inline]
    pub fn side(&self, point: Vec3) -> f32 {
        cross(self.direction(), point - self.start).z
    }
}

/// Intersect two segments in the XY plane
///
/// Uses the two-parameter line intersection and only accepts hits with both
/// parameters inside `[0, 1]`. Parallel and coincident segments return `None`.
pub fn intersect(a: &Segment, b: &Segment) -> Option<Vec3> {
    let (p, q) = (a.start, a.end);
    let (r, s) = (b.start, b.end);

    let denominator = (p.x - q.x) * (r.y - s.y) - (p.y - q.y) * (r.x - s.x);
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }

    let t = ((p.x - r.x) * (r.y - s.y) - (p.y - r.y) * (r.x - s.x)) / denominator;
    let u = -((p.x - q.x) * (p.y - r.y) - (p.y - q.y) * (p.x - r.x)) / denominator;

    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(p + t * (q - p))
}

/// Axis-aligned rectangle in the XY plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec3,
    pub max: Vec3,
}

impl Rect {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: Vec3::new(min.x, min.y, 0.0),
            max: Vec3::new(max.x, max.y, 0.0),
        }
    }

    /// Bounding rectangle of `points` grown by `padding` on every side
    ///
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[Vec3], padding: f32) -> Option<Self> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for point in &points[1..] {
            min = min.min(*point);
            max = max.max(*point);
        }

        let pad = Vec3::new(padding, padding, 0.0);
        Some(Self::new(min - pad, max + pad))
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn diagonal(&self) -> f32 {
        self.min.distance(self.max)
    }

    /// The four boundary segments, clockwise starting at `min`
    pub fn segments(&self) -> [Segment; 4] {
        let top_left = Vec3::new(self.min.x, self.max.y, 0.0);
        let bottom_right = Vec3::new(self.max.x, self.min.y, 0.0);

        [
            Segment::new(self.min, top_left),
            Segment::new(top_left, self.max),
            Segment::new(self.max, bottom_right),
            Segment::new(bottom_right, self.min),
        ]
    }
}

//! Closed centripetal Catmull-Rom spline
//!
//! Each span between consecutive loop vertices is stored in Hermite form
//! `p(s) = a s³ + b s² + m₁ s + p₁` for `s ∈ [0, 1]`, so positions and derivatives
//! are closed-form. A cumulative arc-length table maps a normalized parameter to
//! evenly spaced positions along the whole loop.

use glam::Vec3;

use crate::error::{Result, TrackError};
use crate::geometry::normalize;
use crate::path::TrackPath;

/// Knot parametrization exponent: 0.5 is centripetal (no cusps or self-loops)
const ALPHA: f32 = 0.5;

/// Arc-length samples taken per span
const SAMPLES_PER_SPAN: usize = 16;

/// Smallest knot interval; only reached by coincident control points
const MIN_KNOT: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HermiteSpan {
    a: Vec3,
    b: Vec3,
    m1: Vec3,
    p1: Vec3,
    chord: Vec3,
}

impl HermiteSpan {
    fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let t01 = knot(p0, p1);
        let t12 = knot(p1, p2);
        let t23 = knot(p2, p3);

        let m1 = p2 - p1 + t12 * ((p1 - p0) / t01 - (p2 - p0) / (t01 + t12));
        let m2 = p2 - p1 + t12 * ((p3 - p2) / t23 - (p3 - p1) / (t12 + t23));

        Self {
            a: 2.0 * (p1 - p2) + m1 + m2,
            b: -3.0 * (p1 - p2) - 2.0 * m1 - m2,
            m1,
            p1,
            chord: p2 - p1,
        }
    }

    #[inline]
    fn position(&self, s: f32) -> Vec3 {
        ((self.a * s + self.b) * s + self.m1) * s + self.p1
    }

    #[inline]
    fn derivative(&self, s: f32) -> Vec3 {
        (3.0 * self.a * s + 2.0 * self.b) * s + self.m1
    }
}

#[inline]
fn knot(a: Vec3, b: Vec3) -> f32 {
    a.distance(b).powf(ALPHA).max(MIN_KNOT)
}

/// A closed curve through every vertex of a loop
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedSpline {
    points: Vec<Vec3>,
    spans: Vec<HermiteSpan>,
    /// Cumulative length at every table sample; `SAMPLES_PER_SPAN` per span plus one
    arc_lengths: Vec<f32>,
}

impl ClosedSpline {
    /// Build a spline through `points` (unique vertices, not repeating the first)
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for fewer than three points
    pub fn new(points: &[Vec3]) -> Result<Self> {
        if points.len() < 3 {
            return Err(TrackError::InvalidConfig(format!(
                "a closed spline needs at least 3 points (got {})",
                points.len()
            )));
        }

        let n = points.len();
        let spans: Vec<HermiteSpan> = (0..n)
            .map(|i| {
                HermiteSpan::new(
                    points[(i + n - 1) % n],
                    points[i],
                    points[(i + 1) % n],
                    points[(i + 2) % n],
                )
            })
            .collect();

        let mut arc_lengths = Vec::with_capacity(n * SAMPLES_PER_SPAN + 1);
        let mut total = 0.0;
        let mut previous = points[0];
        arc_lengths.push(0.0);

        for span in &spans {
            for j in 1..=SAMPLES_PER_SPAN {
                let current = span.position(j as f32 / SAMPLES_PER_SPAN as f32);
                total += previous.distance(current);
                arc_lengths.push(total);
                previous = current;
            }
        }

        Ok(Self {
            points: points.to_vec(),
            spans,
            arc_lengths,
        })
    }

    /// Spline through the unique vertices of a track path
    pub fn from_path(path: &TrackPath) -> Result<Self> {
        Self::new(path.points())
    }

    /// Control points
    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Approximate arc length of the whole loop
    #[inline]
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Position at normalized arc parameter `t` (wrapped into `[0, 1)`)
    pub fn evaluate(&self, t: f32) -> Vec3 {
        let (span, s) = self.locate(t);
        self.spans[span].position(s)
    }

    /// Unit tangent at normalized arc parameter `t`
    pub fn tangent(&self, t: f32) -> Vec3 {
        let (span, s) = self.locate(t);
        self.span_tangent(span, s)
    }

    /// Position and unit tangent at `t`
    pub fn sample(&self, t: f32) -> (Vec3, Vec3) {
        let (span, s) = self.locate(t);
        (self.spans[span].position(s), self.span_tangent(span, s))
    }

    fn span_tangent(&self, span: usize, s: f32) -> Vec3 {
        let hermite = &self.spans[span];
        let tangent = normalize(hermite.derivative(s));
        if tangent == Vec3::ZERO {
            normalize(hermite.chord)
        } else {
            tangent
        }
    }

    /// Map a normalized arc parameter to `(span, local parameter)`
    fn locate(&self, t: f32) -> (usize, f32) {
        let t = if t.is_finite() { t.rem_euclid(1.0) } else { 0.0 };
        let target = t * self.length();

        // Last table entry whose cumulative length is <= target
        let upper = self.arc_lengths.partition_point(|&l| l <= target);
        let lo = upper.saturating_sub(1).min(self.arc_lengths.len() - 2);

        let start = self.arc_lengths[lo];
        let end = self.arc_lengths[lo + 1];
        let fraction = if end > start {
            ((target - start) / (end - start)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let global = (lo as f32 + fraction) / SAMPLES_PER_SPAN as f32;
        let span = (global.floor() as usize).min(self.spans.len() - 1);
        (span, (global - span as f32).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::TAU;

    fn polygon(count: usize, radius: f32) -> Vec<Vec3> {
        (0..count)
            .map(|i| {
                let angle = -(i as f32) / count as f32 * TAU;
                Vec3::new(angle.cos(), angle.sin(), 0.0) * radius
            })
            .collect()
    }

    #[test]
    fn test_requires_three_points() {
        assert!(ClosedSpline::new(&[Vec3::ZERO, Vec3::X]).is_err());
        assert!(ClosedSpline::new(&[Vec3::ZERO, Vec3::X, Vec3::Y]).is_ok());
    }

    #[test]
    fn test_starts_at_first_point_and_closes() {
        let points = polygon(6, 10.0);
        let spline = ClosedSpline::new(&points).unwrap();

        let start = spline.evaluate(0.0);
        assert!(start.distance(points[0]) < 1e-4);
        assert!(spline.evaluate(1.0).distance(start) < 1e-4);
        assert!(spline.evaluate(0.999_99).distance(start) < 1e-2);
    }

    #[test]
    fn test_passes_through_control_points() {
        let points = polygon(5, 4.0);
        let spline = ClosedSpline::new(&points).unwrap();

        for (span, point) in spline.spans.iter().zip(points.iter()) {
            assert!(span.position(0.0).distance(*point) < 1e-5);
        }
        assert!(spline.spans[4].position(1.0).distance(points[0]) < 1e-4);
    }

    #[test]
    fn test_length_of_circle() {
        let spline = ClosedSpline::new(&polygon(32, 5.0)).unwrap();
        let circumference = TAU * 5.0;

        assert!((spline.length() - circumference).abs() / circumference < 1e-2);
    }

    #[test]
    fn test_even_arc_spacing() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(2.0, 10.0, 0.0),
            Vec3::new(20.0, 8.0, 0.0),
            Vec3::new(15.0, 0.0, 0.0),
        ];
        let spline = ClosedSpline::new(&points).unwrap();
        let count = 200;
        let expected = spline.length() / count as f32;

        for k in 0..count {
            let a = spline.evaluate(k as f32 / count as f32);
            let b = spline.evaluate((k + 1) as f32 / count as f32);
            assert!((a.distance(b) - expected).abs() < expected * 0.15);
        }
    }

    #[test]
    fn test_wraps_negative_parameter() {
        let spline = ClosedSpline::new(&polygon(8, 3.0)).unwrap();

        assert!(spline.evaluate(-0.25).distance(spline.evaluate(0.75)) < 1e-4);
        assert!(spline.evaluate(1.5).distance(spline.evaluate(0.5)) < 1e-4);
    }

    #[test]
    fn test_tangent_is_unit_and_follows_winding() {
        let spline = ClosedSpline::new(&polygon(12, 6.0)).unwrap();

        for k in 0..24 {
            let (position, tangent) = spline.sample(k as f32 / 24.0);
            assert_abs_diff_eq!(tangent.length(), 1.0, epsilon = 1e-4);
            // Clockwise loop around the origin
            assert!(position.cross(tangent).z < 0.0);
        }
    }
}

//! Bezier motion paths through (or guided by) waypoints.
//!
//! Two flavours mirror how flight paths are authored in the scene:
//!
//! - [`BezierKind::Thru`] passes through every waypoint. Each span is a
//!   cubic segment whose handles come from the Catmull-Rom tangent of the
//!   neighbouring points.
//! - [`BezierKind::Soft`] treats waypoints as control points. Quadratic
//!   segments join the midpoints between consecutive controls, so only the
//!   first and last points are hit exactly.
//!
//! Paths are arc-length parameterized: [`BezierPath::sample`] maps progress
//! to a distance along the curve, so speed depends only on the easing.

use glam::Vec3;

/// Samples per segment in the arc-length table.
const SAMPLES_PER_SEGMENT: u32 = 24;

/// Handle length relative to the Catmull-Rom tangent.
const CURVINESS: f32 = 1.0;

/// Arc lengths below this fraction of the points' magnitude count as no
/// movement; the handle arithmetic leaves rounding noise on repeated points.
const STATIONARY_TOLERANCE: f32 = 1e-5;

/// How waypoints shape the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BezierKind {
    /// Curve passes through every point.
    #[default]
    Thru,
    /// Points are control points; only the ends are hit.
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Curve {
    Line([Vec3; 2]),
    Quadratic([Vec3; 3]),
    Cubic([Vec3; 4]),
}

impl Curve {
    fn eval(&self, t: f32) -> Vec3 {
        let u = 1.0 - t;
        match self {
            Curve::Line([a, b]) => a.lerp(*b, t),
            Curve::Quadratic([a, c, b]) => *a * (u * u) + *c * (2.0 * u * t) + *b * (t * t),
            Curve::Cubic([a, c1, c2, b]) => {
                *a * (u * u * u)
                    + *c1 * (3.0 * u * u * t)
                    + *c2 * (3.0 * u * t * t)
                    + *b * (t * t * t)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TableEntry {
    distance: f32,
    segment: u32,
    t: f32,
}

/// A piecewise Bezier curve with an arc-length lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierPath {
    curves: Vec<Curve>,
    table: Vec<TableEntry>,
    end: Vec3,
    stationary: bool,
}

impl BezierPath {
    /// Build a path. `points[0]` is the start; the rest are waypoints.
    ///
    /// A single point yields a stationary path.
    #[must_use]
    pub fn new(kind: BezierKind, points: &[Vec3]) -> Self {
        let curves = match kind {
            BezierKind::Thru => thru_curves(points),
            BezierKind::Soft => soft_curves(points),
        };
        let end = points.last().copied().unwrap_or(Vec3::ZERO);
        let table = build_table(&curves);
        let magnitude = points
            .iter()
            .fold(1.0_f32, |m, p| m.max(p.abs().max_element()));
        let travelled = table.last().map_or(0.0, |e| e.distance);
        let stationary = points.windows(2).all(|w| w[0] == w[1])
            || travelled <= magnitude * STATIONARY_TOLERANCE;
        Self {
            curves,
            table,
            end,
            stationary,
        }
    }

    /// Total arc length.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.table.last().map_or(0.0, |e| e.distance)
    }

    /// Number of curve segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.curves.len()
    }

    /// Position at progress `s` in `[0, 1]` measured along the arc.
    #[must_use]
    pub fn sample(&self, s: f32) -> Vec3 {
        if self.stationary || self.curves.is_empty() || s >= 1.0 {
            return self.end;
        }
        let total = self.length();
        let target = s.max(0.0) * total;
        let upper = self
            .table
            .partition_point(|e| e.distance < target)
            .clamp(1, self.table.len() - 1);
        let hi = self.table[upper];
        let lo = self.table[upper - 1];
        let (segment, t) = if lo.segment == hi.segment {
            let span = hi.distance - lo.distance;
            let f = if span > 0.0 {
                (target - lo.distance) / span
            } else {
                0.0
            };
            (hi.segment, lo.t + (hi.t - lo.t) * f)
        } else {
            (hi.segment, hi.t)
        };
        self.curves[segment as usize].eval(t)
    }
}

fn thru_curves(points: &[Vec3]) -> Vec<Curve> {
    match points.len() {
        0 | 1 => Vec::new(),
        2 => vec![Curve::Line([points[0], points[1]])],
        n => (0..n - 1)
            .map(|i| {
                let p0 = points[i.saturating_sub(1)];
                let p1 = points[i];
                let p2 = points[i + 1];
                let p3 = points[(i + 2).min(n - 1)];
                let c1 = p1 + (p2 - p0) * (CURVINESS / 6.0);
                let c2 = p2 - (p3 - p1) * (CURVINESS / 6.0);
                Curve::Cubic([p1, c1, c2, p2])
            })
            .collect(),
    }
}

fn soft_curves(points: &[Vec3]) -> Vec<Curve> {
    match points.len() {
        0 | 1 => Vec::new(),
        2 => vec![Curve::Line([points[0], points[1]])],
        n => (1..n - 1)
            .map(|i| {
                let start = if i == 1 {
                    points[0]
                } else {
                    points[i - 1].midpoint(points[i])
                };
                let end = if i == n - 2 {
                    points[n - 1]
                } else {
                    points[i].midpoint(points[i + 1])
                };
                Curve::Quadratic([start, points[i], end])
            })
            .collect(),
    }
}

fn build_table(curves: &[Curve]) -> Vec<TableEntry> {
    let mut table = Vec::with_capacity(curves.len() * (SAMPLES_PER_SEGMENT as usize + 1));
    let mut distance = 0.0;
    for (segment, curve) in curves.iter().enumerate() {
        let mut prev = curve.eval(0.0);
        table.push(TableEntry {
            distance,
            segment: segment as u32,
            t: 0.0,
        });
        for k in 1..=SAMPLES_PER_SEGMENT {
            let t = k as f32 / SAMPLES_PER_SEGMENT as f32;
            let p = curve.eval(t);
            distance += p.distance(prev);
            prev = p;
            table.push(TableEntry {
                distance,
                segment: segment as u32,
                t,
            });
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3, eps: f32) -> bool {
        (a - b).length() < eps
    }

    #[test]
    fn thru_hits_every_waypoint() {
        let points = [
            Vec3::new(-50.0, -5.0, -6.0),
            Vec3::new(-25.0, -3.0, -6.0),
            Vec3::new(1.0, -8.0, -6.0),
            Vec3::new(50.0, 0.0, -6.0),
        ];
        let path = BezierPath::new(BezierKind::Thru, &points);
        assert_eq!(path.segment_count(), 3);
        assert!(close(path.sample(0.0), points[0], 1e-3));
        assert!(close(path.sample(1.0), points[3], 1e-3));
        // Interior waypoints lie on the curve: the closest sample is near.
        for p in &points[1..3] {
            let best = (0..=2000)
                .map(|k| path.sample(k as f32 / 2000.0).distance(*p))
                .fold(f32::MAX, f32::min);
            assert!(best < 0.1, "waypoint {p:?} missed by {best}");
        }
    }

    #[test]
    fn soft_starts_and_ends_on_points_but_skips_controls() {
        let points = [
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(8.0, 0.0, 4.0),
            Vec3::new(300.0, 0.0, -200.0),
            Vec3::new(800.0, 0.0, 600.0),
        ];
        let path = BezierPath::new(BezierKind::Soft, &points);
        assert_eq!(path.segment_count(), 2);
        assert!(close(path.sample(0.0), points[0], 1e-3));
        assert!(close(path.sample(1.0), points[3], 1e-3));
        let best = (0..=2000)
            .map(|k| path.sample(k as f32 / 2000.0).distance(points[2]))
            .fold(f32::MAX, f32::min);
        assert!(best > 1.0);
    }

    #[test]
    fn progress_is_arc_length_uniform() {
        // Very uneven spacing: a short hop then a long run.
        let points = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(100.0, 0.0, 0.0)];
        let path = BezierPath::new(BezierKind::Thru, &points);
        let total = path.length();
        let mid = path.sample(0.5);
        let walked = (0..=500)
            .map(|k| path.sample(k as f32 / 1000.0))
            .collect::<Vec<_>>()
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum::<f32>();
        assert!((walked - total / 2.0).abs() < total * 0.02);
        assert!(mid.x > 40.0 && mid.x < 60.0);
    }

    #[test]
    fn two_points_is_a_straight_line() {
        let path = BezierPath::new(BezierKind::Soft, &[Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0)]);
        assert!(close(path.sample(0.25), Vec3::new(0.0, 2.5, 0.0), 1e-4));
    }

    #[test]
    fn degenerate_paths_return_end() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        let single = BezierPath::new(BezierKind::Thru, &[p]);
        assert_eq!(single.sample(0.3), p);
        let repeated = BezierPath::new(BezierKind::Thru, &[p, p, p]);
        assert_eq!(repeated.sample(0.7), p);
        let soft = BezierPath::new(BezierKind::Soft, &[p, p, p, p]);
        assert_eq!(soft.sample(0.5), p);
    }

    #[test]
    fn rounding_noise_on_a_held_position_is_not_motion() {
        // Jitter anchors far from the origin with a zero offset.
        let p = Vec3::new(15.0, -10.0, -40.0);
        let q = p + Vec3::splat(1e-6);
        let path = BezierPath::new(BezierKind::Thru, &[p, q, p]);
        for k in 0..=10 {
            assert_eq!(path.sample(k as f32 / 10.0), p);
        }
    }
}

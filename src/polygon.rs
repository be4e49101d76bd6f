//! Planar polygons and convex clipping
//!
//! Cells and clip regions are ordered corner lists. Only convex polygons are
//! meaningful clippers; `convex_clip` makes no attempt to handle concave ones.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Check whether a point lies inside or on the box
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// A simple polygon given by its corners in order
///
/// The closing edge from the last corner back to the first is implicit.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    points: Vec<DVec2>,
}

impl Polygon {
    /// Create an empty polygon
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polygon from an ordered list of corners
    pub fn from_points(points: Vec<DVec2>) -> Self {
        Self { points }
    }

    /// Append a corner
    pub fn add(&mut self, x: f64, y: f64) {
        self.points.push(DVec2::new(x, y));
    }

    #[inline]
    pub fn push(&mut self, point: DVec2) {
        self.points.push(point);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Corners in order
    #[inline]
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn into_points(self) -> Vec<DVec2> {
        self.points
    }

    /// Iterate over the edges as `(start, end)` pairs, closing edge included
    pub fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Shoelace area, positive for counter-clockwise corner order
    pub fn signed_area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        self.edges().map(|(a, b)| a.perp_dot(b)).sum::<f64>() * 0.5
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Reverse the corner order, flipping the orientation
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Area centroid
    ///
    /// Returns `None` for polygons without area.
    pub fn centroid(&self) -> Option<DVec2> {
        let area = self.signed_area();
        if area == 0.0 || !area.is_finite() {
            return None;
        }

        let mut acc = DVec2::ZERO;
        for (a, b) in self.edges() {
            acc += (a + b) * a.perp_dot(b);
        }
        Some(acc / (6.0 * area))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.points.first()?;
        let (min, max) = self
            .points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Bounds { min, max })
    }

    /// Check whether the corners describe a convex polygon
    ///
    /// Collinear corners are tolerated. The outline must turn in one
    /// direction only and wind around exactly once.
    pub fn is_convex(&self) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }

        let mut sign = 0.0;
        let mut turning = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let c = self.points[(i + 2) % n];
            let ab = b - a;
            let bc = c - b;
            let cross = ab.perp_dot(bc);
            if cross != 0.0 {
                if sign != 0.0 && cross.signum() != sign {
                    return false;
                }
                sign = cross.signum();
            }
            turning += cross.atan2(ab.dot(bc));
        }

        sign != 0.0 && (turning.abs() - std::f64::consts::TAU).abs() < 1e-6
    }

    /// Point-in-polygon test by ray crossing
    pub fn contains(&self, point: DVec2) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Intersect this polygon with a convex clipper
    ///
    /// Sutherland-Hodgman: the subject is cut by every edge of `clipper` in
    /// turn. The clipper may be given in either orientation. Corners of
    /// `self` that lie inside the clipper are kept bit-for-bit. Returns an
    /// empty polygon when fewer than three corners survive.
    ///
    /// The result is only correct when `clipper` is convex.
    ///
    /// # Example
    ///
    /// ```
    /// use power_diagram::Polygon;
    /// use glam::DVec2;
    ///
    /// let square = Polygon::from_points(vec![
    ///     DVec2::new(0.0, 0.0),
    ///     DVec2::new(2.0, 0.0),
    ///     DVec2::new(2.0, 2.0),
    ///     DVec2::new(0.0, 2.0),
    /// ]);
    /// let shifted = Polygon::from_points(vec![
    ///     DVec2::new(1.0, 1.0),
    ///     DVec2::new(3.0, 1.0),
    ///     DVec2::new(3.0, 3.0),
    ///     DVec2::new(1.0, 3.0),
    /// ]);
    ///
    /// let overlap = square.convex_clip(&shifted);
    /// assert!((overlap.area() - 1.0).abs() < 1e-12);
    /// ```
    pub fn convex_clip(&self, clipper: &Polygon) -> Polygon {
        if self.points.len() < 3 || clipper.points.len() < 3 {
            return Polygon::new();
        }

        let orientation = clipper.signed_area().signum();
        if clipper.signed_area() == 0.0 || orientation.is_nan() {
            return Polygon::new();
        }

        let mut output = self.points.clone();
        for (edge_start, edge_end) in clipper.edges() {
            if output.is_empty() {
                break;
            }
            if edge_start == edge_end {
                continue;
            }

            let sides: Vec<f64> = output
                .iter()
                .map(|&p| orientation * (edge_end - edge_start).perp_dot(p - edge_start))
                .collect();

            if sides.iter().all(|&s| s >= 0.0) {
                continue;
            }

            output = clip_by_edge(&output, &sides);
        }

        if output.len() < 3 {
            return Polygon::new();
        }
        Polygon::from_points(output)
    }
}

/// Keep the part of `subject` on the non-negative side of one clip line
///
/// `sides[i]` is the signed distance (scaled) of `subject[i]` to the line.
fn clip_by_edge(subject: &[DVec2], sides: &[f64]) -> Vec<DVec2> {
    let n = subject.len();
    let mut output = Vec::with_capacity(n + 1);

    let mut prev = subject[n - 1];
    let mut prev_side = sides[n - 1];

    for (&current, &current_side) in subject.iter().zip(sides) {
        let prev_inside = prev_side >= 0.0;
        let current_inside = current_side >= 0.0;

        match (prev_inside, current_inside) {
            (true, true) => output.push(current),
            (true, false) => {
                // prev on the line is already in the output
                if prev_side > 0.0 {
                    output.push(intersect(prev, prev_side, current, current_side));
                }
            }
            (false, true) => {
                if current_side > 0.0 {
                    output.push(intersect(prev, prev_side, current, current_side));
                }
                output.push(current);
            }
            (false, false) => {}
        }

        prev = current;
        prev_side = current_side;
    }

    output
}

#[inline]
fn intersect(a: DVec2, side_a: f64, b: DVec2, side_b: f64) -> DVec2 {
    let t = side_a / (side_a - side_b);
    a + (b - a) * t
}

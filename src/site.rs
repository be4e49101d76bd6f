//! Weighted site structure
//!
//! A site is the input unit of a power diagram. After a computation it also
//! carries its cell polygon and the indices of its neighbouring sites.

use glam::{DVec2, DVec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::polygon::Polygon;

/// A weighted point together with the cell the diagram assigned to it
///
/// Larger weights grow a site's cell at the expense of its neighbours. The
/// cell boundary between two sites is where their power distances
/// (`|p - s|² - weight`) are equal.
///
/// # Result fields
///
/// `polygon`, `non_clipped_polygon` and `neighbours` are written by
/// [`PowerDiagram::compute_diagram`](crate::PowerDiagram::compute_diagram).
/// A site whose cell is empty (its weight is dominated by its neighbours, or
/// the cell misses the clip region) keeps `polygon() == None`; callers must
/// check before use.
///
/// # Boundary sites
///
/// There is no dummy flag on `Site`. The four synthetic sites that bound the
/// diagram are created by [`PowerDiagram`](crate::PowerDiagram) from the clip
/// region and exist only inside the hull as
/// [`HullSite::Boundary`](crate::hull::HullSite); they never appear in the
/// site list or in any neighbour list.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub x: f64,
    pub y: f64,
    weight: f64,

    /// Cell clipped to the diagram's clip region
    polygon: Option<Polygon>,

    /// Cell before clipping, bounded only by the boundary sites
    non_clipped_polygon: Option<Polygon>,

    /// Indices of sites sharing a cell edge, in the order found around the cell
    neighbours: Vec<usize>,
}

impl Site {
    /// Create a new site with the given weight
    pub fn new(x: f64, y: f64, weight: f64) -> Self {
        Self {
            x,
            y,
            weight,
            polygon: None,
            non_clipped_polygon: None,
            neighbours: Vec::new(),
        }
    }

    /// Create an unweighted site; its cell is an ordinary Voronoi cell
    pub fn unweighted(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0)
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Power distance from `point` to this site: `|point - site|² - weight`
    #[inline]
    pub fn power_distance(&self, point: DVec2) -> f64 {
        point.distance_squared(self.position()) - self.weight
    }

    /// Lifted point `(x, y, x² + y² - weight)`
    #[inline]
    pub fn lifted(&self) -> DVec3 {
        lift(self.position(), self.weight)
    }

    /// Reset the result fields, keeping position and weight
    pub fn clear(&mut self) {
        self.polygon = None;
        self.non_clipped_polygon = None;
        self.neighbours.clear();
    }

    #[inline]
    pub fn polygon(&self) -> Option<&Polygon> {
        self.polygon.as_ref()
    }

    #[inline]
    pub fn non_clipped_polygon(&self) -> Option<&Polygon> {
        self.non_clipped_polygon.as_ref()
    }

    #[inline]
    pub fn neighbours(&self) -> &[usize] {
        &self.neighbours
    }

    #[inline]
    pub fn neighbour_count(&self) -> usize {
        self.neighbours.len()
    }

    /// Check if the site at `other` shares a cell edge with this one
    #[inline]
    pub fn is_neighbour_of(&self, other: usize) -> bool {
        self.neighbours.contains(&other)
    }

    /// Area of the clipped cell, zero when there is none
    pub fn cell_area(&self) -> f64 {
        self.polygon.as_ref().map(Polygon::area).unwrap_or(0.0)
    }

    pub(crate) fn set_cell(
        &mut self,
        non_clipped: Polygon,
        clipped: Option<Polygon>,
        neighbours: Vec<usize>,
    ) {
        self.non_clipped_polygon = Some(non_clipped);
        self.polygon = clipped;
        self.neighbours = neighbours;
    }
}

/// The lifting map `(x, y, w) -> (x, y, x² + y² - w)`
///
/// Lower convex hull faces of lifted sites are in one-to-one correspondence
/// with the vertices of their power diagram.
#[inline]
pub fn lift(position: DVec2, weight: f64) -> DVec3 {
    DVec3::new(position.x, position.y, position.length_squared() - weight)
}

//! Convex hull of lifted sites
//!
//! The power diagram of a set of weighted sites is the projection of the
//! lower convex hull of their lifted points. This module collects lifted
//! points, hands them to parry's 3D convex hull and turns the resulting
//! triangle soup into a half-edge mesh whose vertices remember which site
//! they came from.

mod mesh;

pub use mesh::{Face, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, HullSite, MeshVertex, VertexId};

use glam::DVec3;
use log::trace;
use parry3d_f64::math::Point;
use parry3d_f64::transformation;

use crate::error::{DiagramError, Result};
use crate::spatial::SpatialIndex;

/// Relative distance allowed between a hull vertex and the input point it is
/// matched to. parry renormalizes its input, so the two are not bit-identical.
const VERTEX_MATCH_TOLERANCE: f64 = 1e-9;

/// A lifted site ready to be added to the hull
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiftedPoint {
    pub position: DVec3,
    pub site: HullSite,
}

impl LiftedPoint {
    pub fn new(position: DVec3, site: HullSite) -> Self {
        Self { position, site }
    }
}

/// Accumulates lifted points and computes their convex hull
#[derive(Debug, Clone, Default)]
pub struct ConvexHull {
    points: Vec<LiftedPoint>,
}

impl ConvexHull {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn add_point(&mut self, point: LiftedPoint) {
        self.points.push(point);
    }

    /// Number of points added so far
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Compute the hull of all added points
    ///
    /// Points strictly inside the hull do not become mesh vertices. Mesh
    /// vertices carry the exact lifted position that was added, not parry's
    /// round-tripped copy.
    ///
    /// # Errors
    ///
    /// `HullFailed` if fewer than four points were added, if parry fails
    /// (e.g. all points are coplanar), or if its output is not a closed mesh.
    pub fn compute(&self) -> Result<HalfEdgeMesh> {
        if self.points.len() < 4 {
            return Err(DiagramError::HullFailed(format!(
                "need at least 4 points, got {}",
                self.points.len()
            )));
        }

        let input: Vec<Point<f64>> = self
            .points
            .iter()
            .map(|p| Point::new(p.position.x, p.position.y, p.position.z))
            .collect();

        let (hull_points, triangles) = transformation::try_convex_hull(&input)
            .map_err(|e| DiagramError::HullFailed(format!("{:?}", e)))?;

        if triangles.is_empty() {
            return Err(DiagramError::HullFailed(
                "hull has no facets, input is degenerate".to_string(),
            ));
        }

        let vertices = self.match_vertices(&hull_points)?;
        let triangles = orient_outward(&vertices, triangles);

        trace!(
            "hull: {} input points, {} vertices, {} facets",
            self.points.len(),
            vertices.len(),
            triangles.len()
        );

        HalfEdgeMesh::from_triangles(vertices, &triangles)
    }

    /// Pair every hull output point with the input point it was copied from
    fn match_vertices(&self, hull_points: &[Point<f64>]) -> Result<Vec<MeshVertex>> {
        let positions: Vec<DVec3> = self.points.iter().map(|p| p.position).collect();
        let index = SpatialIndex::new(&positions);

        hull_points
            .iter()
            .map(|p| {
                let query = DVec3::new(p.x, p.y, p.z);
                let source = index
                    .find_nearest(query)
                    .map(|id| self.points[id])
                    .ok_or_else(|| DiagramError::HullFailed("empty point index".to_string()))?;

                let scale = 1.0 + source.position.abs().max_element();
                if source.position.distance(query) > VERTEX_MATCH_TOLERANCE * scale {
                    return Err(DiagramError::HullFailed(format!(
                        "hull vertex {:?} does not match any input point",
                        query
                    )));
                }

                Ok(MeshVertex {
                    position: source.position,
                    site: source.site,
                })
            })
            .collect()
    }
}

/// Flip every triangle if the hull came out wound inward
///
/// The sign of the summed tetrahedron volumes against the vertex centroid
/// gives the winding of the whole closed mesh.
fn orient_outward(vertices: &[MeshVertex], mut triangles: Vec<[u32; 3]>) -> Vec<[u32; 3]> {
    let centroid = vertices
        .iter()
        .fold(DVec3::ZERO, |acc, v| acc + v.position)
        / vertices.len() as f64;

    let volume: f64 = triangles
        .iter()
        .map(|tri| {
            let [a, b, c] = tri.map(|v| vertices[v as usize].position);
            (b - a).cross(c - a).dot(a - centroid)
        })
        .sum();

    if volume < 0.0 {
        for tri in &mut triangles {
            tri.swap(1, 2);
        }
    }

    triangles
}

//! Half-edge mesh of a lifted convex hull
//!
//! Index-based arena storage: vertices, half-edges and faces live in flat
//! vectors and refer to each other by `u32` ids.

use glam::{DVec2, DVec3};
use std::collections::HashMap;

use crate::error::{DiagramError, Result};

/// Index into the half-edge array
pub type HalfEdgeId = u32;
/// Index into the vertex array
pub type VertexId = u32;
/// Index into the face array
pub type FaceId = u32;

/// What a hull vertex stands for in the plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HullSite {
    /// Index of a caller site
    Real(usize),
    /// One of the four synthetic corner sites bounding the diagram
    Boundary(usize),
}

impl HullSite {
    #[inline]
    pub fn real(self) -> Option<usize> {
        match self {
            HullSite::Real(id) => Some(id),
            HullSite::Boundary(_) => None,
        }
    }

    #[inline]
    pub fn is_boundary(self) -> bool {
        matches!(self, HullSite::Boundary(_))
    }
}

/// A hull vertex
#[derive(Debug, Clone, Copy)]
pub struct MeshVertex {
    /// Lifted position, exactly as it was added to the hull
    pub position: DVec3,
    pub site: HullSite,
}

/// A directed edge of one triangular face
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    pub origin: VertexId,
    /// Opposite half-edge, belonging to the adjacent face
    pub twin: HalfEdgeId,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    pub face: FaceId,
}

/// A triangular hull facet
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// First of the three half-edges; the others follow at `edge + 1`, `edge + 2`
    pub edge: HalfEdgeId,
    /// Outward normal (not normalized)
    pub normal: DVec3,
    /// A point on the facet's plane
    pub anchor: DVec3,
}

impl Face {
    /// Whether the outward normal points down, i.e. the facet is part of the
    /// lower hull and contributes a diagram vertex
    #[inline]
    pub fn is_visible_from_below(&self) -> bool {
        self.normal.z < 0.0
    }

    /// The planar point dual to this facet's plane
    ///
    /// For the lifting `z = x² + y² - w` the plane `n · (p - anchor) = 0`
    /// dualizes to `(-n.x / 2n.z, -n.y / 2n.z)`, the point with equal power
    /// distance to the facet's three sites. `None` for vertical facets.
    pub fn dual_point(&self) -> Option<DVec2> {
        if self.normal.z == 0.0 {
            return None;
        }
        let scale = -0.5 / self.normal.z;
        Some(DVec2::new(self.normal.x * scale, self.normal.y * scale))
    }

    /// Half-edge `i` (0..3) of this face
    #[inline]
    pub fn edge(&self, i: u32) -> HalfEdgeId {
        debug_assert!(i < 3);
        self.edge + i
    }
}

/// Closed triangle mesh with twin links on every half-edge
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh {
    vertices: Vec<MeshVertex>,
    half_edges: Vec<HalfEdge>,
    faces: Vec<Face>,
}

impl HalfEdgeMesh {
    /// Build the mesh from consistently oriented triangles
    ///
    /// Every triangle must wind counter-clockwise seen from outside. Each
    /// directed edge may occur once and must have its reverse in another
    /// triangle, otherwise the hull is not a closed 2-manifold.
    pub fn from_triangles(vertices: Vec<MeshVertex>, triangles: &[[VertexId; 3]]) -> Result<Self> {
        let mut half_edges: Vec<HalfEdge> = Vec::with_capacity(triangles.len() * 3);
        let mut faces: Vec<Face> = Vec::with_capacity(triangles.len());

        // Map from directed edge (from, to) -> half-edge index for twin linking
        let mut edge_map: HashMap<(VertexId, VertexId), HalfEdgeId> =
            HashMap::with_capacity(triangles.len() * 3);

        for (fi, tri) in triangles.iter().enumerate() {
            if tri.iter().any(|&v| v as usize >= vertices.len()) {
                return Err(DiagramError::HullFailed(format!(
                    "triangle {} references a missing vertex",
                    fi
                )));
            }

            let face_id = fi as FaceId;
            let base = half_edges.len() as HalfEdgeId;

            for i in 0..3u32 {
                let from = tri[i as usize];
                let to = tri[((i + 1) % 3) as usize];

                half_edges.push(HalfEdge {
                    origin: from,
                    twin: HalfEdgeId::MAX,
                    next: base + (i + 1) % 3,
                    prev: base + (i + 2) % 3,
                    face: face_id,
                });

                if edge_map.insert((from, to), base + i).is_some() {
                    return Err(DiagramError::HullFailed(format!(
                        "edge {} -> {} is used by more than one face",
                        from, to
                    )));
                }
            }

            let [a, b, c] = tri.map(|v| vertices[v as usize].position);
            faces.push(Face {
                edge: base,
                normal: (b - a).cross(c - a),
                anchor: a,
            });
        }

        for he_idx in 0..half_edges.len() {
            let from = half_edges[he_idx].origin;
            let to = half_edges[half_edges[he_idx].next as usize].origin;

            match edge_map.get(&(to, from)) {
                Some(&twin) => half_edges[he_idx].twin = twin,
                None => {
                    return Err(DiagramError::HullFailed(format!(
                        "edge {} -> {} has no opposite half-edge",
                        from, to
                    )))
                }
            }
        }

        Ok(Self {
            vertices,
            half_edges,
            faces,
        })
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    #[inline]
    pub fn vertex(&self, v: VertexId) -> &MeshVertex {
        &self.vertices[v as usize]
    }

    #[inline]
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    #[inline]
    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f as usize]
    }

    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn origin(&self, e: HalfEdgeId) -> VertexId {
        self.half_edges[e as usize].origin
    }

    #[inline]
    pub fn destination(&self, e: HalfEdgeId) -> VertexId {
        self.origin(self.next(e))
    }

    #[inline]
    pub fn twin(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[e as usize].twin
    }

    #[inline]
    pub fn next(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[e as usize].next
    }

    #[inline]
    pub fn previous(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[e as usize].prev
    }

    #[inline]
    pub fn face_of(&self, e: HalfEdgeId) -> &Face {
        self.face(self.half_edges[e as usize].face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tetrahedron with outward counter-clockwise faces
    fn tetrahedron() -> HalfEdgeMesh {
        let positions = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
        ];
        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| MeshVertex {
                position,
                site: HullSite::Real(i),
            })
            .collect();
        let triangles = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];
        HalfEdgeMesh::from_triangles(vertices, &triangles).unwrap()
    }

    #[test]
    fn test_counts() {
        let mesh = tetrahedron();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.half_edge_count(), 12);
    }

    #[test]
    fn test_twin_links() {
        let mesh = tetrahedron();
        for e in 0..mesh.half_edge_count() as HalfEdgeId {
            let t = mesh.twin(e);
            assert_ne!(t, e);
            assert_eq!(mesh.twin(t), e);
            assert_eq!(mesh.origin(t), mesh.destination(e));
            assert_eq!(mesh.destination(t), mesh.origin(e));
        }
    }

    #[test]
    fn test_next_prev_cycle() {
        let mesh = tetrahedron();
        for e in 0..mesh.half_edge_count() as HalfEdgeId {
            assert_eq!(mesh.next(mesh.next(mesh.next(e))), e);
            assert_eq!(mesh.previous(mesh.next(e)), e);
            assert_eq!(mesh.destination(mesh.previous(e)), mesh.origin(e));
        }
    }

    #[test]
    fn test_visibility() {
        let mesh = tetrahedron();
        let below: Vec<bool> = mesh.faces().iter().map(Face::is_visible_from_below).collect();
        // Only the z = 0 facet faces down
        assert_eq!(below, vec![true, false, false, false]);
    }

    #[test]
    fn test_ring_around_vertex() {
        let mesh = tetrahedron();
        // Every vertex of a tetrahedron has three incident faces
        for start in 0..mesh.half_edge_count() as HalfEdgeId {
            let v = mesh.destination(start);
            let mut e = start;
            let mut steps = 0;
            loop {
                e = mesh.previous(mesh.twin(e));
                assert_eq!(mesh.destination(e), v);
                steps += 1;
                if e == start {
                    break;
                }
            }
            assert_eq!(steps, 3);
        }
    }

    #[test]
    fn test_dual_point() {
        // Plane z = 2x + 4y + 1 through lifted points, normal pointing down
        let face = Face {
            edge: 0,
            normal: DVec3::new(2.0, 4.0, -1.0),
            anchor: DVec3::new(0.0, 0.0, 1.0),
        };
        assert!(face.is_visible_from_below());
        assert_eq!(face.dual_point(), Some(DVec2::new(1.0, 2.0)));

        let vertical = Face {
            edge: 0,
            normal: DVec3::new(1.0, 0.0, 0.0),
            anchor: DVec3::ZERO,
        };
        assert_eq!(vertical.dual_point(), None);
    }

    #[test]
    fn test_open_mesh_rejected() {
        let vertices = (0..3)
            .map(|i| MeshVertex {
                position: DVec3::new(i as f64, (i * i) as f64, 0.0),
                site: HullSite::Boundary(i),
            })
            .collect();
        let result = HalfEdgeMesh::from_triangles(vertices, &[[0, 1, 2]]);
        assert!(matches!(result, Err(DiagramError::HullFailed(_))));
    }

    #[test]
    fn test_hull_site() {
        assert_eq!(HullSite::Real(4).real(), Some(4));
        assert_eq!(HullSite::Boundary(1).real(), None);
        assert!(HullSite::Boundary(0).is_boundary());
    }
}

//! Cell extraction from the lifted hull
//!
//! Every lower hull facet is a diagram vertex and every hull vertex is a
//! cell. Walking the ring of facets around a hull vertex yields the cell's
//! corners in order, and the far ends of the ring's edges are its neighbours.

use glam::DVec2;

use super::Frame;
use crate::hull::{HalfEdgeId, HalfEdgeMesh};
use crate::polygon::Polygon;

/// Raw cell of one real site, before clipping
#[derive(Debug, Clone)]
pub(crate) struct ExtractedCell {
    pub site: usize,
    /// Deduplicated corners in world coordinates, counter-clockwise
    pub corners: Vec<DVec2>,
    pub neighbours: Vec<usize>,
}

/// Walk the mesh once and build the raw cell of every real site on the
/// lower hull
///
/// Dual points are mapped out of `frame` before deduplication, so
/// `tolerance` is in world units. Sites whose lifted point is not a hull
/// vertex, or only touches upper facets, produce no cell.
pub(crate) fn extract_cells(
    mesh: &HalfEdgeMesh,
    frame: &Frame,
    tolerance: f64,
) -> Vec<ExtractedCell> {
    let mut visited = vec![false; mesh.vertex_count()];
    let mut cells = Vec::new();

    for face in mesh.faces().iter().filter(|f| f.is_visible_from_below()) {
        for i in 0..3 {
            let edge = face.edge(i);
            let dest = mesh.destination(edge);

            if visited[dest as usize] {
                continue;
            }
            visited[dest as usize] = true;

            let Some(site) = mesh.vertex(dest).site.real() else {
                continue;
            };

            let (corners, neighbours) = walk_ring(mesh, edge, site);
            let corners = corners.into_iter().map(|p| frame.to_world(p)).collect();
            cells.push(ExtractedCell {
                site,
                corners: counter_clockwise(dedup_corners(corners, tolerance)),
                neighbours,
            });
        }
    }

    cells
}

/// Collect dual points and neighbouring sites around the destination of
/// `start`, in ring order
///
/// `previous(twin(e))` is the next half-edge ending at the same vertex.
fn walk_ring(mesh: &HalfEdgeMesh, start: HalfEdgeId, site: usize) -> (Vec<DVec2>, Vec<usize>) {
    let mut corners = Vec::new();
    let mut neighbours: Vec<usize> = Vec::new();

    let mut edge = start;
    // A closed mesh returns to `start` long before this bound
    for _ in 0..mesh.half_edge_count() {
        edge = mesh.previous(mesh.twin(edge));

        if let Some(other) = mesh.vertex(mesh.origin(edge)).site.real() {
            if other != site && !neighbours.contains(&other) {
                neighbours.push(other);
            }
        }

        let face = mesh.face_of(edge);
        if face.is_visible_from_below() {
            if let Some(point) = face.dual_point() {
                corners.push(point);
            }
        }

        if edge == start {
            break;
        }
    }

    (corners, neighbours)
}

/// Merge consecutive corners that differ by at most `tolerance` in both
/// coordinates, including the pair closing the ring
///
/// Coplanar hull facets share a dual point; rounding turns those into
/// near-duplicates.
pub(crate) fn dedup_corners(points: Vec<DVec2>, tolerance: f64) -> Vec<DVec2> {
    let mut out: Vec<DVec2> = Vec::with_capacity(points.len());

    for point in points {
        match out.last() {
            Some(&last) if is_close(last, point, tolerance) => {}
            _ => out.push(point),
        }
    }

    while out.len() > 1 && is_close(out[0], out[out.len() - 1], tolerance) {
        out.pop();
    }

    out
}

#[inline]
fn is_close(a: DVec2, b: DVec2, tolerance: f64) -> bool {
    (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance
}

fn counter_clockwise(points: Vec<DVec2>) -> Vec<DVec2> {
    let mut polygon = Polygon::from_points(points);
    if polygon.signed_area() < 0.0 {
        polygon.reverse();
    }
    polygon.into_points()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hull::{ConvexHull, HullSite, LiftedPoint};
    use crate::site::lift;

    #[test]
    fn test_dedup_consecutive() {
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1e-11, -1e-11),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0 + 5e-11, 1.0),
        ];
        let deduped = dedup_corners(points, 1e-10);
        assert_eq!(
            deduped,
            vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0)]
        );
    }

    #[test]
    fn test_dedup_needs_both_coordinates_close() {
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1e-11, 1e-3),
            DVec2::new(1e-3, 1e-3),
        ];
        assert_eq!(dedup_corners(points.clone(), 1e-10), points);
    }

    #[test]
    fn test_dedup_closing_pair() {
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(-2e-11, 3e-11),
        ];
        let deduped = dedup_corners(points, 1e-10);
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[0], DVec2::new(0.0, 0.0));
    }

    #[test]
    fn test_dedup_compares_against_kept_corner() {
        // A slow drift is not collapsed as a whole: each step is measured
        // from the last corner that was kept.
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(6e-11, 0.0),
            DVec2::new(1.2e-10, 0.0),
            DVec2::new(1.8e-10, 0.0),
        ];
        let deduped = dedup_corners(points, 1e-10);
        assert_eq!(deduped, vec![DVec2::new(0.0, 0.0), DVec2::new(1.2e-10, 0.0)]);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(dedup_corners(Vec::new(), 1e-10).is_empty());
    }

    #[test]
    fn test_extract_skips_boundary_vertices() {
        let mut hull = ConvexHull::new();
        let corners = [(-10.0, -10.0), (20.0, -10.0), (20.0, 20.0), (-10.0, 20.0)];
        for (i, &(x, y)) in corners.iter().enumerate() {
            hull.add_point(LiftedPoint::new(lift(DVec2::new(x, y), 0.0), HullSite::Boundary(i)));
        }
        hull.add_point(LiftedPoint::new(lift(DVec2::new(4.0, 6.0), 0.0), HullSite::Real(0)));
        let mesh = hull.compute().unwrap();

        let cells = extract_cells(&mesh, &Frame::IDENTITY, 1e-10);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].site, 0);
        assert!(cells[0].neighbours.is_empty());

        // The lone site's cell is bounded by the four bisectors with the corners
        let cell = Polygon::from_points(cells[0].corners.clone());
        assert_eq!(cell.len(), 4);
        assert!(cell.is_counter_clockwise());
        assert!(cell.contains(DVec2::new(4.0, 6.0)));
    }

    #[test]
    fn test_extract_maps_corners_to_world() {
        let frame = Frame {
            center: DVec2::new(1000.0, -500.0),
            scale: 100.0,
        };
        let mut hull = ConvexHull::new();
        let corners = [(-1.0, -1.0), (2.0, -1.0), (2.0, 2.0), (-1.0, 2.0)];
        for (i, &(x, y)) in corners.iter().enumerate() {
            hull.add_point(LiftedPoint::new(lift(DVec2::new(x, y), 0.0), HullSite::Boundary(i)));
        }
        hull.add_point(LiftedPoint::new(lift(DVec2::new(0.4, 0.6), 0.0), HullSite::Real(0)));
        let mesh = hull.compute().unwrap();

        let local = extract_cells(&mesh, &Frame::IDENTITY, 1e-10);
        let world = extract_cells(&mesh, &frame, 1e-10);
        assert_eq!(local[0].corners.len(), world[0].corners.len());
        for (l, w) in local[0].corners.iter().zip(&world[0].corners) {
            assert!(frame.to_world(*l).distance(*w) < 1e-9);
        }

        let cell = Polygon::from_points(world[0].corners.clone());
        assert!(cell.contains(DVec2::new(1040.0, -440.0)));
    }

    #[test]
    fn test_extract_two_sites_are_neighbours() {
        let mut hull = ConvexHull::new();
        let corners = [(-10.0, -10.0), (20.0, -10.0), (20.0, 20.0), (-10.0, 20.0)];
        for (i, &(x, y)) in corners.iter().enumerate() {
            hull.add_point(LiftedPoint::new(lift(DVec2::new(x, y), 0.0), HullSite::Boundary(i)));
        }
        hull.add_point(LiftedPoint::new(lift(DVec2::new(2.0, 3.0), 0.0), HullSite::Real(0)));
        hull.add_point(LiftedPoint::new(lift(DVec2::new(7.0, 6.0), 0.0), HullSite::Real(1)));
        let mesh = hull.compute().unwrap();

        let mut cells = extract_cells(&mesh, &Frame::IDENTITY, 1e-10);
        cells.sort_by_key(|c| c.site);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].neighbours, vec![1]);
        assert_eq!(cells[1].neighbours, vec![0]);
    }
}

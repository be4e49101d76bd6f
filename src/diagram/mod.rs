//! Power diagram orchestration
//!
//! Validates the sites, lifts them together with four boundary sites, builds
//! the hull and writes each site's cell and neighbours back onto it.

mod extract;

use glam::DVec2;
use log::debug;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

use crate::config::DiagramConfig;
use crate::error::{DiagramError, Result};
use crate::hull::{ConvexHull, HalfEdgeMesh, HullSite, LiftedPoint};
use crate::polygon::Polygon;
use crate::site::{lift, Site};
use crate::spatial::SiteLocator;

/// Progress of a diagram through one computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramState {
    /// Nothing computed for the current sites and clip region
    Idle,
    /// Checking weights, positions and the clip region
    Validating,
    /// The lifted hull exists, cells are not assigned yet
    HullComputed,
    /// Every site carries its cell (or none, if it has no area)
    Extracted,
}

/// Similarity mapping the clip region's bounding box onto a unit square
/// centred at the origin
///
/// The hull is computed in this frame: lifted heights grow with the square
/// of the coordinates, and parry's tolerances only hold near unit scale.
/// Power diagrams are equivariant under `p -> (p - center) / scale`,
/// `w -> w / scale²`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    center: DVec2,
    scale: f64,
}

impl Frame {
    #[cfg(test)]
    const IDENTITY: Frame = Frame {
        center: DVec2::ZERO,
        scale: 1.0,
    };

    #[inline]
    fn to_local(&self, point: DVec2) -> DVec2 {
        (point - self.center) / self.scale
    }

    #[inline]
    fn local_weight(&self, weight: f64) -> f64 {
        weight / (self.scale * self.scale)
    }

    #[inline]
    fn to_world(&self, point: DVec2) -> DVec2 {
        self.center + point * self.scale
    }
}

/// Convex clip region plus the four boundary sites derived from it
#[derive(Debug, Clone)]
struct ClipRegion {
    polygon: Polygon,
    boundary_sites: [DVec2; 4],
    frame: Frame,
}

impl ClipRegion {
    fn new(polygon: Polygon) -> Result<Self> {
        if polygon.len() < 3 {
            return Err(DiagramError::InvalidClipRegion(format!(
                "need at least 3 corners, got {}",
                polygon.len()
            )));
        }
        if polygon.points().iter().any(|p| !p.is_finite()) {
            return Err(DiagramError::InvalidClipRegion(
                "corners must be finite".to_string(),
            ));
        }
        if polygon.area() == 0.0 {
            return Err(DiagramError::InvalidClipRegion(
                "region has no area".to_string(),
            ));
        }
        if !polygon.is_convex() {
            return Err(DiagramError::InvalidClipRegion(
                "region must be convex".to_string(),
            ));
        }

        let bounds = polygon
            .bounds()
            .ok_or_else(|| DiagramError::InvalidClipRegion("region is empty".to_string()))?;

        // A rectangle this far out never puts a bisector between two of its
        // corners inside the region.
        let (min, w, h) = (bounds.min, bounds.width(), bounds.height());
        let boundary_sites = [
            DVec2::new(min.x - w, min.y - h),
            DVec2::new(min.x + 2.0 * w, min.y - h),
            DVec2::new(min.x + 2.0 * w, min.y + 2.0 * h),
            DVec2::new(min.x - w, min.y + 2.0 * h),
        ];

        let frame = Frame {
            center: (bounds.min + bounds.max) * 0.5,
            scale: w.max(h),
        };

        Ok(Self {
            polygon,
            boundary_sites,
            frame,
        })
    }
}

/// A power diagram over a set of weighted sites, clipped to a convex region
///
/// # Example
///
/// ```
/// use power_diagram::*;
///
/// let config = DiagramConfigBuilder::new().seed(42).build().unwrap();
/// let mut diagram = PowerDiagram::new(config);
///
/// diagram.set_sites(vec![
///     Site::new(20.0, 30.0, 0.0),
///     Site::new(70.0, 40.0, 400.0),
///     Site::new(45.0, 80.0, 100.0),
/// ]);
///
/// let mut region = Polygon::new();
/// region.add(0.0, 0.0);
/// region.add(100.0, 0.0);
/// region.add(100.0, 100.0);
/// region.add(0.0, 100.0);
/// diagram.set_clip_poly(region).unwrap();
///
/// diagram.compute_diagram().unwrap();
///
/// let total: f64 = diagram.sites().iter().map(Site::cell_area).sum();
/// assert!((total - 10_000.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct PowerDiagram {
    config: DiagramConfig,
    sites: Vec<Site>,
    clip: Option<ClipRegion>,
    /// Hull of the last successful computation
    mesh: Option<HalfEdgeMesh>,
    state: DiagramState,
}

impl PowerDiagram {
    /// Create an empty diagram
    pub fn new(config: DiagramConfig) -> Self {
        Self {
            config,
            sites: Vec::new(),
            clip: None,
            mesh: None,
            state: DiagramState::Idle,
        }
    }

    /// Create a diagram with sites and a clip region and compute it
    pub fn compute(config: DiagramConfig, sites: Vec<Site>, clip_poly: Polygon) -> Result<Self> {
        let mut diagram = Self::new(config);
        diagram.set_sites(sites);
        diagram.set_clip_poly(clip_poly)?;
        diagram.compute_diagram()?;
        Ok(diagram)
    }

    /// Replace the sites, discarding any previous result
    pub fn set_sites(&mut self, sites: Vec<Site>) {
        self.sites = sites;
        self.invalidate();
    }

    /// Set the convex region cells are clipped to
    ///
    /// Also places the four boundary sites: the corners of the region's
    /// bounding box grown by its width and height on every side.
    ///
    /// # Errors
    ///
    /// `InvalidClipRegion` if the polygon has fewer than three corners, a
    /// non-finite corner, no area, or is not convex. Concave regions are
    /// not supported; clipping against them would silently give wrong cells.
    pub fn set_clip_poly(&mut self, polygon: Polygon) -> Result<()> {
        self.clip = Some(ClipRegion::new(polygon)?);
        self.invalidate();
        Ok(())
    }

    pub fn clip_poly(&self) -> Option<&Polygon> {
        self.clip.as_ref().map(|c| &c.polygon)
    }

    /// Positions of the four synthetic corner sites
    pub fn boundary_sites(&self) -> Option<[DVec2; 4]> {
        self.clip.as_ref().map(|c| c.boundary_sites)
    }

    #[inline]
    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> DiagramState {
        self.state
    }

    #[inline]
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Sites in the order they were given
    #[inline]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Mutable access to the sites, e.g. to adjust weights between runs
    ///
    /// Discards the cached hull; call `compute_diagram` again afterwards.
    pub fn sites_mut(&mut self) -> &mut [Site] {
        self.invalidate();
        &mut self.sites
    }

    pub fn into_sites(self) -> Vec<Site> {
        self.sites
    }

    /// Hull mesh of the last successful computation
    ///
    /// Vertex positions are in the normalized frame the hull is computed in:
    /// the clip region's bounding box centred at the origin and scaled so its
    /// longer side is 1, with weights scaled by the same factor squared and
    /// shifted so the smallest weight is 0.
    pub fn mesh(&self) -> Option<&HalfEdgeMesh> {
        self.mesh.as_ref()
    }

    /// Clipped cell of a site
    ///
    /// `None` for invalid ids and for sites without a cell.
    pub fn cell(&self, site_id: usize) -> Option<&Polygon> {
        self.sites.get(site_id).and_then(Site::polygon)
    }

    /// Neighbour ids of a site, empty for invalid ids
    pub fn neighbours(&self, site_id: usize) -> &[usize] {
        self.sites
            .get(site_id)
            .map(Site::neighbours)
            .unwrap_or(&[])
    }

    /// Point location structure over the current sites
    pub fn locator(&self) -> SiteLocator {
        SiteLocator::new(&self.sites)
    }

    /// Compute the cell and neighbours of every site
    ///
    /// An empty site list is a no-op. On error no site is modified and the
    /// diagram returns to `Idle`.
    ///
    /// # Errors
    ///
    /// - `InvalidWeight` if a site's weight is NaN or infinite
    /// - `InvalidPosition` if a site's coordinates are not finite
    /// - `MissingClipRegion` if `set_clip_poly` was never called
    /// - `HullFailed` if the lifted points have no usable hull
    pub fn compute_diagram(&mut self) -> Result<()> {
        if self.sites.is_empty() {
            self.mesh = None;
            self.state = DiagramState::Extracted;
            return Ok(());
        }

        self.state = DiagramState::Validating;
        let result = self.run();
        if result.is_err() {
            self.invalidate();
        }
        result
    }

    fn run(&mut self) -> Result<()> {
        validate_sites(&self.sites)?;
        let clip = self.clip.as_ref().ok_or(DiagramError::MissingClipRegion)?;

        let frame = clip.frame;

        // Adding a constant to every weight leaves the diagram unchanged. The
        // boundary sites take the smallest weight so they never outweigh a
        // site inside the region.
        let min_weight = self
            .sites
            .iter()
            .map(Site::weight)
            .fold(f64::INFINITY, f64::min);

        let start = Instant::now();
        let mut hull = ConvexHull::with_capacity(self.sites.len() + 4);
        for id in insertion_order(self.sites.len(), &self.config) {
            let site = &self.sites[id];
            let lifted = lift(
                frame.to_local(site.position()),
                frame.local_weight(site.weight() - min_weight),
            );
            hull.add_point(LiftedPoint::new(lifted, HullSite::Real(id)));
        }
        for (corner, &position) in clip.boundary_sites.iter().enumerate() {
            let lifted = lift(frame.to_local(position), 0.0);
            hull.add_point(LiftedPoint::new(lifted, HullSite::Boundary(corner)));
        }

        let mesh = hull.compute()?;
        self.state = DiagramState::HullComputed;
        debug!(
            "[PowerDiagram] hull of {} sites: {} vertices, {} facets in {:?}",
            self.sites.len(),
            mesh.vertex_count(),
            mesh.face_count(),
            start.elapsed()
        );

        let cells = extract::extract_cells(&mesh, &frame, self.config.dedup_tolerance);

        for site in &mut self.sites {
            site.clear();
        }
        for cell in cells {
            let non_clipped = Polygon::from_points(cell.corners);
            let clipped = clip.polygon.convex_clip(&non_clipped);
            let clipped = (!clipped.is_empty()).then_some(clipped);
            self.sites[cell.site].set_cell(non_clipped, clipped, cell.neighbours);
        }

        for (id, site) in self.sites.iter().enumerate() {
            if site.polygon().is_none() {
                debug!("[PowerDiagram] site {} has no cell inside the clip region", id);
            }
        }

        self.mesh = Some(mesh);
        self.state = DiagramState::Extracted;
        Ok(())
    }

    fn invalidate(&mut self) {
        self.mesh = None;
        self.state = DiagramState::Idle;
    }
}

/// Reject NaN or infinite weights and non-finite positions before anything
/// is lifted
fn validate_sites(sites: &[Site]) -> Result<()> {
    for (id, site) in sites.iter().enumerate() {
        if !site.weight().is_finite() {
            return Err(DiagramError::InvalidWeight(id));
        }
        if !site.position().is_finite() {
            return Err(DiagramError::InvalidPosition(id));
        }
    }
    Ok(())
}

/// Order in which sites are added to the hull
///
/// A seeded permutation of `0..len`, or the identity when shuffling is off.
fn insertion_order(len: usize, config: &DiagramConfig) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    if config.shuffle {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        order.shuffle(&mut rng);
    }
    order
}

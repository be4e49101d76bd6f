//! Spatial indexing for nearest-point lookups
//!
//! `SpatialIndex` maps hull output vertices back to the lifted input points.
//! `SiteLocator` answers "which cell contains this point" for a set of sites.

use glam::{DVec2, DVec3};
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

use crate::site::Site;

/// Wrapper around an immutable KD-tree over 3D points
///
/// Items are the positions of the points in the slice the index was built
/// from.
#[derive(Clone)]
pub struct SpatialIndex {
    tree: Option<ImmutableKdTree<f64, usize, 3, 32>>,
}

impl SpatialIndex {
    /// Build the index from a slice of points
    pub fn new(points: &[DVec3]) -> Self {
        if points.is_empty() {
            return Self { tree: None };
        }

        let points: Vec<[f64; 3]> = points.iter().map(|p| p.to_array()).collect();

        Self {
            tree: Some(ImmutableKdTree::new_from_slice(&points)),
        }
    }

    /// Index of the point closest to `position`, `None` for an empty index
    pub fn find_nearest(&self, position: DVec3) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let result = tree.nearest_one::<SquaredEuclidean>(&position.to_array());
        Some(result.item as usize)
    }
}

/// Point location in a power diagram
///
/// The power distance `|p - s|² - w` becomes a plain squared Euclidean
/// distance after embedding each site as `(x, y, sqrt(W - w))`, where `W` is
/// the largest weight, and each query as `(px, py, 0)`: both differ only by
/// the constant `W`. The nearest embedded site is therefore the site whose
/// power cell contains the query point.
///
/// # Example
///
/// ```
/// use power_diagram::{Site, SiteLocator};
/// use glam::DVec2;
///
/// let sites = vec![Site::new(0.0, 0.0, 0.0), Site::new(10.0, 0.0, 40.0)];
/// let locator = SiteLocator::new(&sites);
///
/// // Unweighted, (4, 0) would belong to the first site; the weight of the
/// // second site moves the boundary to x = 3.
/// assert_eq!(locator.find_site_at(DVec2::new(4.0, 0.0)), Some(1));
/// assert_eq!(locator.find_site_at(DVec2::new(2.0, 0.0)), Some(0));
/// ```
#[derive(Clone)]
pub struct SiteLocator {
    index: SpatialIndex,
    /// Site index for every point in `index`
    site_ids: Vec<usize>,
}

impl SiteLocator {
    /// Build a locator over `sites`
    ///
    /// Sites with a NaN weight or a non-finite position are left out.
    pub fn new(sites: &[Site]) -> Self {
        let usable = |s: &Site| !s.weight().is_nan() && s.position().is_finite();

        let max_weight = sites
            .iter()
            .filter(|s| usable(s))
            .map(Site::weight)
            .fold(f64::NEG_INFINITY, f64::max);

        let (site_ids, points): (Vec<usize>, Vec<DVec3>) = sites
            .iter()
            .enumerate()
            .filter(|(_, s)| usable(s))
            .map(|(id, s)| (id, s.position().extend((max_weight - s.weight()).sqrt())))
            .unzip();

        Self {
            index: SpatialIndex::new(&points),
            site_ids,
        }
    }

    /// Index of the site whose power cell contains `point`
    ///
    /// Ties on a cell boundary resolve to either side.
    pub fn find_site_at(&self, point: DVec2) -> Option<usize> {
        let nearest = self.index.find_nearest(point.extend(0.0))?;
        self.site_ids.get(nearest).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_index_basic() {
        let points = vec![
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(-1.0, 0.0, 0.0),
        ];

        let index = SpatialIndex::new(&points);

        assert_eq!(index.find_nearest(DVec3::new(0.9, 0.1, 0.0)), Some(0));
        assert_eq!(index.find_nearest(DVec3::new(0.0, 0.95, 0.0)), Some(1));
        assert_eq!(index.find_nearest(DVec3::new(0.0, 0.1, 0.9)), Some(2));
        assert_eq!(index.find_nearest(DVec3::new(-0.8, 0.0, 0.0)), Some(3));
    }

    #[test]
    fn test_spatial_index_exact_match() {
        let points = vec![DVec3::new(10.0, 0.0, 100.0), DVec3::new(0.0, 10.0, 100.0)];
        let index = SpatialIndex::new(&points);

        assert_eq!(index.find_nearest(points[0]), Some(0));
        assert_eq!(index.find_nearest(points[1]), Some(1));
    }

    #[test]
    fn test_spatial_index_empty() {
        let index = SpatialIndex::new(&[]);
        assert_eq!(index.find_nearest(DVec3::ZERO), None);
    }

    #[test]
    fn test_locator_unweighted_is_nearest_site() {
        let sites = vec![
            Site::unweighted(0.0, 0.0),
            Site::unweighted(10.0, 0.0),
            Site::unweighted(0.0, 10.0),
        ];
        let locator = SiteLocator::new(&sites);

        assert_eq!(locator.find_site_at(DVec2::new(1.0, 1.0)), Some(0));
        assert_eq!(locator.find_site_at(DVec2::new(9.0, 2.0)), Some(1));
        assert_eq!(locator.find_site_at(DVec2::new(2.0, 9.0)), Some(2));
    }

    #[test]
    fn test_locator_matches_power_distance() {
        let sites = vec![
            Site::new(0.0, 0.0, 5.0),
            Site::new(6.0, 1.0, 30.0),
            Site::new(2.0, 7.0, -4.0),
            Site::new(9.0, 9.0, 12.0),
        ];
        let locator = SiteLocator::new(&sites);

        for i in 0..20 {
            for j in 0..20 {
                let p = DVec2::new(i as f64 * 0.5 + 0.1, j as f64 * 0.5 + 0.2);
                let found = locator.find_site_at(p).unwrap();
                let best = sites
                    .iter()
                    .map(|s| s.power_distance(p))
                    .fold(f64::INFINITY, f64::min);
                assert!((sites[found].power_distance(p) - best).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_locator_skips_nan_weight() {
        let sites = vec![Site::new(0.0, 0.0, f64::NAN), Site::unweighted(10.0, 10.0)];
        let locator = SiteLocator::new(&sites);
        assert_eq!(locator.find_site_at(DVec2::ZERO), Some(1));
    }

    #[test]
    fn test_locator_empty() {
        let locator = SiteLocator::new(&[]);
        assert_eq!(locator.find_site_at(DVec2::ZERO), None);
    }
}

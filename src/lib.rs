//! Power diagrams clipped to a convex region
//!
//! A power diagram (weighted Voronoi diagram) assigns every point of the
//! plane to the site with the smallest power distance `|p - s|² - w`. Cells
//! are computed by lifting each site to `(x, y, x² + y² - w)`, taking the 3D
//! convex hull and projecting its lower facets back down. Four synthetic
//! sites far outside the clip region keep every cell bounded, and each cell
//! is finally clipped to the region.
//!
//! # Quick Start
//!
//! ```rust
//! use power_diagram::*;
//!
//! let config = DiagramConfigBuilder::new().seed(42).build().unwrap();
//!
//! let sites = vec![
//!     Site::new(25.0, 25.0, 0.0),
//!     Site::new(75.0, 25.0, 200.0),
//!     Site::new(50.0, 75.0, 50.0),
//! ];
//!
//! let mut region = Polygon::new();
//! region.add(0.0, 0.0);
//! region.add(100.0, 0.0);
//! region.add(100.0, 100.0);
//! region.add(0.0, 100.0);
//!
//! let diagram = PowerDiagram::compute(config, sites, region).unwrap();
//!
//! for (id, site) in diagram.sites().iter().enumerate() {
//!     println!(
//!         "site {} has area {:.1} and neighbours {:?}",
//!         id,
//!         site.cell_area(),
//!         site.neighbours()
//!     );
//! }
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization support for configuration, sites and polygons

// Modules
pub mod error;
pub mod config;
pub mod polygon;
pub mod site;
pub mod hull;
pub mod diagram;
pub mod spatial;

// Re-export core types for convenience
pub use error::{DiagramError, Result};
pub use config::{DiagramConfig, DiagramConfigBuilder, DEFAULT_DEDUP_TOLERANCE};
pub use polygon::{Bounds, Polygon};
pub use site::{lift, Site};
pub use diagram::{DiagramState, PowerDiagram};
pub use spatial::{SiteLocator, SpatialIndex};

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;

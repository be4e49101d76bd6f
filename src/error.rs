//! Error types for power diagram computation

use std::fmt;

/// Errors that can occur while configuring or computing a power diagram
#[derive(Debug, Clone, PartialEq)]
pub enum DiagramError {
    /// Configuration validation failed
    InvalidConfig(String),
    /// A site carries a NaN weight
    InvalidWeight(usize),
    /// A site has a non-finite coordinate
    InvalidPosition(usize),
    /// The clip region is not a usable convex polygon
    InvalidClipRegion(String),
    /// Sites were given but no clip region was set
    MissingClipRegion,
    /// The convex hull could not be built or is not a closed mesh
    HullFailed(String),
}

impl fmt::Display for DiagramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            DiagramError::InvalidWeight(idx) => {
                write!(f, "weight of site {} may not be NaN", idx)
            }
            DiagramError::InvalidPosition(idx) => {
                write!(f, "site {} has a non-finite position", idx)
            }
            DiagramError::InvalidClipRegion(msg) => write!(f, "invalid clip region: {}", msg),
            DiagramError::MissingClipRegion => write!(f, "no clip region set"),
            DiagramError::HullFailed(msg) => write!(f, "convex hull failed: {}", msg),
        }
    }
}

impl std::error::Error for DiagramError {}

/// Result type alias for power diagram operations
pub type Result<T> = std::result::Result<T, DiagramError>;

//! Diagram configuration and builder
//!
//! This module provides the knobs that control a power diagram computation:
//! the seed for input reordering and the tolerance used to merge dual points.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DiagramError, Result};

/// Default tolerance below which consecutive cell corners are merged
pub const DEFAULT_DEDUP_TOLERANCE: f64 = 1e-10;

/// Configuration for a power diagram computation
///
/// The same configuration and the same sites always produce the identical
/// diagram, because the hull input order is derived from `seed`.
///
/// # Example
///
/// ```rust
/// use power_diagram::*;
///
/// let config = DiagramConfigBuilder::new()
///     .seed(7)
///     .dedup_tolerance(1e-9)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.seed, 7);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagramConfig {
    /// Seed for the permutation applied to the sites before hull construction
    ///
    /// Hull robustness depends on insertion order; correctness does not.
    pub seed: u64,

    /// Two consecutive dual points closer than this in both coordinates
    /// become one cell corner
    pub dedup_tolerance: f64,

    /// Whether sites are reordered before they are handed to the hull
    ///
    /// Disabling this keeps input order, which is only useful to reproduce
    /// hull problems with a specific insertion sequence.
    pub shuffle: bool,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            seed: rand::random(),
            dedup_tolerance: DEFAULT_DEDUP_TOLERANCE,
            shuffle: true,
        }
    }
}

/// Builder for creating DiagramConfig with validation
#[derive(Debug, Clone)]
pub struct DiagramConfigBuilder {
    seed: Option<u64>,
    dedup_tolerance: f64,
    shuffle: bool,
}

impl DiagramConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - dedup_tolerance: 1e-10
    /// - shuffle: true
    pub fn new() -> Self {
        Self {
            seed: None,
            dedup_tolerance: DEFAULT_DEDUP_TOLERANCE,
            shuffle: true,
        }
    }

    /// Set the seed used to reorder sites before hull construction
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the corner merge tolerance
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the tolerance is negative or not finite
    pub fn dedup_tolerance(mut self, tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(DiagramError::InvalidConfig(format!(
                "dedup tolerance must be finite and >= 0 (got {})",
                tolerance
            )));
        }
        self.dedup_tolerance = tolerance;
        Ok(self)
    }

    /// Enable or disable reordering of the sites
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    pub fn build(self) -> Result<DiagramConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);

        Ok(DiagramConfig {
            seed,
            dedup_tolerance: self.dedup_tolerance,
            shuffle: self.shuffle,
        })
    }
}

impl Default for DiagramConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = DiagramConfigBuilder::new().build().unwrap();
        assert_eq!(config.dedup_tolerance, DEFAULT_DEDUP_TOLERANCE);
        assert!(config.shuffle);
    }

    #[test]
    fn test_builder_custom() {
        let config = DiagramConfigBuilder::new()
            .seed(42)
            .dedup_tolerance(1e-8)
            .unwrap()
            .shuffle(false)
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.dedup_tolerance, 1e-8);
        assert!(!config.shuffle);
    }

    #[test]
    fn test_builder_invalid_tolerance() {
        assert!(DiagramConfigBuilder::new().dedup_tolerance(-1.0).is_err());
        assert!(DiagramConfigBuilder::new().dedup_tolerance(f64::NAN).is_err());
        assert!(DiagramConfigBuilder::new()
            .dedup_tolerance(f64::INFINITY)
            .is_err());
    }

    #[test]
    fn test_zero_tolerance_allowed() {
        let config = DiagramConfigBuilder::new()
            .dedup_tolerance(0.0)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.dedup_tolerance, 0.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = DiagramConfigBuilder::new().seed(12345).build().unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: DiagramConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}

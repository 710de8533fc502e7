//! Engine tuning, fixed for the lifetime of a run.

use crate::error::{validation_error, Result};
use crate::{MAX_TREE_HEIGHT, MIN_SIZE_THRESHOLD};

/// Tuning knobs handed to every [`Engine`](crate::engine::Engine).
///
/// * `max_tree_height`: recursion levels at which delegation is still allowed.
///   Zero disables distribution entirely.
/// * `leaf_threshold`: dimension at or below which the cubic leaf is used and
///   nothing is delegated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_tree_height: usize,
    pub leaf_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_tree_height: MAX_TREE_HEIGHT,
            leaf_threshold: MIN_SIZE_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `leaf_threshold` is zero.
    pub fn new(max_tree_height: usize, leaf_threshold: usize) -> Result<Self> {
        let config = EngineConfig {
            max_tree_height,
            leaf_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_tree_height(mut self, max_tree_height: usize) -> Self {
        self.max_tree_height = max_tree_height;
        self
    }

    pub fn with_leaf_threshold(mut self, leaf_threshold: usize) -> Self {
        self.leaf_threshold = leaf_threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.leaf_threshold == 0 {
            return Err(validation_error("leaf threshold must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_tree_height, 5);
        assert_eq!(config.leaf_threshold, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = EngineConfig::default()
            .with_max_tree_height(2)
            .with_leaf_threshold(4);
        assert_eq!(config, EngineConfig::new(2, 4).unwrap());
    }

    #[test]
    fn test_zero_leaf_threshold_rejected() {
        assert!(EngineConfig::new(3, 0).is_err());
    }
}

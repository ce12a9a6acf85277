//! Normalizer settings.

use serde::{Deserialize, Serialize};

use crate::error::{LsuvError, Result};

/// Settings for [`super::LsuvInit`].
///
/// The defaults are the values LSUV is usually run with: unit target
/// variance, a 0.1 margin, ten rescales per layer and a 32-activation
/// minimum layer size.
///
/// # Example
///
/// ```
/// use lsuv::lsuv::LsuvConfig;
///
/// let config = LsuvConfig::default().with_margin(0.05).with_verbose(false);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_iter, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LsuvConfig {
    /// Desired output variance per layer
    pub target_variance: f64,
    /// Stop rescaling once `|target - variance| <= margin`
    pub margin: f64,
    /// Maximum number of rescales per layer
    pub max_iter: usize,
    /// Layers with fewer non-batch output elements are skipped
    pub min_output_size: usize,
    /// Stop rescaling when the measured standard deviation falls below this
    pub min_std: f64,
    /// Print per-layer progress to stdout
    pub verbose: bool,
}

impl Default for LsuvConfig {
    fn default() -> Self {
        Self {
            target_variance: 1.0,
            margin: 0.1,
            max_iter: 10,
            min_output_size: 32,
            min_std: 1e-7,
            verbose: true,
        }
    }
}

impl LsuvConfig {
    /// Set the target variance.
    #[must_use]
    pub fn with_target_variance(mut self, target_variance: f64) -> Self {
        self.target_variance = target_variance;
        self
    }

    /// Set the convergence margin.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Set the maximum number of rescales per layer.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the minimum non-batch output size for a layer to be normalized.
    #[must_use]
    pub fn with_min_output_size(mut self, min_output_size: usize) -> Self {
        self.min_output_size = min_output_size;
        self
    }

    /// Set the degeneracy threshold on the measured standard deviation.
    #[must_use]
    pub fn with_min_std(mut self, min_std: f64) -> Self {
        self.min_std = min_std;
        self
    }

    /// Enable or disable stdout progress output.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check that the settings describe a runnable normalization.
    ///
    /// # Errors
    ///
    /// Returns [`LsuvError::InvalidHyperparameter`] for a non-positive or
    /// non-finite target, a negative or non-finite margin, or a negative or
    /// non-finite `min_std`.
    pub fn validate(&self) -> Result<()> {
        if !(self.target_variance.is_finite() && self.target_variance > 0.0) {
            return Err(LsuvError::invalid_hyperparameter(
                "target_variance",
                self.target_variance,
                "finite and > 0",
            ));
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(LsuvError::invalid_hyperparameter(
                "margin",
                self.margin,
                "finite and >= 0",
            ));
        }
        if !(self.min_std.is_finite() && self.min_std >= 0.0) {
            return Err(LsuvError::invalid_hyperparameter(
                "min_std",
                self.min_std,
                "finite and >= 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LsuvConfig::default();
        assert_eq!(config.target_variance, 1.0);
        assert_eq!(config.margin, 0.1);
        assert_eq!(config.max_iter, 10);
        assert_eq!(config.min_output_size, 32);
        assert_eq!(config.min_std, 1e-7);
        assert!(config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = LsuvConfig::default()
            .with_target_variance(2.0)
            .with_margin(0.01)
            .with_max_iter(3)
            .with_min_output_size(1)
            .with_min_std(0.0)
            .with_verbose(false);

        assert_eq!(config.target_variance, 2.0);
        assert_eq!(config.margin, 0.01);
        assert_eq!(config.max_iter, 3);
        assert_eq!(config.min_output_size, 1);
        assert_eq!(config.min_std, 0.0);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            LsuvConfig::default().with_target_variance(0.0),
            LsuvConfig::default().with_target_variance(f64::NAN),
            LsuvConfig::default().with_margin(-0.1),
            LsuvConfig::default().with_margin(f64::INFINITY),
            LsuvConfig::default().with_min_std(-1.0),
        ];
        for config in &bad {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, LsuvError::InvalidHyperparameter { .. }));
        }
    }

    #[test]
    fn test_serde_fills_missing_fields_with_defaults() {
        let config: LsuvConfig =
            serde_json::from_str(r#"{"margin": 0.2, "verbose": false}"#).expect("valid json");
        assert_eq!(config.margin, 0.2);
        assert!(!config.verbose);
        assert_eq!(config.max_iter, 10);
        assert_eq!(config.target_variance, 1.0);
    }
}

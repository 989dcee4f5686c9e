// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Calibration configuration and common types.
//!
//! This module defines the [`CalibConfig`] struct, which controls the tunable
//! parameters of the threshold analysis: the box-association IoU threshold,
//! the OKS cut points that partition samples into quality groups, the
//! percentile points used for threshold derivation, and the per-keypoint
//! sigma table.

use crate::error::{CalibError, Result};

/// Default per-keypoint OKS sigmas for the 17-point person skeleton.
///
/// Head and torso points are forgiving (0.35), limbs tighter (0.25), and the
/// extremities tightest (0.20). Indexed by keypoint index; only the first
/// `point_count` entries are used.
pub const DEFAULT_SIGMAS: [f32; 17] = [
    0.35, 0.35, 0.35, 0.35, 0.35, 0.35, 0.35, 0.35, 0.35, 0.35, 0.25, 0.25, 0.25, 0.25, 0.25,
    0.20, 0.20,
];

/// Configuration for threshold analysis.
///
/// Uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use pose_calib::CalibConfig;
///
/// let config = CalibConfig::new()
///     .with_iou(0.5)
///     .with_oks_cuts(0.85, 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct CalibConfig {
    /// Minimum IoU for a prediction to be associated with a ground-truth
    /// instance. Unmatched predictions contribute no samples.
    pub iou_threshold: f32,
    /// OKS above this value puts a sample in the "high" quality group.
    pub oks_high: f32,
    /// OKS below this value puts a sample in the "low" quality group.
    /// Samples between `oks_low` and `oks_high` form the "mid" group.
    pub oks_low: f32,
    /// Percentile of high-group confidences used for `t_high`.
    pub t_high_pct: f32,
    /// Percentile of low-group confidences used for `t_low` (and for the
    /// low-group term of the visible threshold).
    pub t_low_pct: f32,
    /// Percentile of high-group confidences used for the visible threshold.
    pub v2_high_pct: f32,
    /// Percentile of mid-group confidences used for the occluded threshold.
    pub v1_mid_pct: f32,
    /// Per-keypoint OKS sigma table, indexed by keypoint index.
    /// Must be at least `point_count` long.
    pub sigmas: Vec<f32>,
}

impl Default for CalibConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.5,
            oks_high: 0.85,
            oks_low: 0.5,
            t_high_pct: 0.10,
            t_low_pct: 0.95,
            v2_high_pct: 0.15,
            v1_mid_pct: 0.10,
            sigmas: DEFAULT_SIGMAS.to_vec(),
        }
    }
}

impl CalibConfig {
    /// Create a new configuration with default values.
    ///
    /// # Returns
    ///
    /// * A new `CalibConfig` instance with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the IoU threshold for box association.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum IoU (0.0 to 1.0).
    ///
    /// # Returns
    ///
    /// * The modified `CalibConfig`.
    #[must_use]
    pub fn with_iou(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    /// Set the OKS cut points separating the high/mid/low quality groups.
    ///
    /// # Arguments
    ///
    /// * `high` - OKS above this is "high" quality.
    /// * `low` - OKS below this is "low" quality.
    ///
    /// # Returns
    ///
    /// * The modified `CalibConfig`.
    #[must_use]
    pub fn with_oks_cuts(mut self, high: f32, low: f32) -> Self {
        self.oks_high = high;
        self.oks_low = low;
        self
    }

    /// Replace the per-keypoint sigma table.
    ///
    /// # Arguments
    ///
    /// * `sigmas` - One sigma per keypoint index.
    ///
    /// # Returns
    ///
    /// * The modified `CalibConfig`.
    #[must_use]
    pub fn with_sigmas(mut self, sigmas: Vec<f32>) -> Self {
        self.sigmas = sigmas;
        self
    }

    /// Validate the configuration against a keypoint count.
    ///
    /// # Arguments
    ///
    /// * `point_count` - Number of keypoints per instance.
    ///
    /// # Errors
    ///
    /// Returns [`CalibError::ConfigError`] if the sigma table is shorter than
    /// `point_count`, if any sigma is not strictly positive, or if the OKS
    /// cut points or IoU threshold fall outside their valid ranges.
    pub fn validate(&self, point_count: usize) -> Result<()> {
        if point_count == 0 {
            return Err(CalibError::ConfigError(
                "point count must be at least 1".to_string(),
            ));
        }
        if self.sigmas.len() < point_count {
            return Err(CalibError::ConfigError(format!(
                "sigma table has {} entries but {point_count} keypoints were requested",
                self.sigmas.len()
            )));
        }
        if self.sigmas[..point_count].iter().any(|&s| s <= 0.0) {
            return Err(CalibError::ConfigError(
                "sigmas must be strictly positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(CalibError::ConfigError(format!(
                "IoU threshold {} outside [0, 1]",
                self.iou_threshold
            )));
        }
        if self.oks_low >= self.oks_high {
            return Err(CalibError::ConfigError(format!(
                "OKS cut points inverted: low {} >= high {}",
                self.oks_low, self.oks_high
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CalibConfig::default();
        assert!((config.iou_threshold - 0.5).abs() < f32::EPSILON);
        assert!((config.oks_high - 0.85).abs() < f32::EPSILON);
        assert!((config.oks_low - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.sigmas.len(), 17);
        assert!(config.validate(17).is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = CalibConfig::new()
            .with_iou(0.6)
            .with_oks_cuts(0.9, 0.4)
            .with_sigmas(vec![0.3; 4]);

        assert!((config.iou_threshold - 0.6).abs() < f32::EPSILON);
        assert!((config.oks_high - 0.9).abs() < f32::EPSILON);
        assert!((config.oks_low - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.sigmas.len(), 4);
    }

    #[test]
    fn test_validate_sigma_table_too_short() {
        let config = CalibConfig::new().with_sigmas(vec![0.35; 5]);
        assert!(config.validate(5).is_ok());
        assert!(config.validate(6).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(CalibConfig::new().validate(0).is_err());
        assert!(CalibConfig::new().with_iou(1.5).validate(13).is_err());
        assert!(
            CalibConfig::new()
                .with_oks_cuts(0.5, 0.85)
                .validate(13)
                .is_err()
        );
        assert!(
            CalibConfig::new()
                .with_sigmas(vec![0.0; 17])
                .validate(13)
                .is_err()
        );
    }
}

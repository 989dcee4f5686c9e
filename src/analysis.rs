// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Matcher & threshold estimator.
//!
//! Pairs prediction files with their ground-truth counterparts, associates
//! predicted instances to ground-truth instances by box IoU, scores every
//! visible keypoint with an OKS value, and derives two recommended
//! confidence thresholds per keypoint index from the pooled samples: `v2`
//! (label visible) and `v1` (label occluded).

use std::path::Path;

use ndarray::Array2;

use crate::config::CalibConfig;
use crate::error::Result;
use crate::labels::{self, instance_box, keypoint, load_table};
use crate::report::{ThresholdEntry, ThresholdReport};
use crate::utils::{calculate_iou, keypoint_oks, mean, median, percentile};
use crate::{verbose, warn};

/// `t_high` when no sample localized well.
pub const FALLBACK_T_HIGH: f32 = 0.5;
/// `t_low` when no sample localized poorly.
pub const FALLBACK_T_LOW: f32 = 0.2;
/// High-group percentile term of `v2` when the high group is empty.
pub const FALLBACK_V2_PERCENTILE: f32 = 0.6;
/// High-group median term of `v2` when the high group is empty.
pub const FALLBACK_V2_MEDIAN: f32 = 0.5;
/// Mid-group percentile term of `v1` when the mid group is empty.
pub const FALLBACK_V1_PERCENTILE: f32 = 0.3;
/// Scales the high-group median confidence into the `v2` floor term.
pub const V2_MEDIAN_FACTOR: f32 = 0.7;
/// Scales the mid-group median confidence into the `v1` term.
pub const V1_MEDIAN_FACTOR: f32 = 0.6;
/// Derives the `v1` median term from `v2` when the mid group is empty.
pub const V1_EMPTY_MID_FACTOR: f32 = 0.5;

/// One scored keypoint of a matched instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeypointSample {
    /// Keypoint index within the skeleton.
    pub index: usize,
    /// Predicted confidence of the keypoint.
    pub conf: f32,
    /// OKS localization score against ground truth.
    pub oks: f32,
}

/// Find the ground-truth row with the highest IoU against a predicted box.
///
/// Ties keep the first row found (strictly-greater comparison). Returns
/// `None` for an empty ground-truth table or when nothing overlaps at all.
#[must_use]
pub fn best_match(pred_box: &[f32; 4], gt_table: &Array2<f32>) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (row_idx, gt_row) in gt_table.rows().into_iter().enumerate() {
        let iou = calculate_iou(pred_box, &instance_box(&gt_row));
        if iou > best.map_or(0.0, |(_, b)| b) {
            best = Some((row_idx, iou));
        }
    }
    best
}

/// Score the visible keypoints of one matched prediction/ground-truth pair.
///
/// Ground-truth keypoints with visibility 0 are absent from the image and
/// produce no sample. The OKS scale is the prediction's box area.
fn score_instance(
    pred_row: &ndarray::ArrayView1<'_, f32>,
    gt_row: &ndarray::ArrayView1<'_, f32>,
    point_count: usize,
    sigmas: &[f32],
    samples: &mut Vec<KeypointSample>,
) {
    let scale = pred_row[3] * pred_row[4];
    for index in 0..point_count {
        let (px, py, conf) = keypoint(pred_row, index);
        let (gx, gy, gvis) = keypoint(gt_row, index);
        if gvis > 0.0 {
            let oks = keypoint_oks((px, py), (gx, gy), scale, sigmas[index]);
            samples.push(KeypointSample { index, conf, oks });
        }
    }
}

/// Collect `(conf, oks)` samples across a prediction/ground-truth directory
/// pair.
///
/// Prediction files without a ground-truth counterpart are skipped silently;
/// files that fail to decode are skipped with a warning so one bad file
/// never aborts the batch.
///
/// # Errors
///
/// Returns an error if the prediction directory itself cannot be listed.
pub fn collect_samples(
    gt_dir: &Path,
    pred_dir: &Path,
    point_count: usize,
    config: &CalibConfig,
) -> Result<Vec<KeypointSample>> {
    let pred_files = labels::detail_files(pred_dir)?;
    verbose!("Analyzing {} prediction files...", pred_files.len());

    let mut samples = Vec::new();
    for pred_file in &pred_files {
        let Some(base) = labels::detail_base_name(pred_file) else {
            continue;
        };
        let gt_file = gt_dir.join(format!("{base}.txt"));
        if !gt_file.exists() {
            continue;
        }

        let pred_table = match load_table(pred_file, point_count) {
            Ok(table) => table,
            Err(e) => {
                warn!("Skipping {}: {e}", pred_file.display());
                continue;
            }
        };
        let gt_table = match load_table(&gt_file, point_count) {
            Ok(table) => table,
            Err(e) => {
                warn!("Skipping {}: {e}", gt_file.display());
                continue;
            }
        };

        for pred_row in pred_table.rows() {
            let pred_box = instance_box(&pred_row);
            if let Some((gt_idx, iou)) = best_match(&pred_box, &gt_table) {
                if iou > config.iou_threshold {
                    score_instance(
                        &pred_row,
                        &gt_table.row(gt_idx),
                        point_count,
                        &config.sigmas,
                        &mut samples,
                    );
                }
            }
        }
    }
    Ok(samples)
}

/// Derive per-index thresholds from pooled samples.
///
/// A pure function of the sample multiset: input order never changes the
/// result. Indices with no samples are absent from the report.
#[must_use]
pub fn derive_thresholds(
    samples: &[KeypointSample],
    point_count: usize,
    config: &CalibConfig,
) -> ThresholdReport {
    let mut by_index: Vec<Vec<(f32, f32)>> = vec![Vec::new(); point_count];
    for sample in samples {
        if sample.index < point_count {
            by_index[sample.index].push((sample.conf, sample.oks));
        }
    }

    let mut entries = Vec::new();
    for (index, group) in by_index.iter().enumerate() {
        if group.is_empty() {
            continue;
        }

        let high: Vec<f32> = group
            .iter()
            .filter(|(_, oks)| *oks > config.oks_high)
            .map(|(conf, _)| *conf)
            .collect();
        let mid: Vec<f32> = group
            .iter()
            .filter(|(_, oks)| *oks > config.oks_low && *oks <= config.oks_high)
            .map(|(conf, _)| *conf)
            .collect();
        let low: Vec<f32> = group
            .iter()
            .filter(|(_, oks)| *oks < config.oks_low)
            .map(|(conf, _)| *conf)
            .collect();

        let t_high = percentile(&high, config.t_high_pct).unwrap_or(FALLBACK_T_HIGH);
        let t_low = percentile(&low, config.t_low_pct).unwrap_or(FALLBACK_T_LOW);

        let v2_quantile = percentile(&high, config.v2_high_pct).unwrap_or(FALLBACK_V2_PERCENTILE);
        let v2_floor = percentile(&low, config.t_low_pct)
            .unwrap_or(0.0)
            .max(median(&high).map_or(FALLBACK_V2_MEDIAN, |m| m * V2_MEDIAN_FACTOR));
        let v2 = (v2_quantile + v2_floor) / 2.0;

        let v1_quantile = percentile(&mid, config.v1_mid_pct).unwrap_or(FALLBACK_V1_PERCENTILE);
        let v1_median = median(&mid).map_or(v2 * V1_EMPTY_MID_FACTOR, |m| m * V1_MEDIAN_FACTOR);
        let v1 = (v1_quantile + v1_median) / 2.0;

        let oks_values: Vec<f32> = group.iter().map(|(_, oks)| *oks).collect();
        let accuracy = mean(&oks_values).unwrap_or(0.0);

        entries.push(ThresholdEntry {
            index,
            accuracy,
            t_high,
            t_low,
            margin: t_high - t_low,
            v2,
            v1,
        });
    }

    ThresholdReport { entries }
}

/// Run the full estimation stage: collect samples, derive thresholds.
///
/// # Arguments
///
/// * `gt_dir` - Directory of ground-truth label files.
/// * `pred_dir` - Directory of prediction detail files.
/// * `point_count` - Keypoints per instance.
/// * `config` - Analysis parameters.
///
/// # Errors
///
/// Returns an error on invalid configuration or when the prediction
/// directory cannot be listed. Individual unreadable files only warn.
pub fn analyze(
    gt_dir: &Path,
    pred_dir: &Path,
    point_count: usize,
    config: &CalibConfig,
) -> Result<ThresholdReport> {
    config.validate(point_count)?;
    let samples = collect_samples(gt_dir, pred_dir, point_count, config)?;
    if samples.is_empty() {
        warn!("No matched keypoint samples were collected; the report will be empty");
    }
    let report = derive_thresholds(&samples, point_count, config);
    for entry in &report.entries {
        // Nothing enforces v1 <= v2; an inversion makes the visibility
        // decision skip level 2, so surface it.
        if entry.v1 > entry.v2 {
            warn!(
                "P{:02}: occluded threshold {:.4} exceeds visible threshold {:.4}",
                entry.index, entry.v1, entry.v2
            );
        }
    }
    Ok(report)
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Label updater.
//!
//! Reads the threshold report produced by the analysis stage and rewrites
//! the visibility flags of label files in place. Each label file is paired
//! with a detail file carrying continuous keypoint confidences; the label
//! keypoint is refreshed from the detail coordinates, erased entirely when
//! it falls outside its own instance box, and its visibility re-derived from
//! the calibrated thresholds.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::labels::{self, instance_box, keypoint, load_table, save_table, META_COLUMNS};
use crate::report::{load_thresholds, ThresholdPair};
use crate::utils::point_in_box;
use crate::{verbose, warn};

/// Visible-label threshold for keypoint indices absent from the report.
pub const DEFAULT_V2: f32 = 0.5;
/// Occluded-label threshold for keypoint indices absent from the report.
pub const DEFAULT_V1: f32 = 0.3;

/// Counters reported after an update run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Label files rewritten.
    pub files_changed: usize,
    /// Keypoints whose stored coordinate or visibility changed.
    pub points_updated: usize,
    /// Keypoints erased for falling outside their instance box.
    pub points_erased: usize,
}

/// Map a keypoint confidence to a visibility flag.
///
/// `conf >= v2` labels the keypoint visible (2), `conf >= v1` occluded (1),
/// anything lower absent (0).
#[must_use]
pub fn classify_visibility(conf: f32, thresholds: ThresholdPair) -> f32 {
    if conf >= thresholds.v2 {
        2.0
    } else if conf >= thresholds.v1 {
        1.0
    } else {
        0.0
    }
}

/// Rewrite the visibility flags of every label file in a directory.
///
/// # Arguments
///
/// * `label_dir` - Directory holding `<base>.txt` label files and their
///   `<base>_detail.txt` prediction counterparts.
/// * `report_path` - Threshold report written by the analysis stage.
/// * `point_count` - Keypoints per instance.
///
/// # Errors
///
/// Returns an error when the threshold report is missing or unreadable, or
/// when the label directory cannot be listed. Individual files that fail to
/// decode, or whose detail/label tables disagree on shape, are skipped with
/// a warning.
#[allow(clippy::float_cmp)]
pub fn update(label_dir: &Path, report_path: &Path, point_count: usize) -> Result<UpdateSummary> {
    let thresholds = load_thresholds(report_path)?;
    let detail_files = labels::detail_files(label_dir)?;
    verbose!("Filtering {} label files...", detail_files.len());

    let mut summary = UpdateSummary::default();
    for detail_file in &detail_files {
        let Some(base) = labels::detail_base_name(detail_file) else {
            continue;
        };
        let label_file = label_dir.join(format!("{base}.txt"));
        if !label_file.exists() {
            continue;
        }

        let detail_table = match load_table(detail_file, point_count) {
            Ok(table) => table,
            Err(e) => {
                warn!("Load failed ({}): {e}", detail_file.display());
                continue;
            }
        };
        let mut label_table = match load_table(&label_file, point_count) {
            Ok(table) => table,
            Err(e) => {
                warn!("Load failed ({}): {e}", label_file.display());
                continue;
            }
        };
        if detail_table.nrows() != label_table.nrows() {
            warn!(
                "Skipping {}: {} detail rows vs {} label rows",
                label_file.display(),
                detail_table.nrows(),
                label_table.nrows()
            );
            continue;
        }

        let mut file_modified = false;
        for row_idx in 0..detail_table.nrows() {
            let detail_row = detail_table.row(row_idx);
            let bbox = instance_box(&detail_row);

            for point_idx in 0..point_count {
                let (px, py, conf) = keypoint(&detail_row, point_idx);

                let (new_x, new_y, new_vis) = if point_in_box(px, py, &bbox) {
                    let pair = lookup(&thresholds, point_idx);
                    (px, py, classify_visibility(conf, pair))
                } else {
                    summary.points_erased += 1;
                    (0.0, 0.0, 0.0)
                };

                let base_col = META_COLUMNS + point_idx * 3;
                let label_row = label_table.row(row_idx);
                let dirty = label_row[base_col] != new_x
                    || label_row[base_col + 1] != new_y
                    || label_row[base_col + 2] != new_vis;
                if dirty {
                    label_table[[row_idx, base_col]] = new_x;
                    label_table[[row_idx, base_col + 1]] = new_y;
                    label_table[[row_idx, base_col + 2]] = new_vis;
                    summary.points_updated += 1;
                    file_modified = true;
                }
            }
        }

        if file_modified {
            save_table(&label_file, &label_table)?;
            summary.files_changed += 1;
        }
    }
    Ok(summary)
}

fn lookup(thresholds: &HashMap<usize, ThresholdPair>, index: usize) -> ThresholdPair {
    thresholds.get(&index).copied().unwrap_or(ThresholdPair {
        v2: DEFAULT_V2,
        v1: DEFAULT_V1,
    })
}

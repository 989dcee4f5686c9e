// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Threshold report serialization.
//!
//! The analysis stage writes a plain-text table with one `P<index>` row per
//! keypoint and a trailing recommendation block; the update stage reads the
//! same file back. Serializer and parser live together here so the format
//! stays a single, round-trippable schema rather than two ad hoc halves.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{CalibError, Result};
use crate::utils::mean;

/// Report banner line.
const BANNER: &str = "=== Keypoint Auto-Labeling Threshold Analysis ===";

/// Width of the divider rules in the report.
const DIVIDER_WIDTH: usize = 110;

/// Derived thresholds for one keypoint index.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdEntry {
    /// Keypoint index this entry applies to.
    pub index: usize,
    /// Mean OKS across all samples for this index (diagnostic).
    pub accuracy: f32,
    /// 10th-percentile confidence of well-localized samples (diagnostic).
    pub t_high: f32,
    /// 95th-percentile confidence of poorly-localized samples (diagnostic).
    pub t_low: f32,
    /// `t_high - t_low`; negative margin means the confidence signal does
    /// not separate good from bad localizations at this index.
    pub margin: f32,
    /// Confidence at or above which a keypoint is labeled visible (2).
    pub v2: f32,
    /// Confidence at or above which a keypoint is labeled occluded (1).
    pub v1: f32,
}

/// Full threshold report: per-index entries plus derived global means.
#[derive(Debug, Clone, Default)]
pub struct ThresholdReport {
    /// One entry per keypoint index that produced samples, ascending.
    pub entries: Vec<ThresholdEntry>,
}

/// Visible/occluded threshold pair as consumed by the updater.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPair {
    /// Visible-label threshold.
    pub v2: f32,
    /// Occluded-label threshold.
    pub v1: f32,
}

impl ThresholdReport {
    /// Arithmetic mean of `v2` across entries. `None` when empty.
    #[must_use]
    pub fn mean_v2(&self) -> Option<f32> {
        mean(&self.entries.iter().map(|e| e.v2).collect::<Vec<_>>())
    }

    /// Arithmetic mean of `v1` across entries. `None` when empty.
    #[must_use]
    pub fn mean_v1(&self) -> Option<f32> {
        mean(&self.entries.iter().map(|e| e.v1).collect::<Vec<_>>())
    }

    /// Render the report to its on-disk text form.
    ///
    /// The same string is printed to the terminal and written to the report
    /// file, so the two never diverge.
    #[must_use]
    pub fn render(&self) -> String {
        let header = format!(
            "{:<6} | {:<8} | {:<7} | {:<7} | {:<8} | {:<12} | {:<12}",
            "Point", "Accuracy", "T_High", "T_Low", "Margin", "V2(Visible)", "V1(Occlude)"
        );
        let divider = "-".repeat(DIVIDER_WIDTH);

        let mut out = String::new();
        out.push_str(BANNER);
        out.push('\n');
        out.push_str(&header);
        out.push('\n');
        out.push_str(&divider);
        out.push('\n');

        for entry in &self.entries {
            let status = if entry.margin > 0.0 { "✅" } else { "⚠️" };
            out.push_str(&format!(
                "P{:02}     | {:.4}   | {:.3}   | {:.3}   | {:+.3} {status} | {:.4}     | {:.4}\n",
                entry.index, entry.accuracy, entry.t_high, entry.t_low, entry.margin, entry.v2,
                entry.v1
            ));
        }

        out.push_str(&divider);
        out.push('\n');
        out.push_str("📌 [FINAL RECOMMENDATION]\n");
        out.push_str(&format!(
            " * Global V2 (Visible)  Threshold: {:.4}\n",
            self.mean_v2().unwrap_or(0.0)
        ));
        out.push_str(&format!(
            " * Global V1 (Occluded) Threshold: {:.4}\n",
            self.mean_v1().unwrap_or(0.0)
        ));
        out.push_str(&divider);
        out.push('\n');
        out
    }

    /// Write the rendered report to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }
}

/// Parse the visible/occluded threshold pairs back out of a report file.
///
/// Only lines starting with the `P` row marker and containing the `|`
/// separator are considered; the index comes from the marker and the pair
/// from the two rightmost columns. Banner, header, divider and summary lines
/// fail those checks and are skipped, as is any malformed row, so the parser
/// tolerates the mixed layout of the report file.
///
/// # Errors
///
/// Returns [`CalibError::ReportError`] if the file cannot be read; without
/// thresholds no update is possible.
pub fn load_thresholds(path: &Path) -> Result<HashMap<usize, ThresholdPair>> {
    let text = fs::read_to_string(path).map_err(|e| {
        CalibError::ReportError(format!("cannot read {}: {e}", path.display()))
    })?;

    let mut thresholds = HashMap::new();
    for line in text.lines() {
        if !line.starts_with('P') || !line.contains('|') {
            continue;
        }
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() < 3 {
            continue;
        }
        let index = match parts[0].trim().strip_prefix('P').map(str::parse::<usize>) {
            Some(Ok(index)) => index,
            _ => continue,
        };
        let v2 = parts[parts.len() - 2].trim().parse::<f32>();
        let v1 = parts[parts.len() - 1].trim().parse::<f32>();
        if let (Ok(v2), Ok(v1)) = (v2, v1) {
            thresholds.insert(index, ThresholdPair { v2, v1 });
        }
    }
    Ok(thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_report() -> ThresholdReport {
        ThresholdReport {
            entries: vec![
                ThresholdEntry {
                    index: 0,
                    accuracy: 0.9312,
                    t_high: 0.612,
                    t_low: 0.284,
                    margin: 0.328,
                    v2: 0.5531,
                    v1: 0.3217,
                },
                ThresholdEntry {
                    index: 3,
                    accuracy: 0.4218,
                    t_high: 0.301,
                    t_low: 0.477,
                    margin: -0.176,
                    v2: 0.4125,
                    v1: 0.275,
                },
            ],
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf_threshold.txt");

        let report = sample_report();
        report.save(&path).unwrap();

        let parsed = load_thresholds(&path).unwrap();
        assert_eq!(parsed.len(), 2);

        // Values survive the 4-decimal printed precision.
        let p0 = parsed[&0];
        assert!((p0.v2 - 0.5531).abs() < 5e-5);
        assert!((p0.v1 - 0.3217).abs() < 5e-5);
        let p3 = parsed[&3];
        assert!((p3.v2 - 0.4125).abs() < 5e-5);
        assert!((p3.v1 - 0.2750).abs() < 5e-5);
    }

    #[test]
    fn test_parser_skips_non_row_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        // Header starts with 'P' and contains '|' but carries no index.
        fs::write(
            &path,
            "=== Keypoint Auto-Labeling Threshold Analysis ===\n\
             Point  | Accuracy | T_High  | T_Low   | Margin   | V2(Visible)  | V1(Occlude)\n\
             --------------------\n\
             P05     | 0.8000   | 0.500   | 0.200   | +0.300 ✅ | 0.4500     | 0.2500\n\
             📌 [FINAL RECOMMENDATION]\n\
             * Global V2 (Visible)  Threshold: 0.4500\n",
        )
        .unwrap();

        let parsed = load_thresholds(&path).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!((parsed[&5].v2 - 0.45).abs() < 1e-6);
        assert!((parsed[&5].v1 - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_missing_report_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.txt");
        assert!(matches!(
            load_thresholds(&path),
            Err(CalibError::ReportError(_))
        ));
    }

    #[test]
    fn test_global_means() {
        let report = sample_report();
        let v2 = report.mean_v2().unwrap();
        let v1 = report.mean_v1().unwrap();
        assert!((v2 - (0.5531 + 0.4125) / 2.0).abs() < 1e-6);
        assert!((v1 - (0.3217 + 0.2750) / 2.0).abs() < 1e-6);
        assert_eq!(ThresholdReport::default().mean_v2(), None);
    }
}

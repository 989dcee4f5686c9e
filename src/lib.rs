// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]

//! # Pose Keypoint Calibration Toolkit
//!
//! Batch tools for maintaining YOLO pose datasets: derive per-keypoint
//! confidence thresholds by comparing predictions against ground truth, then
//! rewrite label visibility flags using those thresholds.
//!
//! ## Features
//!
//! - **Threshold Analysis** - IoU-based instance matching, per-keypoint OKS
//!   scoring, percentile-based threshold derivation
//! - **Label Update** - rewrites visibility flags in place, erasing keypoints
//!   that escape their instance box
//! - **Dataset Sharding** - shuffles and splits a dataset directory into
//!   fixed-size folders for annotation tooling
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use std::path::Path;
//! use pose_calib::{analyze, update, CalibConfig};
//!
//! fn main() -> pose_calib::Result<()> {
//!     let config = CalibConfig::new();
//!     let report = analyze(
//!         Path::new("val/labels"),
//!         Path::new("runs/pose/labels"),
//!         13,
//!         &config,
//!     )?;
//!     report.save(Path::new("output/conf_threshold.txt"))?;
//!
//!     let summary = update(
//!         Path::new("runs/pose/labels"),
//!         Path::new("output/conf_threshold.txt"),
//!         13,
//!     )?;
//!     println!("{} files changed", summary.files_changed);
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Derive thresholds from a validation run
//! pose-calib analyze --gt-dir val/labels --pred-dir runs/pose/labels --points 13
//!
//! # Apply them to a prediction run's labels
//! pose-calib update --label-dir runs/pose/labels --report output/conf_threshold.txt
//!
//! # Shard a finished dataset into folders of 100 images
//! pose-calib split --src-dir dataset/train --chunk-size 100
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`analysis`] | Matcher & threshold estimator |
//! | [`updater`] | Label visibility rewriting |
//! | [`splitter`] | Dataset sharding |
//! | [`labels`] | Label table I/O (`class cx cy w h (kx ky kv)xP` rows) |
//! | [`report`] | Threshold report serializer/parser |
//! | [`config`] | [`CalibConfig`] analysis parameters |
//! | [`utils`] | IoU, OKS, containment, percentiles |
//! | [`error`] | Error types ([`CalibError`], [`Result`]) |

// Modules
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod labels;
pub mod report;
pub mod splitter;
pub mod updater;
pub mod utils;

// Re-export main types for convenience
pub use analysis::{analyze, KeypointSample};
pub use config::{CalibConfig, DEFAULT_SIGMAS};
pub use error::{CalibError, Result};
pub use report::{ThresholdEntry, ThresholdPair, ThresholdReport};
pub use splitter::{split, SplitSummary};
pub use updater::{update, UpdateSummary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

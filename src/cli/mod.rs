// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for the calibration toolkit.
//!
//! This module contains the command-line interface logic: argument parsing
//! plus the `analyze`, `update` and `split` command implementations.

// Modules
/// CLI arguments.
pub mod args;

/// Threshold analysis command.
pub mod analyze;

/// Console output helpers.
pub mod logging;

/// Dataset sharding command.
pub mod split;

/// Label update command.
pub mod update;

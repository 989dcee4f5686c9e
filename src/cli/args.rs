// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Default number of keypoints per instance.
pub const DEFAULT_POINT_COUNT: usize = 13;

/// Default threshold report location.
pub const DEFAULT_REPORT: &str = "output/conf_threshold.txt";

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r"Examples:
    pose-calib analyze --gt-dir val/labels --pred-dir runs/pose/labels --points 13
    pose-calib analyze --gt-dir val/labels --pred-dir runs/pose/labels --iou 0.6 --oks-high 0.9
    pose-calib update --label-dir runs/pose/labels --report output/conf_threshold.txt
    pose-calib split --src-dir dataset/train --chunk-size 100 --classes classes.txt")]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive per-keypoint confidence thresholds from predictions vs ground truth
    Analyze(AnalyzeArgs),
    /// Rewrite label visibility flags from a threshold report
    Update(UpdateArgs),
    /// Shard a dataset directory into fixed-size folders
    Split(SplitArgs),
}

/// Arguments for the analyze command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Directory of ground-truth label files
    #[arg(long)]
    pub gt_dir: PathBuf,

    /// Directory of prediction detail files (*_detail.txt)
    #[arg(long)]
    pub pred_dir: PathBuf,

    /// Number of keypoints per instance
    #[arg(short, long, default_value_t = DEFAULT_POINT_COUNT)]
    pub points: usize,

    /// Where to write the threshold report
    #[arg(short, long, default_value = DEFAULT_REPORT)]
    pub output: PathBuf,

    /// Minimum IoU for prediction/ground-truth association
    #[arg(long, default_value_t = 0.5)]
    pub iou: f32,

    /// OKS above this counts as well localized
    #[arg(long, default_value_t = 0.85)]
    pub oks_high: f32,

    /// OKS below this counts as poorly localized
    #[arg(long, default_value_t = 0.5)]
    pub oks_low: f32,

    /// Per-keypoint OKS sigmas, comma separated (defaults to the built-in
    /// 17-point person table)
    #[arg(long, value_delimiter = ',')]
    pub sigmas: Option<Vec<f32>>,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the update command.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Directory holding label files and their *_detail.txt counterparts
    #[arg(long)]
    pub label_dir: PathBuf,

    /// Threshold report produced by the analyze command
    #[arg(short, long, default_value = DEFAULT_REPORT)]
    pub report: PathBuf,

    /// Number of keypoints per instance
    #[arg(short, long, default_value_t = DEFAULT_POINT_COUNT)]
    pub points: usize,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the split command.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Directory holding the images to shard
    #[arg(long)]
    pub src_dir: PathBuf,

    /// Root under which split folders are created (defaults to the source
    /// directory)
    #[arg(long)]
    pub dest_dir: Option<PathBuf>,

    /// Maximum number of images per folder
    #[arg(short, long, default_value_t = 100)]
    pub chunk_size: usize,

    /// classes.txt to copy into every folder
    #[arg(long)]
    pub classes: Option<PathBuf>,
}

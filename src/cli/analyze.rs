// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::fs;
use std::process;

use crate::analysis;
use crate::cli::args::AnalyzeArgs;
use crate::config::CalibConfig;
use crate::{error, success};

/// Run the threshold analysis stage.
pub fn run_analysis(args: &AnalyzeArgs) {
    crate::cli::logging::set_verbose(args.verbose);

    let mut config = CalibConfig::new()
        .with_iou(args.iou)
        .with_oks_cuts(args.oks_high, args.oks_low);
    if let Some(sigmas) = &args.sigmas {
        config = config.with_sigmas(sigmas.clone());
    }

    let report = match analysis::analyze(&args.gt_dir, &args.pred_dir, args.points, &config) {
        Ok(report) => report,
        Err(e) => {
            error!("Analysis failed: {e}");
            process::exit(1);
        }
    };

    // Terminal and file receive the identical rendering.
    print!("{}", report.render());

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create {}: {e}", parent.display());
                process::exit(1);
            }
        }
    }
    if let Err(e) = report.save(&args.output) {
        error!("Failed to write report: {e}");
        process::exit(1);
    }
    success!("Analysis report saved to '{}'", args.output.display());
}

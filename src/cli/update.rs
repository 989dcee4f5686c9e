// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use crate::cli::args::UpdateArgs;
use crate::updater;
use crate::{error, info, success};

/// Run the label update stage.
pub fn run_update(args: &UpdateArgs) {
    crate::cli::logging::set_verbose(args.verbose);

    let summary = match updater::update(&args.label_dir, &args.report, args.points) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Update failed: {e}");
            process::exit(1);
        }
    };

    info!("{}", "-".repeat(60));
    success!("Update complete");
    info!(" - Files changed: {}", summary.files_changed);
    info!(" - Points updated: {}", summary.points_updated);
    info!(" - Points erased outside their box: {}", summary.points_erased);
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use crate::cli::args::SplitArgs;
use crate::splitter;
use crate::{error, success};

/// Run the dataset sharding utility.
pub fn run_split(args: &SplitArgs) {
    let dest_dir = args.dest_dir.as_deref().unwrap_or(&args.src_dir);

    let summary = match splitter::split(
        &args.src_dir,
        dest_dir,
        args.chunk_size,
        args.classes.as_deref(),
    ) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Split failed: {e}");
            process::exit(1);
        }
    };

    success!(
        "Moved {} images into {} folders",
        summary.files_moved,
        summary.folders
    );
}

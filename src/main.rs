// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;

use pose_calib::cli::args::{Cli, Commands};
use pose_calib::cli::{analyze, split, update};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => analyze::run_analysis(&args),
        Commands::Update(args) => update::run_update(&args),
        Commands::Split(args) => split::run_split(&args),
    }
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use clap::Parser;

use ultralytics_pose_compare::cli::args::{Cli, Commands};
use ultralytics_pose_compare::cli::compare::{run_compare, run_render, run_score};
use ultralytics_pose_compare::cli::logging::set_verbose;
use ultralytics_pose_compare::error;

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Compare(args) => {
            set_verbose(args.verbose && !args.json);
            run_compare(args)
        }
        Commands::Score(args) => {
            set_verbose(args.verbose && !args.json);
            run_score(args)
        }
        Commands::Render(args) => {
            set_verbose(args.verbose);
            run_render(args)
        }
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use crate::annotate::DISPLAY_HEIGHT;
use clap::{Args, Parser, Subcommand};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Examples:
    ultralytics-pose-compare compare --target warrior.jpg --challenge me.jpg
    ultralytics-pose-compare compare -t warrior.jpg -c me.jpg --save --hide-image
    ultralytics-pose-compare score --target warrior.json --challenge me.json
    ultralytics-pose-compare render --image me.jpg --output me_skeleton.png

Each image is paired with its keypoints in a JSON file of the same name
(warrior.jpg -> warrior.json), as written by a COCO-17 pose estimator."#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare a target pose image against a challenge pose image
    Compare(CompareArgs),
    /// Score two pose JSON files without images
    Score(ScoreArgs),
    /// Draw the skeleton of one pose over its image
    Render(RenderArgs),
}

/// Arguments for the compare command.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct CompareArgs {
    /// Target pose image
    #[arg(short, long)]
    pub target: String,

    /// Challenge pose image
    #[arg(short, long)]
    pub challenge: String,

    /// Draw skeletons on a black background instead of the images
    #[arg(long, default_value_t = false)]
    pub hide_image: bool,

    /// Canvas height in pixels
    #[arg(long, default_value_t = DISPLAY_HEIGHT)]
    pub height: u32,

    /// Save overlays and the score report to runs/compare/<run>
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Display the side-by-side overlay in a window
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Ring the terminal bell when the score is computed
    #[arg(long, default_value_t = false)]
    pub bell: bool,

    /// Print the result as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the score command.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Target pose JSON
    #[arg(short, long)]
    pub target: String,

    /// Challenge pose JSON
    #[arg(short, long)]
    pub challenge: String,

    /// Print the result as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the render command.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Source image
    #[arg(short, long)]
    pub image: String,

    /// Pose JSON (defaults to the image's sidecar file)
    #[arg(short, long)]
    pub pose: Option<String>,

    /// Output path (defaults to runs/render/<run>/<image name>.png)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Draw the skeleton on a black background
    #[arg(long, default_value_t = false)]
    pub hide_image: bool,

    /// Canvas height in pixels
    #[arg(long, default_value_t = DISPLAY_HEIGHT)]
    pub height: u32,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compare_args_defaults() {
        let args = Cli::parse_from(["app", "compare", "--target", "a.jpg", "--challenge", "b.jpg"]);
        match args.command {
            Commands::Compare(compare) => {
                assert_eq!(compare.target, "a.jpg");
                assert_eq!(compare.challenge, "b.jpg");
                assert_eq!(compare.height, 300);
                assert!(!compare.hide_image);
                assert!(!compare.save);
                assert!(compare.verbose);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_score_args_custom() {
        let args = Cli::parse_from([
            "app", "score", "-t", "a.json", "-c", "b.json", "--json", "--verbose", "false",
        ]);
        match args.command {
            Commands::Score(score) => {
                assert_eq!(score.target, "a.json");
                assert!(score.json);
                assert!(!score.verbose);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_render_args() {
        let args = Cli::parse_from(["app", "render", "--image", "a.jpg", "--hide-image", "--height", "480"]);
        match args.command {
            Commands::Render(render) => {
                assert_eq!(render.image, "a.jpg");
                assert!(render.pose.is_none());
                assert!(render.hide_image);
                assert_eq!(render.height, 480);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}

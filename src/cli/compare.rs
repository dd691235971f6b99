// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::io::Write;
use std::path::Path;

#[cfg(feature = "visualize")]
use std::time::Duration;

use image::RgbImage;
use serde::Serialize;

use crate::annotate::{RenderConfig, draw_pose, side_by_side};
use crate::cli::args::{CompareArgs, RenderArgs, ScoreArgs};
use crate::estimator::{PoseEstimator, SidecarEstimator, read_estimates};
use crate::io::{SaveResults, find_next_run_dir};
use crate::keypoints::{Pose, RawPose};
use crate::scoring::{Feedback, ScoreBreakdown, score_breakdown};
use crate::session::{Commit, ScoreListener, Session, SlotKind};
use crate::source::{ImageUpload, LoadedImage};
use crate::{PoseError, Result, VERSION};
use crate::{error, info, section, slot, success, verbose, warn};

/// Gap between the two canvases in the side-by-side image.
const SIDE_BY_SIDE_GAP: u32 = 8;

/// Rings the terminal bell as the audio cue for a new score.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl ScoreListener for TerminalBell {
    fn score_changed(&mut self, _score: u8) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

/// Result of a comparison, as printed with `--json` and saved with `--save`.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    /// Target image or pose file.
    pub target: String,
    /// Challenge image or pose file.
    pub challenge: String,
    /// Similarity score (0 to 100).
    pub score: u8,
    /// Feedback tier.
    pub feedback: &'static str,
    /// Feedback message.
    pub message: &'static str,
    /// Valid keypoints in the target pose.
    pub target_valid: usize,
    /// Valid keypoints in the challenge pose.
    pub challenge_valid: usize,
    /// Keypoints valid in both poses.
    pub matched: usize,
    /// Mean scaled keypoint distance.
    pub avg_distance: f64,
    /// Penalty branch (`normal` or `severe`).
    pub regime: &'static str,
}

impl ComparisonReport {
    fn new(target: &str, challenge: &str, breakdown: &ScoreBreakdown) -> Self {
        let feedback = Feedback::from_score(breakdown.score);
        Self {
            target: target.to_string(),
            challenge: challenge.to_string(),
            score: breakdown.score,
            feedback: feedback.as_str(),
            message: feedback.message(),
            target_valid: breakdown.valid_a,
            challenge_valid: breakdown.valid_b,
            matched: breakdown.matched,
            avg_distance: breakdown.avg_distance,
            regime: breakdown.regime.as_str(),
        }
    }

    fn print(&self, json: bool) -> Result<()> {
        if json {
            info!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }
        verbose!(
            "keypoints: {} target, {} challenge, {} matched, avg distance {:.3} ({} regime)",
            self.target_valid,
            self.challenge_valid,
            self.matched,
            self.avg_distance,
            self.regime
        );
        success!("Similarity {}/100 ({})", self.score, self.feedback);
        info!("{}", self.message);
        Ok(())
    }
}

/// Compare a target image against a challenge image.
///
/// Both slots are loaded, estimated in parallel and committed to a
/// [`Session`]; the session's score is then reported.
///
/// # Errors
///
/// Returns the first slot failure if the pair could not be scored, or an IO
/// error from `--save`.
pub fn run_compare(args: &CompareArgs) -> Result<()> {
    verbose!("Ultralytics Pose Compare {VERSION} 🚀");
    let config = RenderConfig::new().with_display_height(args.height);
    config.validate()?;
    let mut session = Session::new(config);
    if args.bell {
        session = session.with_listener(TerminalBell);
    }
    let estimator = SidecarEstimator::new();

    section!("Loading images");
    let mut failures: Vec<PoseError> = Vec::new();
    let mut tickets = Vec::new();
    for (kind, path) in [
        (SlotKind::Target, &args.target),
        (SlotKind::Challenge, &args.challenge),
    ] {
        match ImageUpload::from_path(path).and_then(|upload| session.begin_upload(kind, upload)) {
            Ok(ticket) => {
                if let Some(loaded) = session.slot(kind).image() {
                    slot!(kind, "{} {}x{}", loaded.name, loaded.image.width(), loaded.image.height());
                }
                tickets.push(ticket);
            }
            Err(e) => {
                error!("{kind}: {e}");
                failures.push(e);
            }
        }
    }

    section!("Estimating poses");
    let target_image = session.slot(SlotKind::Target).image();
    let challenge_image = session.slot(SlotKind::Challenge).image();
    let (target_estimates, challenge_estimates) = rayon::join(
        || estimate(&estimator, target_image),
        || estimate(&estimator, challenge_image),
    );
    let mut estimates = [Some(target_estimates), Some(challenge_estimates)];

    for ticket in tickets {
        let index = match ticket.slot {
            SlotKind::Target => 0,
            SlotKind::Challenge => 1,
        };
        let Some(Some(result)) = estimates[index].take() else {
            continue;
        };
        match session.complete_detection(ticket, result) {
            Ok(Commit::Applied) => {
                if let Some(pose) = session.slot(ticket.slot).pose() {
                    slot!(ticket.slot, "{} valid keypoints", pose.valid_count());
                }
            }
            Ok(Commit::Stale) => {
                warn!("{}: discarded a stale detection", ticket.slot);
            }
            Err(e) => {
                error!("{}: {e}", ticket.slot);
                failures.push(e);
            }
        }
    }

    let (Some(target), Some(challenge)) = (
        session.slot(SlotKind::Target).pose(),
        session.slot(SlotKind::Challenge).pose(),
    ) else {
        return Err(failures
            .into_iter()
            .next()
            .unwrap_or(PoseError::NoPersonDetected));
    };

    section!("Result");
    let report = ComparisonReport::new(&args.target, &args.challenge, &score_breakdown(target, challenge));
    report.print(args.json)?;

    if args.hide_image {
        session.set_show_image(SlotKind::Target, false);
        session.set_show_image(SlotKind::Challenge, false);
    }
    let combined = side_by_side(
        session.slot(SlotKind::Target).canvas(),
        session.slot(SlotKind::Challenge).canvas(),
        SIDE_BY_SIDE_GAP,
    );

    if args.save {
        let saver = SaveResults::new(find_next_run_dir("runs", "compare"));
        saver.save_canvas("target.png", session.slot(SlotKind::Target).canvas())?;
        saver.save_canvas("challenge.png", session.slot(SlotKind::Challenge).canvas())?;
        saver.save_canvas("comparison.png", &combined)?;
        saver.save_json("report.json", &report)?;
        verbose!("Results saved to {}", saver.dir().display());
    }

    if args.show {
        show(&combined)?;
    }

    Ok(())
}

/// Score two pose JSON files.
///
/// # Errors
///
/// Returns an error if either file cannot be read or holds no person.
pub fn run_score(args: &ScoreArgs) -> Result<()> {
    let target = load_pose(Path::new(&args.target))?;
    let challenge = load_pose(Path::new(&args.challenge))?;
    slot!(SlotKind::Target, "{} valid keypoints", target.valid_count());
    slot!(SlotKind::Challenge, "{} valid keypoints", challenge.valid_count());

    let report = ComparisonReport::new(&args.target, &args.challenge, &score_breakdown(&target, &challenge));
    report.print(args.json)
}

/// Draw one pose over its image and save the overlay.
///
/// # Errors
///
/// Returns an error if the image or pose cannot be loaded, or the overlay
/// cannot be written.
pub fn run_render(args: &RenderArgs) -> Result<()> {
    let loaded = ImageUpload::from_path(&args.image)?.decode()?;
    let estimates = match &args.pose {
        Some(path) => read_estimates(Path::new(path))?,
        None => SidecarEstimator::new().estimate(&loaded)?,
    };
    let pose = Pose::from_estimates(&estimates)?;
    verbose!("{}: {} valid keypoints", loaded.name, pose.valid_count());

    let config = RenderConfig::new().with_display_height(args.height);
    config.validate()?;
    let canvas = draw_pose(&pose, &loaded.image, !args.hide_image, &config);

    let saved = if let Some(output) = &args.output {
        canvas.save(output).map_err(|e| PoseError::Io(std::io::Error::other(e.to_string())))?;
        output.into()
    } else {
        let stem = Path::new(&args.image)
            .file_stem()
            .map_or_else(|| "pose".to_string(), |s| s.to_string_lossy().to_string());
        SaveResults::new(find_next_run_dir("runs", "render")).save_canvas(&format!("{stem}.png"), &canvas)?
    };
    success!("Saved overlay to {}", saved.display());
    Ok(())
}

fn estimate(estimator: &dyn PoseEstimator, image: Option<&LoadedImage>) -> Option<Result<Vec<RawPose>>> {
    image.map(|image| estimator.estimate(image))
}

fn load_pose(path: &Path) -> Result<Pose> {
    Pose::from_estimates(&read_estimates(path)?)
}

#[cfg(feature = "visualize")]
fn show(image: &RgbImage) -> Result<()> {
    use crate::visualizer::Viewer;

    let mut viewer = Viewer::new("Ultralytics Pose Compare", image.width() as usize, image.height() as usize)?;
    let frame = image::DynamicImage::ImageRgb8(image.clone());
    if viewer.update(&frame)? {
        while viewer.wait(Duration::from_millis(100))? {}
    }
    Ok(())
}

#[cfg(not(feature = "visualize"))]
#[allow(clippy::unnecessary_wraps)]
fn show(_image: &RgbImage) -> Result<()> {
    warn!("--show requires the 'visualize' feature. Compile with --features visualize to enable it.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Regime;

    fn breakdown(score: u8) -> ScoreBreakdown {
        ScoreBreakdown {
            valid_a: 17,
            valid_b: 12,
            matched: 12,
            avg_distance: 0.25,
            base_similarity: 95.0,
            detection_quality: 12.0 / 17.0,
            regime: Regime::Normal,
            score,
        }
    }

    #[test]
    fn test_report_fields() {
        let report = ComparisonReport::new("a.jpg", "b.jpg", &breakdown(67));
        assert_eq!(report.score, 67);
        assert_eq!(report.feedback, "good");
        assert_eq!(report.regime, "normal");
        assert_eq!(report.challenge_valid, 12);
    }

    #[test]
    fn test_report_json() {
        let report = ComparisonReport::new("a.jpg", "b.jpg", &breakdown(95));
        let value: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["score"], 95);
        assert_eq!(value["feedback"], "excellent");
        assert_eq!(value["target"], "a.jpg");
    }

    #[test]
    fn test_score_command_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let pose = r#"[{"keypoints": [
            {"x": 10, "y": 10, "score": 0.9}, {"x": 20, "y": 10, "score": 0.9},
            {"x": 30, "y": 10, "score": 0.9}, {"x": 40, "y": 10, "score": 0.9},
            {"x": 50, "y": 10, "score": 0.9}, {"x": 60, "y": 10, "score": 0.9},
            {"x": 70, "y": 10, "score": 0.9}, {"x": 80, "y": 10, "score": 0.9},
            {"x": 90, "y": 10, "score": 0.9}
        ]}]"#;
        let target = dir.path().join("target.json");
        let challenge = dir.path().join("challenge.json");
        std::fs::write(&target, pose).unwrap();
        std::fs::write(&challenge, pose).unwrap();

        let loaded = load_pose(&target).unwrap();
        assert_eq!(loaded.valid_count(), 9);

        let args = ScoreArgs {
            target: target.display().to_string(),
            challenge: challenge.display().to_string(),
            json: true,
            verbose: false,
        };
        assert!(run_score(&args).is_ok());
    }

    /// Write `<name>.png` and its `<name>.json` sidecar into `dir`.
    fn write_fixture(dir: &Path, name: &str, dx: f32) -> String {
        let png = dir.join(format!("{name}.png"));
        RgbImage::from_pixel(400, 200, image::Rgb([60, 60, 60]))
            .save(&png)
            .unwrap();
        let pose = RawPose {
            keypoints: (0..17)
                .map(|i| crate::keypoints::RawKeypoint {
                    x: 60.0 + i as f32 * 15.0 + dx,
                    y: 30.0 + i as f32 * 8.0,
                    score: Some(0.9),
                })
                .collect(),
            score: Some(0.9),
        };
        std::fs::write(dir.join(format!("{name}.json")), serde_json::to_string(&[pose]).unwrap()).unwrap();
        png.display().to_string()
    }

    #[test]
    fn test_compare_command_runs() {
        let dir = tempfile::tempdir().unwrap();
        let args = CompareArgs {
            target: write_fixture(dir.path(), "target", 0.0),
            challenge: write_fixture(dir.path(), "challenge", 20.0),
            hide_image: true,
            height: 300,
            save: false,
            show: false,
            bell: false,
            json: true,
            verbose: false,
        };
        assert!(run_compare(&args).is_ok());
    }

    #[test]
    fn test_compare_command_missing_sidecar_fails() {
        let dir = tempfile::tempdir().unwrap();
        let challenge = write_fixture(dir.path(), "challenge", 0.0);
        let target = dir.path().join("lonely.png");
        RgbImage::new(32, 32).save(&target).unwrap();

        let args = CompareArgs {
            target: target.display().to_string(),
            challenge,
            hide_image: false,
            height: 300,
            save: false,
            show: false,
            bell: false,
            json: true,
            verbose: false,
        };
        assert!(matches!(run_compare(&args), Err(PoseError::EstimatorError(_))));
    }

    #[test]
    fn test_render_command_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("overlay.png");
        let args = RenderArgs {
            image: write_fixture(dir.path(), "pose", 0.0),
            pose: None,
            output: Some(output.display().to_string()),
            hide_image: false,
            height: 150,
            verbose: false,
        };
        assert!(run_render(&args).is_ok());

        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (300, 150));
    }

    #[test]
    fn test_render_command_rejects_zero_height() {
        let dir = tempfile::tempdir().unwrap();
        let args = RenderArgs {
            image: write_fixture(dir.path(), "pose", 0.0),
            pose: None,
            output: Some(dir.path().join("out.png").display().to_string()),
            hide_image: false,
            height: 0,
            verbose: false,
        };
        assert!(matches!(run_render(&args), Err(PoseError::ConfigError(_))));
    }

    #[test]
    fn test_score_command_empty_file_is_no_person() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(load_pose(&path), Err(PoseError::NoPersonDetected)));
    }
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Comparison session state.
//!
//! A [`Session`] owns the two image slots (target and challenge). Each slot
//! holds its own image, pose, canvas and display flag, so the two pipelines
//! never share mutable state. The only shared read is the pose pair, which is
//! rescored after every change.
//!
//! Detection is split into [`Session::begin_upload`] and
//! [`Session::complete_detection`] so callers can run the estimator wherever
//! they like. Every upload bumps the slot's generation; a detection that
//! finishes after a newer upload carries an old [`Ticket`] and is dropped.

use std::fmt;

use image::RgbImage;

use crate::annotate::{RenderConfig, render_pose};
use crate::error::{PoseError, Result};
use crate::estimator::PoseEstimator;
use crate::keypoints::{Pose, RawPose};
use crate::scoring::score;
use crate::source::{ImageUpload, LoadedImage};

/// Which of the two images a slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// The pose to imitate.
    Target,
    /// The attempt being scored.
    Challenge,
}

impl SlotKind {
    /// Lowercase name of the slot.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Challenge => "challenge",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receives score change notifications (e.g. to play a sound cue).
pub trait ScoreListener {
    /// Called once for each distinct new score.
    fn score_changed(&mut self, score: u8);
}

/// Compares each recomputed score against the previous one and reports only
/// changes.
#[derive(Debug, Clone, Default)]
pub struct ScoreNotifier {
    last: Option<u8>,
}

impl ScoreNotifier {
    /// Create a notifier with no previous score.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly computed score.
    ///
    /// Returns the score if it differs from the last reported value. A
    /// missing score is not recorded, so a slot being re-uploaded and scoring
    /// the same value again stays silent. Only [`ScoreNotifier::reset`]
    /// forgets the last value.
    pub fn update(&mut self, score: Option<u8>) -> Option<u8> {
        let score = score?;
        if self.last == Some(score) {
            return None;
        }
        self.last = Some(score);
        Some(score)
    }

    /// Last recorded score.
    #[must_use]
    pub const fn last(&self) -> Option<u8> {
        self.last
    }

    /// Forget the previous score.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Proof of an in-flight detection for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    /// Slot the detection belongs to.
    pub slot: SlotKind,
    generation: u64,
}

/// Outcome of committing a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The pose was stored and the slot re-rendered.
    Applied,
    /// A newer upload replaced the image; the result was discarded.
    Stale,
}

/// State of one image slot.
#[derive(Debug, Clone)]
pub struct Slot {
    image: Option<LoadedImage>,
    pose: Option<Pose>,
    canvas: RgbImage,
    show_image: bool,
    busy: bool,
    message: Option<String>,
    generation: u64,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            image: None,
            pose: None,
            canvas: RgbImage::new(0, 0),
            show_image: true,
            busy: false,
            message: None,
            generation: 0,
        }
    }
}

impl Slot {
    /// Current image, if one was uploaded.
    #[must_use]
    pub const fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    /// Current pose, if detection succeeded.
    #[must_use]
    pub const fn pose(&self) -> Option<&Pose> {
        self.pose.as_ref()
    }

    /// Rendered overlay.
    #[must_use]
    pub const fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    /// Whether the source image is drawn under the skeleton.
    #[must_use]
    pub const fn show_image(&self) -> bool {
        self.show_image
    }

    /// Whether a detection is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// User-facing message from the last failure.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn render(&mut self, config: &RenderConfig) {
        let Some(loaded) = &self.image else {
            self.canvas = RgbImage::new(0, 0);
            return;
        };
        let blank;
        let pose = match &self.pose {
            Some(pose) => pose,
            None => {
                blank = Pose::new(Vec::new(), 0.0);
                &blank
            }
        };
        render_pose(&mut self.canvas, pose, &loaded.image, self.show_image, config);
    }

    fn fail(&mut self, err: &PoseError) {
        self.busy = false;
        self.pose = None;
        self.message = Some(err.to_string());
    }
}

/// Target and challenge slots plus the score notifier.
pub struct Session {
    target: Slot,
    challenge: Slot,
    config: RenderConfig,
    notifier: ScoreNotifier,
    listener: Option<Box<dyn ScoreListener + Send>>,
    next_generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("target", &self.target)
            .field("challenge", &self.challenge)
            .field("config", &self.config)
            .field("notifier", &self.notifier)
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self {
            target: Slot::default(),
            challenge: Slot::default(),
            config,
            notifier: ScoreNotifier::new(),
            listener: None,
            next_generation: 0,
        }
    }

    /// Attach a listener for score changes.
    #[must_use]
    pub fn with_listener(mut self, listener: impl ScoreListener + Send + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Read access to a slot.
    #[must_use]
    pub const fn slot(&self, kind: SlotKind) -> &Slot {
        match kind {
            SlotKind::Target => &self.target,
            SlotKind::Challenge => &self.challenge,
        }
    }

    fn slot_mut(&mut self, kind: SlotKind) -> &mut Slot {
        match kind {
            SlotKind::Target => &mut self.target,
            SlotKind::Challenge => &mut self.challenge,
        }
    }

    /// Current similarity score, if both slots have a pose.
    #[must_use]
    pub fn score(&self) -> Option<u8> {
        match (&self.target.pose, &self.challenge.pose) {
            (Some(target), Some(challenge)) => Some(score(target, challenge)),
            _ => None,
        }
    }

    /// Accept a new image for a slot and start a detection.
    ///
    /// The slot's previous pose is discarded. The returned ticket must be
    /// passed to [`Session::complete_detection`].
    ///
    /// # Errors
    ///
    /// Returns the upload's validation or decode error. The slot is cleared
    /// and keeps the error message. Detections still running for its previous
    /// image become stale.
    pub fn begin_upload(&mut self, kind: SlotKind, upload: ImageUpload) -> Result<Ticket> {
        match upload.decode() {
            Ok(loaded) => Ok(self.begin_image(kind, loaded)),
            Err(err) => {
                self.next_generation += 1;
                let generation = self.next_generation;
                let config = self.config.clone();

                let slot = self.slot_mut(kind);
                slot.image = None;
                slot.generation = generation;
                slot.fail(&err);
                slot.render(&config);

                self.rescore();
                Err(err)
            }
        }
    }

    /// Like [`Session::begin_upload`] for an already decoded image.
    pub fn begin_image(&mut self, kind: SlotKind, image: LoadedImage) -> Ticket {
        self.next_generation += 1;
        let generation = self.next_generation;
        let config = self.config.clone();

        let slot = self.slot_mut(kind);
        slot.image = Some(image);
        slot.pose = None;
        slot.busy = true;
        slot.message = None;
        slot.generation = generation;
        slot.render(&config);

        self.rescore();
        Ticket {
            slot: kind,
            generation,
        }
    }

    /// Commit the estimator's result for a ticket.
    ///
    /// Results for a ticket that no longer matches the slot's image are
    /// ignored and reported as [`Commit::Stale`].
    ///
    /// # Errors
    ///
    /// Returns the estimator error, or [`PoseError::NoPersonDetected`] if it
    /// found nobody. The failure is recorded on the slot only.
    pub fn complete_detection(
        &mut self,
        ticket: Ticket,
        estimates: Result<Vec<RawPose>>,
    ) -> Result<Commit> {
        let config = self.config.clone();
        let slot = self.slot_mut(ticket.slot);
        if slot.generation != ticket.generation || slot.image.is_none() {
            return Ok(Commit::Stale);
        }

        match estimates.and_then(|raw| Pose::from_estimates(&raw)) {
            Ok(pose) => {
                slot.pose = Some(pose);
                slot.busy = false;
                slot.message = None;
                slot.render(&config);
                self.rescore();
                Ok(Commit::Applied)
            }
            Err(err) => {
                slot.fail(&err);
                slot.render(&config);
                self.rescore();
                Err(err)
            }
        }
    }

    /// Upload, estimate and commit in one call.
    ///
    /// # Errors
    ///
    /// Returns any upload, estimator or detection error.
    pub fn detect(
        &mut self,
        kind: SlotKind,
        upload: ImageUpload,
        estimator: &dyn PoseEstimator,
    ) -> Result<Commit> {
        let ticket = self.begin_upload(kind, upload)?;
        let estimates = match self.slot(kind).image() {
            Some(image) => estimator.estimate(image),
            None => Ok(Vec::new()),
        };
        self.complete_detection(ticket, estimates)
    }

    /// Toggle whether the source image is drawn under the skeleton.
    pub fn set_show_image(&mut self, kind: SlotKind, show: bool) {
        let config = self.config.clone();
        let slot = self.slot_mut(kind);
        if slot.show_image == show {
            return;
        }
        slot.show_image = show;
        slot.render(&config);
        self.rescore();
    }

    /// Clear both slots and forget the last score.
    pub fn reset(&mut self) {
        self.target = Slot::default();
        self.challenge = Slot::default();
        self.notifier.reset();
    }

    /// Recompute the score and notify the listener if it changed.
    fn rescore(&mut self) {
        let current = self.score();
        if let Some(changed) = self.notifier.update(current)
            && let Some(listener) = self.listener.as_mut()
        {
            listener.score_changed(changed);
        }
    }
}

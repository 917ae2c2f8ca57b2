//! Timed recording of the live surface.
//!
//! The controller is driven entirely by the frame loop: frames and the current time come in
//! through [`CaptureController::on_frame`] and [`CaptureController::poll`], so the scheduled stop
//! fires at `duration` on the injected clock regardless of frame jitter. Encoders hand their output
//! back over a channel; draining it never touches render state.

use std::fmt;
use std::time::{Duration, Instant};

use crate::encode::recorder::{RecorderConfig, RecorderFactory, StreamRecorder, VideoFormat};
use crate::foundation::core::Fps;
use crate::foundation::error::{WavebandsError, WavebandsResult};
use crate::render::artifact::Artifact;
use crate::render::frame::FrameRGBA;

/// Base name of every captured clip.
pub const VIDEO_FILE_STEM: &str = "pattern_HD";

/// User-facing status line.
#[derive(Clone, Debug, PartialEq)]
pub enum CaptureStatus {
    /// Animation is off, so capture cannot start.
    AnimationDisabled,
    Ready,
    /// Session opened; no frame delivered yet.
    Starting,
    Recording { remaining_secs: f64 },
    Error(String),
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnimationDisabled => f.write_str("Enable Animate to render"),
            Self::Ready => f.write_str("Ready"),
            Self::Starting => f.write_str("Starting…"),
            Self::Recording { remaining_secs } => write!(f, "Recording {remaining_secs:.1}s…"),
            Self::Error(reason) => write!(f, "Error: {reason}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
}

/// Why a start request did not open a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartRejection {
    AnimationDisabled,
    AlreadyRecording,
    /// The encoder could not be created or started.
    Recorder(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    Rejected(StartRejection),
}

impl StartOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }
}

/// What to record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureRequest {
    pub duration: Duration,
    pub fps: Fps,
    pub width: u32,
    pub height: u32,
}

/// One live recording.
pub struct CaptureSession {
    pub started_at: Instant,
    pub duration: Duration,
    /// Encoded segments in arrival order.
    pub segments: Vec<Vec<u8>>,
    pub frames: u64,
    format: VideoFormat,
    height: u32,
    recorder: Box<dyn StreamRecorder>,
}

impl CaptureSession {
    pub fn format(&self) -> VideoFormat {
        self.format
    }

    /// `None` when the duration reaches past what the clock can represent.
    pub fn deadline(&self) -> Option<Instant> {
        self.started_at.checked_add(self.duration)
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration
            .saturating_sub(now.saturating_duration_since(self.started_at))
    }

    fn collect(&mut self) {
        let fresh = self.recorder.take_segments();
        self.segments.extend(fresh.into_iter().filter(|s| !s.is_empty()));
    }

    /// Stop the encoder and concatenate everything it produced.
    fn finalize(mut self) -> WavebandsResult<Artifact> {
        self.collect();
        let tail = self.recorder.stop()?;
        self.segments.extend(tail.into_iter().filter(|s| !s.is_empty()));
        if self.segments.is_empty() {
            return Err(WavebandsError::capture("no segments were captured"));
        }

        let bytes = self.segments.concat();
        tracing::debug!(
            segments = self.segments.len(),
            frames = self.frames,
            bytes = bytes.len(),
            "capture finalized"
        );
        Ok(Artifact::new(
            format!("{VIDEO_FILE_STEM}_{}p.{}", self.height, self.format.extension()),
            self.format.mime(),
            bytes,
        ))
    }
}

/// `Idle -> Recording -> Idle` state machine around one recorder at a time.
pub struct CaptureController {
    factory: Box<dyn RecorderFactory>,
    animation_enabled: bool,
    session: Option<CaptureSession>,
    artifact: Option<Artifact>,
    status: CaptureStatus,
}

impl CaptureController {
    pub fn new(factory: Box<dyn RecorderFactory>, animation_enabled: bool) -> Self {
        Self {
            factory,
            animation_enabled,
            session: None,
            artifact: None,
            status: idle_status(animation_enabled),
        }
    }

    pub fn status(&self) -> &CaptureStatus {
        &self.status
    }

    pub fn state(&self) -> CaptureState {
        if self.session.is_some() {
            CaptureState::Recording
        } else {
            CaptureState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the start control is enabled.
    pub fn can_start(&self) -> bool {
        self.animation_enabled && self.session.is_none()
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// Most recent finished clip.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    pub fn take_artifact(&mut self) -> Option<Artifact> {
        self.artifact.take()
    }

    /// Follow the animation toggle. A running session keeps recording; only the start control and
    /// the idle status line change.
    pub fn set_animation_enabled(&mut self, enabled: bool) {
        if self.animation_enabled == enabled {
            return;
        }
        self.animation_enabled = enabled;
        if self.session.is_none() {
            self.status = idle_status(enabled);
        }
    }

    #[tracing::instrument(skip(self, request, now), fields(duration = ?request.duration))]
    pub fn start(&mut self, request: CaptureRequest, now: Instant) -> StartOutcome {
        if !self.animation_enabled {
            return StartOutcome::Rejected(StartRejection::AnimationDisabled);
        }
        if self.session.is_some() {
            return StartOutcome::Rejected(StartRejection::AlreadyRecording);
        }

        self.status = CaptureStatus::Starting;
        let cfg = RecorderConfig {
            width: request.width,
            height: request.height,
            fps: request.fps,
        };
        let opened = self.factory.create().and_then(|mut recorder| {
            recorder.start(&cfg)?;
            Ok(recorder)
        });
        let recorder = match opened {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "capture could not start");
                self.status = CaptureStatus::Error(e.to_string());
                return StartOutcome::Rejected(StartRejection::Recorder(e.to_string()));
            }
        };

        tracing::debug!(format = ?recorder.format(), "capture started");
        self.session = Some(CaptureSession {
            started_at: now,
            duration: request.duration,
            segments: Vec::new(),
            frames: 0,
            format: recorder.format(),
            height: request.height,
            recorder,
        });
        StartOutcome::Started
    }

    /// Feed the frame just drawn. Frames at or past the deadline end the session instead.
    pub fn on_frame(&mut self, frame: &FrameRGBA, now: Instant) {
        self.poll(now);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Err(e) = session.recorder.push_frame(frame) {
            self.abort(e);
            return;
        }
        session.frames += 1;
        session.collect();
        self.status = CaptureStatus::Recording {
            remaining_secs: session.remaining(now).as_secs_f64(),
        };
    }

    /// Drain encoder output, refresh the remaining time and fire the scheduled stop when due.
    pub fn poll(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.collect();
        if session.deadline().is_some_and(|deadline| now >= deadline) {
            self.finish();
            return;
        }
        if session.frames > 0 {
            self.status = CaptureStatus::Recording {
                remaining_secs: session.remaining(now).as_secs_f64(),
            };
        }
    }

    /// Forced stop. A no-op while idle.
    #[tracing::instrument(skip(self, now))]
    pub fn stop(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            tracing::debug!(
                remaining = ?session.remaining(now),
                "capture stopped before deadline"
            );
            self.finish();
        }
    }

    fn finish(&mut self) {
        // Taking the session marks the controller idle before the encoder is finalized.
        let Some(session) = self.session.take() else {
            return;
        };
        match session.finalize() {
            Ok(artifact) => {
                if let Some(old) = self.artifact.replace(artifact) {
                    tracing::debug!(file = %old.file_name, "released previous capture");
                }
                self.status = idle_status(self.animation_enabled);
            }
            Err(e) => {
                tracing::warn!(error = %e, "capture finalize failed");
                self.status = CaptureStatus::Error(e.to_string());
            }
        }
    }

    /// End a session whose encoder failed mid-stream, keeping whatever it already produced.
    fn abort(&mut self, err: WavebandsError) {
        tracing::warn!(error = %err, "capture aborted");
        if let Some(session) = self.session.take() {
            match session.finalize() {
                Ok(partial) => {
                    tracing::debug!(bytes = partial.bytes.len(), "kept partial capture");
                    self.artifact = Some(partial);
                }
                Err(e) => tracing::debug!(error = %e, "nothing to salvage from aborted capture"),
            }
        }
        self.status = CaptureStatus::Error(err.to_string());
    }
}

fn idle_status(animation_enabled: bool) -> CaptureStatus {
    if animation_enabled {
        CaptureStatus::Ready
    } else {
        CaptureStatus::AnimationDisabled
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/controller.rs"]
mod tests;

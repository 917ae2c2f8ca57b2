use super::*;
use crate::encode::recorder::DefaultRecorderFactory;
use crate::foundation::core::Rgb8;

/// Emits one single-byte segment per frame and a trailer on stop.
struct ScriptedRecorder {
    fail_stop: bool,
    fail_push_after: Option<u8>,
    pending: Vec<Vec<u8>>,
    frames: u8,
}

impl StreamRecorder for ScriptedRecorder {
    fn format(&self) -> VideoFormat {
        VideoFormat::WebmVp9
    }

    fn start(&mut self, _cfg: &RecorderConfig) -> WavebandsResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _frame: &FrameRGBA) -> WavebandsResult<()> {
        if self.fail_push_after == Some(self.frames) {
            return Err(WavebandsError::encode("encoder pipe closed"));
        }
        self.frames += 1;
        self.pending.push(vec![self.frames]);
        Ok(())
    }

    fn take_segments(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.pending)
    }

    fn stop(&mut self) -> WavebandsResult<Vec<Vec<u8>>> {
        if self.fail_stop {
            return Err(WavebandsError::encode("recorder already stopped"));
        }
        Ok(vec![vec![0xff]])
    }
}

#[derive(Default)]
struct ScriptedFactory {
    fail_start: bool,
    fail_stop: bool,
    fail_push_after: Option<u8>,
}

impl RecorderFactory for ScriptedFactory {
    fn create(&self) -> WavebandsResult<Box<dyn StreamRecorder>> {
        if self.fail_start {
            return Err(WavebandsError::encode("no encoder"));
        }
        Ok(Box::new(ScriptedRecorder {
            fail_stop: self.fail_stop,
            fail_push_after: self.fail_push_after,
            pending: Vec::new(),
            frames: 0,
        }))
    }
}

fn request() -> CaptureRequest {
    CaptureRequest {
        duration: Duration::from_secs(10),
        fps: Fps::whole(60),
        width: 4,
        height: 2,
    }
}

fn frame() -> FrameRGBA {
    FrameRGBA::filled(4, 2, Rgb8::new(0xf5, 0xf5, 0xdc)).unwrap()
}

fn controller(factory: ScriptedFactory, animate: bool) -> CaptureController {
    CaptureController::new(Box::new(factory), animate)
}

#[test]
fn status_lines_match_the_control_panel() {
    assert_eq!(CaptureStatus::AnimationDisabled.to_string(), "Enable Animate to render");
    assert_eq!(CaptureStatus::Ready.to_string(), "Ready");
    assert_eq!(CaptureStatus::Starting.to_string(), "Starting…");
    assert_eq!(
        CaptureStatus::Recording { remaining_secs: 7.46 }.to_string(),
        "Recording 7.5s…"
    );
    assert_eq!(CaptureStatus::Error("boom".into()).to_string(), "Error: boom");
}

#[test]
fn start_is_rejected_while_animation_is_off() {
    let mut c = controller(ScriptedFactory::default(), false);
    let before = c.status().clone();

    let outcome = c.start(request(), Instant::now());

    assert_eq!(outcome, StartOutcome::Rejected(StartRejection::AnimationDisabled));
    assert_eq!(c.status(), &before);
    assert_eq!(c.status().to_string(), "Enable Animate to render");
    assert!(c.session().is_none());
    assert_eq!(c.state(), CaptureState::Idle);
}

#[test]
fn second_start_is_rejected_while_recording() {
    let mut c = controller(ScriptedFactory::default(), true);
    let t0 = Instant::now();
    assert!(c.start(request(), t0).is_started());
    assert!(!c.can_start());
    assert_eq!(
        c.start(request(), t0),
        StartOutcome::Rejected(StartRejection::AlreadyRecording)
    );
    assert_eq!(c.state(), CaptureState::Recording);
}

#[test]
fn early_stop_produces_non_empty_artifact() {
    let mut c = controller(ScriptedFactory::default(), true);
    let t0 = Instant::now();
    c.start(request(), t0);
    assert_eq!(c.status(), &CaptureStatus::Starting);

    for i in 0..3u64 {
        c.on_frame(&frame(), t0 + Duration::from_millis(16 * i));
    }
    assert_eq!(c.session().map(|s| s.segments.len()), Some(3));

    c.stop(t0 + Duration::from_secs(1));

    assert_eq!(c.state(), CaptureState::Idle);
    assert_eq!(c.status(), &CaptureStatus::Ready);
    assert!(c.can_start());
    let artifact = c.artifact().unwrap();
    assert_eq!(artifact.bytes, vec![1, 2, 3, 0xff]);
    assert_eq!(artifact.file_name, "pattern_HD_2p.webm");
    assert_eq!(artifact.mime, "video/webm;codecs=vp9");
}

#[test]
fn recording_status_reports_remaining_time() {
    let mut c = controller(ScriptedFactory::default(), true);
    let t0 = Instant::now();
    c.start(request(), t0);
    c.on_frame(&frame(), t0 + Duration::from_millis(2500));
    assert_eq!(c.status().to_string(), "Recording 7.5s…");
    c.poll(t0 + Duration::from_secs(9));
    assert_eq!(c.status().to_string(), "Recording 1.0s…");
}

#[test]
fn scheduled_stop_fires_at_deadline() {
    let mut c = controller(ScriptedFactory::default(), true);
    let t0 = Instant::now();
    c.start(request(), t0);
    c.on_frame(&frame(), t0);
    c.poll(t0 + Duration::from_millis(9_999));
    assert!(c.is_recording());

    // A late frame is not recorded; the session ends instead.
    c.on_frame(&frame(), t0 + Duration::from_secs(10));
    assert!(!c.is_recording());
    assert_eq!(c.artifact().unwrap().bytes, vec![1, 0xff]);
}

#[test]
fn unrepresentable_duration_never_reaches_its_deadline() {
    let mut c = controller(ScriptedFactory::default(), true);
    let t0 = Instant::now();
    let outcome = c.start(
        CaptureRequest {
            duration: Duration::MAX,
            ..request()
        },
        t0,
    );
    assert!(outcome.is_started());
    assert!(c.session().unwrap().deadline().is_none());

    c.on_frame(&frame(), t0 + Duration::from_secs(3600));
    assert!(c.is_recording());
    c.stop(t0 + Duration::from_secs(3601));
    assert_eq!(c.artifact().unwrap().bytes, vec![1, 0xff]);
}

#[test]
fn encoder_failure_keeps_the_frames_already_encoded() {
    let factory = ScriptedFactory {
        fail_push_after: Some(2),
        ..ScriptedFactory::default()
    };
    let mut c = controller(factory, true);
    let t0 = Instant::now();
    c.start(request(), t0);
    for i in 0..3u64 {
        c.on_frame(&frame(), t0 + Duration::from_millis(100 * i));
    }

    assert_eq!(c.state(), CaptureState::Idle);
    assert_eq!(
        c.status(),
        &CaptureStatus::Error("encode error: encoder pipe closed".to_string())
    );
    let partial = c.artifact().unwrap();
    assert_eq!(partial.bytes, vec![1, 2, 0xff]);
    assert_eq!(partial.file_name, "pattern_HD_2p.webm");
}

#[test]
fn failed_stop_still_returns_to_idle_with_error() {
    let factory = ScriptedFactory {
        fail_stop: true,
        ..ScriptedFactory::default()
    };
    let mut c = controller(factory, true);
    let t0 = Instant::now();
    c.start(request(), t0);
    c.on_frame(&frame(), t0);
    c.stop(t0 + Duration::from_secs(2));

    assert_eq!(c.state(), CaptureState::Idle);
    assert!(matches!(c.status(), CaptureStatus::Error(_)));
    assert!(c.status().to_string().starts_with("Error: "));
    assert!(c.artifact().is_none());
    assert!(c.can_start());
}

#[test]
fn recorder_start_failure_is_reported_not_raised() {
    let factory = ScriptedFactory {
        fail_start: true,
        ..ScriptedFactory::default()
    };
    let mut c = controller(factory, true);
    let outcome = c.start(request(), Instant::now());
    assert!(matches!(
        outcome,
        StartOutcome::Rejected(StartRejection::Recorder(_))
    ));
    assert_eq!(c.state(), CaptureState::Idle);
    assert!(matches!(c.status(), CaptureStatus::Error(_)));
}

#[test]
fn previous_artifact_is_kept_until_the_next_one_is_ready() {
    let mut c = controller(ScriptedFactory::default(), true);
    let t0 = Instant::now();
    c.start(request(), t0);
    c.on_frame(&frame(), t0);
    c.stop(t0);
    let first = c.artifact().cloned().unwrap();

    c.start(request(), t0);
    c.on_frame(&frame(), t0);
    c.on_frame(&frame(), t0);
    assert_eq!(c.artifact(), Some(&first));

    c.stop(t0);
    assert_eq!(c.artifact().unwrap().bytes, vec![1, 2, 0xff]);
}

#[test]
fn disabling_animation_mid_session_keeps_start_disabled_afterwards() {
    let mut c = controller(ScriptedFactory::default(), true);
    let t0 = Instant::now();
    c.start(request(), t0);
    c.on_frame(&frame(), t0);
    c.set_animation_enabled(false);
    assert!(c.is_recording());

    c.stop(t0 + Duration::from_secs(1));
    assert!(!c.can_start());
    assert_eq!(c.status(), &CaptureStatus::AnimationDisabled);
    assert!(c.artifact().is_some());
}

#[test]
fn gif_fallback_records_a_playable_clip() {
    let factory = DefaultRecorderFactory::with_format(VideoFormat::Gif).with_segment_bytes(32);
    let mut c = CaptureController::new(Box::new(factory), true);
    let t0 = Instant::now();
    assert!(c.start(request(), t0).is_started());
    for i in 0..4u64 {
        c.on_frame(&frame(), t0 + Duration::from_millis(16 * i));
    }
    c.stop(t0 + Duration::from_millis(100));

    let artifact = c.artifact().unwrap();
    assert_eq!(artifact.file_name, "pattern_HD_2p.gif");
    assert!(artifact.bytes.starts_with(b"GIF89a"));
    assert_eq!(artifact.bytes.last(), Some(&0x3b));
}

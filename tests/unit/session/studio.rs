use super::*;
use crate::animation::scheduler::{AnimationMode, AnimationSettings};
use crate::capture::controller::{CaptureStatus, StartRejection};
use crate::encode::recorder::VideoFormat;
use crate::foundation::core::{Canvas, Fps};
use crate::pattern::params::GlobalRenderParams;

fn small_store(animate: bool) -> ParameterStore {
    let canvas = Canvas {
        width: 64,
        height: 36,
    };
    let params = RenderParameters {
        canvas,
        globals: GlobalRenderParams {
            spacing: 6.0,
            line_count: 8,
            sample_step: 2.0,
            ..GlobalRenderParams::for_canvas(canvas)
        },
        ..RenderParameters::default()
    };
    let animation = AnimationSettings {
        enabled: animate,
        mode: AnimationMode::Loop,
        fps: Fps::whole(10),
        loop_seconds: 1.0,
    };
    ParameterStore::new(params, animation)
}

fn studio(animate: bool) -> Studio {
    let factory = DefaultRecorderFactory::with_format(VideoFormat::Gif).with_segment_bytes(64);
    Studio::new(small_store(animate), Box::new(factory))
}

#[test]
fn frames_are_counted_from_zero() {
    let mut s = studio(true);
    let t0 = Instant::now();
    assert_eq!(s.tick(t0).unwrap(), FrameIndex(0));
    assert_eq!(s.tick(t0).unwrap(), FrameIndex(1));
    assert_eq!(s.next_frame(), FrameIndex(2));
    assert_eq!(s.current_frame(), Some(FrameIndex(1)));
}

#[test]
fn static_scene_redraws_only_on_parameter_change() {
    let mut s = studio(false);
    let t0 = Instant::now();
    s.tick(t0).unwrap();
    s.tick(t0).unwrap();
    assert_eq!(s.live().draw_count(), 1);

    s.store_mut().set_spacing(8.0);
    s.tick(t0).unwrap();
    assert_eq!(s.live().draw_count(), 2);
}

#[test]
fn animated_scene_redraws_every_tick() {
    let mut s = studio(true);
    let t0 = Instant::now();
    for _ in 0..3 {
        s.tick(t0).unwrap();
    }
    assert_eq!(s.live().draw_count(), 3);
    let frame = s.frame().unwrap();
    assert_eq!((frame.width, frame.height), (64, 36));
}

#[test]
fn exports_snapshot_the_frame_on_screen() {
    let mut s = studio(true);
    let t0 = Instant::now();
    for _ in 0..4 {
        s.tick(t0).unwrap();
    }

    let params = s.store().snapshot();
    let state = s.store().animation().at(FrameIndex(3));
    let expected = PatternPlan::build(&params, &compute_frame_delta(&state, params.layer_count()));
    assert_eq!(s.current_plan(), expected);

    let first = s.store().animation().at(FrameIndex(0));
    let at_zero = PatternPlan::build(&params, &compute_frame_delta(&first, params.layer_count()));
    assert_ne!(s.current_plan(), at_zero);

    let png = s.export_raster(2).unwrap();
    assert_eq!(png.file_name, "pattern_2x.png");
    let img = image::load_from_memory(&png.bytes).unwrap();
    assert_eq!((img.width(), img.height()), (128, 72));

    let svg = s.export_vector();
    assert_eq!(svg.file_name, "pattern.svg");
    assert_eq!(svg.mime, "image/svg+xml");
}

#[test]
fn capture_is_rejected_without_animation() {
    let mut s = studio(false);
    let t0 = Instant::now();
    s.tick(t0).unwrap();
    let outcome = s.start_capture(t0);
    assert_eq!(outcome, StartOutcome::Rejected(StartRejection::AnimationDisabled));
    assert_eq!(s.capture().status(), &CaptureStatus::AnimationDisabled);
    assert!(s.capture().session().is_none());
}

#[test]
fn capture_stops_itself_after_the_loop_duration() {
    let mut s = studio(true);
    let t0 = Instant::now();
    assert!(s.start_capture(t0).is_started());

    let fps = s.store().animation().fps;
    for i in 0..=10u64 {
        s.tick(t0 + Duration::from_secs_f64(fps.frames_to_secs(i))).unwrap();
    }

    assert!(!s.capture().is_recording());
    assert_eq!(s.capture().status(), &CaptureStatus::Ready);
    let clip = s.take_capture_artifact().unwrap();
    assert_eq!(clip.file_name, "pattern_HD_36p.gif");
    assert!(clip.bytes.starts_with(b"GIF89a"));
}

#[test]
fn animation_toggle_reaches_the_capture_status() {
    let mut s = studio(true);
    let t0 = Instant::now();
    s.tick(t0).unwrap();
    assert_eq!(s.capture().status().to_string(), "Ready");

    s.store_mut().set_animation_enabled(false);
    s.tick(t0).unwrap();
    assert_eq!(s.capture().status().to_string(), "Enable Animate to render");
    assert!(!s.capture().can_start());
}

#[test]
fn oversized_loop_duration_still_starts_a_capture() {
    let mut store = small_store(true);
    store.set_loop_seconds(1e20);
    let factory = DefaultRecorderFactory::with_format(VideoFormat::Gif).with_segment_bytes(64);
    let mut s = Studio::new(store, Box::new(factory));
    let t0 = Instant::now();

    assert!(s.start_capture(t0).is_started());
    assert_eq!(s.capture().session().unwrap().duration, Duration::MAX);
    s.tick(t0).unwrap();
    s.stop_capture(t0 + Duration::from_millis(100));
    assert_eq!(s.capture().status(), &CaptureStatus::Ready);
    assert!(s.take_capture_artifact().is_some());
}

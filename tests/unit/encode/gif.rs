use super::*;
use crate::foundation::core::{Fps, Rgb8};

fn cfg() -> RecorderConfig {
    RecorderConfig {
        width: 8,
        height: 4,
        fps: Fps::whole(30),
    }
}

#[test]
fn push_before_start_is_an_error() {
    let mut rec = GifRecorder::new(64);
    let frame = FrameRGBA::filled(8, 4, Rgb8::new(1, 2, 3)).unwrap();
    assert!(rec.push_frame(&frame).is_err());
    assert!(rec.stop().is_err());
}

#[test]
fn produces_a_complete_gif_across_segments() {
    let mut rec = GifRecorder::new(16);
    rec.start(&cfg()).unwrap();
    for i in 0..4u8 {
        let frame = FrameRGBA::filled(8, 4, Rgb8::new(i * 60, 20, 200)).unwrap();
        rec.push_frame(&frame).unwrap();
    }
    assert_eq!(rec.frames_encoded(), 4);

    let mut segments = rec.take_segments();
    segments.extend(rec.stop().unwrap());
    assert!(segments.len() > 1);

    let bytes: Vec<u8> = segments.concat();
    assert!(bytes.starts_with(b"GIF89a"));
    assert_eq!(bytes.last(), Some(&0x3b));
}

#[test]
fn mismatched_frame_size_is_rejected() {
    let mut rec = GifRecorder::new(64);
    rec.start(&cfg()).unwrap();
    let frame = FrameRGBA::filled(4, 4, Rgb8::new(0, 0, 0)).unwrap();
    assert!(rec.push_frame(&frame).is_err());
}

fn delay_ms(fps: Fps) -> f64 {
    let (n, d) = frame_delay(fps).numer_denom_ms();
    f64::from(n) / f64::from(d)
}

#[test]
fn frame_delay_follows_the_rational_rate() {
    assert!((delay_ms(Fps::whole(50)) - 20.0).abs() < 1e-9);
    assert!((delay_ms(Fps::new(30_000, 1001).unwrap()) - 1001.0 / 30.0).abs() < 1e-9);
}

#[test]
fn huge_denominators_do_not_overflow_the_delay() {
    let fps = Fps::new(5_000_000, 4_300_000).unwrap();
    let ms = delay_ms(fps);
    assert!((ms - 860.0).abs() < 1.0, "{ms}");

    let mut rec = GifRecorder::new(64);
    rec.start(&RecorderConfig { fps, ..cfg() }).unwrap();
}

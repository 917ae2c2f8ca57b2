use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::whole(0), Fps { num: 1, den: 1 });
}

#[test]
fn fps_secs_to_frames_rounds() {
    let fps = Fps::whole(60);
    assert_eq!(fps.secs_to_frames_round(10.0), 600);
    assert_eq!(fps.secs_to_frames_round(0.0125), 1);
    assert_eq!(fps.secs_to_frames_round(-3.0), 0);
    assert!((fps.frames_to_secs(30) - 0.5).abs() < 1e-12);
}

#[test]
fn canvas_center_and_scale() {
    let c = Canvas::default();
    assert_eq!(c.center(), Point::new(960.0, 540.0));
    let s = c.scaled(4).unwrap();
    assert_eq!((s.width, s.height), (7680, 4320));
    assert!(c.scaled(u32::MAX).is_err());
}

#[test]
fn rgb_hex_parses_and_formats() {
    let c = Rgb8::from_hex("#D2691E").unwrap();
    assert_eq!(c, Rgb8::new(0xd2, 0x69, 0x1e));
    assert_eq!(c.to_hex(), "#d2691e");
    assert_eq!(Rgb8::from_hex("8b0000").unwrap(), Rgb8::new(0x8b, 0, 0));
    assert!(Rgb8::from_hex("#12345").is_err());
    assert!(Rgb8::from_hex("#zz0000").is_err());
}

#[test]
fn frame_index_next_saturates() {
    assert_eq!(FrameIndex(4).next(), FrameIndex(5));
    assert_eq!(FrameIndex(u64::MAX).next(), FrameIndex(u64::MAX));
}

use super::*;
use crate::foundation::core::Rgb8;

const ENCODERS: &str = "Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC
 V....D libvpx               libvpx VP8 (codec vp8)
 A....D libopus              libopus Opus
";

#[test]
fn encoder_table_is_parsed_below_separator() {
    let names = parse_encoder_list(ENCODERS);
    assert_eq!(names, vec!["libx264".to_string(), "libvpx".to_string()]);
}

#[test]
fn negotiation_prefers_vp9_then_vp8_then_h264() {
    let all = ["libvpx-vp9", "libvpx", "libx264"].map(String::from).to_vec();
    assert_eq!(negotiate_format(&all), VideoFormat::WebmVp9);
    assert_eq!(negotiate_format(&parse_encoder_list(ENCODERS)), VideoFormat::WebmVp8);
    assert_eq!(negotiate_format(&["libx264".to_string()]), VideoFormat::Mp4H264);
    assert_eq!(negotiate_format(&[]), VideoFormat::Gif);
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_to_opaque_rgba8(&mut dst, &src, [10, 20, 30]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_to_opaque_rgba8(&mut dst, &src, [10, 20, 30]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let mut rec = FfmpegRecorder::new("ffmpeg", VideoFormat::WebmVp9, 1024);
    let cfg = RecorderConfig {
        width: 15,
        height: 16,
        fps: Fps::whole(30),
    };
    assert!(rec.start(&cfg).is_err());
}

#[test]
fn streams_segments_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let program = ffmpeg_program();
    let Ok(encoders) = probe_encoders(&program) else {
        return;
    };
    let format = negotiate_format(&encoders);
    if format == VideoFormat::Gif {
        return;
    }

    let cfg = RecorderConfig {
        width: 64,
        height: 32,
        fps: Fps::whole(30),
    };
    let mut rec = FfmpegRecorder::new(program, format, 512);
    rec.start(&cfg).unwrap();
    for i in 0..15u8 {
        let frame = FrameRGBA::filled(64, 32, Rgb8::new(i * 10, 100, 200)).unwrap();
        rec.push_frame(&frame).unwrap();
    }
    let mut segments = rec.take_segments();
    segments.extend(rec.stop().unwrap());
    let total: usize = segments.iter().map(Vec::len).sum();
    assert!(!segments.is_empty());
    assert!(total > 0);
}

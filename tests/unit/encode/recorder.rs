use super::*;
use std::io::Write as _;

#[test]
fn writer_emits_segments_at_threshold_and_on_drop() {
    let (mut writer, receiver) = segment_channel(4);
    writer.write_all(&[1, 2, 3]).unwrap();
    assert!(receiver.drain().is_empty());

    writer.write_all(&[4, 5]).unwrap();
    assert_eq!(receiver.drain(), vec![vec![1, 2, 3, 4, 5]]);

    writer.write_all(&[6]).unwrap();
    drop(writer);
    assert_eq!(receiver.drain(), vec![vec![6]]);
}

#[test]
fn flush_sends_partial_segment_once() {
    let (mut writer, receiver) = segment_channel(1024);
    writer.write_all(b"abc").unwrap();
    writer.flush().unwrap();
    writer.flush().unwrap();
    assert_eq!(receiver.drain(), vec![b"abc".to_vec()]);
}

#[test]
fn formats_report_container_details() {
    assert_eq!(VideoFormat::PREFERENCE[0], VideoFormat::WebmVp9);
    assert_eq!(VideoFormat::WebmVp9.extension(), "webm");
    assert_eq!(VideoFormat::Mp4H264.mime(), "video/mp4");
    assert_eq!(VideoFormat::Gif.ffmpeg_encoder(), None);
    assert_eq!(VideoFormat::WebmVp8.ffmpeg_encoder(), Some("libvpx"));
}

#[test]
fn gif_factory_creates_gif_recorders() {
    let factory = DefaultRecorderFactory::with_format(VideoFormat::Gif).with_segment_bytes(256);
    let rec = factory.create().unwrap();
    assert_eq!(rec.format(), VideoFormat::Gif);
}

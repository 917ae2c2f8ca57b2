use std::io::Write;
use std::sync::mpsc;

use crate::foundation::core::Fps;
use crate::foundation::error::WavebandsResult;
use crate::render::frame::FrameRGBA;

/// Default size of one emitted capture segment.
pub const DEFAULT_SEGMENT_BYTES: usize = 64 * 1024;

/// Container and codec of a capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VideoFormat {
    /// WebM with VP9, the preferred encoding.
    WebmVp9,
    /// WebM with VP8.
    WebmVp8,
    /// Fragmented MP4 with H.264.
    Mp4H264,
    /// Animated GIF, encoded in-process. Always available.
    Gif,
}

impl VideoFormat {
    /// Negotiation order, most preferred first.
    pub const PREFERENCE: [VideoFormat; 4] = [
        VideoFormat::WebmVp9,
        VideoFormat::WebmVp8,
        VideoFormat::Mp4H264,
        VideoFormat::Gif,
    ];

    pub fn mime(self) -> &'static str {
        match self {
            Self::WebmVp9 => "video/webm;codecs=vp9",
            Self::WebmVp8 => "video/webm",
            Self::Mp4H264 => "video/mp4",
            Self::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::WebmVp9 | Self::WebmVp8 => "webm",
            Self::Mp4H264 => "mp4",
            Self::Gif => "gif",
        }
    }

    /// `ffmpeg` encoder name, `None` for in-process formats.
    pub fn ffmpeg_encoder(self) -> Option<&'static str> {
        match self {
            Self::WebmVp9 => Some("libvpx-vp9"),
            Self::WebmVp8 => Some("libvpx"),
            Self::Mp4H264 => Some("libx264"),
            Self::Gif => None,
        }
    }
}

/// Parameters of one recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecorderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

/// Encoder fed with live frames, emitting encoded segments as they become available.
///
/// Lifecycle: `start` once, `push_frame` any number of times, `stop` once. Segments may be drained
/// with `take_segments` at any time in between; `stop` returns whatever is still pending.
pub trait StreamRecorder {
    fn format(&self) -> VideoFormat;
    fn start(&mut self, cfg: &RecorderConfig) -> WavebandsResult<()>;
    fn push_frame(&mut self, frame: &FrameRGBA) -> WavebandsResult<()>;
    /// Segments produced since the last call. Never blocks.
    fn take_segments(&mut self) -> Vec<Vec<u8>>;
    /// Finish encoding and return the trailing segments.
    fn stop(&mut self) -> WavebandsResult<Vec<Vec<u8>>>;
}

/// Source of fresh recorders, one per capture session.
pub trait RecorderFactory {
    fn create(&self) -> WavebandsResult<Box<dyn StreamRecorder>>;
}

/// `Write` end of a segment channel.
///
/// Bytes are buffered and sent as one segment every `segment_bytes`; the remainder is sent on
/// `flush` and on drop.
pub struct SegmentWriter {
    tx: mpsc::Sender<Vec<u8>>,
    buf: Vec<u8>,
    segment_bytes: usize,
}

impl SegmentWriter {
    fn send_buffered(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let segment = std::mem::take(&mut self.buf);
        // A dropped receiver means the session is gone; the bytes have nowhere to go.
        let _ = self.tx.send(segment);
    }
}

impl Write for SegmentWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= self.segment_bytes {
            self.send_buffered();
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.send_buffered();
        Ok(())
    }
}

impl Drop for SegmentWriter {
    fn drop(&mut self) {
        self.send_buffered();
    }
}

/// Receiving end of a segment channel.
pub struct SegmentReceiver {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl SegmentReceiver {
    /// Every segment currently queued, in arrival order.
    pub fn drain(&self) -> Vec<Vec<u8>> {
        self.rx.try_iter().filter(|s| !s.is_empty()).collect()
    }
}

/// Create a connected writer/receiver pair.
pub fn segment_channel(segment_bytes: usize) -> (SegmentWriter, SegmentReceiver) {
    let (tx, rx) = mpsc::channel();
    (
        SegmentWriter {
            tx,
            buf: Vec::new(),
            segment_bytes: segment_bytes.max(1),
        },
        SegmentReceiver { rx },
    )
}

/// Segment size from `WAVEBANDS_SEGMENT_BYTES`, defaulting to [`DEFAULT_SEGMENT_BYTES`].
pub fn segment_bytes_from_env() -> usize {
    std::env::var("WAVEBANDS_SEGMENT_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_SEGMENT_BYTES)
}

/// Factory that negotiates the best available encoding once and reuses it for every session.
#[derive(Clone, Debug)]
pub struct DefaultRecorderFactory {
    format: VideoFormat,
    ffmpeg_program: String,
    segment_bytes: usize,
}

impl DefaultRecorderFactory {
    /// Probe the system `ffmpeg` and pick the most preferred format it supports, falling back to
    /// GIF when `ffmpeg` is unavailable.
    pub fn negotiate() -> Self {
        let program = crate::encode::ffmpeg::ffmpeg_program();
        let format = match crate::encode::ffmpeg::probe_encoders(&program) {
            Ok(encoders) => crate::encode::ffmpeg::negotiate_format(&encoders),
            Err(e) => {
                tracing::warn!(error = %e, "ffmpeg unavailable, capturing as gif");
                VideoFormat::Gif
            }
        };
        if format != VideoFormat::WebmVp9 {
            tracing::warn!(?format, "preferred capture encoding unavailable, falling back");
        }
        Self::with_format(format).with_program(program)
    }

    /// Factory for a fixed format.
    pub fn with_format(format: VideoFormat) -> Self {
        Self {
            format,
            ffmpeg_program: crate::encode::ffmpeg::ffmpeg_program(),
            segment_bytes: segment_bytes_from_env(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.ffmpeg_program = program.into();
        self
    }

    pub fn with_segment_bytes(mut self, segment_bytes: usize) -> Self {
        self.segment_bytes = segment_bytes.max(1);
        self
    }

    pub fn format(&self) -> VideoFormat {
        self.format
    }
}

impl RecorderFactory for DefaultRecorderFactory {
    fn create(&self) -> WavebandsResult<Box<dyn StreamRecorder>> {
        let recorder: Box<dyn StreamRecorder> = match self.format {
            VideoFormat::Gif => Box::new(crate::encode::gif::GifRecorder::new(self.segment_bytes)),
            format => Box::new(crate::encode::ffmpeg::FfmpegRecorder::new(
                self.ffmpeg_program.clone(),
                format,
                self.segment_bytes,
            )),
        };
        Ok(recorder)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/recorder.rs"]
mod tests;

use std::time::Duration;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::encode::recorder::{
    RecorderConfig, SegmentReceiver, SegmentWriter, StreamRecorder, VideoFormat, segment_channel,
};
use crate::foundation::core::Fps;
use crate::foundation::error::{WavebandsError, WavebandsResult};
use crate::render::frame::FrameRGBA;

/// In-process animated GIF recorder, used when no `ffmpeg` is available.
///
/// The encoder writes into a [`SegmentWriter`], so segments appear while recording just like the
/// `ffmpeg` path. The GIF trailer is written when the encoder is dropped in [`StreamRecorder::stop`].
pub struct GifRecorder {
    segment_bytes: usize,
    encoder: Option<GifEncoder<SegmentWriter>>,
    segments: Option<SegmentReceiver>,
    delay: Delay,
    cfg: Option<RecorderConfig>,
    frames: u64,
}

impl GifRecorder {
    pub fn new(segment_bytes: usize) -> Self {
        Self {
            segment_bytes,
            encoder: None,
            segments: None,
            delay: Delay::from_numer_denom_ms(1000, 60),
            cfg: None,
            frames: 0,
        }
    }

    /// Frames encoded since `start`.
    pub fn frames_encoded(&self) -> u64 {
        self.frames
    }
}

impl StreamRecorder for GifRecorder {
    fn format(&self) -> VideoFormat {
        VideoFormat::Gif
    }

    fn start(&mut self, cfg: &RecorderConfig) -> WavebandsResult<()> {
        if self.encoder.is_some() {
            return Err(WavebandsError::encode("gif recorder already started"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(WavebandsError::validation(
                "recorder width/height must be non-zero",
            ));
        }
        if cfg.width > u16::MAX as u32 || cfg.height > u16::MAX as u32 {
            return Err(WavebandsError::validation(
                "gif frames are limited to 65535x65535",
            ));
        }

        let (writer, receiver) = segment_channel(self.segment_bytes);
        let mut encoder = GifEncoder::new_with_speed(writer, 30);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| WavebandsError::encode(format!("gif setup failed: {e}")))?;

        self.delay = frame_delay(cfg.fps);
        self.encoder = Some(encoder);
        self.segments = Some(receiver);
        self.cfg = Some(*cfg);
        self.frames = 0;
        tracing::info!(width = cfg.width, height = cfg.height, "gif recorder started");
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> WavebandsResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| WavebandsError::encode("gif recorder not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(WavebandsError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(WavebandsError::encode("gif recorder is already stopped"));
        };

        let img = RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or_else(|| WavebandsError::validation("frame.data size mismatch with width*height*4"))?;
        encoder
            .encode_frame(Frame::from_parts(img, 0, 0, self.delay))
            .map_err(|e| WavebandsError::encode(format!("gif frame encode failed: {e}")))?;
        self.frames += 1;
        Ok(())
    }

    fn take_segments(&mut self) -> Vec<Vec<u8>> {
        self.segments
            .as_ref()
            .map(SegmentReceiver::drain)
            .unwrap_or_default()
    }

    fn stop(&mut self) -> WavebandsResult<Vec<Vec<u8>>> {
        if self.cfg.take().is_none() {
            return Err(WavebandsError::encode("gif recorder not started"));
        }
        // Dropping the encoder writes the trailer, then the writer flushes its last segment.
        drop(self.encoder.take());
        let tail = self.take_segments();
        self.segments = None;
        Ok(tail)
    }
}

/// Per-frame GIF delay. The exact ratio is kept when it fits, which keeps fractional rates close
/// once the encoder rounds to centiseconds.
fn frame_delay(fps: Fps) -> Delay {
    let num = fps.num.max(1);
    match fps.den.checked_mul(1000) {
        Some(ms) => Delay::from_numer_denom_ms(ms, num),
        None => Delay::from_saturating_duration(
            Duration::try_from_secs_f64(f64::from(fps.den) / f64::from(num))
                .unwrap_or(Duration::MAX),
        ),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;

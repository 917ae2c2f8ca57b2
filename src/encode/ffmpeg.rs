use std::io::{Read, Write as _};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::recorder::{
    RecorderConfig, SegmentReceiver, StreamRecorder, VideoFormat, segment_channel,
};
use crate::foundation::core::Fps;
use crate::foundation::error::{WavebandsError, WavebandsResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Encoder binary: `WAVEBANDS_FFMPEG` when set, `ffmpeg` from `PATH` otherwise.
pub fn ffmpeg_program() -> String {
    std::env::var("WAVEBANDS_FFMPEG")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| "ffmpeg".to_string())
}

/// Return `true` when `ffmpeg` can be invoked.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new(ffmpeg_program())
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// List the encoder names `program -encoders` reports.
pub fn probe_encoders(program: &str) -> WavebandsResult<Vec<String>> {
    let out = Command::new(program)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| WavebandsError::encode(format!("failed to run '{program}': {e}")))?;
    if !out.status.success() {
        return Err(WavebandsError::encode(format!(
            "'{program} -encoders' exited with status {}",
            out.status
        )));
    }
    Ok(parse_encoder_list(&String::from_utf8_lossy(&out.stdout)))
}

/// Parse the table printed by `ffmpeg -encoders`.
///
/// Rows look like ` V....D libvpx-vp9   libvpx VP9`; the legend above the `------` separator is
/// skipped.
pub fn parse_encoder_list(text: &str) -> Vec<String> {
    text.lines()
        .skip_while(|l| !l.trim_start().starts_with("---"))
        .skip(1)
        .filter_map(|l| {
            let mut cols = l.split_whitespace();
            let flags = cols.next()?;
            let name = cols.next()?;
            flags.starts_with('V').then(|| name.to_string())
        })
        .collect()
}

/// Most preferred format whose encoder is in `available`; GIF when none are.
pub fn negotiate_format(available: &[String]) -> VideoFormat {
    VideoFormat::PREFERENCE
        .into_iter()
        .find(|f| match f.ffmpeg_encoder() {
            Some(enc) => available.iter().any(|a| a == enc),
            None => true,
        })
        .unwrap_or(VideoFormat::Gif)
}

/// Recorder that spawns `ffmpeg`, streams raw frames to stdin and collects the encoded container
/// from stdout as it is produced.
pub struct FfmpegRecorder {
    program: String,
    format: VideoFormat,
    segment_bytes: usize,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<JoinHandle<std::io::Result<()>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    segments: Option<SegmentReceiver>,

    scratch: Vec<u8>,
    cfg: Option<RecorderConfig>,
}

impl FfmpegRecorder {
    pub fn new(program: impl Into<String>, format: VideoFormat, segment_bytes: usize) -> Self {
        Self {
            program: program.into(),
            format,
            segment_bytes,
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            segments: None,
            scratch: Vec::new(),
            cfg: None,
        }
    }
}

impl StreamRecorder for FfmpegRecorder {
    fn format(&self) -> VideoFormat {
        self.format
    }

    fn start(&mut self, cfg: &RecorderConfig) -> WavebandsResult<()> {
        if self.child.is_some() {
            return Err(WavebandsError::encode("ffmpeg recorder already started"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(WavebandsError::validation(
                "recorder width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(WavebandsError::validation(
                "recorder width/height must be even (required for yuv420p output)",
            ));
        }
        let Some(encoder) = self.format.ffmpeg_encoder() else {
            return Err(WavebandsError::encode(format!(
                "{:?} is not an ffmpeg format",
                self.format
            )));
        };

        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Frames are opaque after flattening, so `rgba` input is exact.
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an", "-c:v", encoder, "-pix_fmt", "yuv420p"]);
        cmd.args(output_args(self.format));
        cmd.arg("pipe:1");

        let mut child = cmd.spawn().map_err(|e| {
            WavebandsError::encode(format!("failed to spawn '{}': {e}", self.program))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| WavebandsError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| WavebandsError::encode("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| WavebandsError::encode("failed to open ffmpeg stderr (unexpected)"))?;

        let (mut writer, receiver) = segment_channel(self.segment_bytes);
        let stdout_drain = std::thread::spawn(move || {
            let mut chunk = vec![0u8; 16 * 1024];
            loop {
                let n = stdout.read(&mut chunk)?;
                if n == 0 {
                    break;
                }
                writer.write_all(&chunk[..n])?;
            }
            writer.flush()
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::info!(
            program = %self.program,
            encoder,
            width = cfg.width,
            height = cfg.height,
            "ffmpeg recorder started"
        );

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.segments = Some(receiver);
        self.cfg = Some(*cfg);
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> WavebandsResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| WavebandsError::encode("ffmpeg recorder not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(WavebandsError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        flatten_premul_to_opaque_rgba8(&mut self.scratch, &frame.data, [0, 0, 0])?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(WavebandsError::encode("ffmpeg recorder is already stopped"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            WavebandsError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn take_segments(&mut self) -> Vec<Vec<u8>> {
        self.segments
            .as_ref()
            .map(SegmentReceiver::drain)
            .unwrap_or_default()
    }

    fn stop(&mut self) -> WavebandsResult<Vec<Vec<u8>>> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| WavebandsError::encode("ffmpeg recorder not started"))?;

        let status = child
            .wait()
            .map_err(|e| WavebandsError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        if let Some(handle) = self.stdout_drain.take() {
            handle
                .join()
                .map_err(|_| WavebandsError::encode("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| WavebandsError::encode(format!("ffmpeg stdout read failed: {e}")))?;
        }
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| WavebandsError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| WavebandsError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        self.cfg = None;
        let tail = self.take_segments();
        self.segments = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(WavebandsError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(tail)
    }
}

impl Drop for FfmpegRecorder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // `-r` before `-i` sets the rawvideo input rate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Container options for streaming to a non-seekable pipe.
fn output_args(format: VideoFormat) -> &'static [&'static str] {
    match format {
        VideoFormat::WebmVp9 => &[
            "-deadline", "realtime", "-cpu-used", "8", "-row-mt", "1", "-b:v", "0", "-crf", "32",
            "-f", "webm",
        ],
        VideoFormat::WebmVp8 => &[
            "-deadline", "realtime", "-cpu-used", "8", "-b:v", "8M", "-f", "webm",
        ],
        VideoFormat::Mp4H264 => &[
            "-preset",
            "veryfast",
            "-movflags",
            "frag_keyframe+empty_moov+default_base_moof",
            "-f",
            "mp4",
        ],
        VideoFormat::Gif => &[],
    }
}

fn flatten_premul_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgb: [u8; 3],
) -> WavebandsResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(WavebandsError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - a;
        for c in 0..3 {
            d[c] = (s[c] as u16 + mul_div255_u16(bg_rgb[c] as u16, inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;

//! Wavebands generates layered wave-band patterns from a handful of parameters and renders them
//! identically to a live surface, a scaled raster still and a vector document.
//!
//! The pipeline is:
//!
//! - Snapshot [`RenderParameters`] from a [`ParameterStore`]
//! - Compute the frame's [`FrameDelta`] from the [`AnimationSettings`]
//! - Build one [`PatternPlan`] and hand it to any of the render targets
//!
//! [`Studio`] drives that loop once per frame and feeds the [`CaptureController`].
#![forbid(unsafe_code)]

mod foundation;

/// Time-driven parameter deltas.
pub mod animation;
/// Timed recording of the live surface.
pub mod capture;
/// Capture encoders.
pub mod encode;
/// Band geometry and the per-frame plan.
pub mod pattern;
/// Render targets.
pub mod render;
/// Parameter store and frame loop.
pub mod session;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, Point, Rgb8, Vec2,
};
pub use crate::foundation::error::{WavebandsError, WavebandsResult};
pub use crate::foundation::math::{fract01, linear_map};

pub use crate::animation::scheduler::{
    AnimationMode, AnimationSettings, AnimationState, FrameDelta, compute_frame_delta,
};
pub use crate::capture::controller::{
    CaptureController, CaptureRequest, CaptureSession, CaptureState, CaptureStatus, StartOutcome,
    StartRejection,
};
pub use crate::encode::ffmpeg::{FfmpegRecorder, is_ffmpeg_on_path};
pub use crate::encode::gif::GifRecorder;
pub use crate::encode::recorder::{
    DefaultRecorderFactory, RecorderConfig, RecorderFactory, StreamRecorder, VideoFormat,
};
pub use crate::pattern::bands::{Band, EdgeSampling, generate_bands, layer_transform};
pub use crate::pattern::jitter::{Jitter, jitter};
pub use crate::pattern::params::{GlobalRenderParams, Layer, RenderParameters, reference_layers};
pub use crate::pattern::plan::{BlendMode, LayerPlan, PatternPlan};
pub use crate::render::artifact::Artifact;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::live::LiveCanvas;
pub use crate::render::raster::{RASTER_SCALES, RasterExporter};
pub use crate::render::vector::{VECTOR_FILE_NAME, VectorExporter, rasterize_svg};
pub use crate::session::store::{ParameterStore, VectorEditor};
pub use crate::session::studio::Studio;

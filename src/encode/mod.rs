//! Capture encoders.

pub mod ffmpeg;
pub mod gif;
pub mod recorder;

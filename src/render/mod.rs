//! Render targets.
//!
//! All three targets consume a [`crate::pattern::plan::PatternPlan`]; they differ only in sink.

pub mod artifact;
pub mod composite;
pub mod cpu;
pub mod frame;
pub mod live;
pub mod raster;
pub mod vector;

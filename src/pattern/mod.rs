pub mod bands;
pub mod jitter;
pub mod params;
pub mod plan;

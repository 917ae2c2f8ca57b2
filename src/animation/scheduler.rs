use std::f64::consts::TAU;

use crate::foundation::core::{Fps, FrameIndex, Vec2};
use crate::pattern::params::GlobalRenderParams;

/// Scale from frame counter to drift time.
pub const DRIFT_TIME_SCALE: f64 = 0.01;

/// Animation mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AnimationMode {
    /// Continuous, non-repeating orbits.
    #[default]
    Drift,
    /// Exactly periodic motion sized to a target duration.
    Loop,
    /// No motion: the zero delta.
    None,
}

impl std::str::FromStr for AnimationMode {
    type Err = crate::foundation::error::WavebandsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "drift" => Ok(Self::Drift),
            "loop" => Ok(Self::Loop),
            "none" | "off" => Ok(Self::None),
            _ => Err(crate::foundation::error::WavebandsError::validation(format!(
                "unknown animation mode '{s}' (expected Drift, Loop or None)"
            ))),
        }
    }
}

/// Animation configuration, independent of the frame counter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationSettings {
    /// Master switch; when off every frame gets the zero delta regardless of `mode`.
    pub enabled: bool,
    pub mode: AnimationMode,
    pub fps: Fps,
    /// Loop period and default capture duration, in seconds.
    pub loop_seconds: f64,
}

impl AnimationSettings {
    /// Mode that actually drives motion.
    pub fn effective_mode(&self) -> AnimationMode {
        if self.enabled {
            self.mode
        } else {
            AnimationMode::None
        }
    }

    /// State for a given frame.
    pub fn at(&self, frame: FrameIndex) -> AnimationState {
        AnimationState {
            mode: self.effective_mode(),
            frame,
            fps: self.fps,
            loop_seconds: self.loop_seconds,
        }
    }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: AnimationMode::Drift,
            fps: Fps::whole(60),
            loop_seconds: 10.0,
        }
    }
}

/// Inputs of [`compute_frame_delta`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub mode: AnimationMode,
    pub frame: FrameIndex,
    pub fps: Fps,
    pub loop_seconds: f64,
}

impl AnimationState {
    /// Frames per loop period: `max(1, round(loop_seconds * fps))`.
    pub fn loop_frames(&self) -> u64 {
        let secs = if self.loop_seconds.is_finite() {
            self.loop_seconds
        } else {
            0.0
        };
        self.fps.secs_to_frames_round(secs).max(1)
    }
}

/// Per-frame perturbation of the render parameters.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameDelta {
    pub spacing_delta: f64,
    pub angle_delta: f64,
    pub falloff_delta: f64,
    /// One offset per layer, in layer order.
    pub layer_offsets: Vec<Vec2>,
}

impl FrameDelta {
    /// All-zero delta for `layer_count` layers.
    pub fn zero(layer_count: usize) -> Self {
        Self {
            layer_offsets: vec![Vec2::ZERO; layer_count],
            ..Self::default()
        }
    }

    /// Offset for layer `i`; missing entries are zero.
    pub fn layer_offset(&self, i: usize) -> Vec2 {
        self.layer_offsets.get(i).copied().unwrap_or(Vec2::ZERO)
    }

    /// Apply the global deltas on top of `globals`.
    pub fn apply(&self, globals: &GlobalRenderParams) -> GlobalRenderParams {
        GlobalRenderParams {
            spacing: globals.spacing + self.spacing_delta,
            rotation_deg: globals.rotation_deg + self.angle_delta,
            falloff: globals.falloff + self.falloff_delta,
            ..*globals
        }
    }

    pub fn is_zero(&self) -> bool {
        self.spacing_delta == 0.0
            && self.angle_delta == 0.0
            && self.falloff_delta == 0.0
            && self.layer_offsets.iter().all(|v| *v == Vec2::ZERO)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Orbit {
    amp: f64,
    freq_x: f64,
    phase_x: f64,
    freq_y: f64,
    phase_y: f64,
}

const DRIFT_ORBITS: [Orbit; 3] = [
    Orbit {
        amp: 0.35,
        freq_x: 1.0,
        phase_x: 0.0,
        freq_y: 0.9,
        phase_y: 0.0,
    },
    Orbit {
        amp: 0.28,
        freq_x: 1.35,
        phase_x: 1.2,
        freq_y: 1.15,
        phase_y: 0.7,
    },
    Orbit {
        amp: 0.22,
        freq_x: 1.7,
        phase_x: 2.1,
        freq_y: 1.55,
        phase_y: 1.9,
    },
];

const LOOP_RADII: [f64; 3] = [0.38, 0.30, 0.24];

fn drift_orbit(layer: usize) -> Orbit {
    let base = DRIFT_ORBITS[layer % DRIFT_ORBITS.len()];
    let cycle = (layer / DRIFT_ORBITS.len()) as i32;
    if cycle == 0 {
        return base;
    }
    let shift = 0.61 * layer as f64;
    Orbit {
        amp: base.amp * 0.8f64.powi(cycle),
        freq_x: base.freq_x * 1.35f64.powi(cycle),
        phase_x: base.phase_x + shift,
        freq_y: base.freq_y * 1.35f64.powi(cycle),
        phase_y: base.phase_y + shift,
    }
}

fn loop_radius(layer: usize) -> f64 {
    match LOOP_RADII.get(layer) {
        Some(r) => *r,
        None => LOOP_RADII[LOOP_RADII.len() - 1] * 0.8f64.powi((layer + 1 - LOOP_RADII.len()) as i32),
    }
}

/// Deterministic delta for one frame. Pure; never fails.
///
/// Global deltas are zero in every mode; only the per-layer offsets move.
pub fn compute_frame_delta(state: &AnimationState, layer_count: usize) -> FrameDelta {
    let mut delta = FrameDelta::zero(layer_count);
    match state.mode {
        AnimationMode::None => {}
        AnimationMode::Drift => {
            let t = state.frame.0 as f64 * DRIFT_TIME_SCALE;
            for (k, off) in delta.layer_offsets.iter_mut().enumerate() {
                let o = drift_orbit(k);
                *off = Vec2::new(
                    (t * o.freq_x + o.phase_x).sin() * o.amp,
                    (t * o.freq_y + o.phase_y).cos() * o.amp,
                );
            }
        }
        AnimationMode::Loop => {
            let loop_frames = state.loop_frames();
            let f = state.frame.0 % loop_frames;
            let a = (f as f64 / loop_frames as f64) * TAU;
            let n = layer_count.max(1) as f64;
            for (k, off) in delta.layer_offsets.iter_mut().enumerate() {
                let phase = a + TAU * (k as f64) / n;
                let r = loop_radius(k);
                *off = Vec2::new(phase.sin() * r, phase.cos() * r);
            }
        }
    }
    delta
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scheduler.rs"]
mod tests;

use crate::foundation::error::WavebandsResult;
use crate::pattern::plan::{BlendMode, PatternPlan};
use crate::render::cpu::CpuRasterizer;
use crate::render::frame::FrameRGBA;

/// Interactive render surface, redrawn once per frame at scale 1.
///
/// The surface keeps the last drawn frame so capture and preview can read it between draws.
#[derive(Default)]
pub struct LiveCanvas {
    rasterizer: CpuRasterizer,
    frame: Option<FrameRGBA>,
    draws: u64,
}

impl LiveCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redraw the surface from `plan`.
    pub fn draw(&mut self, plan: &PatternPlan) -> WavebandsResult<&FrameRGBA> {
        let frame = self.rasterizer.render(plan, 1)?;
        self.draws += 1;
        Ok(self.frame.insert(frame))
    }

    /// Most recently drawn frame.
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.frame.as_ref()
    }

    /// Number of completed draws.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    /// Compositing mode left on the surface; `Normal` outside of a draw.
    pub fn blend_mode(&self) -> BlendMode {
        self.rasterizer.compositor().mode()
    }
}

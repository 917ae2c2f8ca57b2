use crate::foundation::error::{WavebandsError, WavebandsResult};
use crate::pattern::plan::PatternPlan;
use crate::render::artifact::Artifact;
use crate::render::cpu::CpuRasterizer;
use crate::render::frame::FrameRGBA;

/// Scale factors offered by the export control.
pub const RASTER_SCALES: [u32; 4] = [1, 2, 4, 8];

/// One-shot still-image export at an integer scale factor.
#[derive(Default)]
pub struct RasterExporter {
    rasterizer: CpuRasterizer,
}

impl RasterExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// File name for a given scale, e.g. `pattern_4x.png`.
    pub fn file_name(scale: u32) -> String {
        format!("pattern_{scale}x.png")
    }

    /// Render `plan` into an offscreen `(width * scale, height * scale)` surface.
    pub fn render(&mut self, plan: &PatternPlan, scale: u32) -> WavebandsResult<FrameRGBA> {
        if scale == 0 {
            return Err(WavebandsError::validation("raster scale must be a positive integer"));
        }
        self.rasterizer.render(plan, scale)
    }

    /// Render and encode as a PNG artifact.
    #[tracing::instrument(skip(self, plan), fields(layers = plan.layers.len()))]
    pub fn export(&mut self, plan: &PatternPlan, scale: u32) -> WavebandsResult<Artifact> {
        let frame = self.render(plan, scale)?;
        let png = frame.to_png()?;
        tracing::debug!(
            width = frame.width,
            height = frame.height,
            bytes = png.len(),
            "raster export encoded"
        );
        Ok(Artifact::new(Self::file_name(scale), "image/png", png))
    }
}

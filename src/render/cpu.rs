use crate::foundation::core::{Affine, BezPath};
use crate::foundation::error::{WavebandsError, WavebandsResult};
use crate::pattern::plan::PatternPlan;
use crate::render::composite::Compositor;
use crate::render::frame::FrameRGBA;

/// CPU rasteriser shared by the live canvas and the raster exporter.
///
/// Each visible layer is filled into a transparent scratch surface with `vello_cpu` and then
/// composited onto the background with the plan's blend mode, which is the same group semantics the
/// vector exporter expresses with a per-group `mix-blend-mode`.
pub struct CpuRasterizer {
    ctx: Option<vello_cpu::RenderContext>,
    scratch: Option<ScratchSurface>,
    compositor: Compositor,
}

struct ScratchSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl CpuRasterizer {
    pub fn new() -> Self {
        Self {
            ctx: None,
            scratch: None,
            compositor: Compositor::new(),
        }
    }

    /// Compositing mode currently in effect on this rasteriser's surface.
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Rasterise `plan` at an integer `scale` into a `(width * scale, height * scale)` frame.
    pub fn render(&mut self, plan: &PatternPlan, scale: u32) -> WavebandsResult<FrameRGBA> {
        if scale == 0 {
            return Err(WavebandsError::validation("raster scale must be >= 1"));
        }
        let size = plan.canvas.scaled(scale)?;
        let width = surface_dim(size.width, "width")?;
        let height = surface_dim(size.height, "height")?;

        let mut frame = FrameRGBA::filled(size.width, size.height, plan.background)?;
        if plan.layers.is_empty() {
            return Ok(frame);
        }

        let transform = Affine::scale(f64::from(scale)) * plan.transform;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        let mut scratch = match self.scratch.take() {
            Some(s) if s.width == width && s.height == height => s,
            _ => ScratchSurface {
                width,
                height,
                pixmap: vello_cpu::Pixmap::new(width, height),
            },
        };

        let result = {
            let scope = self.compositor.scoped(plan.blend);
            plan.layers.iter().try_for_each(|layer| {
                ctx.reset();
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                let c = layer.color;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255));
                for band in &layer.bands {
                    let path = band.to_world_path(transform);
                    ctx.fill_path(&bezpath_to_cpu(&path));
                }
                ctx.flush();
                scratch.pixmap.data_as_u8_slice_mut().fill(0);
                ctx.render_to_pixmap(&mut scratch.pixmap);
                scope.composite(&mut frame.data, scratch.pixmap.data_as_u8_slice())
            })
        };

        self.ctx = Some(ctx);
        self.scratch = Some(scratch);
        result?;
        Ok(frame)
    }
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

fn surface_dim(v: u32, what: &str) -> WavebandsResult<u16> {
    v.try_into()
        .map_err(|_| WavebandsError::render(format!("surface {what} {v} exceeds u16")))
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

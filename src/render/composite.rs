use crate::foundation::error::{WavebandsError, WavebandsResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};
use crate::pattern::plan::BlendMode;

/// Source-over of premultiplied `src` onto `dst`.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> WavebandsResult<()> {
    check_buffers("over_in_place", dst, src)?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = s[3];
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);
        d[3] = add_sat_u8(sa, mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            d[c] = add_sat_u8(s[c], mul_div255_u8(u16::from(d[c]), inv));
        }
    }
    Ok(())
}

/// Separable blend of premultiplied `src` onto `dst`.
///
/// out_a = sa + da * (1 - sa)
/// out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
fn blend_in_place<F>(dst: &mut [u8], src: &[u8], blend_fn: F) -> WavebandsResult<()>
where
    F: Fn(f32, f32) -> f32,
{
    check_buffers("blend_in_place", dst, src)?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let sa = s[3] as f32 / 255.0;
        let da = d[3] as f32 / 255.0;
        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);

        for c in 0..3 {
            let sp = s[c] as f32 / 255.0;
            let dp = d[c] as f32 / 255.0;
            let sc = (sp / sa).clamp(0.0, 1.0);
            let dc = if da > 0.0 {
                (dp / da).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let b = blend_fn(sc, dc).clamp(0.0, 1.0);
            let out_p = (sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da).clamp(0.0, 1.0);
            d[c] = (out_p * 255.0).round() as u8;
        }
        d[3] = (out_a * 255.0).round() as u8;
    }
    Ok(())
}

/// Composite `src` onto `dst` with `mode`.
pub fn composite_in_place(dst: &mut [u8], src: &[u8], mode: BlendMode) -> WavebandsResult<()> {
    // Dispatch once per layer, not per pixel.
    match mode {
        BlendMode::Normal => over_in_place(dst, src),
        BlendMode::Darken => blend_in_place(dst, src, |s, d| s.min(d)),
    }
}

fn check_buffers(op: &str, dst: &[u8], src: &[u8]) -> WavebandsResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(WavebandsError::render(format!(
            "{op} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

/// Holder of the current compositing mode of a drawing surface.
///
/// The mode can only be changed through [`Compositor::scoped`], whose guard puts it back to
/// [`BlendMode::Normal`] when dropped, on every exit path.
#[derive(Debug, Default)]
pub struct Compositor {
    mode: BlendMode,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mode currently in effect.
    pub fn mode(&self) -> BlendMode {
        self.mode
    }

    /// Switch to `mode` until the returned scope is dropped.
    pub fn scoped(&mut self, mode: BlendMode) -> CompositeScope<'_> {
        self.mode = mode;
        CompositeScope { compositor: self }
    }
}

/// Scope in which layers are composited with a fixed mode.
#[derive(Debug)]
pub struct CompositeScope<'a> {
    compositor: &'a mut Compositor,
}

impl CompositeScope<'_> {
    pub fn mode(&self) -> BlendMode {
        self.compositor.mode
    }

    /// Composite one layer surface onto the frame.
    pub fn composite(&self, dst: &mut [u8], src: &[u8]) -> WavebandsResult<()> {
        composite_in_place(dst, src, self.compositor.mode)
    }
}

impl Drop for CompositeScope<'_> {
    fn drop(&mut self) {
        self.compositor.mode = BlendMode::Normal;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;

//! Path-based export.
//!
//! Bands are written in local layer space, exactly as the generator emitted them, and the
//! rotation/translation is carried by one `transform` attribute per layer group. Each band path
//! mirrors the sampling of the raster path: same vertex count, same order.

use std::fmt::Write as _;

use crate::foundation::error::{WavebandsError, WavebandsResult};
use crate::pattern::plan::{LayerPlan, PatternPlan};
use crate::render::artifact::Artifact;
use crate::render::frame::FrameRGBA;

/// Fixed file name of the vector export.
pub const VECTOR_FILE_NAME: &str = "pattern.svg";

/// One-shot vector document export.
#[derive(Clone, Copy, Debug, Default)]
pub struct VectorExporter;

impl VectorExporter {
    pub fn new() -> Self {
        Self
    }

    /// Build the SVG document for `plan`.
    pub fn document(&self, plan: &PatternPlan) -> String {
        let w = plan.canvas.width;
        let h = plan.canvas.height;
        let center = plan.canvas.center();

        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = writeln!(
            out,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            plan.background.to_hex()
        );

        let blend_style = plan
            .blend
            .css_keyword()
            .map(|k| format!(r#" style="mix-blend-mode:{k}""#))
            .unwrap_or_default();

        for layer in &plan.layers {
            let _ = write!(
                out,
                r#"  <g transform="translate({} {}) rotate({})"{blend_style}>"#,
                center.x, center.y, plan.globals.rotation_deg
            );
            write_layer_paths(&mut out, layer);
            out.push_str("</g>\n");
        }
        out.push_str("</svg>\n");
        out
    }

    #[tracing::instrument(skip(self, plan), fields(layers = plan.layers.len()))]
    pub fn export(&self, plan: &PatternPlan) -> Artifact {
        let svg = self.document(plan);
        tracing::debug!(bytes = svg.len(), "vector export built");
        Artifact::new(VECTOR_FILE_NAME, "image/svg+xml", svg.into_bytes())
    }
}

fn write_layer_paths(out: &mut String, layer: &LayerPlan) {
    let fill = layer.color.to_hex();
    for band in &layer.bands {
        let _ = write!(out, r#"<path d="{}" fill="{fill}"/>"#, band.to_path().to_svg());
    }
}

/// Rasterise an SVG document with `resvg` into a premultiplied frame of the given size.
pub fn rasterize_svg(svg: &str, width: u32, height: u32) -> WavebandsResult<FrameRGBA> {
    let tree = usvg::Tree::from_str(svg, &usvg::Options::default())
        .map_err(|e| WavebandsError::render(format!("svg parse failed: {e}")))?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| WavebandsError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(&tree, xform, &mut pixmap.as_mut());
    Ok(FrameRGBA {
        width,
        height,
        data: pixmap.data().to_vec(),
        premultiplied: true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/vector.rs"]
mod tests;

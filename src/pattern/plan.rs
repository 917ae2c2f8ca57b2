use crate::animation::scheduler::FrameDelta;
use crate::foundation::core::{Affine, Canvas, Rgb8};
use crate::pattern::bands::{Band, generate_bands, layer_transform};
use crate::pattern::jitter::Jitter;
use crate::pattern::params::{GlobalRenderParams, RenderParameters};

/// Layer compositing mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlendMode {
    /// Source-over.
    #[default]
    Normal,
    /// Per-channel minimum ("darkest").
    Darken,
}

impl BlendMode {
    /// Mode selected by the blend toggle.
    pub fn from_toggle(blend_enabled: bool) -> Self {
        if blend_enabled {
            Self::Darken
        } else {
            Self::Normal
        }
    }

    /// CSS `mix-blend-mode` keyword, `None` for source-over.
    pub fn css_keyword(self) -> Option<&'static str> {
        match self {
            Self::Normal => None,
            Self::Darken => Some("darken"),
        }
    }
}

/// Geometry of one visible layer for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerPlan {
    /// Index of the layer in [`RenderParameters::layers`].
    pub layer: usize,
    pub name: String,
    pub color: Rgb8,
    /// Bands in local layer space, in index order.
    pub bands: Vec<Band>,
}

/// Everything a render target needs for one frame.
///
/// This is the single hand-off point between the band generator and the three sinks: the live
/// canvas, the raster exporter and the vector exporter all consume the same plan.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternPlan {
    pub canvas: Canvas,
    pub background: Rgb8,
    pub blend: BlendMode,
    /// Effective globals (base values plus the frame's global deltas).
    pub globals: GlobalRenderParams,
    /// Local layer space to canvas space.
    pub transform: Affine,
    /// Visible layers in draw order.
    pub layers: Vec<LayerPlan>,
}

impl PatternPlan {
    /// Build the plan for a parameter snapshot and a frame delta.
    pub fn build(params: &RenderParameters, delta: &FrameDelta) -> Self {
        let globals = delta.apply(&params.globals).sanitized();
        let jitter = Jitter::new(params.seed);
        let layers = params
            .visible_layers()
            .map(|(i, layer)| LayerPlan {
                layer: i,
                name: layer.name.clone(),
                color: layer.color,
                bands: generate_bands(layer.vector, &globals, delta.layer_offset(i), |line| {
                    jitter.for_line(line)
                }),
            })
            .collect();

        Self {
            canvas: params.canvas,
            background: params.background,
            blend: BlendMode::from_toggle(globals.blend_enabled),
            globals,
            transform: layer_transform(params.canvas, globals.rotation_deg),
            layers,
        }
    }

    /// Total number of band polygons across all layers.
    pub fn band_count(&self) -> usize {
        self.layers.iter().map(|l| l.bands.len()).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/plan.rs"]
mod tests;

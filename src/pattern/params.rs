use crate::foundation::core::{Canvas, Rgb8, Vec2};
use crate::pattern::jitter::DEFAULT_SEED;

/// Smallest value the strictly-positive parameters are clamped to.
pub const MIN_POSITIVE: f64 = 1e-3;

/// One colored band layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Display label.
    pub name: String,
    /// Fill color.
    pub color: Rgb8,
    /// Base displacement vector. `x` shifts the influence peak, `|y|` scales band height.
    pub vector: Vec2,
    /// Whether the layer is drawn.
    pub visible: bool,
}

impl Layer {
    /// Create a visible layer with the reference base vector `(0, 0.7)`.
    pub fn new(name: impl Into<String>, color: Rgb8) -> Self {
        Self {
            name: name.into(),
            color,
            vector: Vec2::new(0.0, 0.7),
            visible: true,
        }
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_vector(mut self, vector: Vec2) -> Self {
        self.vector = vector;
        self
    }
}

/// The three reference layers: Terra (visible), Vinho and Oliva (hidden).
pub fn reference_layers() -> Vec<Layer> {
    vec![
        Layer::new("Terra", Rgb8::new(0xd2, 0x69, 0x1e)),
        Layer::new("Vinho", Rgb8::new(0x8b, 0x00, 0x00)).with_visible(false),
        Layer::new("Oliva", Rgb8::new(0x55, 0x6b, 0x2f)).with_visible(false),
    ]
}

/// Global pattern parameters shared by every layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlobalRenderParams {
    /// Line pitch in local units.
    pub spacing: f64,
    /// Bands drawn on each side of the centre line; band indices span `[-line_count, line_count)`.
    pub line_count: u32,
    /// Horizontal sampling interval.
    pub sample_step: f64,
    /// Half of the horizontal sampling span, in local units.
    pub half_width: f64,
    /// Rotation about the canvas centre, in degrees.
    pub rotation_deg: f64,
    /// Sharpness of the height decay away from the influence peak.
    pub falloff: f64,
    /// Composite layers with the darken blend instead of source-over.
    pub blend_enabled: bool,
}

impl GlobalRenderParams {
    /// Reference parameters for a canvas of the given size.
    pub fn for_canvas(canvas: Canvas) -> Self {
        Self {
            spacing: 35.0,
            line_count: 32,
            sample_step: 4.0,
            half_width: f64::from(canvas.width),
            rotation_deg: -15.0,
            falloff: 3.6,
            blend_enabled: true,
        }
    }

    /// Clamp the strictly-positive parameters. Never fails.
    pub fn sanitized(self) -> Self {
        fn positive(v: f64) -> f64 {
            if v.is_finite() { v.max(MIN_POSITIVE) } else { MIN_POSITIVE }
        }
        Self {
            spacing: positive(self.spacing),
            sample_step: positive(self.sample_step),
            half_width: positive(self.half_width),
            falloff: positive(self.falloff),
            rotation_deg: if self.rotation_deg.is_finite() {
                self.rotation_deg
            } else {
                0.0
            },
            ..self
        }
    }
}

impl Default for GlobalRenderParams {
    fn default() -> Self {
        Self::for_canvas(Canvas::default())
    }
}

/// Immutable per-frame snapshot of everything the renderers read.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderParameters {
    /// Output canvas in pixels (before any export scale).
    pub canvas: Canvas,
    /// Background fill.
    pub background: Rgb8,
    /// Jitter seed.
    pub seed: f64,
    /// Global pattern parameters.
    pub globals: GlobalRenderParams,
    /// Layers in draw order.
    pub layers: Vec<Layer>,
}

impl RenderParameters {
    /// Number of layers, visible or not.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Indices of visible layers, in draw order.
    pub fn visible_layers(&self) -> impl Iterator<Item = (usize, &Layer)> {
        self.layers.iter().enumerate().filter(|(_, l)| l.visible)
    }

    /// Copy with the global parameters clamped into range.
    pub fn sanitized(&self) -> Self {
        Self {
            globals: self.globals.sanitized(),
            ..self.clone()
        }
    }
}

impl Default for RenderParameters {
    fn default() -> Self {
        let canvas = Canvas::default();
        Self {
            canvas,
            background: Rgb8::new(0xf5, 0xf5, 0xdc),
            seed: DEFAULT_SEED,
            globals: GlobalRenderParams::for_canvas(canvas),
            layers: reference_layers(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/params.rs"]
mod tests;

use crate::animation::scheduler::{AnimationMode, AnimationSettings};
use crate::foundation::core::{Fps, Point, Rgb8, Vec2};
use crate::foundation::error::{WavebandsError, WavebandsResult};
use crate::pattern::params::{GlobalRenderParams, Layer, RenderParameters};

/// Inset between the editor's edge and the usable pointer radius.
pub const EDITOR_MARGIN: f64 = 18.0;

/// Square pointer pad mapping a drag position to a unit-disc displacement vector.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VectorEditor {
    pub width: f64,
    pub height: f64,
}

impl VectorEditor {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Usable radius, `width / 2 - 18`. Zero when the pad is too small to drag in.
    pub fn radius(&self) -> f64 {
        (self.width / 2.0 - EDITOR_MARGIN).max(0.0)
    }

    /// Vector for a pointer position in pad coordinates (y grows downwards).
    ///
    /// The result always has a norm of at most 1.
    pub fn vector_at(&self, pointer: Point) -> Vec2 {
        let r = self.radius();
        if r <= 0.0 || !pointer.x.is_finite() || !pointer.y.is_finite() {
            return Vec2::ZERO;
        }
        let c = self.center();
        let d = Vec2::new(pointer.x - c.x, c.y - pointer.y);
        let len = d.hypot();
        let d = if len > r { d * (r / len) } else { d };
        let v = d / r;
        // Division can land a hair above 1.
        let n = v.hypot();
        if n > 1.0 { v / n } else { v }
    }

    /// Pad position of the handle for `vector`.
    pub fn handle_position(&self, vector: Vec2) -> Point {
        let c = self.center();
        let r = self.radius();
        Point::new(c.x + vector.x * r, c.y - vector.y * r)
    }
}

impl Default for VectorEditor {
    fn default() -> Self {
        Self::new(180.0, 180.0)
    }
}

/// Live parameter values, mutated by the control surface and read once per frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterStore {
    params: RenderParameters,
    animation: AnimationSettings,
    editor: VectorEditor,
}

impl ParameterStore {
    pub fn new(params: RenderParameters, animation: AnimationSettings) -> Self {
        Self {
            params,
            animation,
            editor: VectorEditor::default(),
        }
    }

    pub fn with_editor(mut self, editor: VectorEditor) -> Self {
        self.editor = editor;
        self
    }

    /// Immutable copy for one frame.
    pub fn snapshot(&self) -> RenderParameters {
        self.params.clone()
    }

    pub fn params(&self) -> &RenderParameters {
        &self.params
    }

    pub fn animation(&self) -> &AnimationSettings {
        &self.animation
    }

    pub fn editor(&self) -> &VectorEditor {
        &self.editor
    }

    pub fn set_spacing(&mut self, spacing: f64) {
        self.update_globals(|g| g.spacing = spacing);
    }

    pub fn set_line_count(&mut self, line_count: u32) {
        self.update_globals(|g| g.line_count = line_count);
    }

    pub fn set_sample_step(&mut self, step: f64) {
        self.update_globals(|g| g.sample_step = step);
    }

    pub fn set_rotation_deg(&mut self, deg: f64) {
        self.update_globals(|g| g.rotation_deg = deg);
    }

    pub fn set_falloff(&mut self, falloff: f64) {
        self.update_globals(|g| g.falloff = falloff);
    }

    pub fn set_blend_enabled(&mut self, enabled: bool) {
        self.update_globals(|g| g.blend_enabled = enabled);
    }

    fn update_globals(&mut self, f: impl FnOnce(&mut GlobalRenderParams)) {
        let mut g = self.params.globals;
        f(&mut g);
        self.params.globals = g.sanitized();
    }

    pub fn set_background(&mut self, color: Rgb8) {
        self.params.background = color;
    }

    pub fn set_layer_color(&mut self, index: usize, color: Rgb8) -> WavebandsResult<()> {
        self.layer_mut(index)?.color = color;
        Ok(())
    }

    pub fn add_layer(&mut self, layer: Layer) -> usize {
        self.params.layers.push(layer);
        self.params.layers.len() - 1
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> WavebandsResult<()> {
        self.layer_mut(index)?.visible = visible;
        Ok(())
    }

    /// Set a base vector directly. Unlike pointer input this is not clamped.
    pub fn set_layer_vector(&mut self, index: usize, vector: Vec2) -> WavebandsResult<()> {
        self.layer_mut(index)?.vector = vector;
        Ok(())
    }

    /// The editor is locked while its layer is hidden.
    pub fn is_editor_locked(&self, index: usize) -> bool {
        self.params.layers.get(index).is_none_or(|l| !l.visible)
    }

    /// Apply a pointer drag on the editor of layer `index`.
    ///
    /// Returns the new, unit-clamped vector, or `None` when the editor is locked.
    pub fn drag_layer_vector(&mut self, index: usize, pointer: Point) -> WavebandsResult<Option<Vec2>> {
        let editor = self.editor;
        let layer = self.layer_mut(index)?;
        if !layer.visible {
            return Ok(None);
        }
        let v = editor.vector_at(pointer);
        layer.vector = v;
        Ok(Some(v))
    }

    pub fn set_animation_enabled(&mut self, enabled: bool) {
        self.animation.enabled = enabled;
    }

    pub fn set_animation_mode(&mut self, mode: AnimationMode) {
        self.animation.mode = mode;
    }

    pub fn set_fps(&mut self, fps: Fps) {
        self.animation.fps = fps;
    }

    /// Loop period and capture duration. Non-positive values are ignored.
    pub fn set_loop_seconds(&mut self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.animation.loop_seconds = secs;
        }
    }

    fn layer_mut(&mut self, index: usize) -> WavebandsResult<&mut Layer> {
        let count = self.params.layers.len();
        self.params.layers.get_mut(index).ok_or_else(|| {
            WavebandsError::validation(format!("layer index {index} out of range (have {count})"))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/store.rs"]
mod tests;

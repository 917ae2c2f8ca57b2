//! Band outline synthesis.
//!
//! Every renderer consumes the point sequences produced here; none of them re-derives the per-point
//! formula. A band is one closed polygon: a flat top edge sampled left to right along its
//! baseline, followed by a bulging bottom edge sampled right to left.

use crate::foundation::core::{Affine, BezPath, Canvas, Point, Vec2};
use crate::foundation::math::linear_map;
use crate::pattern::params::GlobalRenderParams;

/// Local units of band bulge per unit of `|vector.y|`.
pub const HEIGHT_SCALE: f64 = 300.0;
/// Shaping exponent applied on top of the gaussian influence.
pub const CURVE_EXPONENT: f64 = 1.15;
/// Upper bound on samples per edge; finer steps are coarsened to this count.
pub const MAX_SAMPLES_PER_EDGE: usize = 1 << 16;

/// One closed band polygon in local (pre-transform) layer space.
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    /// Band index in `[-line_count, line_count)`.
    pub index: i64,
    /// Top edge followed by bottom edge. The closing segment is implicit.
    pub points: Vec<Point>,
    /// Number of leading points that belong to the top edge.
    pub top_len: usize,
}

impl Band {
    /// Flat top edge, left to right.
    pub fn top_edge(&self) -> &[Point] {
        &self.points[..self.top_len]
    }

    /// Curved bottom edge, right to left.
    pub fn bottom_edge(&self) -> &[Point] {
        &self.points[self.top_len..]
    }

    /// Closed path through all points in order.
    pub fn to_path(&self) -> BezPath {
        polygon_path(&self.points)
    }

    /// Closed path with every point mapped through `transform`.
    pub fn to_world_path(&self, transform: Affine) -> BezPath {
        let mut path = BezPath::new();
        for (i, &p) in self.points.iter().enumerate() {
            let p = transform * p;
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        if !self.points.is_empty() {
            path.close_path();
        }
        path
    }
}

/// Closed polyline through `points`.
pub fn polygon_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    for &p in rest {
        path.line_to(p);
    }
    path.close_path();
    path
}

/// Local layer space to canvas space: rotate about the origin, then move the origin to the canvas
/// centre.
pub fn layer_transform(canvas: Canvas, rotation_deg: f64) -> Affine {
    Affine::translate(canvas.center().to_vec2()) * Affine::rotate(rotation_deg.to_radians())
}

/// Sampling grid shared by both edges: `count` samples `step` apart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSampling {
    pub half_width: f64,
    pub step: f64,
    pub count: usize,
}

impl EdgeSampling {
    /// Samples `x_k = -half_width + k * step` for every `k` with `k * step <= 2 * half_width`.
    ///
    /// At least one sample per edge is always emitted.
    pub fn new(half_width: f64, step: f64) -> Self {
        let span = 2.0 * half_width;
        let mut n = (span / step).floor().max(0.0) as usize;
        if n >= MAX_SAMPLES_PER_EDGE {
            return Self {
                half_width,
                step: span / (MAX_SAMPLES_PER_EDGE - 1) as f64,
                count: MAX_SAMPLES_PER_EDGE,
            };
        }
        while ((n + 1) as f64) * step <= span {
            n += 1;
        }
        while n > 0 && (n as f64) * step > span {
            n -= 1;
        }
        Self {
            half_width,
            step,
            count: n + 1,
        }
    }

    /// `k`-th sample of the top edge (left to right).
    pub fn top_x(&self, k: usize) -> f64 {
        -self.half_width + (k as f64) * self.step
    }

    /// `k`-th sample of the bottom edge (right to left).
    pub fn bottom_x(&self, k: usize) -> f64 {
        self.half_width - (k as f64) * self.step
    }
}

/// Height offset of the bottom edge at local `x`.
///
/// `distance = |normalized_x - shift_target|`, `influence = exp(-distance² · falloff)`,
/// `offset = influence^1.15 · amplitude · jitter`.
pub fn bulge(
    x: f64,
    half_width: f64,
    shift_target: f64,
    falloff: f64,
    amplitude: f64,
    jitter: f64,
) -> f64 {
    let nx = linear_map(x, -half_width, half_width, -1.0, 1.0);
    let distance = (nx - shift_target).abs();
    let influence = (-distance * distance * falloff).exp();
    let curve = influence.powf(CURVE_EXPONENT);
    curve * amplitude * jitter
}

/// Generate the bands of one layer in local space.
///
/// `vector` is the layer's base displacement and `offset` the per-frame animation offset; they are
/// summed without re-clamping. `globals` must already include the frame's global deltas.
pub fn generate_bands(
    vector: Vec2,
    globals: &GlobalRenderParams,
    offset: Vec2,
    jitter: impl Fn(i64) -> f64,
) -> Vec<Band> {
    let g = globals.sanitized();
    let n = i64::from(g.line_count);
    if n == 0 {
        return Vec::new();
    }

    let effective = vector + offset;
    let amplitude = effective.y.abs() * HEIGHT_SCALE;
    let sampling = EdgeSampling::new(g.half_width, g.sample_step);

    (-n..n)
        .map(|i| {
            let baseline = (i as f64) * g.spacing;
            let position = linear_map(i as f64, -n as f64, n as f64, -1.0, 1.0);
            let shift_target = effective.x + position;
            let jit = jitter(i);

            let mut points = Vec::with_capacity(sampling.count * 2);
            points.extend((0..sampling.count).map(|k| Point::new(sampling.top_x(k), baseline)));
            points.extend((0..sampling.count).map(|k| {
                let x = sampling.bottom_x(k);
                let dy = bulge(x, g.half_width, shift_target, g.falloff, amplitude, jit);
                Point::new(x, baseline + dy)
            }));

            Band {
                index: i,
                points,
                top_len: sampling.count,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/pattern/bands.rs"]
mod tests;

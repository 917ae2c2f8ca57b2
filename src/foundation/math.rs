/// Re-map `v` from `[in_lo, in_hi]` onto `[out_lo, out_hi]` without clamping.
///
/// A degenerate input span maps everything onto `out_lo`.
pub fn linear_map(v: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    let span = in_hi - in_lo;
    if span == 0.0 {
        return out_lo;
    }
    out_lo + (v - in_lo) / span * (out_hi - out_lo)
}

/// Fractional part in `[0, 1)`, following `x - floor(x)`.
pub fn fract01(x: f64) -> f64 {
    x - x.floor()
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

pub(crate) fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;

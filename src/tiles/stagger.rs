//! Per-tile start offsets for the tiled flip.
//!
//! Offsets follow a top-to-bottom scan (row fraction of the stagger span), lean slightly
//! left-to-right inside each row, and carry a small seeded jitter. A fixed share of tiles is
//! marked as glitch tiles and pushed early or late by a larger random delta. Every offset is
//! clamped into `[0, span)`, so with `span + flip_len <= 1` each tile has finished its flip by
//! the time zone progress reaches 1.0.
//!
//! The generator is seeded from the configured seed mixed with the grid shape, so a given
//! seed and grid always produce the same pattern.

use crate::{
    foundation::error::{EngineError, EngineResult},
    foundation::math::{Fnv1a64, Rng64},
    tiles::grid::GridDims,
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StaggerParams {
    pub span: f64,
    /// Extra offset for the last column, as a fraction of one row step.
    pub column_bias: f64,
    /// Maximum jitter, in zone-progress units.
    pub jitter: f64,
    pub glitch_fraction: f64,
    /// Maximum glitch displacement, in zone-progress units.
    pub glitch_delta: f64,
    pub seed: u64,
}

impl Default for StaggerParams {
    fn default() -> Self {
        Self {
            span: 0.6,
            column_bias: 0.15,
            jitter: 0.03,
            glitch_fraction: 0.1,
            glitch_delta: 0.25,
            seed: 0x5CE0_F11B,
        }
    }
}

impl StaggerParams {
    pub fn validate(&self) -> EngineResult<()> {
        if !self.span.is_finite() || self.span <= 0.0 || self.span > 1.0 {
            return Err(EngineError::validation("stagger span must be in (0, 1]"));
        }
        for (name, v) in [
            ("column_bias", self.column_bias),
            ("jitter", self.jitter),
            ("glitch_delta", self.glitch_delta),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(EngineError::validation(format!(
                    "stagger {name} must be finite and >= 0"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.glitch_fraction) {
            return Err(EngineError::validation(
                "glitch_fraction must be in [0, 1]",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TileTiming {
    pub offset: f64,
    pub glitch: bool,
}

/// Offsets for every cell in row-major order. Same params and dims give the same output.
pub fn tile_offsets(dims: GridDims, params: &StaggerParams) -> Vec<TileTiming> {
    let n = dims.len();
    if n == 0 {
        return Vec::new();
    }
    let mut h = Fnv1a64::new(params.seed);
    h.write_u64(u64::from(dims.cols));
    h.write_u64(u64::from(dims.rows));
    let mut rng = Rng64::new(h.finish());
    let glitch = pick_glitch_cells(&mut rng, n, params.glitch_fraction);

    let span = params.span;
    let max_offset = span.next_down().max(0.0);
    let rows = f64::from(dims.rows);
    let cols = f64::from(dims.cols);
    let row_step = span / rows;

    let mut out = Vec::with_capacity(n);
    for row in 0..dims.rows {
        for col in 0..dims.cols {
            let idx = (row * dims.cols + col) as usize;
            let base = f64::from(row) / rows * span;
            let bias = f64::from(col) / cols * params.column_bias * row_step;
            let jitter = rng.next_signed() * params.jitter;

            // Always draw, so the stream does not depend on which cells glitch.
            let late = rng.next_f64_01() < 0.5;
            let magnitude = params.glitch_delta * (0.5 + 0.5 * rng.next_f64_01());

            let mut offset = base + bias + jitter;
            if glitch[idx] {
                offset += if late { magnitude } else { -magnitude };
            }
            out.push(TileTiming {
                offset: offset.clamp(0.0, max_offset),
                glitch: glitch[idx],
            });
        }
    }
    out
}

/// Exactly `round(n * fraction)` distinct cells, chosen by a seeded partial shuffle.
fn pick_glitch_cells(rng: &mut Rng64, n: usize, fraction: f64) -> Vec<bool> {
    let count = ((n as f64) * fraction.clamp(0.0, 1.0)).round() as usize;
    let mut order: Vec<usize> = (0..n).collect();
    let mut marked = vec![false; n];
    for i in 0..count.min(n) {
        let j = i + rng.next_below(n - i);
        order.swap(i, j);
        marked[order[i]] = true;
    }
    marked
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/stagger.rs"]
mod tests;

//! Continuous progress to discrete UI state.
//!
//! A scene with `N` sub-items splits its progress into `N` equal cycles. Every cycle shares the
//! same ordered band table, so the phase inside a cycle and the index of the focused item are
//! step functions of progress alone. Nothing here keeps state between calls: scrolling into a
//! value from above or from below always yields the same [`PhaseState`].

use crate::{
    foundation::error::{EngineError, EngineResult},
    foundation::math::clamp01,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Resting,
    MorphingIn,
    Active,
    MorphingOut,
}

/// A band starts at `at` (fraction of one cycle) and runs until the next band's start.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseThreshold {
    pub at: f64,
    pub phase: Phase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PhaseState {
    pub phase: Phase,
    pub active_index: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PhaseTable {
    bands: Vec<PhaseThreshold>,
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self {
            bands: default_bands(),
        }
    }
}

pub(crate) fn default_bands() -> Vec<PhaseThreshold> {
    vec![
        PhaseThreshold {
            at: 0.0,
            phase: Phase::Resting,
        },
        PhaseThreshold {
            at: 0.1,
            phase: Phase::MorphingIn,
        },
        PhaseThreshold {
            at: 0.3,
            phase: Phase::Active,
        },
        PhaseThreshold {
            at: 0.8,
            phase: Phase::MorphingOut,
        },
    ]
}

impl PhaseTable {
    pub fn new(bands: Vec<PhaseThreshold>) -> EngineResult<Self> {
        validate_bands(&bands)?;
        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[PhaseThreshold] {
        &self.bands
    }

    /// Start of `phase`'s first band inside a cycle, if the table has one.
    pub fn band_start(&self, phase: Phase) -> Option<f64> {
        self.bands.iter().find(|b| b.phase == phase).map(|b| b.at)
    }

    /// Derive `(phase, active_index)` for a scene with `items` sub-items.
    ///
    /// `items == 0` is treated as a single cycle. Progress outside `[0, 1]` is clamped; at
    /// exactly 1.0 the last item stays focused in its final band.
    pub fn derive(&self, progress: f64, items: usize) -> PhaseState {
        let n = items.max(1);
        let (active_index, local) = cycle_position(progress, n);
        PhaseState {
            phase: self.phase_at(local),
            active_index,
        }
    }

    /// Band lookup for a position inside one cycle; boundaries resolve with `>=`.
    pub fn phase_at(&self, local: f64) -> Phase {
        let local = clamp01(local);
        let mut phase = self.bands[0].phase;
        for band in &self.bands {
            if local >= band.at {
                phase = band.phase;
            } else {
                break;
            }
        }
        phase
    }
}

/// `(index, position inside that cycle)` for `n` equal cycles.
pub(crate) fn cycle_position(progress: f64, n: usize) -> (usize, f64) {
    let n = n.max(1);
    let scaled = clamp01(progress) * n as f64;
    let index = (scaled.floor() as usize).min(n - 1);
    let local = (scaled - index as f64).clamp(0.0, 1.0);
    (index, local)
}

pub(crate) fn validate_bands(bands: &[PhaseThreshold]) -> EngineResult<()> {
    let Some(first) = bands.first() else {
        return Err(EngineError::validation("phase table must have at least one band"));
    };
    if first.at != 0.0 {
        return Err(EngineError::validation("first phase band must start at 0"));
    }
    for b in bands {
        if !b.at.is_finite() || !(0.0..1.0).contains(&b.at) {
            return Err(EngineError::validation(
                "phase band thresholds must be finite and in [0, 1)",
            ));
        }
    }
    if !bands.windows(2).all(|w| w[0].at < w[1].at) {
        return Err(EngineError::validation(
            "phase band thresholds must be strictly increasing",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/phase/machine.rs"]
mod tests;

use crate::foundation::error::{EngineError, EngineResult};

/// Named duration bands; converted to scene fractions at build time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationTier {
    Micro,
    Standard,
    Cinematic,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TierSeconds {
    pub micro: f64,
    pub standard: f64,
    pub cinematic: f64,
}

impl Default for TierSeconds {
    fn default() -> Self {
        Self {
            micro: 0.17,
            standard: 0.32,
            cinematic: 0.55,
        }
    }
}

impl TierSeconds {
    pub fn seconds(&self, tier: DurationTier) -> f64 {
        match tier {
            DurationTier::Micro => self.micro,
            DurationTier::Standard => self.standard,
            DurationTier::Cinematic => self.cinematic,
        }
    }

    /// Fraction of a scene of `budget_secs` that `tier` occupies, capped at the whole scene.
    pub fn fraction(&self, tier: DurationTier, budget_secs: f64) -> f64 {
        if !budget_secs.is_finite() || budget_secs <= 0.0 {
            return 1.0;
        }
        (self.seconds(tier) / budget_secs).clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> EngineResult<()> {
        for (name, v) in [
            ("micro", self.micro),
            ("standard", self.standard),
            ("cinematic", self.cinematic),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(EngineError::validation(format!(
                    "tiers.{name} must be finite and > 0"
                )));
            }
        }
        if !(self.micro <= self.standard && self.standard <= self.cinematic) {
            return Err(EngineError::validation(
                "tiers must be ordered micro <= standard <= cinematic",
            ));
        }
        Ok(())
    }
}

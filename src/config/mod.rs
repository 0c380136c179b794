//! Engine tuning and the JSON stage manifest the binary and integration tests load.

use std::{collections::BTreeMap, path::Path};

use crate::{
    animation::script::ScriptedScene,
    animation::tier::TierSeconds,
    foundation::core::{ElementId, Rect, Viewport},
    foundation::error::{EngineError, EngineResult},
    host::StaticHost,
    phase::machine::{PhaseTable, PhaseThreshold, default_bands},
    scroll::registry::{SceneDecl, SceneRegistry},
    tiles::grid::TileConfig,
    transition::router::{TransitionRouter, TransitionSpec},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scroll distance per second of scene budget.
    pub scroll_px_per_sec: f64,
    pub resize_debounce_ms: u64,
    /// Length of the zone ending at each boundary in which its transition is scrubbed.
    pub transition_zone_px: f64,
    /// Distance before a transition zone at which snapshot warm-up starts.
    pub warm_proximity_px: f64,
    pub phases: Vec<PhaseThreshold>,
    pub tiers: TierSeconds,
    pub tiles: TileConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scroll_px_per_sec: 400.0,
            resize_debounce_ms: 200,
            transition_zone_px: 600.0,
            warm_proximity_px: 1200.0,
            phases: default_bands(),
            tiers: TierSeconds::default(),
            tiles: TileConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if !self.scroll_px_per_sec.is_finite() || self.scroll_px_per_sec <= 0.0 {
            return Err(EngineError::validation(
                "scroll_px_per_sec must be finite and > 0",
            ));
        }
        for (name, v) in [
            ("transition_zone_px", self.transition_zone_px),
            ("warm_proximity_px", self.warm_proximity_px),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(EngineError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        self.phase_table()?;
        self.tiers.validate()?;
        self.tiles.validate()
    }

    pub fn phase_table(&self) -> EngineResult<PhaseTable> {
        PhaseTable::new(self.phases.clone())
    }
}

/// Element box in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementBox {
    pub fn rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneManifest {
    #[serde(flatten)]
    pub decl: SceneDecl,
    #[serde(default)]
    pub script: ScriptedScene,
}

/// Everything needed to drive a stage without a live host: tuning, the initial viewport,
/// element geometry, scenes with their scripts, and the transition table.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StageManifest {
    #[serde(default)]
    pub engine: EngineConfig,
    pub viewport: Viewport,
    #[serde(default)]
    pub elements: BTreeMap<ElementId, ElementBox>,
    pub scenes: Vec<SceneManifest>,
    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
}

impl StageManifest {
    pub fn from_json(s: &str) -> EngineResult<Self> {
        let manifest: Self = serde_json::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_path(path: &Path) -> EngineResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            EngineError::validation(format!("read manifest '{}': {e}", path.display()))
        })?;
        Self::from_json(&s)
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.engine.validate()?;
        Viewport::new(self.viewport.width, self.viewport.height)?;
        if self.scenes.is_empty() {
            return Err(EngineError::validation("manifest must declare at least one scene"));
        }
        SceneRegistry::new(&self.decls(), self.engine.scroll_px_per_sec)?;
        for spec in &self.transitions {
            for idx in [spec.from, spec.to] {
                if idx >= self.scenes.len() {
                    return Err(EngineError::validation(format!(
                        "transition {}->{} references missing scene {idx}",
                        spec.from, spec.to
                    )));
                }
            }
            if spec.from.abs_diff(spec.to) != 1 {
                return Err(EngineError::validation(format!(
                    "transition {}->{} must join adjacent scenes",
                    spec.from, spec.to
                )));
            }
        }
        for (id, b) in &self.elements {
            if ![b.x, b.y, b.width, b.height].iter().all(|v| v.is_finite()) {
                return Err(EngineError::validation(format!(
                    "element '{id}' has a non-finite box"
                )));
            }
        }
        self.router().map(|_| ())
    }

    pub fn decls(&self) -> Vec<SceneDecl> {
        self.scenes.iter().map(|s| s.decl.clone()).collect()
    }

    pub fn router(&self) -> EngineResult<TransitionRouter> {
        TransitionRouter::from_specs(&self.transitions)
    }

    /// In-memory host holding every declared element box.
    pub fn host(&self) -> StaticHost {
        let mut host = StaticHost::new();
        for (id, b) in &self.elements {
            host.insert(id.clone(), b.rect());
        }
        host
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/manifest.rs"]
mod tests;

use std::collections::BTreeMap;

use crate::foundation::error::{EngineError, EngineResult};

/// Directional scene boundary: scrolling from scene `from` into scene `to`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Boundary {
    pub from: usize,
    pub to: usize,
}

impl Boundary {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Index of the physical edge (the lower scene); both directions share it.
    pub fn edge(self) -> usize {
        self.from.min(self.to)
    }

    pub fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Per-boundary overrides applied on top of the engine's tile config.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TileFlipParams {
    pub seed: Option<u64>,
    pub glitch_fraction: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Strategy {
    InstantSwap,
    /// Continuous linear crossfade, with the outgoing scene zooming by `zoom` and the incoming
    /// one settling from `1 + zoom` to rest.
    Crossfade { zoom: f64 },
    TileFlip(TileFlipParams),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InstantSwap => "instant_swap",
            Self::Crossfade { .. } => "crossfade",
            Self::TileFlip(_) => "tile_flip",
        }
    }

    pub fn needs_snapshots(&self) -> bool {
        matches!(self, Self::TileFlip(_))
    }
}

pub(crate) static INSTANT_SWAP: Strategy = Strategy::InstantSwap;

/// Manifest form of a transition: `kind` plus free-form params.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionSpec {
    pub from: usize,
    pub to: usize,
    pub kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

pub fn parse_strategy(kind: &str, params: &serde_json::Value) -> EngineResult<Strategy> {
    let kind = kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(EngineError::validation("transition kind must be non-empty"));
    }
    let params = if params.is_null() {
        None
    } else {
        Some(params.as_object().ok_or_else(|| {
            EngineError::validation(format!("{kind} params must be an object"))
        })?)
    };
    let num = |name: &str| params.and_then(|p| p.get(name)).and_then(|v| v.as_f64());

    match kind.as_str() {
        "instant" | "instant_swap" | "swap" | "none" => Ok(Strategy::InstantSwap),
        "crossfade" | "fade" | "zoom" => {
            let zoom = num("zoom").unwrap_or(0.08);
            if !zoom.is_finite() || !(0.0..=1.0).contains(&zoom) {
                return Err(EngineError::validation("crossfade.zoom must be in [0, 1]"));
            }
            Ok(Strategy::Crossfade { zoom })
        }
        "tile_flip" | "tiles" | "flip_grid" => {
            let glitch_fraction = match num("glitch_fraction") {
                Some(f) if !(0.0..=1.0).contains(&f) => {
                    return Err(EngineError::validation(
                        "tile_flip.glitch_fraction must be in [0, 1]",
                    ));
                }
                other => other,
            };
            let seed = params.and_then(|p| p.get("seed")).and_then(|v| v.as_u64());
            Ok(Strategy::TileFlip(TileFlipParams {
                seed,
                glitch_fraction,
            }))
        }
        _ => Err(EngineError::validation(format!(
            "unknown transition kind '{kind}'"
        ))),
    }
}

pub fn parse_transition(spec: &TransitionSpec) -> EngineResult<(Boundary, Strategy)> {
    if spec.from == spec.to {
        return Err(EngineError::validation(format!(
            "transition {}->{} must join two different scenes",
            spec.from, spec.to
        )));
    }
    Ok((
        Boundary::new(spec.from, spec.to),
        parse_strategy(&spec.kind, &spec.params)?,
    ))
}

/// Immutable boundary -> strategy table.
#[derive(Clone, Debug, Default)]
pub struct TransitionRouter {
    table: BTreeMap<Boundary, Strategy>,
}

impl TransitionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[TransitionSpec]) -> EngineResult<Self> {
        let mut router = Self::new();
        for spec in specs {
            let (boundary, strategy) = parse_transition(spec)?;
            router.register(boundary, strategy)?;
        }
        Ok(router)
    }

    /// Add a definition. A boundary can only ever resolve to one strategy.
    pub fn register(&mut self, boundary: Boundary, strategy: Strategy) -> EngineResult<()> {
        if self.table.contains_key(&boundary) {
            return Err(EngineError::validation(format!(
                "transition {boundary} is defined more than once"
            )));
        }
        self.table.insert(boundary, strategy);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Strategy for `boundary`: the exact entry, else the entry for the reverse direction,
    /// else an instant swap.
    pub fn resolve(&self, boundary: Boundary) -> &Strategy {
        self.table
            .get(&boundary)
            .or_else(|| self.table.get(&boundary.reversed()))
            .unwrap_or(&INSTANT_SWAP)
    }

    /// Edges that use a snapshot-backed strategy in at least one direction.
    pub fn snapshot_edges(&self) -> Vec<usize> {
        let mut edges: Vec<usize> = self
            .table
            .iter()
            .filter(|(_, s)| s.needs_snapshots())
            .map(|(b, _)| b.edge())
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transition/router.rs"]
mod tests;

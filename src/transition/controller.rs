//! Lifecycle of the one transition allowed on screen at a time.
//!
//! `begin` mounts resources (a tile grid backed by snapshots, or nothing for swaps and
//! crossfades), `frame` samples them at zone progress, and `end` tears them down. While a
//! transition is in flight, requests for any other edge are ignored; a request for the same
//! edge in the opposite direction keeps the mounted resources and only flips the direction.
//!
//! Frames are positional: zone progress `0` is the lower-indexed scene and `1` the higher one,
//! whichever way the boundary is being crossed. Tile fronts show the lower scene, backs the
//! higher one, and a swap cuts at [`SWAP_AT`].

use crate::{
    foundation::core::{ElementId, Millis, Viewport},
    foundation::math::clamp01,
    snapshot::cache::SnapshotCache,
    snapshot::capture::SnapshotCapturer,
    tiles::grid::{TileConfig, TileFrame, TileGrid},
    transition::router::{Boundary, Strategy, TileFlipParams},
};

/// Zone progress at which a swap shows the higher-indexed scene.
pub const SWAP_AT: f64 = 0.5;

/// Everything `begin` needs to know about the boundary being crossed.
#[derive(Clone, Copy, Debug)]
pub struct TransitionRequest<'a> {
    pub boundary: Boundary,
    pub strategy: &'a Strategy,
    /// Root of the lower-indexed scene at the edge.
    pub outgoing: &'a ElementId,
    /// Root of the higher-indexed scene at the edge.
    pub incoming: &'a ElementId,
    pub viewport: Viewport,
    pub tiles: &'a TileConfig,
    pub reduced_motion: bool,
    pub now: Millis,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BeginOutcome {
    Started,
    /// Same edge already in flight; resources were kept.
    Continued,
    /// A different edge is in flight; nothing was mounted.
    Ignored,
}

#[derive(Clone, Debug)]
pub enum Effect {
    Swap,
    Crossfade { zoom: f64 },
    Tiles(TileGrid),
}

#[derive(Clone, Debug)]
pub struct ActiveTransition {
    pub boundary: Boundary,
    pub effect: Effect,
    pub started_at: Millis,
    /// Snapshots had to be captured synchronously because the cache missed.
    pub blocking_capture: bool,
}

impl ActiveTransition {
    pub fn tile_count(&self) -> usize {
        match &self.effect {
            Effect::Tiles(grid) => grid.len(),
            _ => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum EffectFrame {
    Swap {
        visible: usize,
    },
    Crossfade {
        outgoing_opacity: f64,
        incoming_opacity: f64,
        outgoing_scale: f64,
        incoming_scale: f64,
    },
    Tiles {
        tiles: Vec<TileFrame>,
        complete: bool,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TransitionFrame {
    pub boundary: Boundary,
    pub progress: f64,
    #[serde(flatten)]
    pub effect: EffectFrame,
}

#[derive(Debug, Default)]
pub struct TransitionController {
    active: Option<ActiveTransition>,
}

impl TransitionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveTransition> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[tracing::instrument(skip_all, fields(boundary = %req.boundary, strategy = req.strategy.name()))]
    pub fn begin(
        &mut self,
        req: TransitionRequest<'_>,
        capturer: &dyn SnapshotCapturer,
        cache: &mut SnapshotCache,
    ) -> BeginOutcome {
        if let Some(active) = self.active.as_mut() {
            if active.boundary.edge() == req.boundary.edge() {
                active.boundary = req.boundary;
                return BeginOutcome::Continued;
            }
            tracing::warn!(
                in_flight = %active.boundary,
                "transition requested while another is in flight; ignoring"
            );
            return BeginOutcome::Ignored;
        }

        let mut blocking_capture = false;
        let effect = if req.reduced_motion {
            Effect::Swap
        } else {
            match req.strategy {
                Strategy::InstantSwap => Effect::Swap,
                Strategy::Crossfade { zoom } => Effect::Crossfade { zoom: *zoom },
                Strategy::TileFlip(params) => {
                    let cfg = apply_overrides(req.tiles, params);
                    let pair = match cache.get(req.viewport) {
                        Some(hit) => Ok(hit),
                        None => {
                            tracing::info!(
                                key = %req.viewport.key(),
                                "snapshot cache miss at transition start; capturing synchronously"
                            );
                            blocking_capture = true;
                            cache.capture_blocking(
                                capturer,
                                req.outgoing,
                                req.incoming,
                                req.viewport,
                                req.now,
                            )
                        }
                    };
                    match pair {
                        Ok(pair) => {
                            Effect::Tiles(TileGrid::build(req.viewport, &cfg).with_snapshots(pair))
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "snapshot capture failed; swapping instead");
                            Effect::Swap
                        }
                    }
                }
            }
        };

        self.active = Some(ActiveTransition {
            boundary: req.boundary,
            effect,
            started_at: req.now,
            blocking_capture,
        });
        BeginOutcome::Started
    }

    /// Sample the in-flight transition at zone progress `p` (clamped to `[0, 1]`).
    pub fn frame(&self, p: f64) -> Option<TransitionFrame> {
        let active = self.active.as_ref()?;
        let p = clamp01(p);
        let effect = match &active.effect {
            Effect::Swap => {
                let edge = active.boundary.edge();
                EffectFrame::Swap {
                    visible: if p >= SWAP_AT { edge + 1 } else { edge },
                }
            }
            Effect::Crossfade { zoom } => EffectFrame::Crossfade {
                outgoing_opacity: 1.0 - p,
                incoming_opacity: p,
                outgoing_scale: 1.0 + zoom * p,
                incoming_scale: 1.0 + zoom * (1.0 - p),
            },
            Effect::Tiles(grid) => EffectFrame::Tiles {
                tiles: grid.sample(p),
                complete: grid.is_complete(p),
            },
        };
        Some(TransitionFrame {
            boundary: active.boundary,
            progress: p,
            effect,
        })
    }

    /// Tear down the in-flight transition, if any.
    pub fn end(&mut self) -> Option<ActiveTransition> {
        let ended = self.active.take();
        if let Some(t) = &ended {
            tracing::debug!(boundary = %t.boundary, tiles = t.tile_count(), "transition torn down");
        }
        ended
    }
}

fn apply_overrides(base: &TileConfig, params: &TileFlipParams) -> TileConfig {
    let mut cfg = *base;
    if let Some(seed) = params.seed {
        cfg.stagger.seed = seed;
    }
    if let Some(f) = params.glitch_fraction {
        cfg.stagger.glitch_fraction = f;
    }
    cfg
}

#[cfg(test)]
#[path = "../../tests/unit/transition/controller.rs"]
mod tests;

//! Scrollcine is a scroll-linked scene transition engine.
//!
//! A page is a sequence of full-screen scenes laid out along the scroll axis. The engine turns
//! a scroll offset into deterministic animation state and renders each scene boundary with
//! exactly one transition effect.
//!
//! # Frame overview
//!
//! 1. **Map**: scroll offset -> scene and normalized [`Progress`] ([`ScrollProgressMapper`])
//! 2. **Derive**: progress -> [`Phase`] and active item ([`PhaseTable`])
//! 3. **Sample**: progress -> property values from the scene's [`Timeline`]
//! 4. **Transition**: inside a boundary's zone, the [`TransitionRouter`] picks a [`Strategy`]
//!    and the [`TransitionController`] samples it (crossfade, swap, or a [`TileGrid`] cut from
//!    pre-warmed snapshots held in a [`SnapshotCache`])
//!
//! [`ScrollStage`] runs all four per frame. Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure derivation**: phase, timeline values and transition frames depend on scroll position
//!   alone, so scrubbing in either direction reproduces the same state.
//! - **Explicit time**: the host passes frame timestamps in; there are no timers or threads
//!   beyond the paired snapshot capture.
//! - **Local recovery**: stage entry points never fail; they log and degrade.
#![forbid(unsafe_code)]

mod animation;
mod config;
mod foundation;
mod geometry;
mod host;
mod phase;
mod scroll;
mod snapshot;
mod stage;
mod tiles;
mod transition;

pub use animation::ease::Ease;
pub use animation::script::{SceneScript, ScriptStep, ScriptedScene, StepAt};
pub use animation::tier::{DurationTier, TierSeconds};
pub use animation::timeline::{
    CrossfadePair, FrameValues, Property, Timeline, TimelineBuilder, Tween,
};
pub use config::{ElementBox, EngineConfig, SceneManifest, StageManifest};
pub use foundation::core::{
    Affine, Direction, ElementId, Millis, Point, Progress, Rect, Vec2, Viewport, ViewportKey,
};
pub use foundation::error::{EngineError, EngineResult};
pub use foundation::math::Rng64;
pub use geometry::flip::{FlipMorph, FlipTransform, MorphMode, TransformOrigin, compute_flip};
pub use host::{SceneHost, StaticHost};
pub use phase::machine::{Phase, PhaseState, PhaseTable, PhaseThreshold};
pub use scroll::mapper::{ScrollBounds, ScrollProgressMapper};
pub use scroll::registry::{SceneDecl, SceneRegistry, SceneSpan};
pub use snapshot::cache::{SnapshotCache, WarmOutcome, WarmTicket};
pub use snapshot::capture::{
    Snapshot, SnapshotCapturer, SnapshotPair, SolidFillCapturer, capture_pair,
};
pub use snapshot::debounce::ResizeDebouncer;
pub use stage::{ScrollStage, StageFrame, StageScene, WarmRequest, bare_scene};
pub use tiles::grid::{
    Face, GridDims, GridLayout, PixelRect, Tile, TileConfig, TileFrame, TileGrid, crop_tile,
};
pub use tiles::stagger::{StaggerParams, TileTiming, tile_offsets};
pub use transition::controller::{
    ActiveTransition, BeginOutcome, Effect, EffectFrame, SWAP_AT, TransitionController,
    TransitionFrame, TransitionRequest,
};
pub use transition::router::{
    Boundary, Strategy, TileFlipParams, TransitionRouter, TransitionSpec, parse_strategy,
    parse_transition,
};

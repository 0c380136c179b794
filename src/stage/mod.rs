//! Frame-driven orchestration of one scroll stage.
//!
//! [`ScrollStage`] is the only stateful entry point a host talks to. Each scroll frame maps the
//! offset to a scene, derives phase state, samples that scene's timeline and, inside a
//! transition zone, drives the single in-flight transition. None of the entry points return
//! errors: failures are logged and degrade to a plainer frame.
//!
//! Snapshot capture never runs on the scroll path. Scrolling near a tiled boundary only queues a
//! [`WarmRequest`]; the host runs queued requests in idle time ([`ScrollStage::on_idle`]) or
//! takes them to capture elsewhere and hands the result back through
//! [`ScrollStage::complete_warm`]. The one exception is a transition that starts on a cache
//! miss, which captures synchronously before its first frame.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    animation::script::{SceneScript, ScriptedScene},
    animation::timeline::{FrameValues, Timeline, TimelineBuilder},
    config::{EngineConfig, StageManifest},
    foundation::core::{Direction, ElementId, Millis, Progress, Viewport},
    foundation::error::{EngineError, EngineResult},
    host::SceneHost,
    phase::machine::{PhaseState, PhaseTable},
    scroll::mapper::{ScrollBounds, ScrollProgressMapper},
    scroll::registry::{SceneDecl, SceneRegistry},
    snapshot::cache::{SnapshotCache, WarmOutcome, WarmTicket},
    snapshot::capture::{Snapshot, SnapshotCapturer, capture_pair},
    snapshot::debounce::ResizeDebouncer,
    transition::controller::{TransitionController, TransitionFrame, TransitionRequest},
    transition::router::{Boundary, TransitionRouter},
};

/// A registered scene and the script that authors its timeline.
#[derive(Clone)]
pub struct StageScene {
    pub decl: SceneDecl,
    pub script: Arc<dyn SceneScript>,
}

impl StageScene {
    pub fn new(decl: SceneDecl, script: impl SceneScript + 'static) -> Self {
        Self {
            decl,
            script: Arc::new(script),
        }
    }
}

impl std::fmt::Debug for StageScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageScene")
            .field("decl", &self.decl)
            .finish_non_exhaustive()
    }
}

/// Snapshot capture queued for a tiled boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct WarmRequest {
    pub edge: usize,
    pub outgoing: ElementId,
    pub incoming: ElementId,
    pub viewport: Viewport,
    ticket: WarmTicket,
}

impl WarmRequest {
    pub fn ticket(&self) -> WarmTicket {
        self.ticket
    }

    /// Capture both scenes for this request.
    pub fn capture(
        &self,
        capturer: &dyn SnapshotCapturer,
    ) -> EngineResult<(Snapshot, Snapshot)> {
        capture_pair(capturer, &self.outgoing, &self.incoming, self.viewport)
    }
}

/// Everything the host needs to render one scroll frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StageFrame {
    pub offset: f64,
    pub scene: usize,
    pub progress: Progress,
    pub phase: PhaseState,
    pub values: FrameValues,
    pub transition: Option<TransitionFrame>,
}

pub struct ScrollStage {
    config: EngineConfig,
    phases: PhaseTable,
    registry: SceneRegistry,
    scenes: Vec<StageScene>,
    timelines: Vec<Timeline>,
    timelines_stale: bool,
    router: TransitionRouter,
    warm_edges: Vec<usize>,
    controller: TransitionController,
    caches: BTreeMap<usize, SnapshotCache>,
    pending_warms: Vec<WarmRequest>,
    debouncer: ResizeDebouncer,
    mapper: ScrollProgressMapper,
    viewport: Viewport,
    reduced_motion: bool,
}

impl ScrollStage {
    pub fn new(
        config: EngineConfig,
        viewport: Viewport,
        scenes: Vec<StageScene>,
        router: TransitionRouter,
        host: &dyn SceneHost,
    ) -> EngineResult<Self> {
        config.validate()?;
        let viewport = Viewport::new(viewport.width, viewport.height)?
            .with_coarse_pointer(viewport.coarse_pointer);
        let decls: Vec<SceneDecl> = scenes.iter().map(|s| s.decl.clone()).collect();
        let registry = SceneRegistry::new(&decls, config.scroll_px_per_sec)?;

        let warm_edges = router.snapshot_edges();
        if let Some(edge) = warm_edges.iter().find(|e| **e + 1 >= registry.len()) {
            return Err(EngineError::validation(format!(
                "tiled transition at edge {edge} has no scene after it"
            )));
        }

        let mut stage = Self {
            phases: config.phase_table()?,
            debouncer: ResizeDebouncer::new(config.resize_debounce_ms),
            config,
            registry,
            scenes,
            timelines: Vec::new(),
            timelines_stale: true,
            router,
            warm_edges,
            controller: TransitionController::new(),
            caches: BTreeMap::new(),
            pending_warms: Vec::new(),
            mapper: ScrollProgressMapper::new(),
            viewport,
            reduced_motion: false,
        };
        stage.rebuild_timelines(host);
        Ok(stage)
    }

    pub fn from_manifest(manifest: &StageManifest, host: &dyn SceneHost) -> EngineResult<Self> {
        manifest.validate()?;
        let scenes = manifest
            .scenes
            .iter()
            .map(|s| StageScene::new(s.decl.clone(), s.script.clone()))
            .collect();
        Self::new(
            manifest.engine.clone(),
            manifest.viewport,
            scenes,
            manifest.router()?,
            host,
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn router(&self) -> &TransitionRouter {
        &self.router
    }

    pub fn timeline(&self, scene: usize) -> Option<&Timeline> {
        self.timelines.get(scene)
    }

    pub fn controller(&self) -> &TransitionController {
        &self.controller
    }

    /// Snapshot cache for the tiled transition at `edge`, once anything has touched it.
    pub fn cache(&self, edge: usize) -> Option<&SnapshotCache> {
        self.caches.get(&edge)
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Read at the start of each transition; an in-flight one keeps its effect.
    pub fn set_reduced_motion(&mut self, on: bool) {
        self.reduced_motion = on;
    }

    /// Edge and zone progress if `offset` falls inside a transition zone.
    ///
    /// The zone for edge `i` is `[boundary - transition_zone_px, boundary)`, clipped to the
    /// start of scene `i`.
    pub fn transition_zone(&self, offset: f64) -> Option<(usize, f64)> {
        let scene = self.registry.scene_at(offset);
        let boundary = self.registry.boundary_px(scene)?;
        let zone = ScrollBounds::new(self.zone_start(scene)?, boundary);
        if !zone.contains(offset) {
            return None;
        }
        Some((scene, zone.progress_at(offset)))
    }

    fn zone_start(&self, edge: usize) -> Option<f64> {
        let boundary = self.registry.boundary_px(edge)?;
        let span = self.registry.span(edge)?;
        Some((boundary - self.config.transition_zone_px).max(span.bounds.start_px))
    }

    /// Process one scroll frame.
    pub fn on_scroll(
        &mut self,
        offset: f64,
        host: &dyn SceneHost,
        capturer: &dyn SnapshotCapturer,
        now: Millis,
    ) -> StageFrame {
        if self.timelines_stale {
            self.rebuild_timelines(host);
        }
        let offset = if offset.is_finite() {
            offset
        } else {
            self.mapper.prev_offset().unwrap_or(0.0)
        };

        let scene = self.registry.scene_at(offset);
        let span = &self.registry.spans()[scene];
        let progress = self.mapper.update(offset, span.bounds);
        let phase = self.phases.derive(progress.value, span.items);
        let values = self
            .timelines
            .get(scene)
            .map(|t| t.sample(progress.value))
            .unwrap_or_default();

        let transition = self.drive_transition(offset, progress.direction, capturer, now);
        self.warm_nearby(offset);

        StageFrame {
            offset,
            scene,
            progress,
            phase,
            values,
            transition,
        }
    }

    fn drive_transition(
        &mut self,
        offset: f64,
        direction: Direction,
        capturer: &dyn SnapshotCapturer,
        now: Millis,
    ) -> Option<TransitionFrame> {
        let Some((edge, p)) = self.transition_zone(offset) else {
            self.controller.end();
            return None;
        };
        if let Some(active) = self.controller.active()
            && active.boundary.edge() != edge
        {
            self.controller.end();
        }

        let boundary = match direction {
            Direction::Forward => Boundary::new(edge, edge + 1),
            Direction::Backward => Boundary::new(edge + 1, edge),
        };
        let spans = self.registry.spans();
        let (lo, hi) = (spans.get(edge)?, spans.get(edge + 1)?);
        let req = TransitionRequest {
            boundary,
            strategy: self.router.resolve(boundary),
            outgoing: &lo.element,
            incoming: &hi.element,
            viewport: self.viewport,
            tiles: &self.config.tiles,
            reduced_motion: self.reduced_motion,
            now,
        };
        let cache = self.caches.entry(edge).or_default();
        self.controller.begin(req, capturer, cache);
        self.controller.frame(p)
    }

    fn warm_nearby(&mut self, offset: f64) {
        if self.reduced_motion {
            return;
        }
        let near: Vec<usize> = self
            .warm_edges
            .iter()
            .copied()
            .filter(|&edge| {
                let (Some(start), Some(boundary)) =
                    (self.zone_start(edge), self.registry.boundary_px(edge))
                else {
                    return false;
                };
                let reach = self.config.warm_proximity_px;
                offset >= start - reach && offset <= boundary + reach
            })
            .collect();
        for edge in near {
            self.request_warm(edge);
        }
    }

    /// Queue a capture for `edge` unless its cache is warm, capturing, or failed at this size.
    fn request_warm(&mut self, edge: usize) -> Option<&WarmRequest> {
        let spans = self.registry.spans();
        let (lo, hi) = (spans.get(edge)?, spans.get(edge + 1)?);
        let ticket = self.caches.entry(edge).or_default().begin_warm(self.viewport)?;
        tracing::debug!(edge, key = %ticket.key(), "snapshot warm queued");
        self.pending_warms.push(WarmRequest {
            edge,
            outgoing: lo.element.clone(),
            incoming: hi.element.clone(),
            viewport: self.viewport,
            ticket,
        });
        self.pending_warms.last()
    }

    /// Warm requests queued since the last call, for hosts that capture off the frame loop.
    pub fn take_warm_requests(&mut self) -> Vec<WarmRequest> {
        std::mem::take(&mut self.pending_warms)
    }

    pub fn pending_warms(&self) -> &[WarmRequest] {
        &self.pending_warms
    }

    /// Store the result of a request's capture. A request that outlived a resize is discarded.
    pub fn complete_warm(
        &mut self,
        request: &WarmRequest,
        result: EngineResult<(Snapshot, Snapshot)>,
        now: Millis,
    ) -> WarmOutcome {
        match self.caches.get_mut(&request.edge) {
            Some(cache) => cache.finish_warm(request.ticket, result, now),
            None => WarmOutcome::Discarded,
        }
    }

    /// Idle-time work: queue the first tiled transition's warm-up, then run every queued
    /// capture. Returns the outcome of each capture that ran.
    pub fn on_idle(
        &mut self,
        capturer: &dyn SnapshotCapturer,
        now: Millis,
    ) -> Vec<(usize, WarmOutcome)> {
        if self.reduced_motion {
            return Vec::new();
        }
        if let Some(&edge) = self.warm_edges.first() {
            self.request_warm(edge);
        }
        self.take_warm_requests()
            .into_iter()
            .map(|req| {
                let result = req.capture(capturer);
                (req.edge, self.complete_warm(&req, result, now))
            })
            .collect()
    }

    /// Record a viewport change. It takes effect once [`ScrollStage::tick`] sees it settle.
    pub fn on_resize(&mut self, viewport: Viewport, now: Millis) {
        self.debouncer.notify(viewport, now);
    }

    /// Advance frame time. Returns the viewport if a debounced resize was applied.
    pub fn tick(&mut self, now: Millis) -> Option<Viewport> {
        let next = self.debouncer.poll(now)?;
        if next.width == 0 || next.height == 0 {
            tracing::warn!(
                width = next.width,
                height = next.height,
                "ignoring resize to empty viewport"
            );
            return None;
        }
        if next == self.viewport {
            return None;
        }
        tracing::info!(from = %self.viewport.key(), to = %next.key(), "viewport resized");
        self.viewport = next;
        for cache in self.caches.values_mut() {
            cache.invalidate();
        }
        self.controller.end();
        self.pending_warms.clear();
        self.timelines_stale = true;
        Some(next)
    }

    #[tracing::instrument(skip_all, fields(scenes = self.scenes.len(), viewport = %self.viewport.key()))]
    fn rebuild_timelines(&mut self, host: &dyn SceneHost) {
        let timelines: Vec<Timeline> = self
            .scenes
            .iter()
            .zip(self.registry.spans())
            .map(|(scene, span)| {
                let mut b = TimelineBuilder::new(
                    host,
                    &self.phases,
                    self.config.tiers,
                    span.budget_secs,
                    span.items,
                );
                scene.script.author(&mut b);
                let timeline = b.build();
                if !timeline.skipped().is_empty() {
                    tracing::debug!(
                        scene = span.index,
                        skipped = timeline.skipped().len(),
                        "scene built with missing targets"
                    );
                }
                timeline
            })
            .collect();
        self.timelines = timelines;
        self.timelines_stale = false;
    }
}

impl std::fmt::Debug for ScrollStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollStage")
            .field("viewport", &self.viewport)
            .field("scenes", &self.registry.len())
            .field("reduced_motion", &self.reduced_motion)
            .finish_non_exhaustive()
    }
}

/// Scene with an empty script, for stages that only need scroll mapping and transitions.
pub fn bare_scene(decl: SceneDecl) -> StageScene {
    StageScene::new(decl, ScriptedScene::default())
}

#[cfg(test)]
#[path = "../../tests/unit/stage/stage.rs"]
mod tests;

//! Pre-materialized snapshots for tiled transitions.
//!
//! A cache belongs to one boundary and holds at most one [`SnapshotPair`], keyed by the
//! viewport size it was captured at. Warm-up is split in two halves so the capture itself can
//! run off the scroll path:
//!
//! - [`SnapshotCache::begin_warm`] marks the cache as capturing and hands out a ticket. A second
//!   request for the same key while capturing is a no-op, not a queued retry.
//! - [`SnapshotCache::finish_warm`] stores the result, unless the ticket was invalidated by a
//!   resize in the meantime, in which case the result is dropped.
//!
//! [`SnapshotCache::warm`] runs both halves back to back for hosts whose capture is synchronous.
//!
//! A failed warm is remembered per viewport key: further warm requests for that key are refused
//! until [`SnapshotCache::invalidate`], leaving the transition-time
//! [`SnapshotCache::capture_blocking`] as the only retry.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    foundation::core::{ElementId, Millis, Viewport, ViewportKey},
    foundation::error::EngineResult,
    snapshot::capture::{Snapshot, SnapshotCapturer, SnapshotPair, capture_pair},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarmTicket {
    id: u64,
    key: ViewportKey,
}

impl WarmTicket {
    pub fn key(&self) -> ViewportKey {
        self.key
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmOutcome {
    Stored,
    AlreadyWarm,
    InProgress,
    /// The capture finished after the cache was invalidated; its result was dropped.
    Discarded,
    Failed,
}

#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: HashMap<ViewportKey, Arc<SnapshotPair>>,
    capturing: Option<WarmTicket>,
    failed: HashSet<ViewportKey>,
    next_ticket: u64,
    captures: u64,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.is_some()
    }

    /// Whether a warm for this viewport failed since the last invalidation.
    pub fn has_failed(&self, viewport: Viewport) -> bool {
        self.failed.contains(&viewport.key())
    }

    /// Number of capture operations started over the cache's lifetime.
    pub fn capture_count(&self) -> u64 {
        self.captures
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for the current viewport, or `None` on a miss. Never blocks.
    pub fn get(&self, viewport: Viewport) -> Option<Arc<SnapshotPair>> {
        self.entries.get(&viewport.key()).cloned()
    }

    pub fn begin_warm(&mut self, viewport: Viewport) -> Option<WarmTicket> {
        let key = viewport.key();
        if let Some(t) = self.capturing
            && t.key == key
        {
            tracing::debug!(%key, "snapshot warm already in progress");
            return None;
        }
        if self.entries.contains_key(&key) {
            return None;
        }
        if self.failed.contains(&key) {
            tracing::debug!(%key, "snapshot warm failed earlier for this size, not retrying");
            return None;
        }
        self.next_ticket += 1;
        self.captures += 1;
        let ticket = WarmTicket {
            id: self.next_ticket,
            key,
        };
        self.capturing = Some(ticket);
        Some(ticket)
    }

    pub fn finish_warm(
        &mut self,
        ticket: WarmTicket,
        result: EngineResult<(Snapshot, Snapshot)>,
        now: Millis,
    ) -> WarmOutcome {
        if self.capturing != Some(ticket) {
            tracing::debug!(key = %ticket.key, "capture finished after invalidation, discarding");
            return WarmOutcome::Discarded;
        }
        self.capturing = None;

        let (outgoing, incoming) = match result {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(key = %ticket.key, error = %e, "snapshot capture failed");
                self.failed.insert(ticket.key);
                return WarmOutcome::Failed;
            }
        };
        if self.entries.contains_key(&ticket.key) {
            return WarmOutcome::AlreadyWarm;
        }
        self.store(SnapshotPair {
            key: ticket.key,
            outgoing,
            incoming,
            created_at: now,
        });
        WarmOutcome::Stored
    }

    /// Capture both scenes now (in parallel) and store them.
    #[tracing::instrument(skip(self, capturer), fields(key = %viewport.key()))]
    pub fn warm(
        &mut self,
        capturer: &dyn SnapshotCapturer,
        outgoing: &ElementId,
        incoming: &ElementId,
        viewport: Viewport,
        now: Millis,
    ) -> WarmOutcome {
        let Some(ticket) = self.begin_warm(viewport) else {
            return if self.entries.contains_key(&viewport.key()) {
                WarmOutcome::AlreadyWarm
            } else if self.has_failed(viewport) {
                WarmOutcome::Failed
            } else {
                WarmOutcome::InProgress
            };
        };
        let result = capture_pair(capturer, outgoing, incoming, viewport);
        self.finish_warm(ticket, result, now)
    }

    /// Synchronous slow path used when a transition starts on a cache miss. Does not wait for,
    /// or cancel, a capture already in flight. Retries sizes whose warm failed.
    pub fn capture_blocking(
        &mut self,
        capturer: &dyn SnapshotCapturer,
        outgoing: &ElementId,
        incoming: &ElementId,
        viewport: Viewport,
        now: Millis,
    ) -> EngineResult<Arc<SnapshotPair>> {
        if let Some(hit) = self.get(viewport) {
            return Ok(hit);
        }
        self.captures += 1;
        let (o, i) = capture_pair(capturer, outgoing, incoming, viewport)?;
        self.failed.remove(&viewport.key());
        Ok(self.store(SnapshotPair {
            key: viewport.key(),
            outgoing: o,
            incoming: i,
            created_at: now,
        }))
    }

    /// Drop every entry. A capture in flight keeps running and is discarded when it finishes.
    pub fn invalidate(&mut self) {
        if self.capturing.take().is_some() {
            tracing::debug!("invalidating cache with capture in flight");
        }
        self.entries.clear();
        self.failed.clear();
    }

    fn store(&mut self, pair: SnapshotPair) -> Arc<SnapshotPair> {
        let key = pair.key;
        self.entries.retain(|k, _| *k == key);
        let pair = Arc::new(pair);
        self.entries.insert(key, Arc::clone(&pair));
        tracing::debug!(%key, "snapshot pair cached");
        pair
    }
}

#[cfg(test)]
#[path = "../../tests/unit/snapshot/cache.rs"]
mod tests;

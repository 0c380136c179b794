use crate::foundation::core::{Millis, Viewport};

/// Trailing-edge debounce for viewport resizes; fires once the size has been stable for
/// `window_ms`. Time is supplied by the caller.
#[derive(Clone, Copy, Debug)]
pub struct ResizeDebouncer {
    window_ms: u64,
    pending: Option<(Viewport, Millis)>,
}

impl ResizeDebouncer {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn notify(&mut self, viewport: Viewport, now: Millis) {
        self.pending = Some((viewport, now.saturating_add(self.window_ms)));
    }

    /// The settled viewport, once its deadline has passed.
    pub fn poll(&mut self, now: Millis) -> Option<Viewport> {
        match self.pending {
            Some((vp, deadline)) if now >= deadline => {
                self.pending = None;
                Some(vp)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/snapshot/debounce.rs"]
mod tests;

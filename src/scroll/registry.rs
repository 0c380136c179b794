use crate::{
    foundation::core::ElementId,
    foundation::error::{EngineError, EngineResult},
    scroll::mapper::ScrollBounds,
};

/// One scene as registered by the content layer: what to show and for how long.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDecl {
    pub element: ElementId,
    pub budget_secs: f64,
    /// Sub-items cycled through while the scene is pinned (films, steps, cards).
    #[serde(default = "default_items")]
    pub items: usize,
}

fn default_items() -> usize {
    1
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SceneSpan {
    pub index: usize,
    pub element: ElementId,
    pub start_secs: f64,
    pub budget_secs: f64,
    pub items: usize,
    pub bounds: ScrollBounds,
}

/// Contiguous, non-overlapping scene layout along the scroll axis.
#[derive(Clone, Debug)]
pub struct SceneRegistry {
    spans: Vec<SceneSpan>,
    px_per_sec: f64,
}

impl SceneRegistry {
    pub fn new(decls: &[SceneDecl], px_per_sec: f64) -> EngineResult<Self> {
        if decls.is_empty() {
            return Err(EngineError::validation("at least one scene must be registered"));
        }
        if !px_per_sec.is_finite() || px_per_sec <= 0.0 {
            return Err(EngineError::validation(
                "scroll_px_per_sec must be finite and > 0",
            ));
        }

        let mut spans = Vec::with_capacity(decls.len());
        let mut start_secs = 0.0;
        for (index, d) in decls.iter().enumerate() {
            if !d.budget_secs.is_finite() || d.budget_secs <= 0.0 {
                return Err(EngineError::validation(format!(
                    "scene '{}' budget_secs must be finite and > 0",
                    d.element
                )));
            }
            let end_secs = start_secs + d.budget_secs;
            spans.push(SceneSpan {
                index,
                element: d.element.clone(),
                start_secs,
                budget_secs: d.budget_secs,
                items: d.items.max(1),
                bounds: ScrollBounds::new(start_secs * px_per_sec, end_secs * px_per_sec),
            });
            start_secs = end_secs;
        }

        Ok(Self { spans, px_per_sec })
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[SceneSpan] {
        &self.spans
    }

    pub fn span(&self, index: usize) -> Option<&SceneSpan> {
        self.spans.get(index)
    }

    pub fn px_per_sec(&self) -> f64 {
        self.px_per_sec
    }

    pub fn total_secs(&self) -> f64 {
        self.spans
            .last()
            .map(|s| s.start_secs + s.budget_secs)
            .unwrap_or(0.0)
    }

    pub fn total_scroll_px(&self) -> f64 {
        self.spans.last().map(|s| s.bounds.end_px).unwrap_or(0.0)
    }

    /// Scene whose bounds contain `offset`, clamped to the first/last scene.
    pub fn scene_at(&self, offset: f64) -> usize {
        if !offset.is_finite() || offset <= 0.0 {
            return 0;
        }
        let idx = self.spans.partition_point(|s| s.bounds.start_px <= offset);
        idx.saturating_sub(1).min(self.spans.len() - 1)
    }

    /// Scroll offset where scene `index` hands over to `index + 1`.
    pub fn boundary_px(&self, index: usize) -> Option<f64> {
        if index + 1 >= self.spans.len() {
            return None;
        }
        Some(self.spans[index].bounds.end_px)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/registry.rs"]
mod tests;

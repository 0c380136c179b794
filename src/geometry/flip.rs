//! First/last layout morphs.
//!
//! Geometry is read strictly before any transform is written: [`FlipMorph::measure`] captures
//! both rectangles once, and everything afterwards is pure arithmetic on those values. Reading
//! the source again mid-morph would return its already-scaled rectangle and compound error.

use crate::{
    foundation::core::{Affine, ElementId, Rect, Vec2, is_degenerate_rect},
    foundation::math::{clamp01, lerp},
    host::SceneHost,
};

/// Translation plus non-uniform scale, anchored at the element's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlipTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for FlipTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FlipTransform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    /// Rectangle covered by `source` once this transform is applied to it.
    pub fn apply(self, source: Rect) -> Rect {
        let x0 = source.x0 + self.translate_x;
        let y0 = source.y0 + self.translate_y;
        Rect::new(
            x0,
            y0,
            x0 + source.width() * self.scale_x,
            y0 + source.height() * self.scale_y,
        )
    }

    /// Element-local affine (origin at the element's top-left corner).
    pub fn to_affine(self) -> Affine {
        Affine::translate(Vec2::new(self.translate_x, self.translate_y))
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self {
            translate_x: lerp(a.translate_x, b.translate_x, t),
            translate_y: lerp(a.translate_y, b.translate_y, t),
            scale_x: lerp(a.scale_x, b.scale_x, t),
            scale_y: lerp(a.scale_y, b.scale_y, t),
        }
    }
}

/// Transform that relocates `source` exactly onto `target`.
///
/// Zero-sized or non-finite rectangles yield [`FlipTransform::IDENTITY`] instead of
/// NaN/infinite scale factors.
pub fn compute_flip(source: Rect, target: Rect) -> FlipTransform {
    if is_degenerate_rect(source) || is_degenerate_rect(target) {
        tracing::debug!(?source, ?target, "flip geometry unavailable, using identity");
        return FlipTransform::IDENTITY;
    }
    FlipTransform {
        translate_x: target.x0 - source.x0,
        translate_y: target.y0 - source.y0,
        scale_x: target.width() / source.width(),
        scale_y: target.height() / source.height(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOrigin {
    TopLeft,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphMode {
    /// Source starts in place and ends covering the target.
    ToTarget,
    /// Source starts covering the target and settles back into its own layout slot.
    FromTarget,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlipMorph {
    pub source: ElementId,
    pub target: ElementId,
    pub transform: FlipTransform,
    pub start: f64,
    pub end: f64,
    pub mode: MorphMode,
}

impl FlipMorph {
    /// Measure both elements now and freeze the resulting transform.
    pub fn measure(
        host: &dyn SceneHost,
        source: &ElementId,
        target: &ElementId,
        start: f64,
        end: f64,
        mode: MorphMode,
    ) -> Self {
        let transform = match (host.bounding_rect(source), host.bounding_rect(target)) {
            (Some(s), Some(t)) => compute_flip(s, t),
            _ => {
                tracing::debug!(%source, %target, "flip element not laid out, using identity");
                FlipTransform::IDENTITY
            }
        };
        let (start, end) = (clamp01(start), clamp01(end));
        Self {
            source: source.clone(),
            target: target.clone(),
            transform,
            start: start.min(end),
            end: end.max(start),
            mode,
        }
    }

    fn local(&self, p: f64) -> f64 {
        if p >= self.end {
            return 1.0;
        }
        if p <= self.start {
            return 0.0;
        }
        clamp01((p - self.start) / (self.end - self.start))
    }

    pub fn transform_at(&self, p: f64) -> FlipTransform {
        let t = self.local(p);
        match self.mode {
            MorphMode::ToTarget => FlipTransform::lerp(FlipTransform::IDENTITY, self.transform, t),
            MorphMode::FromTarget => FlipTransform::lerp(self.transform, FlipTransform::IDENTITY, t),
        }
    }

    /// Origin stays pinned top-left for as long as the element carries a non-identity
    /// transform, since the translate is only valid for that anchor. A `ToTarget` morph keeps
    /// covering the target after it ends, so it stays pinned.
    pub fn origin_at(&self, p: f64) -> TransformOrigin {
        let settled = p >= self.end || (self.mode == MorphMode::ToTarget && p < self.start);
        if settled && self.transform_at(p).is_identity() {
            TransformOrigin::Center
        } else {
            TransformOrigin::TopLeft
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/flip.rs"]
mod tests;

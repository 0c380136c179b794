use crate::foundation::core::{Direction, Progress};

/// `[start, end)` scroll range of one scene or transition zone, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollBounds {
    pub start_px: f64,
    pub end_px: f64,
}

impl ScrollBounds {
    pub fn new(start_px: f64, end_px: f64) -> Self {
        Self { start_px, end_px }
    }

    pub fn len_px(self) -> f64 {
        (self.end_px - self.start_px).max(0.0)
    }

    pub fn contains(self, offset: f64) -> bool {
        self.start_px <= offset && offset < self.end_px
    }

    /// Clamped position of `offset` inside the bounds. Never NaN, never outside `[0, 1]`.
    pub fn progress_at(self, offset: f64) -> f64 {
        let len = self.len_px();
        if !offset.is_finite() {
            return 0.0;
        }
        if len <= 0.0 || !len.is_finite() {
            return if offset >= self.end_px { 1.0 } else { 0.0 };
        }
        if offset >= self.end_px {
            return 1.0;
        }
        if offset <= self.start_px {
            return 0.0;
        }
        ((offset - self.start_px) / len).clamp(0.0, 1.0)
    }
}

/// Converts absolute scroll offsets into scene progress.
///
/// The only retained state is the previous offset, used to report scroll direction. Progress
/// itself is recomputed from scratch on every call, so calling this every frame cannot drift.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollProgressMapper {
    prev_offset: Option<f64>,
    direction: Direction,
}

impl ScrollProgressMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn prev_offset(&self) -> Option<f64> {
        self.prev_offset
    }

    /// Publish progress for `offset` within `bounds` and remember `offset` for direction.
    ///
    /// An unchanged offset keeps the last direction. Non-finite offsets are ignored for
    /// direction purposes and map to the last known offset.
    pub fn update(&mut self, offset: f64, bounds: ScrollBounds) -> Progress {
        let offset = if offset.is_finite() {
            offset
        } else {
            self.prev_offset.unwrap_or(bounds.start_px)
        };
        if let Some(prev) = self.prev_offset {
            if offset > prev {
                self.direction = Direction::Forward;
            } else if offset < prev {
                self.direction = Direction::Backward;
            }
        }
        self.prev_offset = Some(offset);
        Progress {
            value: bounds.progress_at(offset),
            direction: self.direction,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/mapper.rs"]
mod tests;

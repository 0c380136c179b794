use crate::foundation::error::{EngineError, EngineResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Opaque reference to a host element (a scene root, a decorative layer, a morph target).
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monotonic host timestamp in milliseconds (frame or idle callback time).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct Millis(pub u64);

impl Millis {
    pub fn saturating_add(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub coarse_pointer: bool, // touch-first input
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> EngineResult<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::validation("viewport width/height must be > 0"));
        }
        Ok(Self {
            width,
            height,
            coarse_pointer: false,
        })
    }

    pub fn with_coarse_pointer(mut self, coarse: bool) -> Self {
        self.coarse_pointer = coarse;
        self
    }

    pub fn key(self) -> ViewportKey {
        ViewportKey {
            width: self.width,
            height: self.height,
        }
    }

    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Cache key for viewport-dependent state; displays as `<width>x<height>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewportKey {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for ViewportKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for ViewportKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| EngineError::validation(format!("viewport key '{s}' is not WxH")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| EngineError::validation(format!("viewport key '{s}' is not WxH")))
        };
        Ok(Self {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn signum(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

/// Normalized position inside one scene, plus the scroll direction at the last update.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Progress {
    pub value: f64, // always in [0, 1]
    pub direction: Direction,
}

pub(crate) fn is_degenerate_rect(r: Rect) -> bool {
    let (w, h) = (r.width(), r.height());
    !(w.is_finite() && h.is_finite() && r.x0.is_finite() && r.y0.is_finite()) || w <= 0.0 || h <= 0.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

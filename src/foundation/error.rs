/// Convenience result type used across scrollcine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Scroll-path entry points on [`crate::ScrollStage`] never surface these; they log and fall
/// back to a degraded transition instead.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Invalid configuration, manifest, or registration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while authoring or sampling a scene timeline.
    #[error("timeline error: {0}")]
    Timeline(String),

    /// Snapshot capture failed or produced unusable pixels.
    #[error("capture error: {0}")]
    Capture(String),

    /// Element geometry missing or degenerate.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// Build an [`EngineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`EngineError::Timeline`] value.
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    /// Build an [`EngineError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build an [`EngineError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build an [`EngineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

//! Narrow view of the page the engine runs in.
//!
//! The engine never walks a document tree itself. It asks the host whether an element is
//! mounted and, when a morph is about to start, for its laid-out rectangle.

use std::collections::BTreeMap;

use crate::foundation::core::{ElementId, Rect};

pub trait SceneHost {
    fn is_mounted(&self, el: &ElementId) -> bool;

    /// Laid-out rectangle in viewport pixels. Elements hidden with `visibility: hidden` still
    /// report a rectangle; `None` means the element is absent or not laid out.
    fn bounding_rect(&self, el: &ElementId) -> Option<Rect>;
}

/// In-memory host with fixed element rectangles.
#[derive(Clone, Debug, Default)]
pub struct StaticHost {
    rects: BTreeMap<ElementId, Rect>,
}

impl StaticHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, el: impl Into<String>, rect: Rect) -> Self {
        self.insert(ElementId::new(el), rect);
        self
    }

    pub fn insert(&mut self, el: ElementId, rect: Rect) {
        self.rects.insert(el, rect);
    }

    pub fn remove(&mut self, el: &ElementId) -> Option<Rect> {
        self.rects.remove(el)
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

impl SceneHost for StaticHost {
    fn is_mounted(&self, el: &ElementId) -> bool {
        self.rects.contains_key(el)
    }

    fn bounding_rect(&self, el: &ElementId) -> Option<Rect> {
        self.rects.get(el).copied()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/static_host.rs"]
mod tests;

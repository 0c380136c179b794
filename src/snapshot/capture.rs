use std::sync::Arc;

use image::RgbaImage;

use crate::{
    foundation::core::{ElementId, Millis, Viewport, ViewportKey},
    foundation::error::{EngineError, EngineResult},
    foundation::math::Fnv1a64,
};

/// Rasterizes a scene element as it currently appears.
///
/// Implementations may be called from two threads at once: the outgoing and incoming scenes of
/// a boundary are captured in parallel.
pub trait SnapshotCapturer: Sync {
    fn capture(&self, el: &ElementId, viewport: Viewport) -> EngineResult<RgbaImage>;
}

/// Static raster of one scene. Pixel size may differ from the viewport (device pixel ratio).
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub element: ElementId,
    pub image: Arc<RgbaImage>,
}

impl Snapshot {
    pub fn new(element: ElementId, image: RgbaImage) -> EngineResult<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(EngineError::capture(format!(
                "snapshot of '{element}' is empty"
            )));
        }
        Ok(Self {
            element,
            image: Arc::new(image),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Outgoing/incoming snapshots for one boundary at one viewport size.
#[derive(Clone, Debug)]
pub struct SnapshotPair {
    pub key: ViewportKey,
    pub outgoing: Snapshot,
    pub incoming: Snapshot,
    pub created_at: Millis,
}

/// Capture both scenes of a boundary in parallel.
pub fn capture_pair(
    capturer: &dyn SnapshotCapturer,
    outgoing: &ElementId,
    incoming: &ElementId,
    viewport: Viewport,
) -> EngineResult<(Snapshot, Snapshot)> {
    let (a, b) = rayon::join(
        || capturer.capture(outgoing, viewport),
        || capturer.capture(incoming, viewport),
    );
    Ok((Snapshot::new(outgoing.clone(), a?)?, Snapshot::new(incoming.clone(), b?)?))
}

/// Flat-colour capturer. Each element gets a stable colour derived from its id; useful for
/// inspection runs and tests where no real rasterizer exists.
#[derive(Clone, Copy, Debug)]
pub struct SolidFillCapturer {
    pub pixel_ratio: u32,
}

impl Default for SolidFillCapturer {
    fn default() -> Self {
        Self { pixel_ratio: 1 }
    }
}

impl SolidFillCapturer {
    pub fn color_for(el: &ElementId) -> image::Rgba<u8> {
        let mut h = Fnv1a64::new(0);
        h.write_bytes(el.as_str().as_bytes());
        let [r, g, b, ..] = h.finish().to_le_bytes();
        image::Rgba([r, g, b, 255])
    }
}

impl SnapshotCapturer for SolidFillCapturer {
    fn capture(&self, el: &ElementId, viewport: Viewport) -> EngineResult<RgbaImage> {
        let ratio = self.pixel_ratio.max(1);
        let w = viewport.width.saturating_mul(ratio);
        let h = viewport.height.saturating_mul(ratio);
        Ok(RgbaImage::from_pixel(w, h, Self::color_for(el)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/snapshot/capture.rs"]
mod tests;

use std::sync::Arc;

use image::RgbaImage;

use crate::{
    foundation::core::Viewport,
    foundation::error::{EngineError, EngineResult},
    foundation::math::clamp01,
    snapshot::capture::{Snapshot, SnapshotPair},
    tiles::stagger::{StaggerParams, tile_offsets},
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Target tile edge for wide viewports with a fine pointer.
    pub size_wide: u32,
    /// Target tile edge for narrow or touch-first viewports.
    pub size_narrow: u32,
    pub narrow_breakpoint_px: u32,
    /// Zone-progress length of one tile's flip.
    pub flip_len: f64,
    pub stagger: StaggerParams,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            size_wide: 150,
            size_narrow: 100,
            narrow_breakpoint_px: 768,
            flip_len: 0.4,
            stagger: StaggerParams::default(),
        }
    }
}

impl TileConfig {
    pub fn tile_edge_for(&self, viewport: Viewport) -> u32 {
        if viewport.coarse_pointer || viewport.width < self.narrow_breakpoint_px {
            self.size_narrow
        } else {
            self.size_wide
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.size_wide == 0 || self.size_narrow == 0 {
            return Err(EngineError::validation("tile sizes must be > 0"));
        }
        if !self.flip_len.is_finite() || self.flip_len <= 0.0 {
            return Err(EngineError::validation("tiles.flip_len must be finite and > 0"));
        }
        self.stagger.validate()?;
        if self.stagger.span + self.flip_len > 1.0 + 1e-9 {
            return Err(EngineError::validation(
                "tiles stagger span + flip_len must be <= 1 so every tile completes",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct GridDims {
    pub cols: u32,
    pub rows: u32,
}

impl GridDims {
    /// Near-square tiles: each axis is `round(extent / tile)`, at least one cell.
    pub fn for_viewport(width: u32, height: u32, tile: u32) -> Self {
        let tile = f64::from(tile.max(1));
        let count = |extent: u32| ((f64::from(extent) / tile).round() as u32).clamp(1, extent.max(1));
        Self {
            cols: count(width),
            rows: count(height),
        }
    }

    pub fn len(self) -> usize {
        (self.cols as usize) * (self.rows as usize)
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// Integer pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(self) -> u32 {
        self.y + self.height
    }
}

/// Cell geometry for a grid laid over `extent_w x extent_h` pixels. All cells share the base
/// size `extent / count`; the last column and row absorb the remainder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub dims: GridDims,
    pub extent_w: u32,
    pub extent_h: u32,
}

impl GridLayout {
    pub fn new(dims: GridDims, extent_w: u32, extent_h: u32) -> Self {
        Self {
            dims,
            extent_w,
            extent_h,
        }
    }

    /// Nominal tile size; `cols * w == extent_w` and `rows * h == extent_h`.
    pub fn tile_size(&self) -> (f64, f64) {
        (
            f64::from(self.extent_w) / f64::from(self.dims.cols),
            f64::from(self.extent_h) / f64::from(self.dims.rows),
        )
    }

    pub fn cell(&self, row: u32, col: u32) -> PixelRect {
        let (x, width) = axis_span(self.extent_w, self.dims.cols, col);
        let (y, height) = axis_span(self.extent_h, self.dims.rows, row);
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }
}

fn axis_span(extent: u32, count: u32, index: u32) -> (u32, u32) {
    let base = extent / count;
    let start = base * index;
    if index + 1 == count {
        (start, extent - start)
    } else {
        (start, base)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    Front,
    Back,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Tile {
    pub row: u32,
    pub col: u32,
    /// Cell in viewport pixels.
    pub rect: PixelRect,
    pub offset: f64,
    pub glitch: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TileFrame {
    pub row: u32,
    pub col: u32,
    pub rotation_deg: f64,
    pub face: Face,
}

/// Tiles for one tiled transition, with the snapshot pair their faces are cut from.
#[derive(Clone, Debug)]
pub struct TileGrid {
    pub viewport: Viewport,
    pub layout: GridLayout,
    pub flip_len: f64,
    tiles: Vec<Tile>,
    snapshots: Option<Arc<SnapshotPair>>,
}

impl TileGrid {
    /// Lay out tiles for `viewport`; offsets depend only on dims and `cfg.stagger`.
    pub fn build(viewport: Viewport, cfg: &TileConfig) -> Self {
        let dims = GridDims::for_viewport(
            viewport.width,
            viewport.height,
            cfg.tile_edge_for(viewport),
        );
        let layout = GridLayout::new(dims, viewport.width, viewport.height);
        let timings = tile_offsets(dims, &cfg.stagger);
        let mut tiles = Vec::with_capacity(dims.len());
        for row in 0..dims.rows {
            for col in 0..dims.cols {
                let t = timings[(row * dims.cols + col) as usize];
                tiles.push(Tile {
                    row,
                    col,
                    rect: layout.cell(row, col),
                    offset: t.offset,
                    glitch: t.glitch,
                });
            }
        }
        Self {
            viewport,
            layout,
            flip_len: cfg.flip_len,
            tiles,
            snapshots: None,
        }
    }

    pub fn with_snapshots(mut self, pair: Arc<SnapshotPair>) -> Self {
        self.snapshots = Some(pair);
        self
    }

    pub fn dims(&self) -> GridDims {
        self.layout.dims
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn snapshots(&self) -> Option<&Arc<SnapshotPair>> {
        self.snapshots.as_ref()
    }

    /// Flip state of one tile at zone progress `p`.
    pub fn tile_frame(&self, tile: &Tile, p: f64) -> TileFrame {
        let local = if p >= tile.offset + self.flip_len {
            1.0
        } else {
            clamp01((p - tile.offset) / self.flip_len)
        };
        TileFrame {
            row: tile.row,
            col: tile.col,
            rotation_deg: 180.0 * local,
            face: if local >= 0.5 { Face::Back } else { Face::Front },
        }
    }

    pub fn sample(&self, p: f64) -> Vec<TileFrame> {
        self.tiles.iter().map(|t| self.tile_frame(t, p)).collect()
    }

    pub fn is_complete(&self, p: f64) -> bool {
        self.tiles.iter().all(|t| p >= t.offset + self.flip_len)
    }

    /// Pixels for one side of a tile: front is the outgoing scene, back the incoming one.
    pub fn face_image(&self, tile: &Tile, face: Face) -> EngineResult<RgbaImage> {
        let pair = self
            .snapshots
            .as_ref()
            .ok_or_else(|| EngineError::capture("tile grid has no snapshots attached"))?;
        let snap = match face {
            Face::Front => &pair.outgoing,
            Face::Back => &pair.incoming,
        };
        Ok(crop_tile(snap, self.viewport, tile.rect))
    }
}

/// Cut `cell` (viewport pixels) out of `snap`, scaling when the snapshot was captured at a
/// different pixel density. Scaled edges use the same floor rule on both sides of a seam.
pub fn crop_tile(snap: &Snapshot, viewport: Viewport, cell: PixelRect) -> RgbaImage {
    let sx = |v: u32| (u64::from(v) * u64::from(snap.width()) / u64::from(viewport.width)) as u32;
    let sy = |v: u32| (u64::from(v) * u64::from(snap.height()) / u64::from(viewport.height)) as u32;
    let (x0, x1) = (sx(cell.x), sx(cell.right()));
    let (y0, y1) = (sy(cell.y), sy(cell.bottom()));
    image::imageops::crop_imm(
        snap.image.as_ref(),
        x0,
        y0,
        x1.saturating_sub(x0),
        y1.saturating_sub(y0),
    )
    .to_image()
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/grid.rs"]
mod tests;

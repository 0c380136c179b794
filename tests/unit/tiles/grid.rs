use super::*;
use crate::foundation::core::{ElementId, Millis};
use crate::snapshot::capture::{SnapshotCapturer, SolidFillCapturer};

fn vp(w: u32, h: u32) -> Viewport {
    Viewport::new(w, h).unwrap()
}

fn assert_exact_cover(layout: GridLayout) {
    let dims = layout.dims;
    for row in 0..dims.rows {
        let mut x = 0;
        for col in 0..dims.cols {
            let c = layout.cell(row, col);
            assert_eq!(c.x, x, "gap/overlap at row {row} col {col}");
            x = c.right();
        }
        assert_eq!(x, layout.extent_w);
    }
    for col in 0..dims.cols {
        let mut y = 0;
        for row in 0..dims.rows {
            let c = layout.cell(row, col);
            assert_eq!(c.y, y);
            y = c.bottom();
        }
        assert_eq!(y, layout.extent_h);
    }
}

#[test]
fn desktop_grid_covers_viewport_exactly() {
    let dims = GridDims::for_viewport(1920, 1080, 150);
    assert_eq!(dims, GridDims { cols: 13, rows: 7 });
    let layout = GridLayout::new(dims, 1920, 1080);
    let (tw, th) = layout.tile_size();
    assert!((f64::from(dims.cols) * tw - 1920.0).abs() < 1e-9);
    assert!((f64::from(dims.rows) * th - 1080.0).abs() < 1e-9);
    assert_exact_cover(layout);
}

#[test]
fn phone_grid_covers_viewport_exactly() {
    let dims = GridDims::for_viewport(375, 667, 100);
    assert_eq!(dims, GridDims { cols: 4, rows: 7 });
    let layout = GridLayout::new(dims, 375, 667);
    let (tw, th) = layout.tile_size();
    assert!((f64::from(dims.cols) * tw - 375.0).abs() < 1e-9);
    assert!((f64::from(dims.rows) * th - 667.0).abs() < 1e-9);
    assert_exact_cover(layout);
}

#[test]
fn remainder_lands_in_last_column_and_row() {
    let layout = GridLayout::new(GridDims::for_viewport(1920, 1080, 150), 1920, 1080);
    assert_eq!(layout.cell(0, 0).width, 147);
    assert_eq!(layout.cell(0, 11).width, 147);
    assert_eq!(layout.cell(0, 12).width, 1920 - 147 * 12);
    assert_eq!(layout.cell(6, 0).height, 1080 - 154 * 6);
}

#[test]
fn tiny_viewports_still_get_one_tile() {
    let dims = GridDims::for_viewport(30, 20, 150);
    assert_eq!(dims, GridDims { cols: 1, rows: 1 });
    assert_exact_cover(GridLayout::new(dims, 30, 20));
}

#[test]
fn narrow_and_coarse_viewports_use_small_tiles() {
    let cfg = TileConfig::default();
    assert_eq!(cfg.tile_edge_for(vp(1920, 1080)), 150);
    assert_eq!(cfg.tile_edge_for(vp(375, 667)), 100);
    assert_eq!(cfg.tile_edge_for(vp(1366, 1024).with_coarse_pointer(true)), 100);
}

#[test]
fn every_tile_finishes_by_zone_end() {
    let grid = TileGrid::build(vp(1920, 1080), &TileConfig::default());
    assert_eq!(grid.len(), 13 * 7);
    assert!(!grid.is_complete(0.5));
    assert!(grid.is_complete(1.0));
    for f in grid.sample(1.0) {
        assert_eq!(f.rotation_deg, 180.0);
        assert_eq!(f.face, Face::Back);
    }
    for f in grid.sample(0.0) {
        assert_eq!(f.face, Face::Front);
    }
}

#[test]
fn tile_frames_are_reproducible_when_scrubbing() {
    let grid = TileGrid::build(vp(1280, 720), &TileConfig::default());
    let a = grid.sample(0.42);
    let _ = grid.sample(0.9);
    let _ = grid.sample(0.1);
    assert_eq!(a, grid.sample(0.42));
}

#[test]
fn invalid_tile_configs_are_rejected() {
    let mut cfg = TileConfig::default();
    cfg.flip_len = 0.6;
    assert!(cfg.validate().is_err());
    let mut cfg = TileConfig::default();
    cfg.size_narrow = 0;
    assert!(cfg.validate().is_err());
    assert!(TileConfig::default().validate().is_ok());
}

#[test]
fn faces_are_cut_from_matching_snapshot() {
    let viewport = vp(300, 200);
    let cap = SolidFillCapturer { pixel_ratio: 2 };
    let out_id = ElementId::new("out");
    let in_id = ElementId::new("in");
    let pair = SnapshotPair {
        key: viewport.key(),
        outgoing: Snapshot::new(out_id.clone(), cap.capture(&out_id, viewport).unwrap()).unwrap(),
        incoming: Snapshot::new(in_id.clone(), cap.capture(&in_id, viewport).unwrap()).unwrap(),
        created_at: Millis(0),
    };
    let grid = TileGrid::build(viewport, &TileConfig::default()).with_snapshots(Arc::new(pair));
    let tile = grid.tiles()[0];
    let front = grid.face_image(&tile, Face::Front).unwrap();
    let back = grid.face_image(&tile, Face::Back).unwrap();
    assert_eq!(front.width(), tile.rect.width * 2);
    assert_eq!(front.height(), tile.rect.height * 2);
    assert_eq!(*front.get_pixel(0, 0), SolidFillCapturer::color_for(&out_id));
    assert_eq!(*back.get_pixel(0, 0), SolidFillCapturer::color_for(&in_id));
}

#[test]
fn faces_need_snapshots() {
    let grid = TileGrid::build(vp(300, 200), &TileConfig::default());
    let tile = grid.tiles()[0];
    assert!(grid.face_image(&tile, Face::Front).is_err());
}

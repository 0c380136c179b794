use super::*;

fn dims() -> GridDims {
    GridDims { cols: 13, rows: 7 }
}

#[test]
fn same_seed_same_sequence() {
    let p = StaggerParams::default();
    assert_eq!(tile_offsets(dims(), &p), tile_offsets(dims(), &p));
}

#[test]
fn different_seed_different_sequence() {
    let a = StaggerParams::default();
    let b = StaggerParams {
        seed: a.seed + 1,
        ..a
    };
    assert_ne!(tile_offsets(dims(), &a), tile_offsets(dims(), &b));
}

#[test]
fn glitch_share_is_fixed() {
    let p = StaggerParams::default();
    let out = tile_offsets(dims(), &p);
    let glitches = out.iter().filter(|t| t.glitch).count();
    assert_eq!(glitches, (91.0_f64 * 0.1).round() as usize);

    let none = StaggerParams {
        glitch_fraction: 0.0,
        ..p
    };
    assert!(tile_offsets(dims(), &none).iter().all(|t| !t.glitch));
}

#[test]
fn offsets_stay_inside_span() {
    let p = StaggerParams {
        glitch_fraction: 0.5,
        glitch_delta: 0.9,
        ..StaggerParams::default()
    };
    for t in tile_offsets(dims(), &p) {
        assert!(t.offset >= 0.0 && t.offset < p.span, "{t:?}");
    }
}

#[test]
fn scan_runs_top_to_bottom_without_noise() {
    let p = StaggerParams {
        jitter: 0.0,
        glitch_fraction: 0.0,
        ..StaggerParams::default()
    };
    let out = tile_offsets(dims(), &p);
    let at = |r: usize, c: usize| out[r * 13 + c].offset;
    assert_eq!(at(0, 0), 0.0);
    for r in 0..6 {
        assert!(at(r + 1, 0) > at(r, 12), "row {r} should finish leaning before the next row");
    }
    for c in 0..12 {
        assert!(at(3, c + 1) > at(3, c));
    }
}

#[test]
fn invalid_params_are_rejected() {
    let p = StaggerParams {
        span: 0.0,
        ..StaggerParams::default()
    };
    assert!(p.validate().is_err());
    let p = StaggerParams {
        glitch_fraction: 1.5,
        ..StaggerParams::default()
    };
    assert!(p.validate().is_err());
}

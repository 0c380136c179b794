use super::*;
use crate::host::StaticHost;

fn assert_rect_close(a: Rect, b: Rect) {
    for (x, y) in [(a.x0, b.x0), (a.y0, b.y0), (a.x1, b.x1), (a.y1, b.y1)] {
        assert!((x - y).abs() < 1e-9, "{a:?} != {b:?}");
    }
}

#[test]
fn flip_covers_target_exactly() {
    let source = Rect::new(100.0, 200.0, 300.0, 350.0);
    let target = Rect::new(0.0, 0.0, 1280.0, 720.0);
    let t = compute_flip(source, target);
    assert_rect_close(t.apply(source), target);
    assert_eq!(t.scale_x, 6.4);
    assert_eq!(t.scale_y, 4.8);
}

#[test]
fn affine_matches_apply_for_top_left_anchor() {
    let source = Rect::new(40.0, 60.0, 140.0, 110.0);
    let target = Rect::new(500.0, 10.0, 700.0, 210.0);
    let t = compute_flip(source, target);
    // Element-local corner (w, h) maps to the target's far corner relative to source origin.
    let far = t.to_affine() * kurbo::Point::new(source.width(), source.height());
    assert!((far.x + source.x0 - target.x1).abs() < 1e-9);
    assert!((far.y + source.y0 - target.y1).abs() < 1e-9);
}

#[test]
fn degenerate_geometry_falls_back_to_identity() {
    let ok = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(compute_flip(Rect::new(5.0, 5.0, 5.0, 9.0), ok).is_identity());
    assert!(compute_flip(ok, Rect::new(0.0, 0.0, 10.0, 0.0)).is_identity());
    assert!(compute_flip(ok, Rect::new(0.0, 0.0, f64::NAN, 3.0)).is_identity());
}

#[test]
fn morph_measures_once_and_interpolates() {
    let mut host = StaticHost::new()
        .with("thumb", Rect::new(100.0, 100.0, 200.0, 150.0))
        .with("stage", Rect::new(0.0, 0.0, 400.0, 200.0));
    let morph = FlipMorph::measure(
        &host,
        &ElementId::new("thumb"),
        &ElementId::new("stage"),
        0.2,
        0.6,
        MorphMode::ToTarget,
    );
    // Later geometry changes do not leak into the frozen morph.
    host.insert(ElementId::new("thumb"), Rect::new(0.0, 0.0, 1.0, 1.0));

    assert!(morph.transform_at(0.0).is_identity());
    assert!(morph.transform_at(0.2).is_identity());
    assert_eq!(morph.transform_at(0.6), morph.transform);
    assert_eq!(morph.transform_at(1.0), morph.transform);
    let mid = morph.transform_at(0.4);
    assert!((mid.scale_x - 2.5).abs() < 1e-9);
}

#[test]
fn origin_resets_only_once_transform_is_identity() {
    let host = StaticHost::new()
        .with("a", Rect::new(0.0, 0.0, 50.0, 50.0))
        .with("b", Rect::new(0.0, 0.0, 100.0, 100.0));
    let to = FlipMorph::measure(
        &host,
        &ElementId::new("a"),
        &ElementId::new("b"),
        0.2,
        0.6,
        MorphMode::ToTarget,
    );
    assert_eq!(to.origin_at(0.1), TransformOrigin::Center);
    assert_eq!(to.origin_at(0.2), TransformOrigin::TopLeft);
    assert_eq!(to.origin_at(0.599), TransformOrigin::TopLeft);
    assert_eq!(to.origin_at(0.6), TransformOrigin::TopLeft);
    assert_eq!(to.origin_at(1.0), TransformOrigin::TopLeft);

    let from = FlipMorph {
        mode: MorphMode::FromTarget,
        ..to.clone()
    };
    assert_eq!(from.origin_at(0.0), TransformOrigin::TopLeft);
    assert_eq!(from.origin_at(0.6), TransformOrigin::Center);
    assert!(from.transform_at(0.6).is_identity());
}

#[test]
fn to_target_keeps_covering_target_after_morph_ends() {
    let source = Rect::new(100.0, 100.0, 150.0, 150.0);
    let target = Rect::new(0.0, 0.0, 200.0, 200.0);
    let host = StaticHost::new().with("a", source).with("b", target);
    let morph = FlipMorph::measure(
        &host,
        &ElementId::new("a"),
        &ElementId::new("b"),
        0.2,
        0.6,
        MorphMode::ToTarget,
    );
    for i in 0..=100 {
        let p = f64::from(i) / 100.0;
        let t = morph.transform_at(p);
        if !t.is_identity() {
            assert_eq!(morph.origin_at(p), TransformOrigin::TopLeft, "p={p}");
        }
        if p >= morph.end {
            assert_rect_close(t.apply(source), target);
        }
    }
}

#[test]
fn identity_morph_releases_origin_at_end() {
    let host = StaticHost::new().with("a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let morph = FlipMorph::measure(
        &host,
        &ElementId::new("a"),
        &ElementId::new("gone"),
        0.2,
        0.6,
        MorphMode::ToTarget,
    );
    assert_eq!(morph.origin_at(0.4), TransformOrigin::TopLeft);
    assert_eq!(morph.origin_at(0.6), TransformOrigin::Center);
}

#[test]
fn missing_elements_measure_as_identity() {
    let host = StaticHost::new().with("a", Rect::new(0.0, 0.0, 50.0, 50.0));
    let m = FlipMorph::measure(
        &host,
        &ElementId::new("a"),
        &ElementId::new("missing"),
        0.0,
        1.0,
        MorphMode::ToTarget,
    );
    assert!(m.transform.is_identity());
}

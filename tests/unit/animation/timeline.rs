use super::*;
use crate::foundation::core::Rect;
use crate::host::StaticHost;

fn host() -> StaticHost {
    StaticHost::new()
        .with("grid", Rect::new(0.0, 0.0, 1280.0, 720.0))
        .with("poster", Rect::new(100.0, 100.0, 300.0, 400.0))
        .with("stage", Rect::new(0.0, 0.0, 1280.0, 720.0))
        .with("caption", Rect::new(40.0, 600.0, 600.0, 680.0))
}

fn el(id: &str) -> ElementId {
    ElementId::new(id)
}

#[test]
fn total_duration_is_exactly_one_when_authoring_stops_early() {
    let host = host();
    let phases = PhaseTable::default();
    let mut b = TimelineBuilder::new(&host, &phases, TierSeconds::default(), 10.0, 1);
    b.tween(
        &el("caption"),
        Property::Opacity,
        0.0,
        1.0,
        0.1,
        DurationTier::Standard,
        Ease::OutCubic,
    );
    let tl = b.build();
    assert_eq!(tl.total_duration(), 1.0);
    assert!(tl.content_end() < 1.0);
    assert!(tl.tweens().all(|t| t.end() <= 1.0));
    // Padded, not stretched.
    assert_eq!(tl.tweens().next().unwrap().position, 0.1);
}

#[test]
fn overrunning_authoring_is_rescaled_into_the_scene() {
    let host = host();
    let phases = PhaseTable::default();
    let mut b = TimelineBuilder::new(&host, &phases, TierSeconds::default(), 1.0, 1);
    b.tween_span(
        &el("caption"),
        Property::TranslateY,
        40.0,
        0.0,
        0.5,
        1.0,
        Ease::Linear,
    );
    let tl = b.build();
    assert_eq!(tl.total_duration(), 1.0);
    assert!((tl.content_end() - 1.0).abs() < 1e-12);
    let tw = tl.tweens().next().unwrap();
    assert!((tw.position - 1.0 / 3.0).abs() < 1e-12);
    assert!(tw.end() <= 1.0 + 1e-12);
    let settled = tl.value(&el("caption"), Property::TranslateY, 1.0).unwrap();
    assert!(settled.abs() < 1e-9);
}

#[test]
fn crossfade_pair_sums_to_one_in_both_directions() {
    let host = host();
    let phases = PhaseTable::default();
    let mut b = TimelineBuilder::new(&host, &phases, TierSeconds::default(), 2.0, 1);
    b.crossfade(&el("grid"), &el("stage"), 0.3, DurationTier::Cinematic);
    let tl = b.build();
    let pair = &tl.crossfades()[0];
    assert_eq!(pair.outgoing, el("grid"));

    let steps = 500;
    let check = |p: f64| {
        let a = tl.value(&el("grid"), Property::Opacity, p).unwrap();
        let b = tl.value(&el("stage"), Property::Opacity, p).unwrap();
        assert!((a + b - 1.0).abs() < 1e-12, "p={p} a={a} b={b}");
    };
    for i in 0..=steps {
        check(f64::from(i) / f64::from(steps));
    }
    for i in (0..=steps).rev() {
        check(f64::from(i) / f64::from(steps));
    }
    assert!(
        tl.tweens()
            .filter(|t| t.property == Property::Opacity)
            .all(|t| t.ease.is_linear())
    );
}

#[test]
fn crossfade_with_missing_side_adds_nothing() {
    let host = host();
    let phases = PhaseTable::default();
    let mut b = TimelineBuilder::new(&host, &phases, TierSeconds::default(), 2.0, 1);
    b.crossfade(&el("grid"), &el("ghost"), 0.3, DurationTier::Standard);
    let tl = b.build();
    assert!(tl.is_empty());
    assert!(tl.crossfades().is_empty());
    assert_eq!(tl.skipped(), &[el("ghost")]);
}

#[test]
fn missing_targets_are_skipped_not_fatal() {
    let host = host();
    let phases = PhaseTable::default();
    let mut b = TimelineBuilder::new(&host, &phases, TierSeconds::default(), 4.0, 2);
    b.tween(
        &el("sparkle"),
        Property::Opacity,
        0.0,
        1.0,
        0.0,
        DurationTier::Micro,
        Ease::Linear,
    )
    .tween(
        &el("caption"),
        Property::Opacity,
        0.0,
        1.0,
        0.0,
        DurationTier::Micro,
        Ease::Linear,
    );
    let tl = b.build();
    assert_eq!(tl.len(), 1);
    assert_eq!(tl.skipped(), &[el("sparkle")]);
}

#[test]
fn positions_follow_cycle_and_phase_fractions() {
    let host = host();
    let phases = PhaseTable::default();
    let b = TimelineBuilder::new(&host, &phases, TierSeconds::default(), 8.0, 4);
    assert_eq!(b.cycle_len(), 0.25);
    assert_eq!(b.at(0, 0.0), 0.0);
    assert_eq!(b.at(2, 0.5), 0.625);
    assert_eq!(b.at(9, 0.0), 0.75);
    assert!((b.at_phase(1, Phase::Active) - (0.25 + 0.3 * 0.25)).abs() < 1e-12);
    assert!((b.tier_len(DurationTier::Cinematic) - 0.55 / 8.0).abs() < 1e-12);
}

#[test]
fn sampling_is_a_pure_function_of_progress() {
    let host = host();
    let phases = PhaseTable::default();
    let mut b = TimelineBuilder::new(&host, &phases, TierSeconds::default(), 4.0, 4);
    for cycle in 0..4 {
        let at = b.at_phase(cycle, Phase::MorphingIn);
        b.tween(
            &el("caption"),
            Property::TranslateX,
            -20.0,
            0.0,
            at,
            DurationTier::Standard,
            Ease::InOutCubic,
        );
    }
    let tl = b.build();
    let forward: Vec<_> = (0..=200).map(|i| tl.sample(f64::from(i) / 200.0)).collect();
    let mut backward: Vec<_> = (0..=200)
        .rev()
        .map(|i| tl.sample(f64::from(i) / 200.0))
        .collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[test]
fn latest_started_tween_wins_and_first_from_holds_before() {
    let host = host();
    let phases = PhaseTable::default();
    let mut b = TimelineBuilder::new(&host, &phases, TierSeconds::default(), 1.0, 1);
    b.tween_span(&el("caption"), Property::Opacity, 0.0, 1.0, 0.2, 0.1, Ease::Linear)
        .tween_span(&el("caption"), Property::Opacity, 1.0, 0.25, 0.6, 0.2, Ease::Linear);
    let tl = b.build();
    let v = |p| tl.value(&el("caption"), Property::Opacity, p).unwrap();
    assert_eq!(v(0.0), 0.0);
    assert!((v(0.25) - 0.5).abs() < 1e-9);
    assert_eq!(v(0.5), 1.0);
    assert_eq!(v(0.9), 0.25);
    assert_eq!(tl.value(&el("nope"), Property::Opacity, 0.5), None);
}

#[test]
fn flip_to_target_stays_pinned_while_scaled() {
    let host = host();
    let phases = PhaseTable::default();
    let mut b = TimelineBuilder::new(&host, &phases, TierSeconds::default(), 1.1, 1);
    b.flip(
        &el("poster"),
        &el("stage"),
        0.2,
        DurationTier::Cinematic,
        MorphMode::ToTarget,
        Ease::InOutCubic,
    );
    let tl = b.build();
    let morph = &tl.morphs()[0];
    assert!((morph.end - 0.7).abs() < 1e-12);

    let poster = el("poster");
    assert_eq!(tl.origin_at(&poster, 0.1), TransformOrigin::Center);
    assert_eq!(tl.origin_at(&poster, 0.2), TransformOrigin::TopLeft);
    assert_eq!(tl.origin_at(&poster, 0.69), TransformOrigin::TopLeft);
    assert_eq!(tl.origin_at(&poster, morph.end), TransformOrigin::TopLeft);
    assert_eq!(tl.origin_at(&poster, 1.0), TransformOrigin::TopLeft);
    for i in 0..=100 {
        let p = f64::from(i) / 100.0;
        let scaled = tl.value(&poster, Property::ScaleX, p) != Some(1.0)
            || tl.value(&poster, Property::ScaleY, p) != Some(1.0);
        if scaled {
            assert_ne!(tl.origin_at(&poster, p), TransformOrigin::Center, "p={p}");
        }
    }

    assert_eq!(tl.value(&poster, Property::ScaleX, 0.0), Some(1.0));
    assert_eq!(tl.value(&poster, Property::ScaleX, 1.0), Some(6.4));
    assert_eq!(tl.value(&poster, Property::TranslateX, 1.0), Some(-100.0));
    assert_eq!(tl.value(&poster, Property::ScaleY, 1.0), Some(2.4));
}

#[test]
fn flip_from_target_starts_pinned() {
    let host = host();
    let phases = PhaseTable::default();
    let mut b = TimelineBuilder::new(&host, &phases, TierSeconds::default(), 1.1, 1);
    b.flip(
        &el("poster"),
        &el("stage"),
        0.2,
        DurationTier::Cinematic,
        MorphMode::FromTarget,
        Ease::Linear,
    );
    let tl = b.build();
    let poster = el("poster");
    assert_eq!(tl.origin_at(&poster, 0.0), TransformOrigin::TopLeft);
    assert_eq!(tl.value(&poster, Property::ScaleX, 0.0), Some(6.4));
    assert_eq!(tl.value(&poster, Property::ScaleX, 1.0), Some(1.0));
    assert_eq!(tl.origin_at(&poster, 1.0), TransformOrigin::Center);
}

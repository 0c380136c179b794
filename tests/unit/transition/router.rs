use super::*;

fn spec(from: usize, to: usize, kind: &str, params: serde_json::Value) -> TransitionSpec {
    TransitionSpec {
        from,
        to,
        kind: kind.to_string(),
        params,
    }
}

#[test]
fn unmapped_boundary_is_instant_swap() {
    let router = TransitionRouter::new();
    assert_eq!(router.resolve(Boundary::new(3, 4)), &Strategy::InstantSwap);
}

#[test]
fn exact_then_reverse_lookup() {
    let router = TransitionRouter::from_specs(&[
        spec(0, 1, "crossfade", serde_json::json!({ "zoom": 0.1 })),
        spec(1, 2, "tile_flip", serde_json::Value::Null),
        spec(2, 1, "instant", serde_json::Value::Null),
    ])
    .unwrap();
    assert_eq!(
        router.resolve(Boundary::new(0, 1)),
        &Strategy::Crossfade { zoom: 0.1 }
    );
    assert_eq!(
        router.resolve(Boundary::new(1, 0)),
        &Strategy::Crossfade { zoom: 0.1 }
    );
    assert!(matches!(
        router.resolve(Boundary::new(1, 2)),
        Strategy::TileFlip(_)
    ));
    assert_eq!(router.resolve(Boundary::new(2, 1)), &Strategy::InstantSwap);
    assert_eq!(router.snapshot_edges(), vec![1]);
}

#[test]
fn duplicate_definitions_are_rejected() {
    let err = TransitionRouter::from_specs(&[
        spec(0, 1, "crossfade", serde_json::Value::Null),
        spec(0, 1, "tile_flip", serde_json::Value::Null),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn parse_kinds_and_params() {
    assert_eq!(
        parse_strategy(" Crossfade ", &serde_json::Value::Null).unwrap(),
        Strategy::Crossfade { zoom: 0.08 }
    );
    assert_eq!(
        parse_strategy(
            "tile_flip",
            &serde_json::json!({ "seed": 42, "glitch_fraction": 0.2 })
        )
        .unwrap(),
        Strategy::TileFlip(TileFlipParams {
            seed: Some(42),
            glitch_fraction: Some(0.2),
        })
    );
    assert!(parse_strategy("", &serde_json::Value::Null).is_err());
    assert!(parse_strategy("melt", &serde_json::Value::Null).is_err());
    assert!(parse_strategy("crossfade", &serde_json::json!([1])).is_err());
    assert!(parse_strategy("crossfade", &serde_json::json!({ "zoom": 4.0 })).is_err());
    assert!(parse_strategy("tiles", &serde_json::json!({ "glitch_fraction": 2.0 })).is_err());
}

#[test]
fn self_transitions_are_rejected() {
    assert!(parse_transition(&spec(2, 2, "crossfade", serde_json::Value::Null)).is_err());
}

#[test]
fn boundary_edges_are_direction_free() {
    let b = Boundary::new(4, 3);
    assert_eq!(b.edge(), 3);
    assert_eq!(b.reversed(), Boundary::new(3, 4));
    assert_eq!(b.to_string(), "4->3");
}

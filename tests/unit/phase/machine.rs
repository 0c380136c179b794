use super::*;

fn samples() -> impl DoubleEndedIterator<Item = f64> {
    (0..=1000).map(|i| f64::from(i) / 1000.0)
}

#[test]
fn derive_is_pure_for_every_sample() {
    let table = PhaseTable::default();
    for p in samples() {
        assert_eq!(table.derive(p, 4), table.derive(p, 4));
    }
}

#[test]
fn scrubbing_forward_then_backward_reproduces_state() {
    let table = PhaseTable::default();
    let forward: Vec<_> = samples().map(|p| table.derive(p, 4)).collect();
    let mut backward: Vec<_> = samples().rev().map(|p| table.derive(p, 4)).collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[test]
fn active_index_floors_and_clamps() {
    let table = PhaseTable::default();
    assert_eq!(table.derive(0.0, 4).active_index, 0);
    assert_eq!(table.derive(0.24, 4).active_index, 0);
    assert_eq!(table.derive(0.25, 4).active_index, 1);
    assert_eq!(table.derive(0.99, 4).active_index, 3);
    assert_eq!(table.derive(1.0, 4).active_index, 3);
    assert_eq!(table.derive(1.7, 4).active_index, 3);
    assert_eq!(table.derive(-0.3, 4).active_index, 0);
}

#[test]
fn threshold_equality_resolves_to_upper_band() {
    let table = PhaseTable::default();
    assert_eq!(table.phase_at(0.1), Phase::MorphingIn);
    assert_eq!(table.phase_at(0.099_999), Phase::Resting);
    assert_eq!(table.phase_at(0.3), Phase::Active);
    assert_eq!(table.phase_at(0.8), Phase::MorphingOut);
}

#[test]
fn phase_repeats_per_cycle() {
    let table = PhaseTable::default();
    // 0.5 into the second of four cycles.
    let st = table.derive(0.25 + 0.125, 4);
    assert_eq!(st.active_index, 1);
    assert_eq!(st.phase, Phase::Active);
    // Start of a cycle is resting again.
    assert_eq!(table.derive(0.5, 4).phase, Phase::Resting);
    // End of the scene stays in the last band.
    assert_eq!(table.derive(1.0, 4).phase, Phase::MorphingOut);
}

#[test]
fn zero_items_is_one_cycle() {
    let table = PhaseTable::default();
    assert_eq!(table.derive(0.5, 0), table.derive(0.5, 1));
}

#[test]
fn invalid_tables_are_rejected() {
    assert!(PhaseTable::new(vec![]).is_err());
    assert!(
        PhaseTable::new(vec![PhaseThreshold {
            at: 0.2,
            phase: Phase::Active
        }])
        .is_err()
    );
    assert!(
        PhaseTable::new(vec![
            PhaseThreshold {
                at: 0.0,
                phase: Phase::Resting
            },
            PhaseThreshold {
                at: 0.0,
                phase: Phase::Active
            },
        ])
        .is_err()
    );
    assert!(
        PhaseTable::new(vec![
            PhaseThreshold {
                at: 0.0,
                phase: Phase::Resting
            },
            PhaseThreshold {
                at: 1.0,
                phase: Phase::Active
            },
        ])
        .is_err()
    );
}

#[test]
fn band_start_lookup() {
    let table = PhaseTable::default();
    assert_eq!(table.band_start(Phase::Active), Some(0.3));
}

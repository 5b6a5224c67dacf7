//! Property-Based Tests for LearnZone Core
//!
//! Uses `proptest` to check the simulator invariants under random command
//! sequences: heading range, position bookkeeping, XP rollover, and
//! deterministic proximity.

use proptest::prelude::*;

use learnzone_core::config::{MovementConfig, ProgressionConfig};
use learnzone_core::movement::{Direction, PlayerState};
use learnzone_core::progression::ProgressionState;
use learnzone_core::proximity::nearest_zone;
use learnzone_core::zone::ZoneRegistry;

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Forward),
        Just(Direction::Backward),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

// ---------------------------------------------------------------------------
// Property: heading always stays in [0, 360)
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn heading_stays_in_range(
        commands in prop::collection::vec(arb_direction(), 0..200),
        rotation in 0.1..360.0f64,
    ) {
        let config = MovementConfig { rotation_step_degrees: rotation, ..MovementConfig::default() };
        let mut player = PlayerState::origin();
        for dir in commands {
            player = player.step(dir, &config);
            prop_assert!(player.heading_degrees >= 0.0);
            prop_assert!(player.heading_degrees < 360.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: position is the sum of the per-step deltas
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn position_is_sum_of_deltas(commands in prop::collection::vec(arb_direction(), 0..100)) {
        let config = MovementConfig::default();
        let mut player = PlayerState::origin();
        let (mut x, mut z) = (0.0f64, 0.0f64);

        for dir in commands {
            let before = player;
            player = player.step(dir, &config);
            match dir {
                Direction::Forward | Direction::Backward => {
                    let sign = if dir == Direction::Forward { 1.0 } else { -1.0 };
                    let (dx, dz) = PlayerState::delta(before.heading_degrees, config.step_distance);
                    x += sign * dx;
                    z += sign * dz;
                    prop_assert!((player.heading_degrees - before.heading_degrees).abs() < 1e-9);
                }
                Direction::Left | Direction::Right => {
                    prop_assert!((player.x - before.x).abs() < 1e-9);
                    prop_assert!((player.z - before.z).abs() < 1e-9);
                }
            }
        }
        prop_assert!((player.x - x).abs() < 1e-6);
        prop_assert!((player.z - z).abs() < 1e-6);
    }
}

// ---------------------------------------------------------------------------
// Property: XP awards are additive and respect the invariant
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn award_split_is_additive(a in 0u32..5_000, b in 0u32..5_000) {
        let config = ProgressionConfig::default();
        let mut split = ProgressionState::new(&config);
        split.award(a);
        split.award(b);

        let mut whole = ProgressionState::new(&config);
        whole.award(a + b);

        prop_assert_eq!(split, whole);
        prop_assert!(whole.xp < whole.xp_to_next_level);
        prop_assert!(whole.level >= 1);
    }

    #[test]
    fn level_never_decreases(awards in prop::collection::vec(0u32..500, 0..50)) {
        let mut p = ProgressionState::default();
        let mut last = p.level;
        for xp in awards {
            p.award(xp);
            prop_assert!(p.level >= last);
            prop_assert!(p.xp < p.xp_to_next_level);
            last = p.level;
        }
    }
}

// ---------------------------------------------------------------------------
// Property: proximity is deterministic and respects the radius
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn proximity_is_deterministic(
        x in -600.0..600.0f64,
        z in -800.0..200.0f64,
        radius in 1.0..400.0f64,
    ) {
        let registry = ZoneRegistry::builtin();
        let player = PlayerState { x, z, heading_degrees: 0.0 };

        let first = nearest_zone(&player, &registry, radius).map(|h| h.zone.id().clone());
        let second = nearest_zone(&player, &registry, radius).map(|h| h.zone.id().clone());
        prop_assert_eq!(&first, &second);

        if let Some(hit) = nearest_zone(&player, &registry, radius) {
            prop_assert!(hit.distance < radius);
            for zone in registry.iter() {
                prop_assert!(zone.position().ground_distance(x, z) >= hit.distance);
            }
        }
    }
}

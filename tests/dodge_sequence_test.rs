//! Integration test: Boss Fight Dodge Sequence
//!
//! Drives a generated boss's full attack pattern through the dodge state
//! machine: telegraph scheduling, window expiry, input resolution, and the
//! attack lock on main combat while a telegraph is live.

use harvest::constants::{DODGE_ATTACK_SPACING_MS, DODGE_FIRST_ATTACK_DELAY_MS};
use harvest::dodge_logic::{DodgeEvent, DodgeMinigame, DodgePhase};
use harvest::enemy::generate_enemy_with;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn boss_minigame(level: u32, seed: u64) -> (DodgeMinigame, usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let boss = generate_enemy_with(1, level, &mut rng);
    assert!(boss.is_boss, "level {level} is not a boss level");
    let pattern = boss.attack_pattern.clone().expect("boss has a pattern");
    let len = pattern.len();
    (DodgeMinigame::for_enemy(&boss, 0).expect("boss minigame"), len)
}

// =========================================================================
// Perfect run: every attack dodged on time
// =========================================================================

#[test]
fn test_perfect_dodge_run_resolves_every_attack() {
    let (mut game, len) = boss_minigame(10, 42);
    let mut dodged = 0;

    for k in 0..len {
        let telegraph_at = DODGE_FIRST_ATTACK_DELAY_MS + k as u64 * DODGE_ATTACK_SPACING_MS;
        let events = game.update(telegraph_at);
        let direction = match events.first() {
            Some(DodgeEvent::AttackTelegraphed { direction, .. }) => *direction,
            other => panic!("expected telegraph at {telegraph_at}, got {other:?}"),
        };
        assert!(game.is_locking());

        let event = game.submit(direction, telegraph_at + 100);
        assert_eq!(event, Some(DodgeEvent::Dodged { index: k }));
        dodged += 1;
        assert!(!game.is_locking());
    }

    assert_eq!(dodged, len);
    assert_eq!(game.phase(), DodgePhase::Finished);
    assert!(game.update(1_000_000).is_empty());
}

// =========================================================================
// Passive run: every window expires into a hit
// =========================================================================

#[test]
fn test_afk_run_takes_every_hit_as_timeout() {
    let (mut game, len) = boss_minigame(30, 7);

    // Jump far past the whole schedule; each attack telegraphs, expires,
    // and the next telegraphs in turn.
    let mut hits = 0;
    let mut now = 0;
    while game.phase() != DodgePhase::Finished {
        now += 10_000;
        for event in game.update(now) {
            if let DodgeEvent::Hit { timed_out, .. } = event {
                assert!(timed_out);
                hits += 1;
            }
        }
    }
    assert_eq!(hits, len);
}

// =========================================================================
// Mixed run and outcome accounting
// =========================================================================

#[test]
fn test_every_attack_gets_exactly_one_outcome() {
    let (mut game, len) = boss_minigame(40, 99);
    let mut outcomes = vec![0u32; len];
    let mut now = 0;
    let mut flip = false;

    while game.phase() != DodgePhase::Finished {
        now += 500;
        for event in game.update(now) {
            match event {
                DodgeEvent::AttackTelegraphed { direction, .. } => {
                    // Alternate between dodging and fumbling the input.
                    flip = !flip;
                    if flip {
                        if let Some(DodgeEvent::Dodged { index }) =
                            game.submit(direction, now + 50)
                        {
                            outcomes[index] += 1;
                        }
                    }
                }
                DodgeEvent::Dodged { index } => outcomes[index] += 1,
                DodgeEvent::Hit { index, .. } => outcomes[index] += 1,
            }
        }
    }

    assert!(outcomes.iter().all(|&n| n == 1), "outcomes {outcomes:?}");
}

#[test]
fn test_stale_timer_cannot_double_resolve() {
    let (mut game, _) = boss_minigame(10, 1);
    game.update(DODGE_FIRST_ATTACK_DELAY_MS);
    let stale_generation = game.generation();
    let direction = game.current_attack().expect("telegraphing").direction;

    assert!(game
        .submit(direction, DODGE_FIRST_ATTACK_DELAY_MS + 10)
        .is_some());

    // The timer scheduled for the resolved attack fires late and must be
    // a no-op even if a new attack is telegraphing by then.
    game.update(DODGE_FIRST_ATTACK_DELAY_MS + DODGE_ATTACK_SPACING_MS);
    assert_eq!(game.resolve_timeout(stale_generation), None);
}

#[test]
fn test_hit_damage_matches_boss_contact_damage() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let boss = generate_enemy_with(1, 30, &mut rng);
    let mut game = DodgeMinigame::for_enemy(&boss, 0).expect("boss minigame");

    game.update(DODGE_FIRST_ATTACK_DELAY_MS);
    let events = game.update(DODGE_FIRST_ATTACK_DELAY_MS + 10_000);
    match events.first() {
        Some(DodgeEvent::Hit { damage, .. }) => assert_eq!(*damage, boss.damage),
        other => panic!("expected a hit, got {other:?}"),
    }
}

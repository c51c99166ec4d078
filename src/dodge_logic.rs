use crate::constants::*;
use crate::enemy::{BossAttack, DodgeDirection, Enemy};

/// Phase of the dodge mini-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DodgePhase {
    /// Waiting for the next attack's scheduled telegraph time.
    Idle,
    /// An attack is visible and its countdown is running.
    Telegraphing { deadline_ms: u64 },
    /// The pattern is exhausted; nothing more until a new boss spawns.
    Finished,
}

/// Events produced by the mini-game.
#[derive(Debug, Clone, PartialEq)]
pub enum DodgeEvent {
    AttackTelegraphed {
        index: usize,
        direction: DodgeDirection,
        window_ms: u64,
    },
    Dodged {
        index: usize,
    },
    /// Mismatched input or countdown expiry. Reports the attack's damage;
    /// no player resource is debited.
    Hit {
        index: usize,
        damage: u32,
        timed_out: bool,
    },
}

/// Per-boss dodge mini-game state machine.
///
/// Time is explicit: the embedding loop calls `update(now_ms)` to run
/// scheduling and timeouts, and `submit(direction, now_ms)` on player
/// input. Each telegraph carries a generation number so a stale external
/// timer callback can never resolve an attack twice.
#[derive(Debug, Clone)]
pub struct DodgeMinigame {
    pattern: Vec<BossAttack>,
    cursor: usize,
    phase: DodgePhase,
    spawn_ms: u64,
    generation: u64,
}

impl DodgeMinigame {
    pub fn new(pattern: Vec<BossAttack>, now_ms: u64) -> Self {
        let phase = if pattern.is_empty() {
            DodgePhase::Finished
        } else {
            DodgePhase::Idle
        };
        Self {
            pattern,
            cursor: 0,
            phase,
            spawn_ms: now_ms,
            generation: 0,
        }
    }

    /// Builds the mini-game for a freshly spawned enemy, if it is a boss
    /// with an attack pattern.
    pub fn for_enemy(enemy: &Enemy, now_ms: u64) -> Option<Self> {
        enemy
            .attack_pattern
            .as_ref()
            .map(|pattern| Self::new(pattern.clone(), now_ms))
    }

    /// Main-combat clicks are rejected while an attack is telegraphing.
    pub fn is_locking(&self) -> bool {
        matches!(self.phase, DodgePhase::Telegraphing { .. })
    }

    pub fn phase(&self) -> DodgePhase {
        self.phase
    }

    pub fn current_attack(&self) -> Option<&BossAttack> {
        match self.phase {
            DodgePhase::Telegraphing { .. } => self.pattern.get(self.cursor),
            _ => None,
        }
    }

    /// Generation of the currently telegraphed attack. An external timer
    /// scheduled at telegraph time should pass this back to
    /// `resolve_timeout` when it fires.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Scheduled telegraph time for attack k: spawn + 3000 + k * 5000 ms.
    fn scheduled_at(&self, index: usize) -> u64 {
        self.spawn_ms + DODGE_FIRST_ATTACK_DELAY_MS + index as u64 * DODGE_ATTACK_SPACING_MS
    }

    /// Runs scheduling and timeouts up to `now_ms`.
    pub fn update(&mut self, now_ms: u64) -> Vec<DodgeEvent> {
        let mut events = Vec::new();

        loop {
            match self.phase {
                DodgePhase::Finished => break,
                DodgePhase::Idle => {
                    if self.cursor >= self.pattern.len() {
                        self.phase = DodgePhase::Finished;
                        break;
                    }
                    if now_ms < self.scheduled_at(self.cursor) {
                        break;
                    }
                    let attack = &self.pattern[self.cursor];
                    self.generation += 1;
                    self.phase = DodgePhase::Telegraphing {
                        deadline_ms: now_ms + attack.dodge_window_ms,
                    };
                    events.push(DodgeEvent::AttackTelegraphed {
                        index: self.cursor,
                        direction: attack.direction,
                        window_ms: attack.dodge_window_ms,
                    });
                }
                DodgePhase::Telegraphing { deadline_ms } => {
                    if now_ms < deadline_ms {
                        break;
                    }
                    let generation = self.generation;
                    if let Some(event) = self.resolve_timeout(generation) {
                        events.push(event);
                    }
                }
            }
        }

        events
    }

    /// Resolves the current telegraph against a player input. Returns
    /// `None` when no attack is telegraphing. Input arriving after the
    /// deadline counts as a timeout miss.
    pub fn submit(&mut self, direction: DodgeDirection, now_ms: u64) -> Option<DodgeEvent> {
        let DodgePhase::Telegraphing { deadline_ms } = self.phase else {
            return None;
        };
        if now_ms >= deadline_ms {
            let generation = self.generation;
            return self.resolve_timeout(generation);
        }

        let attack = &self.pattern[self.cursor];
        let event = if direction == attack.direction {
            DodgeEvent::Dodged { index: self.cursor }
        } else {
            DodgeEvent::Hit {
                index: self.cursor,
                damage: attack.damage,
                timed_out: false,
            }
        };
        self.advance();
        Some(event)
    }

    /// Timeout path for an external timer. The generation check suppresses
    /// callbacks for attacks that were already resolved by input.
    pub fn resolve_timeout(&mut self, generation: u64) -> Option<DodgeEvent> {
        if !self.is_locking() || generation != self.generation {
            return None;
        }
        let attack = &self.pattern[self.cursor];
        let event = DodgeEvent::Hit {
            index: self.cursor,
            damage: attack.damage,
            timed_out: true,
        };
        self.advance();
        Some(event)
    }

    fn advance(&mut self) {
        self.cursor += 1;
        self.phase = if self.cursor >= self.pattern.len() {
            DodgePhase::Finished
        } else {
            DodgePhase::Idle
        };
    }
}

/// Classifies a touch swipe by displacement. Only primarily-downward
/// swipes count; horizontal displacement beyond 30 px picks a diagonal.
pub fn classify_swipe(dx: f64, dy: f64) -> Option<DodgeDirection> {
    if dy <= SWIPE_MIN_DOWN_PX || dy.abs() <= dx.abs() {
        return None;
    }
    if dx < -SWIPE_SIDE_THRESHOLD_PX {
        Some(DodgeDirection::DownLeft)
    } else if dx > SWIPE_SIDE_THRESHOLD_PX {
        Some(DodgeDirection::DownRight)
    } else {
        Some(DodgeDirection::Down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attack(direction: DodgeDirection, window_ms: u64) -> BossAttack {
        BossAttack {
            id: "t".to_string(),
            direction,
            damage: 5,
            dodge_window_ms: window_ms,
        }
    }

    fn machine(directions: &[DodgeDirection]) -> DodgeMinigame {
        let pattern = directions
            .iter()
            .map(|d| attack(*d, 1000))
            .collect::<Vec<_>>();
        DodgeMinigame::new(pattern, 0)
    }

    #[test]
    fn test_first_telegraph_at_three_seconds() {
        let mut m = machine(&[DodgeDirection::Down]);
        assert!(m.update(2999).is_empty());
        assert!(!m.is_locking());

        let events = m.update(3000);
        assert_eq!(
            events,
            vec![DodgeEvent::AttackTelegraphed {
                index: 0,
                direction: DodgeDirection::Down,
                window_ms: 1000,
            }]
        );
        assert!(m.is_locking());
    }

    #[test]
    fn test_attacks_space_out_by_five_seconds() {
        let mut m = machine(&[DodgeDirection::Down, DodgeDirection::DownLeft]);
        m.update(3000);
        m.submit(DodgeDirection::Down, 3100);

        // Second attack is scheduled at spawn + 3000 + 5000.
        assert!(m.update(7999).is_empty());
        let events = m.update(8000);
        assert!(matches!(
            events[0],
            DodgeEvent::AttackTelegraphed { index: 1, .. }
        ));
    }

    #[test]
    fn test_correct_direction_dodges() {
        let mut m = machine(&[DodgeDirection::DownLeft]);
        m.update(3000);
        let event = m.submit(DodgeDirection::DownLeft, 3500);
        assert_eq!(event, Some(DodgeEvent::Dodged { index: 0 }));
        assert_eq!(m.phase(), DodgePhase::Finished);
    }

    #[test]
    fn test_wrong_direction_is_a_hit() {
        let mut m = machine(&[DodgeDirection::DownLeft]);
        m.update(3000);
        let event = m.submit(DodgeDirection::DownRight, 3500);
        assert_eq!(
            event,
            Some(DodgeEvent::Hit {
                index: 0,
                damage: 5,
                timed_out: false,
            })
        );
    }

    #[test]
    fn test_timeout_is_a_hit() {
        let mut m = machine(&[DodgeDirection::Down]);
        m.update(3000);
        let events = m.update(4000); // 1000 ms window expired
        assert_eq!(
            events,
            vec![DodgeEvent::Hit {
                index: 0,
                damage: 5,
                timed_out: true,
            }]
        );
        assert!(!m.is_locking());
    }

    #[test]
    fn test_exactly_one_outcome_per_attack() {
        // Input first: the pending timeout must be suppressed.
        let mut m = machine(&[DodgeDirection::Down, DodgeDirection::Down]);
        m.update(3000);
        let generation = m.generation();
        assert!(m.submit(DodgeDirection::Down, 3100).is_some());
        assert_eq!(m.resolve_timeout(generation), None);

        // Timeout first: late input resolves nothing extra.
        m.update(8000);
        let events = m.update(9500);
        assert_eq!(events.len(), 1);
        assert!(m.submit(DodgeDirection::Down, 9600).is_none());
    }

    #[test]
    fn test_input_after_deadline_counts_as_timeout() {
        let mut m = machine(&[DodgeDirection::Down]);
        m.update(3000);
        let event = m.submit(DodgeDirection::Down, 4001);
        assert_eq!(
            event,
            Some(DodgeEvent::Hit {
                index: 0,
                damage: 5,
                timed_out: true,
            })
        );
    }

    #[test]
    fn test_sequence_exhausts_silently() {
        let mut m = machine(&[DodgeDirection::Down]);
        m.update(3000);
        m.submit(DodgeDirection::Down, 3100);
        assert_eq!(m.phase(), DodgePhase::Finished);
        assert!(m.update(100_000).is_empty());
        assert!(m.submit(DodgeDirection::Down, 100_000).is_none());
    }

    #[test]
    fn test_late_telegraph_still_gets_full_window() {
        let mut m = machine(&[DodgeDirection::Down, DodgeDirection::Down]);
        // A lag spike jumps past the scheduled telegraph time; the window
        // starts when the telegraph actually fires.
        let events = m.update(9000);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            DodgeEvent::AttackTelegraphed { index: 0, .. }
        ));

        // Window expires 1000 ms after the late telegraph; the second
        // attack's schedule (8000 ms) has already passed, so it telegraphs
        // in the same update.
        let events = m.update(10_000);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], DodgeEvent::Hit { index: 0, .. }));
        assert!(matches!(
            events[1],
            DodgeEvent::AttackTelegraphed { index: 1, .. }
        ));
    }

    #[test]
    fn test_swipe_classification() {
        assert_eq!(classify_swipe(0.0, 80.0), Some(DodgeDirection::Down));
        assert_eq!(classify_swipe(-45.0, 80.0), Some(DodgeDirection::DownLeft));
        assert_eq!(classify_swipe(45.0, 80.0), Some(DodgeDirection::DownRight));
        // Within the side threshold stays straight down
        assert_eq!(classify_swipe(29.0, 80.0), Some(DodgeDirection::Down));
        assert_eq!(classify_swipe(-29.0, 80.0), Some(DodgeDirection::Down));
        // Too short or not primarily downward
        assert_eq!(classify_swipe(0.0, 40.0), None);
        assert_eq!(classify_swipe(90.0, 80.0), None);
        assert_eq!(classify_swipe(0.0, -80.0), None);
    }
}

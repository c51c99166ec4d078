use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

use crate::constants::{RAID_BASE_HEALTH, RAID_DURATION_SECONDS, RAID_HEALTH_GROWTH};

pub const RAID_BOSS_NAMES: [&str; 6] = [
    "The Pumpkin King",
    "Karen Supreme",
    "Mega Snus Monster",
    "Traffic Demon Lord",
    "Nightmare Bed",
    "HR Final Boss",
];

/// The shared raid boss row. At most one active boss at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaidBoss {
    pub id: String,
    pub name: String,
    pub max_health: u64,
    pub current_health: u64,
    pub stage_level: u32,
    pub created_at: i64,
    pub expires_at: i64,
    pub is_active: bool,
    pub defeated_at: Option<i64>,
}

impl RaidBoss {
    fn is_attackable(&self, now: i64) -> bool {
        self.is_active && now < self.expires_at
    }
}

/// Cumulative damage one player has dealt to one raid boss. Unique per
/// (raid boss, player); only ever increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidContribution {
    pub raid_boss_id: String,
    pub user_id: String,
    pub damage_dealt: u64,
}

/// Outcome of one raid attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaidAttackResult {
    pub remaining_health: u64,
    pub defeated: bool,
}

/// Push notifications for observers. Transport-agnostic; the `web`
/// feature bridges these onto a WebSocket broadcast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RaidEvent {
    BossSpawned {
        boss: RaidBoss,
    },
    BossDamaged {
        boss_id: String,
        user_id: String,
        damage: u64,
        remaining_health: u64,
    },
    BossDefeated {
        boss_id: String,
        defeated_at: i64,
    },
}

pub type RaidSubscriber = Box<dyn Fn(&RaidEvent) + Send + Sync>;

#[derive(Default)]
struct RaidState {
    boss: Option<RaidBoss>,
    // Insertion order doubles as the stable tie-break for rankings.
    contributions: Vec<RaidContribution>,
}

/// Shared raid boss aggregator.
///
/// The one multi-actor component: many players attack the same boss
/// concurrently. Health decrement and contribution upsert run under a
/// single lock, so no attack can be lost to a read-then-write race and
/// defeat is marked exactly once. Subscribers are notified after the lock
/// is released.
pub struct RaidService {
    state: Mutex<RaidState>,
    subscribers: Mutex<Vec<RaidSubscriber>>,
}

impl RaidService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RaidState::default()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Registers an observer for boss/contribution changes.
    pub fn subscribe(&self, subscriber: RaidSubscriber) {
        self.subscribers.lock().expect("raid subscribers poisoned").push(subscriber);
    }

    fn notify(&self, events: &[RaidEvent]) {
        let subscribers = self.subscribers.lock().expect("raid subscribers poisoned");
        for event in events {
            for subscriber in subscribers.iter() {
                subscriber(event);
            }
        }
    }

    /// Spawn trigger (externally invoked, e.g. on a schedule). Idempotent:
    /// returns the existing boss unchanged when one is still active.
    /// Health scales with the top player's stage.
    pub fn spawn_boss(&self, top_stage: u32, now: i64) -> RaidBoss {
        self.spawn_boss_with(top_stage, now, &mut rand::thread_rng())
    }

    pub fn spawn_boss_with(&self, top_stage: u32, now: i64, rng: &mut impl Rng) -> RaidBoss {
        let mut events = Vec::new();
        let boss = {
            let mut state = self.state.lock().expect("raid state poisoned");
            if let Some(existing) = state.boss.as_ref().filter(|b| b.is_attackable(now)) {
                log::debug!("raid boss already active: {}", existing.name);
                return existing.clone();
            }

            let stage = top_stage.max(1);
            let max_health =
                (RAID_BASE_HEALTH * RAID_HEALTH_GROWTH.powi(stage as i32 - 1)).floor() as u64;
            let boss = RaidBoss {
                id: Uuid::new_v4().to_string(),
                name: RAID_BOSS_NAMES[rng.gen_range(0..RAID_BOSS_NAMES.len())].to_string(),
                max_health,
                current_health: max_health,
                stage_level: stage,
                created_at: now,
                expires_at: now + RAID_DURATION_SECONDS,
                is_active: true,
                defeated_at: None,
            };
            log::info!("raid boss spawned: {} ({} hp)", boss.name, boss.max_health);
            state.boss = Some(boss.clone());
            state.contributions.clear();
            events.push(RaidEvent::BossSpawned { boss: boss.clone() });
            boss
        };
        self.notify(&events);
        boss
    }

    /// The active boss, if any and not expired.
    pub fn active_boss(&self, now: i64) -> Option<RaidBoss> {
        let state = self.state.lock().expect("raid state poisoned");
        state.boss.as_ref().filter(|b| b.is_attackable(now)).cloned()
    }

    /// One attack from one player. Returns `None` (a no-op) when no boss
    /// is attackable; the UI is expected to refresh and hide the surface.
    pub fn attack(&self, user_id: &str, damage: u64, now: i64) -> Option<RaidAttackResult> {
        let mut events = Vec::new();
        let result = {
            let mut state = self.state.lock().expect("raid state poisoned");
            let boss = state.boss.as_mut().filter(|b| b.is_attackable(now))?;
            let boss_id = boss.id.clone();

            boss.current_health = boss.current_health.saturating_sub(damage);
            let remaining_health = boss.current_health;
            let defeated = remaining_health == 0;
            if defeated {
                boss.is_active = false;
                boss.defeated_at = Some(now);
                log::info!("raid boss defeated: {}", boss.name);
            }

            match state
                .contributions
                .iter_mut()
                .find(|c| c.raid_boss_id == boss_id && c.user_id == user_id)
            {
                Some(contribution) => contribution.damage_dealt += damage,
                None => state.contributions.push(RaidContribution {
                    raid_boss_id: boss_id.clone(),
                    user_id: user_id.to_string(),
                    damage_dealt: damage,
                }),
            }

            events.push(RaidEvent::BossDamaged {
                boss_id: boss_id.clone(),
                user_id: user_id.to_string(),
                damage,
                remaining_health,
            });
            if defeated {
                events.push(RaidEvent::BossDefeated {
                    boss_id,
                    defeated_at: now,
                });
            }

            Some(RaidAttackResult {
                remaining_health,
                defeated,
            })
        };
        self.notify(&events);
        result
    }

    /// This player's cumulative contribution to the current boss.
    pub fn contribution(&self, user_id: &str) -> Option<RaidContribution> {
        let state = self.state.lock().expect("raid state poisoned");
        state
            .contributions
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned()
    }

    /// Contributors ranked by damage descending; ties keep insertion order.
    pub fn top_contributors(&self, limit: usize) -> Vec<RaidContribution> {
        let state = self.state.lock().expect("raid state poisoned");
        let mut ranked = state.contributions.clone();
        ranked.sort_by(|a, b| b.damage_dealt.cmp(&a.damage_dealt));
        ranked.truncate(limit);
        ranked
    }
}

impl Default for RaidService {
    fn default() -> Self {
        Self::new()
    }
}

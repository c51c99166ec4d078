use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// The three dodge directions a boss attack can telegraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DodgeDirection {
    Down,
    DownLeft,
    DownRight,
}

pub const DODGE_DIRECTIONS: [DodgeDirection; 3] = [
    DodgeDirection::Down,
    DodgeDirection::DownLeft,
    DodgeDirection::DownRight,
];

/// One telegraphed attack in a boss pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossAttack {
    pub id: String,
    pub direction: DodgeDirection,
    pub damage: u32,
    pub dodge_window_ms: u64,
}

/// Enemy archetype: flavor name plus health/currency scaling.
#[derive(Debug, Clone, Copy)]
pub struct EnemyArchetype {
    pub name: &'static str,
    pub health_multiplier: f64,
    pub currency_multiplier: f64,
}

pub const ENEMY_ARCHETYPES: [EnemyArchetype; 3] = [
    EnemyArchetype {
        name: "Pumpkin Minion",
        health_multiplier: 1.0,
        currency_multiplier: 1.0,
    },
    EnemyArchetype {
        name: "Scarecrow",
        health_multiplier: 1.5,
        currency_multiplier: 1.2,
    },
    EnemyArchetype {
        name: "Autumn Spirit",
        health_multiplier: 2.0,
        currency_multiplier: 1.5,
    },
];

/// An ephemeral enemy. Regenerated on every defeat or stage entry; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: String,
    pub name: String,
    pub health: f64,
    pub max_health: f64,
    pub damage: u32,
    pub currency: u64,
    pub is_boss: bool,
    pub attack_pattern: Option<Vec<BossAttack>>,
}

impl Enemy {
    pub fn take_damage(&mut self, damage: f64) {
        self.health = (self.health - damage).max(0.0);
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Whether the enemy at this level is a boss.
pub fn is_boss_level(level: u32) -> bool {
    level % BOSS_LEVEL_INTERVAL == 0
}

/// Number of attacks in a boss pattern at this level: 3 plus one per 20
/// levels, capped at 7.
pub fn attack_pattern_len(level: u32) -> usize {
    (ATTACK_PATTERN_BASE_LEN + (level / ATTACK_PATTERN_LEVELS_PER_EXTRA) as usize)
        .min(ATTACK_PATTERN_MAX_LEN)
}

/// Dodge window at this level: starts at 1500 ms, shrinks 10 ms per level,
/// floors at 800 ms.
pub fn dodge_window_ms(level: u32) -> u64 {
    DODGE_WINDOW_BASE_MS
        .saturating_sub(u64::from(level) * DODGE_WINDOW_PER_LEVEL_MS)
        .max(DODGE_WINDOW_FLOOR_MS)
}

/// Generates the enemy for (stage, level) with ambient randomness.
pub fn generate_enemy(stage: u32, level: u32) -> Enemy {
    generate_enemy_with(stage, level, &mut rand::thread_rng())
}

/// Generates the enemy for (stage, level). Deterministic for a fixed RNG.
pub fn generate_enemy_with(stage: u32, level: u32, rng: &mut impl Rng) -> Enemy {
    let is_boss = is_boss_level(level);
    let archetype = ENEMY_ARCHETYPES[rng.gen_range(0..ENEMY_ARCHETYPES.len())];

    let base_health = ENEMY_BASE_HEALTH * ENEMY_HEALTH_GROWTH.powi(level as i32);
    let health = if is_boss {
        base_health * BOSS_HEALTH_MULTIPLIER * archetype.health_multiplier
    } else {
        base_health * archetype.health_multiplier
    };

    let currency = if is_boss {
        (f64::from(level) * BOSS_CURRENCY_MULTIPLIER * archetype.currency_multiplier).floor()
    } else {
        (f64::from(level) * archetype.currency_multiplier).floor()
    } as u64;

    let damage = (f64::from(level) * ENEMY_DAMAGE_PER_LEVEL).floor() as u32;

    let name = if is_boss {
        format!("Boss {}", archetype.name)
    } else {
        archetype.name.to_string()
    };

    Enemy {
        id: format!("{stage}-{level}"),
        name,
        health,
        max_health: health,
        damage,
        currency,
        is_boss,
        attack_pattern: is_boss.then(|| generate_attack_pattern(level, damage, rng)),
    }
}

fn generate_attack_pattern(level: u32, damage: u32, rng: &mut impl Rng) -> Vec<BossAttack> {
    let window = dodge_window_ms(level);
    (0..attack_pattern_len(level))
        .map(|i| BossAttack {
            id: format!("{level}-{i}"),
            direction: DODGE_DIRECTIONS[rng.gen_range(0..DODGE_DIRECTIONS.len())],
            damage,
            dodge_window_ms: window,
        })
        .collect()
}

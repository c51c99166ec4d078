// Progression
pub const MAX_LEVEL_PER_STAGE: u32 = 69;
pub const BOSS_LEVEL_INTERVAL: u32 = 10;

// Enemy scaling
pub const ENEMY_BASE_HEALTH: f64 = 10.0;
pub const ENEMY_HEALTH_GROWTH: f64 = 1.15;
pub const BOSS_HEALTH_MULTIPLIER: f64 = 10.0;
pub const BOSS_CURRENCY_MULTIPLIER: f64 = 5.0;
pub const ENEMY_DAMAGE_PER_LEVEL: f64 = 0.5;

// Boss attack patterns
pub const ATTACK_PATTERN_BASE_LEN: usize = 3;
pub const ATTACK_PATTERN_MAX_LEN: usize = 7;
pub const ATTACK_PATTERN_LEVELS_PER_EXTRA: u32 = 20;
pub const DODGE_WINDOW_BASE_MS: u64 = 1500;
pub const DODGE_WINDOW_PER_LEVEL_MS: u64 = 10;
pub const DODGE_WINDOW_FLOOR_MS: u64 = 800;

// Dodge scheduling: attack k telegraphs at spawn + FIRST_DELAY + k * SPACING
pub const DODGE_FIRST_ATTACK_DELAY_MS: u64 = 3000;
pub const DODGE_ATTACK_SPACING_MS: u64 = 5000;

// Swipe classification (pixels)
pub const SWIPE_MIN_DOWN_PX: f64 = 50.0;
pub const SWIPE_SIDE_THRESHOLD_PX: f64 = 30.0;

// Loot scaling
pub const LOOT_DAMAGE_BASE: f64 = 10.0;
pub const LOOT_RARITY_GROWTH: f64 = 1.5;
pub const LOOT_MATERIALS_BASE: f64 = 50.0;
pub const LOOT_LEVEL_SCALE: f64 = 20.0;
pub const LOOT_BOSS_BONUS_LEVELS: u32 = 10;

/// Cumulative rarity thresholds over a uniform draw in [0, 100).
/// Index i wins when the draw falls below `RARITY_DROP_THRESHOLDS[i]`;
/// the winning index is then boosted by `level / LOOT_BOSS_BONUS_LEVELS`,
/// capped at the top tier.
pub const RARITY_DROP_THRESHOLDS: [f64; 10] = [
    50.0, 75.0, 87.0, 93.0, 96.5, 98.3, 99.2, 99.7, 99.9, 100.0,
];

// Crafting
pub const CRAFT_COST_BASE: f64 = 100.0;
pub const CRAFT_COST_GROWTH: f64 = 2.0;

// Prestige
pub const PRESTIGE_MULTIPLIER_GROWTH: f64 = 1.5;
pub const PRESTIGE_MIN_STAGE: u32 = 2;

// Lootboxes
pub const LOOTBOX_BASIC_COST: u64 = 100;
pub const LOOTBOX_PREMIUM_COST: u64 = 10;
pub const LOOTBOX_LEGENDARY_COST: u64 = 50;

// Raid bosses
pub const RAID_BASE_HEALTH: f64 = 1_000_000.0;
pub const RAID_HEALTH_GROWTH: f64 = 1.5;
pub const RAID_DURATION_SECONDS: i64 = 24 * 60 * 60;

// Leaderboard
pub const LEADERBOARD_LIMIT: usize = 100;

// Save system
pub const SAVE_VERSION_MAGIC: u64 = 0x4841525645535400; // "HARVEST\0" in hex

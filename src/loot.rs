use rand::Rng;
use uuid::Uuid;

use crate::constants::*;
use crate::cosmetics::CosmeticItem;
use crate::items::{HandSlot, InventoryItem, ItemType, Rarity};

/// A reward with all fields required, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Reward {
    WeaponDrop(InventoryItem),
    CosmeticDrop(CosmeticItem),
}

/// The resolved stats of one loot roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootRoll {
    pub rarity: Rarity,
    pub damage_bonus: u64,
    pub materials: u64,
}

const WEAPON_BASE_NAMES: [&str; 5] = [
    "Pumpkin Carver",
    "Harvest Sickle",
    "Vine Whip",
    "Gourd Smasher",
    "Scarecrow's Arm",
];

/// Rolls loot for a defeated enemy with ambient randomness.
pub fn roll_loot(level: u32, is_boss: bool) -> LootRoll {
    roll_loot_with(level, is_boss, &mut rand::thread_rng())
}

/// Rolls loot for a defeated enemy. Only bosses drop anything; non-boss
/// defeats yield the lowest tier with zero bonus and materials.
pub fn roll_loot_with(level: u32, is_boss: bool, rng: &mut impl Rng) -> LootRoll {
    if !is_boss {
        return LootRoll {
            rarity: Rarity::lowest(),
            damage_bonus: 0,
            materials: 0,
        };
    }

    let rarity = roll_rarity(level, rng);
    LootRoll {
        rarity,
        damage_bonus: drop_damage_bonus(rarity, level),
        materials: salvage_materials(rarity),
    }
}

/// Rarity roll: uniform draw in [0, 100) against the cumulative threshold
/// table, then the winning tier index is boosted by `level / 10` (deeper
/// bosses skew rarer), capped at the top tier.
pub fn roll_rarity(level: u32, rng: &mut impl Rng) -> Rarity {
    let draw = rng.gen_range(0.0..100.0);
    let boss_bonus = (level / LOOT_BOSS_BONUS_LEVELS) as usize;

    for (i, threshold) in RARITY_DROP_THRESHOLDS.iter().enumerate() {
        if draw < *threshold {
            return Rarity::from_index(i + boss_bonus);
        }
    }
    Rarity::from_index(RARITY_DROP_THRESHOLDS.len() - 1 + boss_bonus)
}

/// Damage bonus of a dropped weapon: scales with rarity and drop level.
pub fn drop_damage_bonus(rarity: Rarity, level: u32) -> u64 {
    (LOOT_DAMAGE_BASE
        * LOOT_RARITY_GROWTH.powi(rarity.index() as i32)
        * (1.0 + f64::from(level) / LOOT_LEVEL_SCALE))
        .floor() as u64
}

/// Materials credited when an item of this rarity is salvaged.
pub fn salvage_materials(rarity: Rarity) -> u64 {
    (LOOT_MATERIALS_BASE * LOOT_RARITY_GROWTH.powi(rarity.index() as i32)).floor() as u64
}

/// Builds the inventory row for a boss weapon drop.
pub fn roll_weapon_drop(owner: &str, level: u32, now: i64, rng: &mut impl Rng) -> InventoryItem {
    let roll = roll_loot_with(level, true, rng);
    let base = WEAPON_BASE_NAMES[rng.gen_range(0..WEAPON_BASE_NAMES.len())];

    InventoryItem {
        id: Uuid::new_v4().to_string(),
        owner: owner.to_string(),
        item_type: ItemType::Weapon,
        name: format!("{} {}", roll.rarity.name(), base),
        rarity: roll.rarity,
        damage_bonus: roll.damage_bonus,
        materials: roll.materials,
        equipped: false,
        slot: None::<HandSlot>,
        created_at: now,
    }
}

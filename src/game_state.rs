use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::PRESTIGE_MULTIPLIER_GROWTH;

/// Owned-upgrades map: upgrade id -> purchase count.
///
/// Stored as JSON in the progress row; a malformed blob degrades to the
/// empty map instead of failing the load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnedUpgrades(BTreeMap<String, u32>);

impl OwnedUpgrades {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owned(&self, upgrade_id: &str) -> u32 {
        self.0.get(upgrade_id).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, upgrade_id: &str) {
        *self.0.entry(upgrade_id.to_string()).or_insert(0) += 1;
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(id, count)| (id.as_str(), *count))
    }

    /// Parses the stored JSON form, falling back to an empty map on
    /// malformed input.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(map) => OwnedUpgrades(map),
            Err(e) => {
                log::warn!("malformed owned-upgrades blob, using empty map: {e}");
                OwnedUpgrades::new()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Per-player progress row. One per player, created at account creation,
/// mutated on every combat/purchase/equip/prestige action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub user_id: String,
    pub current_stage: u32,
    pub current_level: u32,
    /// Derived: `(attack_damage + equipped bonuses + 1) * prestige_multiplier`.
    pub damage_per_click: f64,
    pub currency: u64,
    pub premium_currency: u64,
    pub crafting_materials: u64,
    /// Base damage from permanent upgrades.
    pub attack_damage: u64,
    pub prestige_level: u32,
    pub prestige_multiplier: f64,
    pub left_hand_weapon: Option<String>,
    pub right_hand_weapon: Option<String>,
    pub upgrades: OwnedUpgrades,
    pub updated_at: i64,
}

impl PlayerProgress {
    /// Creates a fresh progress row with account-creation defaults.
    pub fn new(user_id: &str, now: i64) -> Self {
        let mut progress = Self {
            user_id: user_id.to_string(),
            current_stage: 1,
            current_level: 1,
            damage_per_click: 0.0,
            currency: 0,
            premium_currency: 0,
            crafting_materials: 0,
            attack_damage: 0,
            prestige_level: 0,
            prestige_multiplier: 1.0,
            left_hand_weapon: None,
            right_hand_weapon: None,
            upgrades: OwnedUpgrades::new(),
            updated_at: now,
        };
        progress.recompute_damage_per_click(0);
        progress
    }

    /// Recomputes the derived `damage_per_click` from base attack damage,
    /// the summed bonus of equipped weapons, and the prestige multiplier.
    /// Must be called after every equip/purchase/prestige.
    pub fn recompute_damage_per_click(&mut self, equipped_bonus: u64) {
        self.damage_per_click =
            (self.attack_damage + equipped_bonus + 1) as f64 * self.prestige_multiplier;
    }

    /// The multiplier a given prestige level confers.
    pub fn multiplier_for_prestige(level: u32) -> f64 {
        PRESTIGE_MULTIPLIER_GROWTH.powi(level as i32)
    }
}

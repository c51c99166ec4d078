use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{LOOTBOX_BASIC_COST, LOOTBOX_LEGENDARY_COST, LOOTBOX_PREMIUM_COST};
use crate::error::GameError;
use crate::game_state::PlayerProgress;
use crate::items::{Rarity, RARITY_TIERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CosmeticType {
    Skin,
    Effect,
    Frame,
    Emote,
}

/// A cosmetic inventory row. Upserted on (owner, name): duplicate rolls
/// re-affirm existence rather than duplicating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosmeticItem {
    pub id: String,
    pub owner: String,
    pub cosmetic_type: CosmeticType,
    pub name: String,
    pub rarity: Rarity,
    pub equipped: bool,
    pub created_at: i64,
}

/// Fixed cosmetic catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct CosmeticDef {
    pub name: &'static str,
    pub cosmetic_type: CosmeticType,
    pub rarity: Rarity,
}

pub const COSMETIC_POOL: [CosmeticDef; 20] = [
    // Skins
    CosmeticDef { name: "Spooky Pumpkin", cosmetic_type: CosmeticType::Skin, rarity: Rarity::Green },
    CosmeticDef { name: "Golden Pumpkin", cosmetic_type: CosmeticType::Skin, rarity: Rarity::Yellow },
    CosmeticDef { name: "Diamond Pumpkin", cosmetic_type: CosmeticType::Skin, rarity: Rarity::Orange },
    CosmeticDef { name: "Rainbow Pumpkin", cosmetic_type: CosmeticType::Skin, rarity: Rarity::Pink },
    CosmeticDef { name: "Shadow Pumpkin", cosmetic_type: CosmeticType::Skin, rarity: Rarity::Black },
    // Effects
    CosmeticDef { name: "Fire Trail", cosmetic_type: CosmeticType::Effect, rarity: Rarity::Blue },
    CosmeticDef { name: "Lightning Aura", cosmetic_type: CosmeticType::Effect, rarity: Rarity::Green },
    CosmeticDef { name: "Ice Crystals", cosmetic_type: CosmeticType::Effect, rarity: Rarity::Yellow },
    CosmeticDef { name: "Dark Energy", cosmetic_type: CosmeticType::Effect, rarity: Rarity::Red },
    CosmeticDef { name: "Divine Light", cosmetic_type: CosmeticType::Effect, rarity: Rarity::Pink },
    // Frames
    CosmeticDef { name: "Bronze Frame", cosmetic_type: CosmeticType::Frame, rarity: Rarity::LightBlue },
    CosmeticDef { name: "Silver Frame", cosmetic_type: CosmeticType::Frame, rarity: Rarity::Blue },
    CosmeticDef { name: "Gold Frame", cosmetic_type: CosmeticType::Frame, rarity: Rarity::Yellow },
    CosmeticDef { name: "Platinum Frame", cosmetic_type: CosmeticType::Frame, rarity: Rarity::Orange },
    CosmeticDef { name: "Mythic Frame", cosmetic_type: CosmeticType::Frame, rarity: Rarity::Violet },
    // Emotes keep their emoji prefix; the prefix is part of the name the
    // collection dedupes on.
    CosmeticDef { name: "😎 Cool Guy", cosmetic_type: CosmeticType::Emote, rarity: Rarity::Gray },
    CosmeticDef { name: "🎃 Pumpkin Dance", cosmetic_type: CosmeticType::Emote, rarity: Rarity::LightBlue },
    CosmeticDef { name: "👑 Victory", cosmetic_type: CosmeticType::Emote, rarity: Rarity::Green },
    CosmeticDef { name: "⚡ Lightning Strike", cosmetic_type: CosmeticType::Emote, rarity: Rarity::Yellow },
    CosmeticDef { name: "💀 Skull Laugh", cosmetic_type: CosmeticType::Emote, rarity: Rarity::Red },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootboxTier {
    Basic,
    Premium,
    Legendary,
}

impl LootboxTier {
    /// Number of cosmetics rewarded per opening.
    pub fn item_count(&self) -> usize {
        match self {
            LootboxTier::Basic => 3,
            LootboxTier::Premium => 5,
            LootboxTier::Legendary => 7,
        }
    }

    /// Per-tier rarity weights, lowest tier first.
    pub fn rarity_weights(&self) -> [u32; 10] {
        match self {
            LootboxTier::Basic => [50, 30, 15, 5, 0, 0, 0, 0, 0, 0],
            LootboxTier::Premium => [20, 25, 25, 15, 10, 5, 0, 0, 0, 0],
            LootboxTier::Legendary => [5, 10, 15, 20, 20, 15, 10, 5, 0, 0],
        }
    }
}

/// Debits the price of a lootbox: basic boxes cost regular currency,
/// premium and legendary cost premium currency. Rejects without mutating
/// on a short balance.
pub fn charge_lootbox(progress: &mut PlayerProgress, tier: LootboxTier) -> Result<(), GameError> {
    match tier {
        LootboxTier::Basic => {
            if progress.currency < LOOTBOX_BASIC_COST {
                return Err(GameError::InsufficientCurrency {
                    needed: LOOTBOX_BASIC_COST,
                    have: progress.currency,
                });
            }
            progress.currency -= LOOTBOX_BASIC_COST;
        }
        LootboxTier::Premium | LootboxTier::Legendary => {
            let cost = if tier == LootboxTier::Premium {
                LOOTBOX_PREMIUM_COST
            } else {
                LOOTBOX_LEGENDARY_COST
            };
            if progress.premium_currency < cost {
                return Err(GameError::InsufficientPremium {
                    needed: cost,
                    have: progress.premium_currency,
                });
            }
            progress.premium_currency -= cost;
        }
    }
    Ok(())
}

/// Weighted rarity roll over a box's weight table.
pub fn roll_weighted_rarity(weights: &[u32; 10], rng: &mut impl Rng) -> Rarity {
    let total: u32 = weights.iter().sum();
    let mut draw = rng.gen_range(0.0..f64::from(total));
    for (i, weight) in weights.iter().enumerate() {
        draw -= f64::from(*weight);
        if draw <= 0.0 {
            return RARITY_TIERS[i];
        }
    }
    Rarity::lowest()
}

/// Rolls the cosmetic rewards of one box opening: weighted rarity per
/// item, then a uniform pick among pool entries of that rarity.
pub fn roll_lootbox_rewards(tier: LootboxTier, rng: &mut impl Rng) -> Vec<&'static CosmeticDef> {
    let weights = tier.rarity_weights();
    (0..tier.item_count())
        .map(|_| {
            let rarity = roll_weighted_rarity(&weights, rng);
            let candidates: Vec<&CosmeticDef> =
                COSMETIC_POOL.iter().filter(|c| c.rarity == rarity).collect();
            if candidates.is_empty() {
                &COSMETIC_POOL[rng.gen_range(0..COSMETIC_POOL.len())]
            } else {
                candidates[rng.gen_range(0..candidates.len())]
            }
        })
        .collect()
}

/// Equips a cosmetic, unequipping every other cosmetic of the same type.
pub fn equip_cosmetic(items: &mut [CosmeticItem], cosmetic_id: &str) -> Result<(), GameError> {
    let cosmetic_type = items
        .iter()
        .find(|c| c.id == cosmetic_id)
        .map(|c| c.cosmetic_type)
        .ok_or_else(|| GameError::ItemNotFound(cosmetic_id.to_string()))?;

    for item in items.iter_mut() {
        if item.cosmetic_type == cosmetic_type {
            item.equipped = item.id == cosmetic_id;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_item_counts_per_tier() {
        assert_eq!(LootboxTier::Basic.item_count(), 3);
        assert_eq!(LootboxTier::Premium.item_count(), 5);
        assert_eq!(LootboxTier::Legendary.item_count(), 7);
    }

    #[test]
    fn test_basic_box_charges_currency() {
        let mut p = PlayerProgress::new("u", 0);
        p.currency = 250;
        charge_lootbox(&mut p, LootboxTier::Basic).unwrap();
        assert_eq!(p.currency, 150);
        charge_lootbox(&mut p, LootboxTier::Basic).unwrap();
        assert_eq!(p.currency, 50);
    }

    #[test]
    fn test_premium_boxes_charge_premium_currency() {
        let mut p = PlayerProgress::new("u", 0);
        p.premium_currency = 60;
        charge_lootbox(&mut p, LootboxTier::Premium).unwrap();
        assert_eq!(p.premium_currency, 50);
        charge_lootbox(&mut p, LootboxTier::Legendary).unwrap();
        assert_eq!(p.premium_currency, 0);
    }

    #[test]
    fn test_charge_rejects_short_balance() {
        let mut p = PlayerProgress::new("u", 0);
        p.currency = 10;
        p.premium_currency = 5;
        assert!(charge_lootbox(&mut p, LootboxTier::Basic).is_err());
        assert!(charge_lootbox(&mut p, LootboxTier::Premium).is_err());
        assert_eq!(p.currency, 10);
        assert_eq!(p.premium_currency, 5);
    }

    #[test]
    fn test_basic_box_never_rolls_above_green() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..500 {
            let rarity = roll_weighted_rarity(&LootboxTier::Basic.rarity_weights(), &mut rng);
            assert!(rarity <= Rarity::Green, "got {rarity:?}");
        }
    }

    #[test]
    fn test_rewards_match_rolled_rarity_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..50 {
            let rewards = roll_lootbox_rewards(LootboxTier::Legendary, &mut rng);
            assert_eq!(rewards.len(), 7);
            for def in rewards {
                assert!(COSMETIC_POOL.iter().any(|c| c.name == def.name));
            }
        }
    }

    #[test]
    fn test_equip_cosmetic_exclusive_per_type() {
        let mut items: Vec<CosmeticItem> = [
            ("1", CosmeticType::Skin, "Spooky Pumpkin"),
            ("2", CosmeticType::Skin, "Golden Pumpkin"),
            ("3", CosmeticType::Emote, "👑 Victory"),
        ]
        .iter()
        .map(|(id, ty, name)| CosmeticItem {
            id: id.to_string(),
            owner: "u".to_string(),
            cosmetic_type: *ty,
            name: name.to_string(),
            rarity: Rarity::Green,
            equipped: true,
            created_at: 0,
        })
        .collect();

        equip_cosmetic(&mut items, "2").unwrap();
        assert!(!items[0].equipped);
        assert!(items[1].equipped);
        // Other types untouched
        assert!(items[2].equipped);
    }

    #[test]
    fn test_emote_names_keep_emoji_prefix() {
        let emotes: Vec<&str> = COSMETIC_POOL
            .iter()
            .filter(|c| c.cosmetic_type == CosmeticType::Emote)
            .map(|c| c.name)
            .collect();
        assert_eq!(emotes.len(), 5);
        for name in emotes {
            assert!(
                !name.starts_with(|c: char| c.is_ascii()),
                "emote lost its emoji prefix: {name}"
            );
        }
        assert!(COSMETIC_POOL.iter().any(|c| c.name == "🎃 Pumpkin Dance"));
    }

    #[test]
    fn test_equip_missing_cosmetic() {
        let mut items = vec![];
        assert!(matches!(
            equip_cosmetic(&mut items, "ghost"),
            Err(GameError::ItemNotFound(_))
        ));
    }
}

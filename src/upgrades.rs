use crate::error::GameError;
use crate::game_state::PlayerProgress;

/// A purchasable permanent upgrade.
#[derive(Debug, Clone, Copy)]
pub struct UpgradeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub base_cost: u64,
    pub cost_multiplier: f64,
    pub damage_increase: u64,
}

pub const UPGRADES: [UpgradeDef; 4] = [
    UpgradeDef {
        id: "sharpened-sickle",
        name: "Sharpened Sickle",
        description: "A keener edge for the harvest",
        base_cost: 25,
        cost_multiplier: 1.15,
        damage_increase: 1,
    },
    UpgradeDef {
        id: "rusty-machete",
        name: "Rusty Machete",
        description: "Tetanus is the enemy's problem",
        base_cost: 250,
        cost_multiplier: 1.2,
        damage_increase: 5,
    },
    UpgradeDef {
        id: "cursed-scythe",
        name: "Cursed Scythe",
        description: "Whispers of long-dead reapers",
        base_cost: 2_500,
        cost_multiplier: 1.25,
        damage_increase: 25,
    },
    UpgradeDef {
        id: "harvest-golem",
        name: "Harvest Golem",
        description: "It swings so you don't have to",
        base_cost: 20_000,
        cost_multiplier: 1.3,
        damage_increase: 100,
    },
];

pub fn upgrade_by_id(id: &str) -> Option<&'static UpgradeDef> {
    UPGRADES.iter().find(|u| u.id == id)
}

/// Compounding cost curve: `floor(base_cost * cost_multiplier^owned)`.
/// Pure; same inputs always yield the same cost.
pub fn upgrade_cost(upgrade: &UpgradeDef, owned: u32) -> u64 {
    (upgrade.base_cost as f64 * upgrade.cost_multiplier.powi(owned as i32)).floor() as u64
}

/// Purchases one upgrade. Rejects without mutating anything when currency
/// is short; on success debits the cost, raises base attack damage, and
/// recomputes `damage_per_click`. Returns the price paid.
pub fn purchase_upgrade(
    progress: &mut PlayerProgress,
    upgrade_id: &str,
    equipped_bonus: u64,
) -> Result<u64, GameError> {
    let upgrade =
        upgrade_by_id(upgrade_id).ok_or_else(|| GameError::UnknownUpgrade(upgrade_id.to_string()))?;

    let cost = upgrade_cost(upgrade, progress.upgrades.owned(upgrade_id));
    if progress.currency < cost {
        return Err(GameError::InsufficientCurrency {
            needed: cost,
            have: progress.currency,
        });
    }

    progress.currency -= cost;
    progress.upgrades.increment(upgrade_id);
    progress.attack_damage += upgrade.damage_increase;
    progress.recompute_damage_per_click(equipped_bonus);
    Ok(cost)
}

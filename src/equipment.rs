use uuid::Uuid;

use crate::constants::{CRAFT_COST_BASE, CRAFT_COST_GROWTH, LOOT_DAMAGE_BASE, LOOT_RARITY_GROWTH};
use crate::error::GameError;
use crate::game_state::PlayerProgress;
use crate::items::{HandSlot, InventoryItem, ItemType, Rarity};
use crate::loot::salvage_materials;

/// Summed damage bonus of all equipped weapons.
pub fn equipped_damage_bonus(items: &[InventoryItem]) -> u64 {
    items
        .iter()
        .filter(|i| i.is_weapon() && i.equipped)
        .map(|i| i.damage_bonus)
        .sum()
}

/// Equips a weapon into a hand slot, unequipping whatever occupied it.
/// Returns the ids of items whose rows changed.
pub fn equip_weapon(
    progress: &mut PlayerProgress,
    items: &mut [InventoryItem],
    item_id: &str,
    slot: HandSlot,
) -> Result<Vec<String>, GameError> {
    if !items
        .iter()
        .any(|i| i.id == item_id && i.item_type == ItemType::Weapon)
    {
        return Err(GameError::ItemNotFound(item_id.to_string()));
    }

    let mut changed = Vec::new();
    for item in items.iter_mut() {
        if item.slot == Some(slot) && item.equipped && item.id != item_id {
            item.equipped = false;
            item.slot = None;
            changed.push(item.id.clone());
        }
    }

    let mut equipped_name = String::new();
    let mut vacated_slot = None;
    for item in items.iter_mut() {
        if item.id == item_id {
            if item.equipped && item.slot != Some(slot) {
                vacated_slot = item.slot;
            }
            item.equipped = true;
            item.slot = Some(slot);
            equipped_name = item.name.clone();
            changed.push(item.id.clone());
        }
    }

    // A weapon moved between hands leaves its old hand empty.
    match vacated_slot {
        Some(HandSlot::LeftHand) => progress.left_hand_weapon = None,
        Some(HandSlot::RightHand) => progress.right_hand_weapon = None,
        None => {}
    }

    match slot {
        HandSlot::LeftHand => progress.left_hand_weapon = Some(equipped_name),
        HandSlot::RightHand => progress.right_hand_weapon = Some(equipped_name),
    }
    progress.recompute_damage_per_click(equipped_damage_bonus(items));
    Ok(changed)
}

/// Clears a hand slot. Returns the id of the unequipped item, if any.
pub fn unequip_slot(
    progress: &mut PlayerProgress,
    items: &mut [InventoryItem],
    slot: HandSlot,
) -> Option<String> {
    let mut unequipped = None;
    for item in items.iter_mut() {
        if item.slot == Some(slot) && item.equipped {
            item.equipped = false;
            item.slot = None;
            unequipped = Some(item.id.clone());
        }
    }

    match slot {
        HandSlot::LeftHand => progress.left_hand_weapon = None,
        HandSlot::RightHand => progress.right_hand_weapon = None,
    }
    progress.recompute_damage_per_click(equipped_damage_bonus(items));
    unequipped
}

/// Materials price of crafting a weapon: `floor(100 * 2^rarity)`.
pub fn craft_cost(rarity: Rarity) -> u64 {
    (CRAFT_COST_BASE * CRAFT_COST_GROWTH.powi(rarity.index() as i32)).floor() as u64
}

/// Damage bonus of a crafted weapon (no level scaling, unlike drops).
pub fn craft_damage_bonus(rarity: Rarity) -> u64 {
    (LOOT_DAMAGE_BASE * LOOT_RARITY_GROWTH.powi(rarity.index() as i32)).floor() as u64
}

/// Crafts an unequipped weapon of the chosen rarity, debiting materials.
pub fn craft_weapon(
    progress: &mut PlayerProgress,
    rarity: Rarity,
    now: i64,
) -> Result<InventoryItem, GameError> {
    let cost = craft_cost(rarity);
    if progress.crafting_materials < cost {
        return Err(GameError::InsufficientMaterials {
            needed: cost,
            have: progress.crafting_materials,
        });
    }

    progress.crafting_materials -= cost;
    Ok(InventoryItem {
        id: Uuid::new_v4().to_string(),
        owner: progress.user_id.clone(),
        item_type: ItemType::Weapon,
        name: format!("{} Forged Blade", rarity.name()),
        rarity,
        damage_bonus: craft_damage_bonus(rarity),
        materials: salvage_materials(rarity),
        equipped: false,
        slot: None,
        created_at: now,
    })
}

/// Destroys an item and credits its salvage materials. An equipped weapon
/// is unequipped (and the progress row updated) as part of the removal.
pub fn salvage_item(
    progress: &mut PlayerProgress,
    items: &mut Vec<InventoryItem>,
    item_id: &str,
) -> Result<u64, GameError> {
    let index = items
        .iter()
        .position(|i| i.id == item_id)
        .ok_or_else(|| GameError::ItemNotFound(item_id.to_string()))?;

    let item = items.remove(index);
    match item.slot {
        Some(HandSlot::LeftHand) => progress.left_hand_weapon = None,
        Some(HandSlot::RightHand) => progress.right_hand_weapon = None,
        None => {}
    }
    progress.crafting_materials += item.materials;
    progress.recompute_damage_per_click(equipped_damage_bonus(items));
    Ok(item.materials)
}

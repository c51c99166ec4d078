use std::sync::Arc;

use crate::combat_logic::{resolve_attack, CombatEvent};
use crate::cosmetics::{
    charge_lootbox, equip_cosmetic, roll_lootbox_rewards, CosmeticItem, LootboxTier,
};
use crate::dodge_logic::{classify_swipe, DodgeEvent, DodgeMinigame};
use crate::enemy::{generate_enemy, DodgeDirection, Enemy};
use crate::equipment::{
    craft_weapon, equip_weapon, equipped_damage_bonus, salvage_item, unequip_slot,
};
use crate::error::GameError;
use crate::game_state::PlayerProgress;
use crate::items::{HandSlot, InventoryItem, Rarity};
use crate::loot::roll_weapon_drop;
use crate::prestige::perform_prestige;
use crate::store::{new_lootbox_record, GameStore, LeaderboardEntry, StoreError};
use crate::upgrades::purchase_upgrade;
use uuid::Uuid;

fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// One player's live game loop: progress and inventory caches, the
/// current enemy, and the dodge mini-game when a boss is up.
///
/// Every mutating action applies to the in-memory state first and then
/// writes through to the store. A failed write is logged and play
/// continues; the next successful write carries the full row anyway.
pub struct GameSession {
    store: Arc<dyn GameStore>,
    progress: PlayerProgress,
    inventory: Vec<InventoryItem>,
    enemy: Enemy,
    dodge: Option<DodgeMinigame>,
}

impl GameSession {
    /// Loads the player's state, creating a fresh row for a new player,
    /// and spawns the enemy for their current position.
    pub fn new(store: Arc<dyn GameStore>, user_id: &str, now_ms: u64) -> Result<Self, StoreError> {
        let progress = match store.load_progress(user_id)? {
            Some(progress) => progress,
            None => {
                let progress = PlayerProgress::new(user_id, now_timestamp());
                store.save_progress(&progress)?;
                progress
            }
        };
        let inventory = store.list_items(user_id)?;

        let enemy = generate_enemy(progress.current_stage, progress.current_level);
        let dodge = DodgeMinigame::for_enemy(&enemy, now_ms);
        Ok(Self {
            store,
            progress,
            inventory,
            enemy,
            dodge,
        })
    }

    pub fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn dodge(&self) -> Option<&DodgeMinigame> {
        self.dodge.as_ref()
    }

    fn persist_progress(&mut self) {
        self.progress.updated_at = now_timestamp();
        if let Err(e) = self.store.save_progress(&self.progress) {
            log::warn!("progress write failed for {}: {e}", self.progress.user_id);
        }
    }

    fn persist_item(&self, item: &InventoryItem) {
        if let Err(e) = self.store.update_item(item) {
            log::warn!("item write failed for {}: {e}", item.id);
        }
    }

    fn respawn_enemy(&mut self, now_ms: u64) {
        self.enemy = generate_enemy(self.progress.current_stage, self.progress.current_level);
        self.dodge = DodgeMinigame::for_enemy(&self.enemy, now_ms);
    }

    /// One click attack against the current enemy. Rejected while a boss
    /// attack is telegraphing. On a boss defeat a weapon drop is rolled
    /// and added to the inventory.
    pub fn click_attack(&mut self, now_ms: u64) -> Result<Vec<CombatEvent>, GameError> {
        if self.dodge.as_ref().is_some_and(|d| d.is_locking()) {
            return Err(GameError::AttackLocked);
        }

        let damage = self.progress.damage_per_click;
        let mut events = resolve_attack(&mut self.progress, &mut self.enemy, damage);

        let boss_defeat = events.iter().find_map(|e| match e {
            CombatEvent::EnemyDefeated {
                was_boss: true,
                defeated_level,
                ..
            } => Some(*defeated_level),
            _ => None,
        });
        if let Some(defeated_level) = boss_defeat {
            let drop = roll_weapon_drop(
                &self.progress.user_id,
                defeated_level,
                now_timestamp(),
                &mut rand::thread_rng(),
            );
            if let Err(e) = self.store.insert_item(&drop) {
                log::warn!("loot write failed for {}: {e}", self.progress.user_id);
            }
            self.inventory.insert(0, drop.clone());
            events.push(CombatEvent::LootDropped { item: drop });
        }

        if !self.enemy.is_alive() {
            self.respawn_enemy(now_ms);
            self.persist_progress();
        }
        Ok(events)
    }

    /// Advances dodge scheduling and timeouts to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Vec<DodgeEvent> {
        match self.dodge.as_mut() {
            Some(dodge) => dodge.update(now_ms),
            None => Vec::new(),
        }
    }

    /// Resolves a dodge input against the telegraphed attack, if any.
    pub fn submit_dodge(&mut self, direction: DodgeDirection, now_ms: u64) -> Option<DodgeEvent> {
        self.dodge.as_mut()?.submit(direction, now_ms)
    }

    /// Touch input path: classifies the swipe displacement and submits it.
    /// Swipes that don't read as a downward dodge are ignored.
    pub fn swipe(&mut self, dx: f64, dy: f64, now_ms: u64) -> Option<DodgeEvent> {
        let direction = classify_swipe(dx, dy)?;
        self.submit_dodge(direction, now_ms)
    }

    /// Buys one permanent upgrade. Returns the price paid.
    pub fn buy_upgrade(&mut self, upgrade_id: &str) -> Result<u64, GameError> {
        let bonus = equipped_damage_bonus(&self.inventory);
        let cost = purchase_upgrade(&mut self.progress, upgrade_id, bonus)?;
        self.persist_progress();
        Ok(cost)
    }

    /// Crafts a weapon of the chosen rarity from materials.
    pub fn craft(&mut self, rarity: Rarity) -> Result<InventoryItem, GameError> {
        let item = craft_weapon(&mut self.progress, rarity, now_timestamp())?;
        if let Err(e) = self.store.insert_item(&item) {
            log::warn!("craft write failed for {}: {e}", item.id);
        }
        self.inventory.insert(0, item.clone());
        self.persist_progress();
        Ok(item)
    }

    /// Equips an owned weapon into a hand slot.
    pub fn equip(&mut self, item_id: &str, slot: HandSlot) -> Result<(), GameError> {
        let changed = equip_weapon(&mut self.progress, &mut self.inventory, item_id, slot)?;
        for id in &changed {
            if let Some(item) = self.inventory.iter().find(|i| &i.id == id) {
                self.persist_item(item);
            }
        }
        self.persist_progress();
        Ok(())
    }

    /// Clears a hand slot.
    pub fn unequip(&mut self, slot: HandSlot) {
        if let Some(id) = unequip_slot(&mut self.progress, &mut self.inventory, slot) {
            if let Some(item) = self.inventory.iter().find(|i| i.id == id) {
                self.persist_item(item);
            }
        }
        self.persist_progress();
    }

    /// Destroys an item for its salvage materials.
    pub fn salvage(&mut self, item_id: &str) -> Result<u64, GameError> {
        let credited = salvage_item(&mut self.progress, &mut self.inventory, item_id)?;
        if let Err(e) = self.store.delete_item(item_id) {
            log::warn!("salvage delete failed for {item_id}: {e}");
        }
        self.persist_progress();
        Ok(credited)
    }

    /// Resets the run for a permanent damage multiplier, then respawns
    /// the stage-1 enemy.
    pub fn prestige(&mut self, now_ms: u64) -> Result<(), GameError> {
        let bonus = equipped_damage_bonus(&self.inventory);
        perform_prestige(&mut self.progress, bonus)?;
        self.respawn_enemy(now_ms);
        self.persist_progress();
        Ok(())
    }

    /// Opens a lootbox: charges the tier's price, rolls its cosmetics, and
    /// upserts each into the player's collection. Duplicate rolls resolve
    /// to the already-owned row.
    pub fn open_lootbox(&mut self, tier: LootboxTier) -> Result<Vec<CosmeticItem>, GameError> {
        charge_lootbox(&mut self.progress, tier)?;

        let now = now_timestamp();
        let defs = roll_lootbox_rewards(tier, &mut rand::thread_rng());
        let mut rewards = Vec::with_capacity(defs.len());
        for def in defs {
            let row = CosmeticItem {
                id: Uuid::new_v4().to_string(),
                owner: self.progress.user_id.clone(),
                cosmetic_type: def.cosmetic_type,
                name: def.name.to_string(),
                rarity: def.rarity,
                equipped: false,
                created_at: now,
            };
            match self.store.upsert_cosmetic(&row) {
                Ok(stored) => rewards.push(stored),
                Err(e) => {
                    log::warn!("cosmetic write failed for {}: {e}", def.name);
                    rewards.push(row);
                }
            }
        }

        let rarities = rewards.iter().map(|c| c.rarity).collect();
        let record = new_lootbox_record(&self.progress.user_id, tier, rarities, now);
        if let Err(e) = self.store.record_lootbox(&record) {
            log::warn!("lootbox history write failed: {e}");
        }
        self.persist_progress();
        Ok(rewards)
    }

    /// Equips a cosmetic, displacing any other of the same type.
    pub fn equip_cosmetic(&mut self, cosmetic_id: &str) -> Result<(), GameError> {
        let mut cosmetics = match self.store.list_cosmetics(&self.progress.user_id) {
            Ok(cosmetics) => cosmetics,
            Err(e) => {
                log::warn!("cosmetic read failed: {e}");
                return Err(GameError::ItemNotFound(cosmetic_id.to_string()));
            }
        };
        equip_cosmetic(&mut cosmetics, cosmetic_id)?;
        if let Err(e) = self.store.save_cosmetics(&cosmetics) {
            log::warn!("cosmetic write failed: {e}");
        }
        Ok(())
    }

    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.store.leaderboard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CosmeticStore, InventoryStore, MemoryStore, ProgressStore};

    fn session() -> GameSession {
        let store = Arc::new(MemoryStore::new());
        GameSession::new(store, "u", 0).unwrap()
    }

    #[test]
    fn test_new_player_gets_fresh_row_and_enemy() {
        let s = session();
        assert_eq!(s.progress().current_stage, 1);
        assert_eq!(s.progress().current_level, 1);
        assert_eq!(s.enemy().id, "1-1");
        assert!(s.dodge().is_none());
    }

    #[test]
    fn test_existing_progress_is_loaded() {
        let store = Arc::new(MemoryStore::new());
        let mut saved = PlayerProgress::new("u", 0);
        saved.current_stage = 3;
        saved.current_level = 14;
        saved.currency = 500;
        store.save_progress(&saved).unwrap();

        let s = GameSession::new(store, "u", 0).unwrap();
        assert_eq!(s.progress().current_stage, 3);
        assert_eq!(s.progress().currency, 500);
        assert_eq!(s.enemy().id, "3-14");
    }

    #[test]
    fn test_defeat_respawns_enemy_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut s = GameSession::new(Arc::clone(&store) as Arc<dyn GameStore>, "u", 0).unwrap();

        // Click until the level-1 enemy falls.
        let mut defeated = false;
        for _ in 0..100 {
            let events = s.click_attack(0).unwrap();
            if events
                .iter()
                .any(|e| matches!(e, CombatEvent::EnemyDefeated { .. }))
            {
                defeated = true;
                break;
            }
        }
        assert!(defeated);
        assert_eq!(s.progress().current_level, 2);
        assert_eq!(s.enemy().id, "1-2");
        assert!(s.enemy().is_alive());

        let persisted = store.load_progress("u").unwrap().unwrap();
        assert_eq!(persisted.current_level, 2);
    }

    #[test]
    fn test_attack_locked_while_telegraphing() {
        let store = Arc::new(MemoryStore::new());
        let mut saved = PlayerProgress::new("u", 0);
        saved.current_level = 10; // boss level
        store.save_progress(&saved).unwrap();

        let mut s = GameSession::new(store, "u", 0).unwrap();
        assert!(s.dodge().is_some());
        assert!(s.click_attack(0).is_ok());

        let events = s.tick(3000);
        assert!(matches!(events[0], DodgeEvent::AttackTelegraphed { .. }));
        assert_eq!(s.click_attack(3100), Err(GameError::AttackLocked));

        // Resolving the attack unlocks clicking.
        let attack_direction = s.dodge().unwrap().current_attack().unwrap().direction;
        assert!(s.submit_dodge(attack_direction, 3200).is_some());
        assert!(s.click_attack(3300).is_ok());
    }

    #[test]
    fn test_boss_defeat_drops_weapon() {
        let store = Arc::new(MemoryStore::new());
        let mut saved = PlayerProgress::new("u", 0);
        saved.current_level = 10;
        saved.attack_damage = 1_000_000;
        saved.recompute_damage_per_click(0);
        store.save_progress(&saved).unwrap();

        let mut s = GameSession::new(Arc::clone(&store) as Arc<dyn GameStore>, "u", 0).unwrap();
        let events = s.click_attack(0).unwrap();

        let dropped = events.iter().any(|e| matches!(e, CombatEvent::LootDropped { .. }));
        assert!(dropped);
        assert_eq!(s.inventory().len(), 1);
        assert_eq!(store.list_items("u").unwrap().len(), 1);
        assert_eq!(s.progress().current_level, 11);
    }

    #[test]
    fn test_buy_upgrade_writes_through() {
        let store = Arc::new(MemoryStore::new());
        let mut saved = PlayerProgress::new("u", 0);
        saved.currency = 100;
        store.save_progress(&saved).unwrap();

        let mut s = GameSession::new(Arc::clone(&store) as Arc<dyn GameStore>, "u", 0).unwrap();
        s.buy_upgrade("sharpened-sickle").unwrap();

        let persisted = store.load_progress("u").unwrap().unwrap();
        assert_eq!(persisted.currency, 75);
        assert_eq!(persisted.attack_damage, 1);
        assert_eq!(persisted.damage_per_click, 2.0);
    }

    #[test]
    fn test_craft_equip_salvage_flow() {
        let store = Arc::new(MemoryStore::new());
        let mut saved = PlayerProgress::new("u", 0);
        saved.crafting_materials = 200;
        store.save_progress(&saved).unwrap();

        let mut s = GameSession::new(Arc::clone(&store) as Arc<dyn GameStore>, "u", 0).unwrap();
        let item = s.craft(Rarity::Gray).unwrap();
        assert_eq!(s.progress().crafting_materials, 100);

        s.equip(&item.id, HandSlot::LeftHand).unwrap();
        assert_eq!(s.progress().damage_per_click, 11.0); // (0 + 10 + 1) * 1.0
        let stored = store.list_items("u").unwrap();
        assert!(stored[0].equipped);

        let credited = s.salvage(&item.id).unwrap();
        assert_eq!(credited, 50);
        assert_eq!(s.progress().crafting_materials, 150);
        assert!(s.progress().left_hand_weapon.is_none());
        assert!(store.list_items("u").unwrap().is_empty());
    }

    #[test]
    fn test_prestige_respawns_at_stage_one() {
        let store = Arc::new(MemoryStore::new());
        let mut saved = PlayerProgress::new("u", 0);
        saved.current_stage = 2;
        saved.current_level = 40;
        store.save_progress(&saved).unwrap();

        let mut s = GameSession::new(store, "u", 0).unwrap();
        s.prestige(0).unwrap();
        assert_eq!(s.progress().prestige_level, 1);
        assert_eq!(s.enemy().id, "1-1");
    }

    #[test]
    fn test_open_lootbox_rewards_and_history() {
        let store = Arc::new(MemoryStore::new());
        let mut saved = PlayerProgress::new("u", 0);
        saved.premium_currency = 10;
        store.save_progress(&saved).unwrap();

        let mut s = GameSession::new(Arc::clone(&store) as Arc<dyn GameStore>, "u", 0).unwrap();
        let rewards = s.open_lootbox(LootboxTier::Premium).unwrap();
        assert_eq!(rewards.len(), 5);
        assert_eq!(s.progress().premium_currency, 0);
        assert_eq!(store.lootbox_history("u").unwrap().len(), 1);

        // A second opening is unaffordable.
        assert!(matches!(
            s.open_lootbox(LootboxTier::Premium),
            Err(GameError::InsufficientPremium { .. })
        ));
    }

    #[test]
    fn test_equip_cosmetic_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let mut saved = PlayerProgress::new("u", 0);
        saved.currency = 500;
        store.save_progress(&saved).unwrap();

        let mut s = GameSession::new(Arc::clone(&store) as Arc<dyn GameStore>, "u", 0).unwrap();
        let rewards = s.open_lootbox(LootboxTier::Basic).unwrap();
        s.equip_cosmetic(&rewards[0].id).unwrap();

        let cosmetics = store.list_cosmetics("u").unwrap();
        let equipped: Vec<_> = cosmetics.iter().filter(|c| c.equipped).collect();
        assert_eq!(equipped.len(), 1);
        assert_eq!(equipped[0].id, rewards[0].id);
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::constants::{LEADERBOARD_LIMIT, MAX_LEVEL_PER_STAGE};
use crate::cosmetics::{CosmeticItem, LootboxTier};
use crate::game_state::PlayerProgress;
use crate::items::{InventoryItem, Rarity};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// One row on the global leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub current_stage: u32,
    pub current_level: u32,
    pub prestige_level: u32,
    pub total_score: u64,
}

/// Ranking score: prestige dominates, then stage, then level within the
/// stage. Stages span 69 levels, so stage and level never overlap.
pub fn total_score(progress: &PlayerProgress) -> u64 {
    u64::from(progress.prestige_level) * 10_000
        + u64::from(progress.current_stage.saturating_sub(1)) * u64::from(MAX_LEVEL_PER_STAGE)
        + u64::from(progress.current_level)
}

/// A recorded lootbox opening, kept for purchase history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootboxRecord {
    pub id: String,
    pub user_id: String,
    pub tier: LootboxTier,
    pub rarities: Vec<Rarity>,
    pub opened_at: i64,
}

pub trait ProgressStore {
    fn load_progress(&self, user_id: &str) -> Result<Option<PlayerProgress>, StoreError>;
    fn save_progress(&self, progress: &PlayerProgress) -> Result<(), StoreError>;
    fn all_progress(&self) -> Result<Vec<PlayerProgress>, StoreError>;
}

pub trait InventoryStore {
    /// Items owned by the player, newest first.
    fn list_items(&self, user_id: &str) -> Result<Vec<InventoryItem>, StoreError>;
    fn insert_item(&self, item: &InventoryItem) -> Result<(), StoreError>;
    fn update_item(&self, item: &InventoryItem) -> Result<(), StoreError>;
    fn delete_item(&self, item_id: &str) -> Result<(), StoreError>;
}

pub trait CosmeticStore {
    fn list_cosmetics(&self, user_id: &str) -> Result<Vec<CosmeticItem>, StoreError>;
    /// Inserts, or leaves the existing row alone when the player already
    /// owns a cosmetic of that name. Returns the stored row.
    fn upsert_cosmetic(&self, item: &CosmeticItem) -> Result<CosmeticItem, StoreError>;
    fn save_cosmetics(&self, items: &[CosmeticItem]) -> Result<(), StoreError>;
    fn record_lootbox(&self, record: &LootboxRecord) -> Result<(), StoreError>;
    fn lootbox_history(&self, user_id: &str) -> Result<Vec<LootboxRecord>, StoreError>;
}

pub trait LeaderboardStore {
    /// Top players by `total_score`, capped at `LEADERBOARD_LIMIT`.
    fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, StoreError>;
}

/// The full persistence surface a game session needs.
pub trait GameStore:
    ProgressStore + InventoryStore + CosmeticStore + LeaderboardStore + Send + Sync
{
}

impl<T: ProgressStore + InventoryStore + CosmeticStore + LeaderboardStore + Send + Sync> GameStore
    for T
{
}

#[derive(Default)]
struct MemoryTables {
    progress: HashMap<String, PlayerProgress>,
    items: Vec<InventoryItem>,
    cosmetics: Vec<CosmeticItem>,
    lootboxes: Vec<LootboxRecord>,
}

/// In-memory store backing tests and offline play.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn load_progress(&self, user_id: &str) -> Result<Option<PlayerProgress>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables.progress.get(user_id).cloned())
    }

    fn save_progress(&self, progress: &PlayerProgress) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("store poisoned");
        tables
            .progress
            .insert(progress.user_id.clone(), progress.clone());
        Ok(())
    }

    fn all_progress(&self) -> Result<Vec<PlayerProgress>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables.progress.values().cloned().collect())
    }
}

impl InventoryStore for MemoryStore {
    fn list_items(&self, user_id: &str) -> Result<Vec<InventoryItem>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        let mut items: Vec<InventoryItem> = tables
            .items
            .iter()
            .filter(|i| i.owner == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    fn insert_item(&self, item: &InventoryItem) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("store poisoned");
        tables.items.push(item.clone());
        Ok(())
    }

    fn update_item(&self, item: &InventoryItem) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("store poisoned");
        let slot = tables
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| StoreError::NotFound(item.id.clone()))?;
        *slot = item.clone();
        Ok(())
    }

    fn delete_item(&self, item_id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("store poisoned");
        let before = tables.items.len();
        tables.items.retain(|i| i.id != item_id);
        if tables.items.len() == before {
            return Err(StoreError::NotFound(item_id.to_string()));
        }
        Ok(())
    }
}

impl CosmeticStore for MemoryStore {
    fn list_cosmetics(&self, user_id: &str) -> Result<Vec<CosmeticItem>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        let mut cosmetics: Vec<CosmeticItem> = tables
            .cosmetics
            .iter()
            .filter(|c| c.owner == user_id)
            .cloned()
            .collect();
        cosmetics.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cosmetics)
    }

    fn upsert_cosmetic(&self, item: &CosmeticItem) -> Result<CosmeticItem, StoreError> {
        let mut tables = self.tables.lock().expect("store poisoned");
        if let Some(existing) = tables
            .cosmetics
            .iter()
            .find(|c| c.owner == item.owner && c.name == item.name)
        {
            return Ok(existing.clone());
        }
        tables.cosmetics.push(item.clone());
        Ok(item.clone())
    }

    fn save_cosmetics(&self, items: &[CosmeticItem]) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("store poisoned");
        for item in items {
            if let Some(slot) = tables.cosmetics.iter_mut().find(|c| c.id == item.id) {
                *slot = item.clone();
            }
        }
        Ok(())
    }

    fn record_lootbox(&self, record: &LootboxRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("store poisoned");
        tables.lootboxes.push(record.clone());
        Ok(())
    }

    fn lootbox_history(&self, user_id: &str) -> Result<Vec<LootboxRecord>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        let mut history: Vec<LootboxRecord> = tables
            .lootboxes
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        Ok(history)
    }
}

impl LeaderboardStore for MemoryStore {
    fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        let mut entries: Vec<LeaderboardEntry> = tables
            .progress
            .values()
            .map(|p| LeaderboardEntry {
                user_id: p.user_id.clone(),
                current_stage: p.current_stage,
                current_level: p.current_level,
                prestige_level: p.prestige_level,
                total_score: total_score(p),
            })
            .collect();
        entries.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        entries.truncate(LEADERBOARD_LIMIT);
        Ok(entries)
    }
}

pub fn new_lootbox_record(
    user_id: &str,
    tier: LootboxTier,
    rarities: Vec<Rarity>,
    opened_at: i64,
) -> LootboxRecord {
    LootboxRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        tier,
        rarities,
        opened_at,
    }
}

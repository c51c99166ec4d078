use serde::{Deserialize, Serialize};

/// Ten-tier ordinal rarity, lowest to highest. The wire value (and the
/// color key used by clients) is the tier color, matching the stored
/// `rarity_tier` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Gray = 0,
    LightBlue = 1,
    Blue = 2,
    Green = 3,
    Yellow = 4,
    Orange = 5,
    Red = 6,
    Pink = 7,
    Violet = 8,
    Black = 9,
}

pub const RARITY_TIERS: [Rarity; 10] = [
    Rarity::Gray,
    Rarity::LightBlue,
    Rarity::Blue,
    Rarity::Green,
    Rarity::Yellow,
    Rarity::Orange,
    Rarity::Red,
    Rarity::Pink,
    Rarity::Violet,
    Rarity::Black,
];

impl Rarity {
    /// Returns the display name for this rarity tier.
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Gray => "Common",
            Rarity::LightBlue => "Uncommon",
            Rarity::Blue => "Rare",
            Rarity::Green => "Epic",
            Rarity::Yellow => "Legendary",
            Rarity::Orange => "Mythic",
            Rarity::Red => "Exotic",
            Rarity::Pink => "Divine",
            Rarity::Violet => "Celestial",
            Rarity::Black => "Primordial",
        }
    }

    /// Display color for the tier.
    pub fn color(&self) -> &'static str {
        match self {
            Rarity::Gray => "#9ca3af",
            Rarity::LightBlue => "#7dd3fc",
            Rarity::Blue => "#3b82f6",
            Rarity::Green => "#22c55e",
            Rarity::Yellow => "#eab308",
            Rarity::Orange => "#f97316",
            Rarity::Red => "#ef4444",
            Rarity::Pink => "#ec4899",
            Rarity::Violet => "#8b5cf6",
            Rarity::Black => "#18181b",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Tier for an ordinal index, clamped to the top tier.
    pub fn from_index(index: usize) -> Rarity {
        RARITY_TIERS[index.min(RARITY_TIERS.len() - 1)]
    }

    pub fn lowest() -> Rarity {
        Rarity::Gray
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Weapon,
    Upgrade,
}

/// Weapon hand slots. At most one equipped item per slot per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSlot {
    LeftHand,
    RightHand,
}

/// A functional inventory row: a weapon or upgrade drop owned by a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub owner: String,
    pub item_type: ItemType,
    pub name: String,
    pub rarity: Rarity,
    pub damage_bonus: u64,
    pub materials: u64,
    pub equipped: bool,
    pub slot: Option<HandSlot>,
    pub created_at: i64,
}

impl InventoryItem {
    pub fn is_weapon(&self) -> bool {
        self.item_type == ItemType::Weapon
    }
}

//! Harvest - Incremental Harvest-Clicker Game Core
//!
//! This crate holds the full game simulation: enemy generation, click
//! combat, the boss dodge mini-game, loot and crafting, the upgrade and
//! prestige economy, cosmetics and lootboxes, the shared raid boss, and
//! the persistence seams. Rendering and transport live elsewhere.

pub mod combat_logic;
pub mod constants;
pub mod cosmetics;
pub mod dodge_logic;
pub mod enemy;
pub mod equipment;
pub mod error;
pub mod game_state;
pub mod items;
pub mod loot;
pub mod prestige;
pub mod raid;
pub mod save_manager;
pub mod session;
pub mod store;
pub mod upgrades;

#[cfg(feature = "web")]
pub mod web;

pub use combat_logic::CombatEvent;
pub use dodge_logic::{DodgeEvent, DodgeMinigame, DodgePhase};
pub use enemy::{DodgeDirection, Enemy};
pub use error::GameError;
pub use game_state::PlayerProgress;
pub use session::GameSession;

use crate::constants::MAX_LEVEL_PER_STAGE;
use crate::enemy::Enemy;
use crate::game_state::PlayerProgress;
use crate::items::InventoryItem;

/// Events produced by resolving a click attack.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    EnemyDamaged {
        remaining_health: f64,
    },
    EnemyDefeated {
        currency_reward: u64,
        was_boss: bool,
        /// Level the enemy was defeated at, before advancement.
        defeated_level: u32,
    },
    LevelAdvanced {
        stage: u32,
        level: u32,
    },
    /// Boss loot, appended by the session after the defeat roll.
    LootDropped {
        item: InventoryItem,
    },
}

/// Applies one click attack to the current enemy.
///
/// On defeat, credits the enemy's currency and advances progression:
/// level 69 wraps to level 1 of the next stage. The caller regenerates the
/// enemy for the resulting (stage, level) and rolls boss loot.
pub fn resolve_attack(
    progress: &mut PlayerProgress,
    enemy: &mut Enemy,
    damage: f64,
) -> Vec<CombatEvent> {
    let mut events = Vec::new();

    enemy.take_damage(damage);

    if enemy.is_alive() {
        events.push(CombatEvent::EnemyDamaged {
            remaining_health: enemy.health,
        });
        return events;
    }

    let defeated_level = progress.current_level;
    progress.currency += enemy.currency;
    advance_progression(progress);

    events.push(CombatEvent::EnemyDefeated {
        currency_reward: enemy.currency,
        was_boss: enemy.is_boss,
        defeated_level,
    });
    events.push(CombatEvent::LevelAdvanced {
        stage: progress.current_stage,
        level: progress.current_level,
    });
    events
}

/// Advances (stage, level) after a defeat: 69 levels per stage.
pub fn advance_progression(progress: &mut PlayerProgress) {
    if progress.current_level < MAX_LEVEL_PER_STAGE {
        progress.current_level += 1;
    } else {
        progress.current_level = 1;
        progress.current_stage += 1;
    }
}

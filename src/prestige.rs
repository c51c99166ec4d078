use crate::constants::PRESTIGE_MIN_STAGE;
use crate::error::GameError;
use crate::game_state::PlayerProgress;

/// Whether the player has cleared enough stages to prestige.
pub fn can_prestige(progress: &PlayerProgress) -> bool {
    progress.current_stage >= PRESTIGE_MIN_STAGE
}

/// Resets the run in exchange for a permanent multiplier.
///
/// Clears stage, level, currency, owned upgrades, and base attack damage;
/// keeps inventory, crafting materials, and premium currency. The
/// multiplier compounds 1.5x per prestige level.
pub fn perform_prestige(
    progress: &mut PlayerProgress,
    equipped_bonus: u64,
) -> Result<(), GameError> {
    if !can_prestige(progress) {
        return Err(GameError::PrestigeNotReady {
            required: PRESTIGE_MIN_STAGE,
        });
    }

    progress.current_stage = 1;
    progress.current_level = 1;
    progress.currency = 0;
    progress.attack_damage = 0;
    progress.upgrades.clear();

    progress.prestige_level += 1;
    progress.prestige_multiplier = PlayerProgress::multiplier_for_prestige(progress.prestige_level);
    progress.recompute_damage_per_click(equipped_bonus);
    Ok(())
}

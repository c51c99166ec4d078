use thiserror::Error;

/// Local rejections. None of these mutate state; the embedding UI turns
/// them into non-fatal notifications.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("not enough currency: need {needed}, have {have}")]
    InsufficientCurrency { needed: u64, have: u64 },

    #[error("not enough premium currency: need {needed}, have {have}")]
    InsufficientPremium { needed: u64, have: u64 },

    #[error("not enough crafting materials: need {needed}, have {have}")]
    InsufficientMaterials { needed: u64, have: u64 },

    #[error("attacks are locked while a dodge is telegraphing")]
    AttackLocked,

    #[error("unknown upgrade: {0}")]
    UnknownUpgrade(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("prestige requires reaching stage {required}")]
    PrestigeNotReady { required: u32 },
}

use crate::constants::SAVE_VERSION_MAGIC;
use crate::cosmetics::CosmeticItem;
use crate::game_state::PlayerProgress;
use crate::items::InventoryItem;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::PathBuf;

const MAGIC_LEN: usize = 8;
const CHECKSUM_LEN: usize = 32;

/// Everything an offline session restores on a cold start. Progress,
/// inventory, and cosmetics are captured in one snapshot so a save can
/// never pair a spent currency balance with the pre-purchase inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    pub progress: PlayerProgress,
    pub inventory: Vec<InventoryItem>,
    pub cosmetics: Vec<CosmeticItem>,
    pub saved_at: i64,
}

impl SaveSnapshot {
    pub fn new(
        progress: PlayerProgress,
        inventory: Vec<InventoryItem>,
        cosmetics: Vec<CosmeticItem>,
        saved_at: i64,
    ) -> Self {
        Self {
            progress,
            inventory,
            cosmetics,
            saved_at,
        }
    }
}

/// Reads and writes the local save file.
///
/// On-disk layout: version magic (8 bytes), bincode payload, then a
/// SHA-256 checksum over magic + payload (32 bytes). The payload length
/// is implied by the file size.
pub struct SaveManager {
    save_path: PathBuf,
}

impl SaveManager {
    /// Save file in the platform config directory.
    pub fn new() -> io::Result<Self> {
        let project_dirs = ProjectDirs::from("", "", "harvest").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine config directory")
        })?;
        let config_dir = project_dirs.config_dir();
        fs::create_dir_all(config_dir)?;
        Ok(Self::at_path(config_dir.join("save.dat")))
    }

    /// Save file at an explicit path.
    pub fn at_path(save_path: impl Into<PathBuf>) -> Self {
        Self {
            save_path: save_path.into(),
        }
    }

    pub fn save(&self, snapshot: &SaveSnapshot) -> io::Result<()> {
        let payload = bincode::serialize(snapshot)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut buf = Vec::with_capacity(MAGIC_LEN + payload.len() + CHECKSUM_LEN);
        buf.extend_from_slice(&SAVE_VERSION_MAGIC.to_le_bytes());
        buf.extend_from_slice(&payload);
        let checksum = digest(&buf);
        buf.extend_from_slice(&checksum);

        fs::write(&self.save_path, buf)
    }

    /// Rejects truncated files, checksum mismatches, and unknown version
    /// magic before attempting deserialization.
    pub fn load(&self) -> io::Result<SaveSnapshot> {
        let raw = fs::read(&self.save_path)?;
        if raw.len() < MAGIC_LEN + CHECKSUM_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Save file truncated",
            ));
        }

        let (body, stored_checksum) = raw.split_at(raw.len() - CHECKSUM_LEN);
        let computed = digest(body);
        if computed.as_slice() != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Checksum verification failed",
            ));
        }

        let (magic, payload) = body.split_at(MAGIC_LEN);
        let expected_magic = SAVE_VERSION_MAGIC.to_le_bytes();
        if magic != expected_magic.as_slice() {
            let mut found = [0u8; MAGIC_LEN];
            found.copy_from_slice(magic);
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Invalid save version: expected 0x{:016X}, got 0x{:016X}",
                    SAVE_VERSION_MAGIC,
                    u64::from_le_bytes(found)
                ),
            ));
        }

        bincode::deserialize(payload).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn save_exists(&self) -> bool {
        self.save_path.exists()
    }
}

fn digest(bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

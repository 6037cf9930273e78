use super::meta::MetaStore;
use crate::config::AppConfig;
use crate::error::BackupError;
use crate::folder_name::SaveSlot;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One row in the backup listing payload.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BackupEntry {
    /// The backup folder name on disk.
    pub folder_name: String,
    /// The folder's timestamp component.
    pub timestamp: String,
    /// The save slot, as the API's string form.
    pub slot: String,
    /// The display name (descriptor's original name, or derived from the folder).
    pub name: String,
    /// How many times this backup has been restored.
    pub restore_count: u32,
}

/// Outcome of a successful backup creation.
#[derive(Debug, Clone)]
pub struct CreatedBackup {
    pub folder_name: String,
    pub original_name: String,
    pub items_copied: Vec<String>,
    pub warnings: Vec<String>,
}

/// Outcome of a successful restore.
#[derive(Debug, Clone)]
pub struct RestoredBackup {
    pub items_restored: Vec<String>,
    pub warnings: Vec<String>,
}

/// Outcome of a successful rename.
#[derive(Debug, Clone)]
pub struct RenamedBackup {
    pub new_display_name: String,
    pub new_folder_name: String,
}

/// Owns the on-disk folder convention and all file copy operations for one
/// save directory / backup root pair.
///
/// Each operation performs its filesystem mutation first and its metadata
/// mutation second; a crash in between leaves an inconsistency the next
/// reconciliation repairs.
pub struct BackupManager {
    pub(crate) source_dir: PathBuf,
    pub(crate) backup_root: PathBuf,
    pub(crate) store: MetaStore,
}

impl BackupManager {
    pub fn new(config: &AppConfig) -> BackupManager {
        BackupManager {
            source_dir: config.source_folder.clone(),
            backup_root: config.backup_folder.clone(),
            store: MetaStore::new(&config.backup_folder),
        }
    }

    /// Brings `meta.json` in line with the folders on disk. Run once at startup.
    pub fn reconcile(&self) -> Result<bool, BackupError> {
        self.store.reconcile()
    }
}

/// Name of the per-slot restore point folder the game maintains.
pub(crate) fn restore_points_dir_name(slot: SaveSlot) -> String {
    format!("Restore_Points{}", slot)
}

/// Finds the save files belonging to a slot (`user<N>*`) in the given directory.
pub(crate) fn find_slot_files(dir: &Path, slot: SaveSlot) -> Result<Vec<PathBuf>, BackupError> {
    let pattern = format!("{}/user{}*", glob::Pattern::escape(&dir.to_string_lossy()), slot);
    let entries = glob::glob(&pattern)
        .map_err(|e| BackupError::Validation(format!("Invalid save file pattern: {}", e)))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("Skipping unreadable entry while matching save files: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

/// Rejects folder names that are empty or could escape the backup root.
pub(crate) fn guard_folder_name(folder_name: &str) -> Result<(), BackupError> {
    if folder_name.is_empty()
        || folder_name == "."
        || folder_name == ".."
        || folder_name.contains(['/', '\\'])
    {
        return Err(BackupError::Validation(
            "Invalid backup folder name provided".to_string(),
        ));
    }
    Ok(())
}

use super::data::{find_slot_files, restore_points_dir_name, BackupManager, CreatedBackup};
use super::meta::BackupMeta;
use crate::error::BackupError;
use crate::folder_name::{BackupFolderName, SaveSlot};
use chrono::Local;
use std::fs;

impl BackupManager {
    /// Creates a timestamped backup of one save slot.
    ///
    /// Every `user<slot>*` file in the source directory is copied into a new
    /// backup folder, followed by the slot's restore point folder if present.
    /// Per-item copy failures are collected as warnings rather than failing
    /// the operation; the backup exists once the folder and descriptor do.
    pub fn create_backup(&self, name: &str, slot: &str) -> Result<CreatedBackup, BackupError> {
        let slot = SaveSlot::parse(slot)
            .ok_or_else(|| BackupError::Validation("Invalid save slot provided".to_string()))?;
        let display_name = name.trim();
        if display_name.is_empty() {
            return Err(BackupError::Validation(
                "Invalid backup name provided".to_string(),
            ));
        }

        let files = find_slot_files(&self.source_dir, slot)?;
        if files.is_empty() {
            return Err(BackupError::NotFound(format!(
                "No save files found for slot {}",
                slot
            )));
        }

        let folder = BackupFolderName::compose(display_name, slot, Local::now());
        let folder_name = folder.to_string();
        let target_dir = self.backup_root.join(&folder_name);
        fs::create_dir_all(&target_dir)
            .map_err(|e| BackupError::io("Failed to create backup folder", e))?;

        let mut items_copied = Vec::new();
        let mut warnings = Vec::new();

        for file in &files {
            let file_name = match file.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };
            match fs::copy(file, target_dir.join(&file_name)) {
                Ok(_) => {
                    tracing::info!("Copied: {}", file_name);
                    items_copied.push(file_name);
                }
                Err(e) => warnings.push(format!("Failed to copy {}: {}", file_name, e)),
            }
        }

        let restore_dir = restore_points_dir_name(slot);
        let restore_src = self.source_dir.join(&restore_dir);
        if restore_src.is_dir() {
            let mut opts = fs_extra::dir::CopyOptions::new();
            opts.copy_inside = true;
            match fs_extra::dir::copy(&restore_src, target_dir.join(&restore_dir), &opts) {
                Ok(_) => {
                    tracing::info!("Copied: {}/", restore_dir);
                    items_copied.push(format!("{}/", restore_dir));
                }
                Err(e) => warnings.push(format!("Failed to copy {}: {}", restore_dir, e)),
            }
        }

        let mut meta = self.store.load();
        meta.insert(
            folder_name.clone(),
            BackupMeta {
                original_name: display_name.to_string(),
                timestamp: folder.timestamp.clone(),
                restore_count: 0,
            },
        );
        self.store.save(&meta)?;

        Ok(CreatedBackup {
            folder_name,
            original_name: display_name.to_string(),
            items_copied,
            warnings,
        })
    }
}

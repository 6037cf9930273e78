use super::data::{
    find_slot_files, guard_folder_name, restore_points_dir_name, BackupManager, RestoredBackup,
};
use crate::error::BackupError;
use crate::folder_name::SaveSlot;
use std::fs;
use std::path::Path;

impl BackupManager {
    /// Restores a backup's files into the live save directory.
    ///
    /// Matched `user<slot>*` files overwrite their live counterparts one by
    /// one; the slot's restore point folder, when the backup carries one,
    /// replaces the live folder wholesale. Per-item failures become warnings.
    pub fn restore_backup(&self, folder_name: &str, slot: &str) -> Result<RestoredBackup, BackupError> {
        let slot = SaveSlot::parse(slot)
            .ok_or_else(|| BackupError::Validation("Invalid save slot provided".to_string()))?;
        guard_folder_name(folder_name)?;

        let backup_path = self.backup_root.join(folder_name);
        if !backup_path.is_dir() {
            return Err(BackupError::NotFound("Backup folder not found".to_string()));
        }

        let mut items_restored = Vec::new();
        let mut warnings = Vec::new();

        for file in find_slot_files(&backup_path, slot)? {
            let file_name = match file.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };
            match fs::copy(&file, self.source_dir.join(&file_name)) {
                Ok(_) => {
                    tracing::info!("Restored: {}", file_name);
                    items_restored.push(file_name);
                }
                Err(e) => warnings.push(format!("Failed to restore {}: {}", file_name, e)),
            }
        }

        let restore_dir = restore_points_dir_name(slot);
        let restore_src = backup_path.join(&restore_dir);
        if restore_src.is_dir() {
            // Replaced wholly, never merged: restore points must reflect
            // exactly the backed-up state.
            match replace_dir(&restore_src, &self.source_dir.join(&restore_dir)) {
                Ok(()) => {
                    tracing::info!("Restored: {}/", restore_dir);
                    items_restored.push(format!("{}/", restore_dir));
                }
                Err(e) => warnings.push(format!("Failed to restore {}: {}", restore_dir, e)),
            }
        }

        let mut meta = self.store.load();
        if let Some(entry) = meta.get_mut(folder_name) {
            entry.restore_count += 1;
            self.store.save(&meta)?;
        }

        Ok(RestoredBackup {
            items_restored,
            warnings,
        })
    }
}

/// Deletes `target` if present, then copies `src` in its place.
fn replace_dir(src: &Path, target: &Path) -> Result<(), String> {
    if target.exists() {
        fs::remove_dir_all(target).map_err(|e| e.to_string())?;
    }
    let mut opts = fs_extra::dir::CopyOptions::new();
    opts.copy_inside = true;
    fs_extra::dir::copy(src, target, &opts).map_err(|e| e.to_string())?;
    Ok(())
}

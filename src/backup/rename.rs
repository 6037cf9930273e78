use super::data::{guard_folder_name, BackupManager, RenamedBackup};
use crate::error::BackupError;
use crate::folder_name::{sanitize_label, BackupFolderName};
use std::fs;

impl BackupManager {
    /// Renames a backup's display name, moving the folder when the sanitized
    /// label changes.
    ///
    /// The timestamp and slot components are kept; only the label part of the
    /// folder name is recomputed from the new name. When sanitization
    /// collapses the new name onto the current folder name, only the
    /// descriptor's original name is updated.
    pub fn rename_backup(&self, folder_name: &str, new_name: &str) -> Result<RenamedBackup, BackupError> {
        guard_folder_name(folder_name)?;
        let display_name = new_name.trim();
        if display_name.is_empty() {
            return Err(BackupError::Validation(
                "Invalid new backup name provided".to_string(),
            ));
        }

        let backup_path = self.backup_root.join(folder_name);
        if !backup_path.is_dir() {
            return Err(BackupError::NotFound("Backup folder not found".to_string()));
        }

        let parsed = BackupFolderName::parse(folder_name).ok_or_else(|| {
            BackupError::Format(
                "Backup folder name does not match the expected format".to_string(),
            )
        })?;

        let new_folder = BackupFolderName {
            timestamp: parsed.timestamp,
            slot: parsed.slot,
            label: sanitize_label(display_name),
        };
        let new_folder_name = new_folder.to_string();

        if new_folder_name == folder_name {
            let mut meta = self.store.load();
            if let Some(entry) = meta.get_mut(folder_name) {
                entry.original_name = display_name.to_string();
                self.store.save(&meta)?;
            }
            return Ok(RenamedBackup {
                new_display_name: display_name.to_string(),
                new_folder_name,
            });
        }

        // Same sanitized label under a different timestamp or slot is fine;
        // only an exact folder name collision is rejected.
        if self.backup_root.join(&new_folder_name).exists() {
            return Err(BackupError::Conflict(
                "A backup with this name already exists for the same timestamp and slot"
                    .to_string(),
            ));
        }

        fs::rename(&backup_path, self.backup_root.join(&new_folder_name))
            .map_err(|e| BackupError::io("Failed to rename backup folder", e))?;
        tracing::info!("Renamed folder: {} -> {}", folder_name, new_folder_name);

        let mut meta = self.store.load();
        if let Some(mut entry) = meta.remove(folder_name) {
            entry.original_name = display_name.to_string();
            meta.insert(new_folder_name.clone(), entry);
            self.store.save(&meta)?;
        }

        Ok(RenamedBackup {
            new_display_name: display_name.to_string(),
            new_folder_name,
        })
    }
}

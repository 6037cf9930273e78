use super::data::{BackupEntry, BackupManager};
use crate::error::BackupError;
use crate::folder_name::BackupFolderName;
use std::fs;

impl BackupManager {
    /// Lists all backups under the backup root, newest first.
    ///
    /// Folders that do not follow the naming convention are ignored. Backups
    /// without a descriptor are listed with a display name derived from the
    /// folder and a restore count of zero.
    pub fn get_backups(&self) -> Result<Vec<BackupEntry>, BackupError> {
        if !self.backup_root.exists() {
            return Ok(Vec::new());
        }

        let meta = self.store.load();
        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_root)
            .map_err(|e| BackupError::io("Failed to read backup folder", e))?
        {
            let entry = entry.map_err(|e| BackupError::io("Failed to read backup folder", e))?;
            if !entry.path().is_dir() {
                continue;
            }
            let folder_name = entry.file_name().to_string_lossy().to_string();
            let Some(parsed) = BackupFolderName::parse(&folder_name) else {
                continue;
            };

            let (name, restore_count) = match meta.get(&folder_name) {
                Some(descriptor) => (descriptor.original_name.clone(), descriptor.restore_count),
                None => (parsed.fallback_display_name(), 0),
            };

            backups.push(BackupEntry {
                folder_name,
                timestamp: parsed.timestamp,
                slot: parsed.slot.to_string(),
                name,
                restore_count,
            });
        }

        // Sort by timestamp desc
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(backups)
    }
}

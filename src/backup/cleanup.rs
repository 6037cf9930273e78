use super::data::{guard_folder_name, BackupManager};
use crate::error::BackupError;
use std::fs;

impl BackupManager {
    /// Deletes a backup folder and its descriptor.
    pub fn delete_backup(&self, folder_name: &str) -> Result<(), BackupError> {
        guard_folder_name(folder_name)?;

        let backup_path = self.backup_root.join(folder_name);
        if !backup_path.exists() {
            return Err(BackupError::NotFound("Backup folder not found".to_string()));
        }

        // Safety check: only directories are ever removed.
        if !backup_path.is_dir() {
            return Err(BackupError::Validation(
                "Path is not a directory".to_string(),
            ));
        }

        fs::remove_dir_all(&backup_path)
            .map_err(|e| BackupError::io("Failed to delete backup folder", e))?;
        tracing::info!("Deleted backup: {}", folder_name);

        let mut meta = self.store.load();
        if meta.remove(folder_name).is_some() {
            self.store.save(&meta)?;
        }

        Ok(())
    }
}

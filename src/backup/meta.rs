use crate::error::BackupError;
use crate::folder_name::BackupFolderName;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) const META_FILE_NAME: &str = "meta.json";

/// Descriptor stored for one backup folder.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    /// The untransformed user-supplied label, kept for display.
    pub original_name: String,
    /// Duplicate of the folder's timestamp component.
    pub timestamp: String,
    /// How many times this backup has been restored.
    #[serde(default)]
    pub restore_count: u32,
}

/// The full descriptor map, keyed by backup folder name.
pub type MetaMap = HashMap<String, BackupMeta>;

/// Owns the `meta.json` document at the backup root.
///
/// No other component reads or writes the file directly. Callers
/// read-modify-write the map; the file is overwritten whole on save.
pub struct MetaStore {
    backup_root: PathBuf,
}

impl MetaStore {
    pub fn new(backup_root: &Path) -> MetaStore {
        MetaStore {
            backup_root: backup_root.to_path_buf(),
        }
    }

    fn meta_path(&self) -> PathBuf {
        self.backup_root.join(META_FILE_NAME)
    }

    /// Loads the descriptor map.
    ///
    /// A missing or unparseable file degrades to an empty map; backups stay
    /// usable, just unlabeled until the next reconciliation.
    pub fn load(&self) -> MetaMap {
        let path = self.meta_path();
        if path.exists() {
            if let Ok(content) = fs::read_to_string(&path) {
                match serde_json::from_str(&content) {
                    Ok(map) => return map,
                    Err(e) => {
                        tracing::warn!("Failed to parse {:?}, treating as empty: {}", path, e)
                    }
                }
            }
        }
        MetaMap::new()
    }

    /// Serializes the full map as formatted JSON, creating the backup root if needed.
    pub fn save(&self, map: &MetaMap) -> Result<(), BackupError> {
        fs::create_dir_all(&self.backup_root)
            .map_err(|e| BackupError::io("Failed to create backup folder", e))?;
        let content = serde_json::to_string_pretty(map)
            .map_err(|e| BackupError::io("Failed to serialize metadata", e.into()))?;
        fs::write(self.meta_path(), content)
            .map_err(|e| BackupError::io("Failed to write metadata", e))
    }

    /// Aligns the descriptor map with the set of backup folders on disk.
    ///
    /// Folders without a descriptor get one synthesized from their name;
    /// descriptors whose folder is gone are dropped. Persists only when
    /// something changed and returns whether it did. Safe to re-run.
    pub fn reconcile(&self) -> Result<bool, BackupError> {
        fs::create_dir_all(&self.backup_root)
            .map_err(|e| BackupError::io("Failed to create backup folder", e))?;

        let mut meta = self.load();
        let mut changed = false;

        let mut on_disk = HashSet::new();
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

            if !meta.contains_key(&folder_name) {
                tracing::info!("Adding descriptor for existing backup {}", folder_name);
                meta.insert(
                    folder_name.clone(),
                    BackupMeta {
                        original_name: parsed.fallback_display_name(),
                        timestamp: parsed.timestamp,
                        restore_count: 0,
                    },
                );
                changed = true;
            }
            on_disk.insert(folder_name);
        }

        let before = meta.len();
        meta.retain(|folder_name, _| {
            let keep = on_disk.contains(folder_name);
            if !keep {
                tracing::info!("Dropping descriptor for missing backup {}", folder_name);
            }
            keep
        });
        if meta.len() != before {
            changed = true;
        }

        if changed {
            self.save(&meta)?;
        }
        Ok(changed)
    }
}

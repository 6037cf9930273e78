#[cfg(test)]
mod tests {
    use crate::backup::meta::{BackupMeta, MetaMap, MetaStore, META_FILE_NAME};
    use crate::backup::BackupManager;
    use crate::config::AppConfig;
    use crate::error::BackupError;
    use crate::folder_name::BackupFolderName;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    /// Builds a manager over a fresh source/backup directory pair.
    fn test_manager() -> (TempDir, BackupManager) {
        let dir = tempdir().unwrap();
        let source = dir.path().join("saves");
        fs::create_dir_all(&source).unwrap();

        let config = AppConfig {
            source_folder: source,
            backup_folder: dir.path().join("Save Backups"),
            port: 0,
        };
        (dir, BackupManager::new(&config))
    }

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        writeln!(f, "{}", content).unwrap();
    }

    /// Tests that created folder names follow the naming convention.
    #[test]
    fn test_create_backup_folder_name_shape() {
        let (_dir, manager) = test_manager();
        write_file(&manager.source_dir, "user2.dat", "save data");

        let created = manager.create_backup("My Save", "2").unwrap();

        let parsed = BackupFolderName::parse(&created.folder_name).unwrap();
        assert_eq!(parsed.slot.get(), 2);
        assert_eq!(parsed.label, "my_save");
        assert!(parsed
            .label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));

        assert!(manager.backup_root.join(&created.folder_name).is_dir());
        assert_eq!(created.original_name, "My Save");
        assert_eq!(created.items_copied, vec!["user2.dat"]);
        assert!(created.warnings.is_empty());
    }

    /// Tests input validation for slot and name.
    #[test]
    fn test_create_backup_validation() {
        let (_dir, manager) = test_manager();
        write_file(&manager.source_dir, "user1.dat", "data");

        assert!(matches!(
            manager.create_backup("ok", "5"),
            Err(BackupError::Validation(_))
        ));
        assert!(matches!(
            manager.create_backup("ok", "01"),
            Err(BackupError::Validation(_))
        ));
        assert!(matches!(
            manager.create_backup("   ", "1"),
            Err(BackupError::Validation(_))
        ));
    }

    /// Tests that a slot without save files cannot be backed up.
    #[test]
    fn test_create_backup_without_save_files() {
        let (_dir, manager) = test_manager();
        write_file(&manager.source_dir, "user1.dat", "data");

        assert!(matches!(
            manager.create_backup("nothing here", "3"),
            Err(BackupError::NotFound(_))
        ));
    }

    /// Tests the full create flow: matched files, restore points, descriptor.
    #[test]
    fn test_create_backup_copies_slot_files_and_restore_points() {
        let (_dir, manager) = test_manager();
        write_file(&manager.source_dir, "user2.dat", "main");
        write_file(&manager.source_dir, "user2.dat.bak", "bak");
        write_file(&manager.source_dir, "user1.dat", "other slot");

        let points = manager.source_dir.join("Restore_Points2");
        fs::create_dir_all(points.join("auto1")).unwrap();
        write_file(&points.join("auto1"), "user2.dat", "point");

        let created = manager.create_backup("Before Boss", "2").unwrap();

        assert_eq!(
            created.items_copied,
            vec!["user2.dat", "user2.dat.bak", "Restore_Points2/"]
        );

        let target = manager.backup_root.join(&created.folder_name);
        assert!(target.join("user2.dat").exists());
        assert!(target.join("user2.dat.bak").exists());
        assert!(target.join("Restore_Points2").join("auto1").join("user2.dat").exists());
        // Other slots are untouched
        assert!(!target.join("user1.dat").exists());

        // Descriptor was written with the untransformed name
        let meta = MetaStore::new(&manager.backup_root).load();
        let descriptor = meta.get(&created.folder_name).unwrap();
        assert_eq!(descriptor.original_name, "Before Boss");
        assert_eq!(descriptor.restore_count, 0);
    }

    /// Tests the listing round trip after a create.
    #[test]
    fn test_listing_round_trip() {
        let (_dir, manager) = test_manager();
        write_file(&manager.source_dir, "user2.dat", "data");

        let created = manager.create_backup("My Save", "2").unwrap();

        // Folders outside the naming convention are ignored
        fs::create_dir_all(manager.backup_root.join("not-a-backup")).unwrap();

        let backups = manager.get_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].folder_name, created.folder_name);
        assert_eq!(backups[0].slot, "2");
        assert_eq!(backups[0].name, "My Save");
        assert_eq!(backups[0].restore_count, 0);
    }

    /// Tests that listing sorts by timestamp descending.
    #[test]
    fn test_listing_sorted_newest_first() {
        let (_dir, manager) = test_manager();
        for folder in [
            "2023-05-01-10-00-00_slot1_old",
            "2025-02-01-08-30-00_slot2_newest",
            "2024-11-04-14-30-15_slot1_middle",
        ] {
            fs::create_dir_all(manager.backup_root.join(folder)).unwrap();
        }

        let backups = manager.get_backups().unwrap();
        let names: Vec<&str> = backups.iter().map(|b| b.folder_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "2025-02-01-08-30-00_slot2_newest",
                "2024-11-04-14-30-15_slot1_middle",
                "2023-05-01-10-00-00_slot1_old",
            ]
        );
    }

    /// Tests that an empty or missing backup root lists as empty.
    #[test]
    fn test_listing_without_backup_root() {
        let (_dir, manager) = test_manager();
        assert!(manager.get_backups().unwrap().is_empty());
    }

    /// Tests restore: files come back, and the counter increments per restore.
    #[test]
    fn test_restore_increments_counter() {
        let (_dir, manager) = test_manager();
        write_file(&manager.source_dir, "user3.dat", "original");

        let created = manager.create_backup("Checkpoint", "3").unwrap();

        // Corrupt the live file
        write_file(&manager.source_dir, "user3.dat", "corrupted");

        for _ in 0..3 {
            let restored = manager.restore_backup(&created.folder_name, "3").unwrap();
            assert_eq!(restored.items_restored, vec!["user3.dat"]);
            assert!(restored.warnings.is_empty());
        }

        let content = fs::read_to_string(manager.source_dir.join("user3.dat")).unwrap();
        assert_eq!(content.trim(), "original");

        let backups = manager.get_backups().unwrap();
        assert_eq!(backups[0].restore_count, 3);
    }

    /// Tests that the live restore point folder is replaced, not merged.
    #[test]
    fn test_restore_replaces_restore_points_wholly() {
        let (_dir, manager) = test_manager();
        write_file(&manager.source_dir, "user1.dat", "save");

        let old_points = manager.source_dir.join("Restore_Points1");
        fs::create_dir_all(&old_points).unwrap();
        write_file(&old_points, "from_backup.dat", "keep me");

        let created = manager.create_backup("With Points", "1").unwrap();

        // The live folder diverges after the backup
        fs::remove_dir_all(&old_points).unwrap();
        fs::create_dir_all(&old_points).unwrap();
        write_file(&old_points, "newer.dat", "drop me");

        let restored = manager.restore_backup(&created.folder_name, "1").unwrap();
        assert!(restored.items_restored.contains(&"Restore_Points1/".to_string()));

        assert!(old_points.join("from_backup.dat").exists());
        assert!(!old_points.join("newer.dat").exists());
    }

    /// Tests restore failure modes: missing backup and invalid folder names.
    #[test]
    fn test_restore_missing_backup() {
        let (_dir, manager) = test_manager();

        assert!(matches!(
            manager.restore_backup("2024-11-04-14-30-15_slot2_gone", "2"),
            Err(BackupError::NotFound(_))
        ));
        assert!(matches!(
            manager.restore_backup("../escape", "2"),
            Err(BackupError::Validation(_))
        ));
        assert!(matches!(
            manager.restore_backup("", "2"),
            Err(BackupError::Validation(_))
        ));
    }

    /// Tests that restoring a backup without a descriptor succeeds and does
    /// not synthesize one.
    #[test]
    fn test_restore_without_descriptor_skips_metadata() {
        let (_dir, manager) = test_manager();
        let folder = "2024-11-04-14-30-15_slot1_manual_copy";
        let backup_path = manager.backup_root.join(folder);
        fs::create_dir_all(&backup_path).unwrap();
        write_file(&backup_path, "user1.dat", "from backup");

        let restored = manager.restore_backup(folder, "1").unwrap();
        assert_eq!(restored.items_restored, vec!["user1.dat"]);
        assert!(manager.source_dir.join("user1.dat").exists());

        let meta = MetaStore::new(&manager.backup_root).load();
        assert!(!meta.contains_key(folder));
    }

    /// Tests rename: folder moves, descriptor key follows, counter survives.
    #[test]
    fn test_rename_moves_folder_and_descriptor() {
        let (_dir, manager) = test_manager();
        write_file(&manager.source_dir, "user4.dat", "data");

        let created = manager.create_backup("First Try", "4").unwrap();
        manager.restore_backup(&created.folder_name, "4").unwrap();

        let renamed = manager.rename_backup(&created.folder_name, "Second Try").unwrap();
        assert_eq!(renamed.new_display_name, "Second Try");
        assert!(renamed.new_folder_name.ends_with("_slot4_second_try"));

        assert!(!manager.backup_root.join(&created.folder_name).exists());
        assert!(manager.backup_root.join(&renamed.new_folder_name).is_dir());

        let meta = MetaStore::new(&manager.backup_root).load();
        assert!(!meta.contains_key(&created.folder_name));
        let descriptor = meta.get(&renamed.new_folder_name).unwrap();
        assert_eq!(descriptor.original_name, "Second Try");
        assert_eq!(descriptor.restore_count, 1);

        // Timestamp component is unchanged
        let old = BackupFolderName::parse(&created.folder_name).unwrap();
        let new = BackupFolderName::parse(&renamed.new_folder_name).unwrap();
        assert_eq!(old.timestamp, new.timestamp);
    }

    /// Tests that a rename collapsing to the same folder name only updates
    /// the descriptor.
    #[test]
    fn test_rename_same_sanitized_name_updates_descriptor_only() {
        let (_dir, manager) = test_manager();
        write_file(&manager.source_dir, "user1.dat", "data");

        let created = manager.create_backup("My Save", "1").unwrap();
        let renamed = manager.rename_backup(&created.folder_name, "MY SAVE").unwrap();

        assert_eq!(renamed.new_folder_name, created.folder_name);
        assert!(manager.backup_root.join(&created.folder_name).is_dir());

        let meta = MetaStore::new(&manager.backup_root).load();
        assert_eq!(meta.get(&created.folder_name).unwrap().original_name, "MY SAVE");
    }

    /// Tests that a rename colliding with an existing folder is rejected and
    /// both folders are left untouched.
    #[test]
    fn test_rename_collision_is_conflict() {
        let (_dir, manager) = test_manager();
        let alpha = "2024-11-04-14-30-15_slot2_alpha";
        let beta = "2024-11-04-14-30-15_slot2_beta";
        fs::create_dir_all(manager.backup_root.join(alpha)).unwrap();
        fs::create_dir_all(manager.backup_root.join(beta)).unwrap();

        assert!(matches!(
            manager.rename_backup(alpha, "Beta"),
            Err(BackupError::Conflict(_))
        ));
        assert!(manager.backup_root.join(alpha).is_dir());
        assert!(manager.backup_root.join(beta).is_dir());
    }

    /// Tests that renaming a folder outside the naming convention fails with
    /// a format error.
    #[test]
    fn test_rename_rejects_malformed_folder_name() {
        let (_dir, manager) = test_manager();
        fs::create_dir_all(manager.backup_root.join("garbage")).unwrap();

        assert!(matches!(
            manager.rename_backup("garbage", "new name"),
            Err(BackupError::Format(_))
        ));
        assert!(matches!(
            manager.rename_backup("2024-11-04-14-30-15_slot1_gone", "x"),
            Err(BackupError::NotFound(_))
        ));
        assert!(matches!(
            manager.rename_backup("2024-11-04-14-30-15_slot1_ok", "   "),
            Err(BackupError::Validation(_))
        ));
    }

    /// Tests that deletion removes both the folder and its descriptor.
    #[test]
    fn test_delete_removes_folder_and_descriptor() {
        let (_dir, manager) = test_manager();
        write_file(&manager.source_dir, "user2.dat", "data");

        let created = manager.create_backup("Doomed", "2").unwrap();
        manager.delete_backup(&created.folder_name).unwrap();

        assert!(!manager.backup_root.join(&created.folder_name).exists());
        let meta = MetaStore::new(&manager.backup_root).load();
        assert!(!meta.contains_key(&created.folder_name));
    }

    /// Tests deletion failure modes.
    #[test]
    fn test_delete_missing_backup() {
        let (_dir, manager) = test_manager();

        assert!(matches!(
            manager.delete_backup("2024-11-04-14-30-15_slot1_gone"),
            Err(BackupError::NotFound(_))
        ));
        assert!(matches!(
            manager.delete_backup("../../etc"),
            Err(BackupError::Validation(_))
        ));
    }

    /// Tests that reconciliation synthesizes missing descriptors, prunes
    /// stale ones, and is idempotent.
    #[test]
    fn test_reconcile_aligns_metadata_with_disk() {
        let (_dir, manager) = test_manager();
        let store = MetaStore::new(&manager.backup_root);

        // 1. A folder with no descriptor, and a descriptor with no folder
        let orphan_folder = "2024-11-04-14-30-15_slot3_lost_run";
        fs::create_dir_all(manager.backup_root.join(orphan_folder)).unwrap();

        let mut map = MetaMap::new();
        map.insert(
            "2024-01-01-00-00-00_slot1_deleted_elsewhere".to_string(),
            BackupMeta {
                original_name: "Deleted Elsewhere".to_string(),
                timestamp: "2024-01-01-00-00-00".to_string(),
                restore_count: 5,
            },
        );
        store.save(&map).unwrap();

        // 2. First pass repairs both directions
        assert!(manager.reconcile().unwrap());

        let meta = store.load();
        assert_eq!(meta.len(), 1);
        let synthesized = meta.get(orphan_folder).unwrap();
        assert_eq!(synthesized.original_name, "lost run");
        assert_eq!(synthesized.timestamp, "2024-11-04-14-30-15");
        assert_eq!(synthesized.restore_count, 0);

        // 3. Second pass with no filesystem changes mutates nothing
        assert!(!manager.reconcile().unwrap());
        assert_eq!(store.load(), meta);
    }

    /// Tests that reconciliation creates the backup root when missing.
    #[test]
    fn test_reconcile_creates_backup_root() {
        let (_dir, manager) = test_manager();
        assert!(!manager.backup_root.exists());

        assert!(!manager.reconcile().unwrap());
        assert!(manager.backup_root.is_dir());
    }

    /// Tests that corrupt metadata still lists backups under fallback names.
    #[test]
    fn test_corrupt_metadata_degrades_to_fallback_names() {
        let (_dir, manager) = test_manager();
        let folder = "2024-11-04-14-30-15_slot2_before_boss";
        fs::create_dir_all(manager.backup_root.join(folder)).unwrap();
        fs::write(manager.backup_root.join(META_FILE_NAME), "{ broken").unwrap();

        let backups = manager.get_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].name, "before boss");
        assert_eq!(backups[0].restore_count, 0);
    }
}

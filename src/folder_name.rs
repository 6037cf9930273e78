use chrono::{DateTime, Local};
use std::fmt;

/// Format of the timestamp component of a backup folder name.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// One of the four save slots the game manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveSlot(u8);

impl SaveSlot {
    /// Parses a slot from its API string form.
    ///
    /// Only the exact strings `"1"` through `"4"` are accepted.
    ///
    /// # Arguments
    ///
    /// * `s` - The slot string to parse.
    ///
    /// # Returns
    ///
    /// * `Option<SaveSlot>` - The slot if valid, or None.
    pub fn parse(s: &str) -> Option<SaveSlot> {
        match s {
            "1" => Some(SaveSlot(1)),
            "2" => Some(SaveSlot(2)),
            "3" => Some(SaveSlot(3)),
            "4" => Some(SaveSlot(4)),
            _ => None,
        }
    }

    /// Returns the slot number.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SaveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The structured form of a backup folder name.
///
/// Folder names on disk follow `<timestamp>_slot<N>_<label>`; this type is the
/// single place where that string form is parsed and produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFolderName {
    /// Local creation time formatted as `YYYY-MM-DD-HH-MM-SS`.
    pub timestamp: String,
    /// The save slot the backup belongs to.
    pub slot: SaveSlot,
    /// The sanitized user label (lowercase, `_` for spaces and reserved characters).
    pub label: String,
}

impl BackupFolderName {
    /// Builds a folder name for a new backup from a display name and creation time.
    pub fn compose(display_name: &str, slot: SaveSlot, created: DateTime<Local>) -> BackupFolderName {
        BackupFolderName {
            timestamp: created.format(TIMESTAMP_FORMAT).to_string(),
            slot,
            label: sanitize_label(display_name),
        }
    }

    /// Parses a folder name string into its components.
    ///
    /// # Arguments
    ///
    /// * `folder` - The folder name to parse.
    ///
    /// # Returns
    ///
    /// * `Option<BackupFolderName>` - The parsed name, or None when the folder
    ///   does not follow the backup naming convention.
    pub fn parse(folder: &str) -> Option<BackupFolderName> {
        let mut parts = folder.splitn(3, '_');
        let timestamp = parts.next()?;
        let slot_part = parts.next()?;
        let label = parts.next()?;

        if !is_valid_timestamp(timestamp) {
            return None;
        }
        let slot = slot_part.strip_prefix("slot").and_then(SaveSlot::parse)?;
        if label.is_empty() || label.contains(['/', '\\']) {
            return None;
        }

        Some(BackupFolderName {
            timestamp: timestamp.to_string(),
            slot,
            label: label.to_string(),
        })
    }

    /// Display name derived from the label, for backups without a descriptor.
    pub fn fallback_display_name(&self) -> String {
        self.label.replace('_', " ").to_lowercase()
    }
}

impl fmt::Display for BackupFolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_slot{}_{}", self.timestamp, self.slot, self.label)
    }
}

/// Sanitizes a user-supplied backup name into the folder label form.
///
/// The name is trimmed and lowercased; characters the filesystem may reject
/// (`<>:"/\|?*`) and spaces become underscores.
pub fn sanitize_label(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | ' ' => '_',
            other => other,
        })
        .collect()
}

/// Checks the `YYYY-MM-DD-HH-MM-SS` shape without interpreting the date.
fn is_valid_timestamp(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 6 {
        return false;
    }
    let widths = [4, 2, 2, 2, 2, 2];
    parts
        .iter()
        .zip(widths)
        .all(|(part, width)| part.len() == width && part.bytes().all(|b| b.is_ascii_digit()))
}

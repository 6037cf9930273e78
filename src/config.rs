use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Port the server listens on when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Backup root used when `BACKUP_FOLDER` is not set, relative to the source folder.
const DEFAULT_BACKUP_DIR: &str = "Save Backups";

/// Read-only configuration resolved once at startup.
///
/// The core components receive this by reference; nothing reads the
/// environment after resolution.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// The game's live save directory.
    pub source_folder: PathBuf,
    /// The directory backups are written under.
    pub backup_folder: PathBuf,
    /// The local port the web UI is served on.
    pub port: u16,
}

/// Resolves configuration from the process environment.
pub fn resolve() -> Result<AppConfig> {
    resolve_with(|key| std::env::var(key).ok())
}

/// Resolution backed by an arbitrary variable lookup, so tests can run
/// without mutating the process environment.
pub(crate) fn resolve_with<F>(lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let source_folder = match lookup("SOURCE_FOLDER") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let steam_id = lookup("STEAM_ID").context(
                "Neither SOURCE_FOLDER nor STEAM_ID is set; cannot locate the save directory",
            )?;
            default_save_dir(&steam_id)?
        }
    };

    if !source_folder.is_dir() {
        bail!(
            "Save directory does not exist: {}",
            source_folder.display()
        );
    }

    let backup_folder = match lookup("BACKUP_FOLDER") {
        Some(dir) => PathBuf::from(dir),
        None => source_folder.join(DEFAULT_BACKUP_DIR),
    };

    let port = match lookup("PORT") {
        Some(value) => value
            .parse::<u16>()
            .with_context(|| format!("Invalid PORT value: {}", value))?,
        None => DEFAULT_PORT,
    };

    Ok(AppConfig {
        source_folder,
        backup_folder,
        port,
    })
}

/// Platform-specific location of the game's save directory for a Steam user.
fn default_save_dir(steam_id: &str) -> Result<PathBuf> {
    let base = directories::BaseDirs::new().context("Could not determine the home directory")?;
    let home = base.home_dir();

    let dir = if cfg!(target_os = "windows") {
        home.join("AppData")
            .join("LocalLow")
            .join("Team Cherry")
            .join("Hollow Knight Silksong")
            .join(steam_id)
    } else if cfg!(target_os = "macos") {
        home.join("Library")
            .join("Application Support")
            .join("unity.Team-Cherry.Silksong")
            .join(steam_id)
    } else {
        home.join(".config")
            .join("unity3d")
            .join("Team Cherry")
            .join("Hollow Knight Silksong")
            .join(steam_id)
    };
    Ok(dir)
}

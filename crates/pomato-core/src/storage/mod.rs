mod config;
mod database;

pub use config::{Config, DurationsConfig, NotificationsConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/pomato[-dev]/` based on POMATO_ENV.
///
/// Set POMATO_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMATO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomato-dev")
    } else {
        base_dir.join("pomato")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::state::Settings;

const APP_DIR: &str = "ReadAloud";
const STORE_FILE: &str = "settings.json";

/// Default settings file location
pub fn settings_path() -> Result<PathBuf> {
    let config = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot find the user configuration directory"))?;
    Ok(config.join(APP_DIR).join(STORE_FILE))
}

pub fn load_settings(path: &Path) -> Settings {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No stored settings found. Using defaults.");
            return Settings::default();
        }
        Err(e) => {
            tracing::warn!("Failed to read settings file {}: {}. Using defaults.", path.display(), e);
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&data) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to deserialize stored settings: {}. Using defaults.", e);
            Settings::default()
        }
    }
}

fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create settings directory")?;
    }
    let data = serde_json::to_string_pretty(settings)
        .context("Failed to serialize settings")?;
    std::fs::write(path, data)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Persist settings; failures are logged, never fatal
pub fn save_settings(path: &Path, settings: &Settings) {
    match write_settings(path, settings) {
        Ok(()) => tracing::debug!("Settings saved to {}", path.display()),
        Err(e) => tracing::error!("Failed to save settings: {:#}", e),
    }
}

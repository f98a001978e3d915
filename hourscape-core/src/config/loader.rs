//! Config file loading with the first-run template contract.
//!
//! The daemon reads a single JSON file from the user config directory. When
//! the file is missing, a default template is written and loading fails with
//! `ConfigTemplateWritten` so the process can exit and ask the user to fill
//! in their Home Assistant credentials.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::types::Config;
use crate::error::{Error, Result};

/// Config filename under the platform config directory.
const CONFIG_FILE: &str = "hourscape.json";

/// Platform-standard location of the config file, e.g.
/// `~/.config/hourscape.json` on Linux.
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE))
        .ok_or(Error::NoConfigDir)
}

/// Loads and validates the config at `path`. A missing file writes the
/// default template and returns `ConfigTemplateWritten`.
pub fn load(path: &Path) -> Result<Config> {
    if !path.exists() {
        write_template(path)?;
        return Err(Error::ConfigTemplateWritten(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::ConfigLoad(path.display().to_string(), e.to_string()))?;

    let config: Config = serde_json::from_str(&content)
        .map_err(|e| Error::ConfigParse(path.display().to_string(), e.to_string()))?;

    config.validate()?;
    Ok(config)
}

fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let template = serde_json::to_string_pretty(&Config::default())
        .expect("default config serializes");
    fs::write(path, template)?;
    tracing::info!("Wrote config template to {}", path.display());
    Ok(())
}

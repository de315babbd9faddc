//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Service TOML configuration file contents
///
/// All fields are optional; missing fields fall back to environment
/// variables and compiled defaults at resolution time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Data folder holding the SQLite database
    pub data_folder: Option<String>,
    /// Bind address for the HTTP listener (e.g. "127.0.0.1:5810")
    pub bind_address: Option<String>,
    /// OpenAI API key (ChatGPT provider + sentiment analysis)
    pub openai_api_key: Option<String>,
    /// Anthropic API key (Claude provider)
    pub anthropic_api_key: Option<String>,
    /// Google AI API key (Gemini provider)
    pub gemini_api_key: Option<String>,
    /// Perplexity API key
    pub perplexity_api_key: Option<String>,
    /// SERP API key (Google AI Overviews provider)
    pub serp_api_key: Option<String>,
    /// Backlink index API key
    pub backlink_api_key: Option<String>,
    /// Backlink index base URL override
    pub backlink_api_url: Option<String>,
}

/// Load the service TOML config, if one exists
///
/// Looks for `aivis.toml` in the platform config directory
/// (`~/.config/aivis/` on Linux), then `/etc/aivis/` as a system-wide
/// fallback. A missing file is not an error; a malformed file is.
pub fn load_toml_config() -> Result<Option<TomlConfig>> {
    let path = match find_config_file() {
        Some(p) => p,
        None => return Ok(None),
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    tracing::info!("Loaded configuration from {}", path.display());
    Ok(Some(config))
}

/// Locate the configuration file for the platform
fn find_config_file() -> Option<PathBuf> {
    if let Some(user_config) = dirs::config_dir().map(|d| d.join("aivis").join("aivis.toml")) {
        if user_config.exists() {
            return Some(user_config);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/aivis/aivis.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the data folder following priority order:
/// 1. Environment variable `AIVIS_DATA` (highest priority)
/// 2. TOML config file `data_folder` key
/// 3. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(toml_config: Option<&TomlConfig>) -> PathBuf {
    // Priority 1: Environment variable
    if let Ok(path) = std::env::var("AIVIS_DATA") {
        return PathBuf::from(path);
    }

    // Priority 2: TOML config file
    if let Some(folder) = toml_config.and_then(|c| c.data_folder.as_deref()) {
        return PathBuf::from(folder);
    }

    // Priority 3: OS-dependent compiled default
    default_data_folder()
}

/// Get OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/aivis (or /var/lib/aivis for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("aivis"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/aivis"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/aivis
        dirs::data_dir()
            .map(|d| d.join("aivis"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/aivis"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\aivis
        dirs::data_local_dir()
            .map(|d| d.join("aivis"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\aivis"))
    } else {
        PathBuf::from("./aivis_data")
    }
}

/// Ensure the data folder exists, creating it if missing
pub fn ensure_data_folder(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .map_err(|e| Error::Config(format!("Failed to create {}: {}", path.display(), e)))?;
        tracing::info!("Created data folder: {}", path.display());
    }
    Ok(())
}

/// Database file path within the data folder
pub fn database_path(data_folder: &PathBuf) -> PathBuf {
    data_folder.join("aivis.db")
}

//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Default port for the store service (persistence REST API)
pub const DEFAULT_STORE_PORT: u16 = 3005;

/// Default port for the UI service
pub const DEFAULT_UI_PORT: u16 = 3006;

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "vibesync.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `VIBESYNC_ROOT` environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var("VIBESYNC_ROOT") {
        return PathBuf::from(path);
    }

    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    default_root_folder()
}

/// Ensure the root folder exists and return the database path inside it
pub fn prepare_database_path(root_folder: &PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(root_folder)?;
    Ok(root_folder.join(DATABASE_FILE))
}

/// Resolve the Gemini API key.
///
/// Checks `GEMINI_API_KEY` then `API_KEY` environment variables, then the
/// `gemini_api_key` entry of the config file. A missing or placeholder key
/// resolves to `None`; callers degrade to a clearly-labeled placeholder
/// result rather than failing.
pub fn resolve_gemini_api_key() -> Option<String> {
    for var in ["GEMINI_API_KEY", "API_KEY"] {
        if let Ok(key) = std::env::var(var) {
            if is_usable_key(&key) {
                return Some(key);
            }
        }
    }

    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(key) = config.get("gemini_api_key").and_then(|v| v.as_str()) {
                    if is_usable_key(key) {
                        return Some(key.to_string());
                    }
                }
            }
        }
    }

    None
}

fn is_usable_key(key: &str) -> bool {
    !key.trim().is_empty() && key != "PLACEHOLDER"
}

/// Get the configuration file path for the platform
fn find_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("vibesync").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/vibesync/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("vibesync"))
        .unwrap_or_else(|| PathBuf::from("./vibesync_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins() {
        let root = resolve_root_folder(Some("/tmp/vibesync-test"));
        assert_eq!(root, PathBuf::from("/tmp/vibesync-test"));
    }

    #[test]
    fn placeholder_key_is_rejected() {
        assert!(!is_usable_key("PLACEHOLDER"));
        assert!(!is_usable_key("  "));
        assert!(is_usable_key("AIza-real-key"));
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging;

const APP_DIR_NAME: &str = "printer-manager";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AppConfig {
    /// Port the bundled printer service listens on
    #[serde(default = "default_service_port")]
    pub service_port: u16,
    /// Timeout for requests against the printer service
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub verbose_logging: bool,
    /// Load service scripts from here instead of the application bundle
    #[serde(default)]
    pub scripts_dir_override: Option<PathBuf>,
}

fn default_service_port() -> u16 {
    8089
}

fn default_http_timeout() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_port: default_service_port(),
            http_timeout_secs: default_http_timeout(),
            verbose_logging: false,
            scripts_dir_override: None,
        }
    }
}

/// Get the application root directory
pub fn get_app_root_dir() -> Result<PathBuf, String> {
    // A file named "portable" next to the executable pins everything to that directory
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if exe_dir.join("portable").exists() {
                return Ok(exe_dir.to_path_buf());
            }
        }
    }

    if cfg!(debug_assertions) {
        let exe_path =
            std::env::current_exe().map_err(|e| format!("Failed to get exe path: {}", e))?;
        let exe_dir = exe_path.parent().ok_or("Failed to get exe directory")?;
        return Ok(exe_dir.to_path_buf());
    }

    // Release builds run from read-only bundles (AppImage, .app), so use the user config dir
    let base = dirs::config_dir().ok_or("Failed to resolve user config directory")?;
    let path = base.join(APP_DIR_NAME);
    if !path.exists() {
        fs::create_dir_all(&path)
            .map_err(|e| format!("Failed to create app directory: {}", e))?;
    }
    Ok(path)
}

/// Get the configuration directory: config/
pub fn get_config_dir() -> Result<PathBuf, String> {
    let root = get_app_root_dir()?;
    let config_dir = root.join("config");

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    Ok(config_dir)
}

fn get_config_path() -> Result<PathBuf, String> {
    Ok(get_config_dir()?.join("config.json"))
}

pub fn read_config_file(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

    match serde_json::from_str::<AppConfig>(&content) {
        Ok(config) => Ok(config),
        Err(e) => {
            log::warn!("Failed to parse config.json, using defaults: {}", e);
            Ok(AppConfig::default())
        }
    }
}

pub fn write_config_file(path: &Path, config: &AppConfig) -> Result<(), String> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, json).map_err(|e| format!("Failed to write config: {}", e))
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub fn save_config(config: AppConfig) -> Result<(), String> {
    write_config_file(&get_config_path()?, &config)?;
    let _ = logging::write_domain_log("audit", "Updated Application Configuration");
    Ok(())
}

#[cfg_attr(feature = "desktop", tauri::command)]
pub fn load_config() -> Result<AppConfig, String> {
    read_config_file(&get_config_path()?)
}

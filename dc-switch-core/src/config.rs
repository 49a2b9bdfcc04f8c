//! Application paths
//!
//! The config directory can be redirected with `DC_SWITCH_HOME`, which the
//! CLI tests use to keep a throwaway catalog.

use std::path::PathBuf;

pub fn get_app_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DC_SWITCH_HOME") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::config_dir().unwrap_or_default().join("dc-switch")
}

pub fn get_database_path() -> PathBuf {
    get_app_config_dir().join("dc-switch.db")
}

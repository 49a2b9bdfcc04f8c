//! Launcher settings
//!
//! Preferred release channel and an optional custom executable path,
//! persisted in the settings table.

use crate::channel::ChannelPreference;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LauncherSettings {
    #[serde(default)]
    pub preferred_channel: ChannelPreference,
    pub custom_executable_path: Option<String>,
}

/// Trim the custom path and reject one that does not exist on disk.
pub fn sanitize_launcher_settings(settings: LauncherSettings) -> Result<LauncherSettings> {
    let clean_custom_path = settings
        .custom_executable_path
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(str::to_string);
    if let Some(path) = &clean_custom_path {
        if !PathBuf::from(path).exists() {
            return Err(CoreError::Config(
                "Custom executable path does not exist.".to_string(),
            ));
        }
    }
    Ok(LauncherSettings {
        preferred_channel: settings.preferred_channel,
        custom_executable_path: clean_custom_path,
    })
}

//! Settings data access object
//!
//! Launcher settings are stored as a single JSON value in the settings table.

use crate::database::{lock_conn, Database};
use crate::error::{CoreError, Result};
use crate::settings::{sanitize_launcher_settings, LauncherSettings};
use rusqlite::params;

const LAUNCHER_SETTINGS_KEY: &str = "launcher";

impl Database {
    /// Load launcher settings, falling back to defaults when never saved.
    pub fn get_launcher_settings(&self) -> Result<LauncherSettings> {
        let raw = self.get_setting(LAUNCHER_SETTINGS_KEY)?;
        let Some(raw) = raw else {
            return Ok(LauncherSettings::default());
        };
        let parsed: LauncherSettings = serde_json::from_str(&raw)
            .map_err(|e| CoreError::Config(format!("Could not parse launcher settings: {e}")))?;
        // A custom path may have vanished since it was saved; drop it rather
        // than surfacing a stale descriptor later.
        match sanitize_launcher_settings(parsed.clone()) {
            Ok(clean) => Ok(clean),
            Err(_) => Ok(LauncherSettings {
                preferred_channel: parsed.preferred_channel,
                custom_executable_path: None,
            }),
        }
    }

    /// Validate and persist launcher settings.
    pub fn save_launcher_settings(&self, settings: LauncherSettings) -> Result<LauncherSettings> {
        let cleaned = sanitize_launcher_settings(settings)?;
        let payload = serde_json::to_string(&cleaned)?;
        self.set_setting(LAUNCHER_SETTINGS_KEY, &payload)?;
        Ok(cleaned)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = lock_conn!(self.conn);
        let result = conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get::<_, Option<String>>(0),
        );

        match result {
            Ok(value) => Ok(value),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CoreError::Database(e.to_string())),
        }
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = lock_conn!(self.conn);
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map_err(|e| CoreError::Database(e.to_string()))?;
        Ok(())
    }
}

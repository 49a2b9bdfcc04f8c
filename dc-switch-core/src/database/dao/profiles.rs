//! Profile data access object
//!
//! CRUD for credential profiles plus token storage. Tokens are opaque text
//! and never leave this layer except through [`Database::get_profile_token`].

use crate::database::{lock_conn, Database};
use crate::error::{CoreError, Result};
use crate::profile::Profile;
use rusqlite::params;

impl Database {
    /// List all profiles, oldest first.
    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        let conn = lock_conn!(self.conn);
        let mut stmt = conn
            .prepare(
                "SELECT id, nickname, avatar_color, created_at, token IS NOT NULL
                 FROM profiles ORDER BY created_at ASC, id ASC",
            )
            .map_err(|e| CoreError::Database(e.to_string()))?;

        let profile_iter = stmt
            .query_map([], |row| {
                Ok(Profile {
                    id: row.get(0)?,
                    nickname: row.get(1)?,
                    avatar_color: row.get(2)?,
                    created_at_ms: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                    has_token: row.get(4)?,
                })
            })
            .map_err(|e| CoreError::Database(e.to_string()))?;

        let mut profiles = Vec::new();
        for profile in profile_iter {
            profiles.push(profile.map_err(|e| CoreError::Database(e.to_string()))?);
        }
        Ok(profiles)
    }

    /// Get a single profile by id.
    pub fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let conn = lock_conn!(self.conn);
        let result = conn.query_row(
            "SELECT nickname, avatar_color, created_at, token IS NOT NULL
             FROM profiles WHERE id = ?1",
            params![id],
            |row| {
                Ok(Profile {
                    id: id.to_string(),
                    nickname: row.get(0)?,
                    avatar_color: row.get(1)?,
                    created_at_ms: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                    has_token: row.get(3)?,
                })
            },
        );

        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CoreError::Database(e.to_string())),
        }
    }

    /// Whether another profile already uses this nickname (case-insensitive).
    pub fn nickname_taken(&self, nickname: &str, exclude_id: Option<&str>) -> Result<bool> {
        let conn = lock_conn!(self.conn);
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM profiles
                 WHERE nickname = ?1 COLLATE NOCASE AND id != COALESCE(?2, '')",
                params![nickname, exclude_id],
                |row| row.get(0),
            )
            .map_err(|e| CoreError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Save profile (insert or update). The token column is left untouched
    /// on update; use [`Database::set_profile_token`] for that.
    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        let conn = lock_conn!(self.conn);
        conn.execute(
            "INSERT INTO profiles (id, nickname, avatar_color, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                nickname = excluded.nickname,
                avatar_color = excluded.avatar_color",
            params![
                profile.id,
                profile.nickname,
                profile.avatar_color,
                profile.created_at_ms,
            ],
        )
        .map_err(|e| CoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a profile, discarding its token with it.
    pub fn delete_profile(&self, id: &str) -> Result<()> {
        let conn = lock_conn!(self.conn);
        let removed = conn
            .execute("DELETE FROM profiles WHERE id = ?1", params![id])
            .map_err(|e| CoreError::Database(e.to_string()))?;
        if removed == 0 {
            return Err(CoreError::ProfileNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Store or clear the captured token for a profile.
    pub fn set_profile_token(&self, id: &str, token: Option<&str>) -> Result<()> {
        let conn = lock_conn!(self.conn);
        let updated = conn
            .execute(
                "UPDATE profiles SET token = ?2 WHERE id = ?1",
                params![id, token],
            )
            .map_err(|e| CoreError::Database(e.to_string()))?;
        if updated == 0 {
            return Err(CoreError::ProfileNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Read the captured token for a profile, if any.
    pub fn get_profile_token(&self, id: &str) -> Result<Option<String>> {
        let conn = lock_conn!(self.conn);
        let result = conn.query_row(
            "SELECT token FROM profiles WHERE id = ?1",
            params![id],
            |row| row.get::<_, Option<String>>(0),
        );

        match result {
            Ok(token) => Ok(token),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(CoreError::ProfileNotFound(id.to_string()))
            }
            Err(e) => Err(CoreError::Database(e.to_string())),
        }
    }
}

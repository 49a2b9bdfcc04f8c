//! Schema definition and migrations
//!
//! Responsible for database table creation and version migrations.

use super::{lock_conn, Database, SCHEMA_VERSION};
use crate::error::{CoreError, Result};
use rusqlite::Connection;

impl Database {
    /// Create all database tables
    pub(crate) fn create_tables(&self) -> Result<()> {
        let conn = lock_conn!(self.conn);
        Self::create_tables_on_conn(&conn)?;
        Self::set_user_version(&conn, SCHEMA_VERSION)
    }

    /// Create tables on a specific connection
    pub(crate) fn create_tables_on_conn(conn: &Connection) -> Result<()> {
        // 1. Profiles table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                nickname TEXT NOT NULL,
                avatar_color TEXT NOT NULL DEFAULT '#4F7BFF',
                created_at INTEGER,
                token TEXT
            )",
            [],
        )
        .map_err(|e| CoreError::Database(e.to_string()))?;

        // 2. Settings table (launcher config)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT
            )",
            [],
        )
        .map_err(|e| CoreError::Database(e.to_string()))?;

        Ok(())
    }

    /// Apply schema migrations
    pub(crate) fn apply_schema_migrations(&self) -> Result<()> {
        let conn = lock_conn!(self.conn);

        let mut version = Self::get_user_version(&conn)?;

        if version > SCHEMA_VERSION {
            return Err(CoreError::Database(format!(
                "Database version ({version}) is newer than supported ({SCHEMA_VERSION}). Please upgrade the application."
            )));
        }

        while version < SCHEMA_VERSION {
            match version {
                0 => {
                    log::info!("Detected user_version=0, migrating to 1");
                    Self::migrate_v0_to_v1(&conn)?;
                    Self::set_user_version(&conn, 1)?;
                }
                _ => {
                    return Err(CoreError::Database(format!(
                        "Unknown database version {version}, cannot migrate to {SCHEMA_VERSION}"
                    )));
                }
            }
            version = Self::get_user_version(&conn)?;
        }

        Ok(())
    }

    /// v0 -> v1 migration: add columns missing from early catalogs
    fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
        Self::add_column_if_missing(
            conn,
            "profiles",
            "avatar_color",
            "TEXT NOT NULL DEFAULT '#4F7BFF'",
        )?;
        Self::add_column_if_missing(conn, "profiles", "created_at", "INTEGER")?;
        Self::add_column_if_missing(conn, "profiles", "token", "TEXT")?;
        Ok(())
    }

    // --- Helper methods ---

    pub(crate) fn get_user_version(conn: &Connection) -> Result<i32> {
        conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
            .map_err(|e| CoreError::Database(format!("Failed to read user_version: {e}")))
    }

    pub(crate) fn set_user_version(conn: &Connection, version: i32) -> Result<()> {
        if version < 0 {
            return Err(CoreError::Database(
                "user_version cannot be negative".to_string(),
            ));
        }
        let sql = format!("PRAGMA user_version = {version};");
        conn.execute(&sql, [])
            .map_err(|e| CoreError::Database(format!("Failed to write user_version: {e}")))?;
        Ok(())
    }

    fn validate_identifier(s: &str, kind: &str) -> Result<()> {
        if s.is_empty() {
            return Err(CoreError::Database(format!("{kind} cannot be empty")));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(CoreError::Database(format!(
                "Invalid {kind}: {s}, only letters, numbers and underscores allowed"
            )));
        }
        Ok(())
    }

    fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
        Self::validate_identifier(table, "table name")?;
        Self::validate_identifier(column, "column name")?;

        let sql = format!("PRAGMA table_info(\"{table}\");");
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| CoreError::Database(format!("Failed to read table info: {e}")))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| CoreError::Database(format!("Failed to query table info: {e}")))?;
        while let Some(row) = rows.next().map_err(|e| CoreError::Database(e.to_string()))? {
            let name: String = row
                .get(1)
                .map_err(|e| CoreError::Database(format!("Failed to read column name: {e}")))?;
            if name.eq_ignore_ascii_case(column) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        definition: &str,
    ) -> Result<bool> {
        if Self::has_column(conn, table, column)? {
            return Ok(false);
        }

        let sql = format!("ALTER TABLE \"{table}\" ADD COLUMN \"{column}\" {definition};");
        conn.execute(&sql, []).map_err(|e| {
            CoreError::Database(format!("Failed to add column {column} to {table}: {e}"))
        })?;
        log::info!("Added missing column {column} to table {table}");
        Ok(true)
    }
}

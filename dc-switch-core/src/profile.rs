//! Credential profile types
//!
//! A profile is a nickname plus an optionally captured token. The token is
//! stored in the catalog but never serialized outward; callers only see
//! `has_token`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_AVATAR_COLOR: &str = "#4F7BFF";

const NICKNAME_MAX_CHARS: usize = 48;

/// Profile record as exposed to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub nickname: String,
    pub avatar_color: String,
    pub created_at_ms: i64,
    pub has_token: bool,
}

impl Profile {
    /// Create a fresh profile with a generated id and no token.
    pub fn new(nickname: String, avatar_color: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            nickname,
            avatar_color,
            created_at_ms: chrono::Utc::now().timestamp_millis(),
            has_token: false,
        }
    }
}

/// Trim and validate a nickname.
pub fn normalize_nickname(input: &str) -> crate::error::Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(crate::error::CoreError::Config(
            "Nickname cannot be empty.".to_string(),
        ));
    }
    if trimmed.chars().count() > NICKNAME_MAX_CHARS {
        return Err(crate::error::CoreError::Config(format!(
            "Nickname must be at most {NICKNAME_MAX_CHARS} characters."
        )));
    }
    Ok(trimmed.to_string())
}

/// Normalize an avatar color, falling back to the default when unset.
pub fn normalize_avatar_color(input: Option<&str>) -> crate::error::Result<String> {
    let source = input
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .unwrap_or(DEFAULT_AVATAR_COLOR);
    let normalized = source.to_ascii_uppercase();
    if !is_valid_hex_color(&normalized) {
        return Err(crate::error::CoreError::Config(
            "Avatar color must be a hex color like #4F7BFF.".to_string(),
        ));
    }
    Ok(normalized)
}

fn is_valid_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value.chars().skip(1).all(|c| c.is_ascii_hexdigit())
}

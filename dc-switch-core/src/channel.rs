//! Discord release channels
//!
//! A concrete channel names one release track with its own executable,
//! process names and user-data directory. The `Auto` preference lives in
//! [`ChannelPreference`] so code that keys maps by channel never has to
//! handle a wildcard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DiscordChannel {
    Stable,
    Ptb,
    Canary,
}

impl DiscordChannel {
    pub const ALL: [DiscordChannel; 3] = [
        DiscordChannel::Stable,
        DiscordChannel::Ptb,
        DiscordChannel::Canary,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            DiscordChannel::Stable => "stable",
            DiscordChannel::Ptb => "ptb",
            DiscordChannel::Canary => "canary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stable" => Some(DiscordChannel::Stable),
            "ptb" => Some(DiscordChannel::Ptb),
            "canary" => Some(DiscordChannel::Canary),
            _ => None,
        }
    }

    /// Human-facing label, matching the client's own branding.
    pub fn label(&self) -> &str {
        match self {
            DiscordChannel::Stable => "Discord",
            DiscordChannel::Ptb => "Discord PTB",
            DiscordChannel::Canary => "Discord Canary",
        }
    }

    /// Directory name used under the per-user config root
    /// (`discord`, `discordptb`, `discordcanary` on every OS).
    pub fn data_dir_name(&self) -> &str {
        match self {
            DiscordChannel::Stable => "discord",
            DiscordChannel::Ptb => "discordptb",
            DiscordChannel::Canary => "discordcanary",
        }
    }

    /// Process names this channel shows up as in the OS process table.
    pub fn process_names(&self) -> &[&str] {
        match self {
            DiscordChannel::Stable => &["Discord", "Discord.exe", "discord"],
            DiscordChannel::Ptb => &["DiscordPTB", "DiscordPTB.exe", "Discord PTB", "discordptb"],
            DiscordChannel::Canary => &[
                "DiscordCanary",
                "DiscordCanary.exe",
                "Discord Canary",
                "discordcanary",
            ],
        }
    }

    /// Conventional user-data root for this channel on the current OS.
    pub fn default_user_data_root(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(self.data_dir_name()))
    }
}

impl fmt::Display for DiscordChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel preference as stored in launcher settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ChannelPreference {
    #[default]
    Auto,
    Stable,
    Ptb,
    Canary,
}

impl ChannelPreference {
    pub fn as_str(&self) -> &str {
        match self {
            ChannelPreference::Auto => "auto",
            ChannelPreference::Stable => "stable",
            ChannelPreference::Ptb => "ptb",
            ChannelPreference::Canary => "canary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(ChannelPreference::Auto),
            "stable" => Some(ChannelPreference::Stable),
            "ptb" => Some(ChannelPreference::Ptb),
            "canary" => Some(ChannelPreference::Canary),
            _ => None,
        }
    }

    /// The concrete channel this preference names, if any.
    pub fn channel(&self) -> Option<DiscordChannel> {
        match self {
            ChannelPreference::Auto => None,
            ChannelPreference::Stable => Some(DiscordChannel::Stable),
            ChannelPreference::Ptb => Some(DiscordChannel::Ptb),
            ChannelPreference::Canary => Some(DiscordChannel::Canary),
        }
    }

    /// Concrete channel used when a single one must be picked without
    /// probing: auto falls back to stable.
    pub fn resolved(&self) -> DiscordChannel {
        self.channel().unwrap_or(DiscordChannel::Stable)
    }
}

//! Installation locator
//!
//! Probes conventional per-OS install locations for each release channel.
//! Stateless: descriptors are rediscovered on every call and never cached.

use crate::channel::{ChannelPreference, DiscordChannel};
use crate::error::{CoreError, Result};
use crate::settings::LauncherSettings;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A viable client installation: one channel's executable plus the
/// user-data root its credential store lives under.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationDescriptor {
    pub channel: DiscordChannel,
    pub label: String,
    pub executable_path: PathBuf,
    pub user_data_root: PathBuf,
}

/// Enumerate viable installations, ordered by relevance.
///
/// A custom override pointing at an existing executable is returned as the
/// sole result, tagged with the preferred channel. A dangling override falls
/// back to normal probing. Fails with `NotFound` only when nothing was found
/// and no override was usable; callers treat that as an empty state, not a
/// fatal error.
pub fn locate(
    preferred: ChannelPreference,
    custom_override: Option<&Path>,
) -> Result<Vec<InstallationDescriptor>> {
    if let Some(path) = custom_override {
        if path.is_file() {
            let channel = preferred.resolved();
            return Ok(vec![InstallationDescriptor {
                channel,
                label: "Custom executable".to_string(),
                executable_path: path.to_path_buf(),
                user_data_root: channel.default_user_data_root().unwrap_or_default(),
            }]);
        }
        log::warn!(
            "custom executable path {} does not exist, probing instead",
            path.display()
        );
    }

    let mut found = detect_for_current_os();

    // "auto" keeps the stable -> ptb -> canary probe order; a concrete
    // preference floats its channel to the front.
    if let Some(channel) = preferred.channel() {
        found.sort_by_key(|d| d.channel != channel);
    }

    if found.is_empty() {
        return Err(CoreError::NotFound(
            "no installation detected for any release channel".to_string(),
        ));
    }
    Ok(found)
}

/// Map saved settings to the single descriptor the protocol should drive.
pub fn resolve_launch_target(settings: &LauncherSettings) -> Result<InstallationDescriptor> {
    let custom = settings.custom_executable_path.as_ref().map(PathBuf::from);
    let found = locate(settings.preferred_channel, custom.as_deref())?;

    if let Some(channel) = settings.preferred_channel.channel() {
        if let Some(descriptor) = found.into_iter().find(|d| d.channel == channel) {
            return Ok(descriptor);
        }
        return Err(CoreError::NotFound(format!(
            "preferred channel '{channel}' was not found; use auto or set a custom path"
        )));
    }

    found
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::NotFound("no installation detected".to_string()))
}

fn detect_for_current_os() -> Vec<InstallationDescriptor> {
    #[cfg(target_os = "linux")]
    {
        return detect_linux_installations();
    }

    #[cfg(target_os = "macos")]
    {
        return detect_macos_installations();
    }

    #[cfg(target_os = "windows")]
    {
        return detect_windows_installations();
    }

    #[allow(unreachable_code)]
    Vec::new()
}

fn descriptor_for(channel: DiscordChannel, executable_path: PathBuf) -> InstallationDescriptor {
    InstallationDescriptor {
        channel,
        label: channel.label().to_string(),
        executable_path,
        user_data_root: channel.default_user_data_root().unwrap_or_default(),
    }
}

#[cfg(target_os = "linux")]
fn detect_linux_installations() -> Vec<InstallationDescriptor> {
    let local_share = dirs::data_local_dir().unwrap_or_default();
    let mut installations = Vec::new();

    let candidates = [
        (
            DiscordChannel::Stable,
            vec![
                PathBuf::from("/usr/share/discord/Discord"),
                PathBuf::from("/opt/discord/Discord"),
                PathBuf::from("/usr/bin/discord"),
                local_share.join("discord/Discord"),
            ],
        ),
        (
            DiscordChannel::Ptb,
            vec![
                PathBuf::from("/usr/share/discord-ptb/DiscordPTB"),
                PathBuf::from("/opt/discord-ptb/DiscordPTB"),
                PathBuf::from("/usr/bin/discord-ptb"),
                local_share.join("discord-ptb/DiscordPTB"),
            ],
        ),
        (
            DiscordChannel::Canary,
            vec![
                PathBuf::from("/usr/share/discord-canary/DiscordCanary"),
                PathBuf::from("/opt/discord-canary/DiscordCanary"),
                PathBuf::from("/usr/bin/discord-canary"),
                local_share.join("discord-canary/DiscordCanary"),
            ],
        ),
    ];

    for (channel, paths) in candidates {
        if let Some(found) = paths.into_iter().find(|p| p.is_file()) {
            installations.push(descriptor_for(channel, found));
        }
    }

    installations
}

#[cfg(target_os = "macos")]
fn detect_macos_installations() -> Vec<InstallationDescriptor> {
    let home_apps = dirs::home_dir().unwrap_or_default().join("Applications");
    let mut installations = Vec::new();

    let candidates = [
        (DiscordChannel::Stable, "Discord.app"),
        (DiscordChannel::Ptb, "Discord PTB.app"),
        (DiscordChannel::Canary, "Discord Canary.app"),
    ];

    for (channel, bundle) in candidates {
        let paths = [
            PathBuf::from("/Applications").join(bundle),
            home_apps.join(bundle),
        ];
        if let Some(found) = paths.into_iter().find(|p| p.exists()) {
            installations.push(descriptor_for(channel, found));
        }
    }

    installations
}

#[cfg(target_os = "windows")]
fn detect_windows_installations() -> Vec<InstallationDescriptor> {
    let mut installations = Vec::new();

    let candidates = [
        (DiscordChannel::Stable, "Discord", &["Discord.exe"][..]),
        (
            DiscordChannel::Ptb,
            "DiscordPTB",
            &["DiscordPTB.exe", "Discord.exe"][..],
        ),
        (
            DiscordChannel::Canary,
            "DiscordCanary",
            &["DiscordCanary.exe", "Discord.exe"][..],
        ),
    ];

    for (channel, folder, executables) in candidates {
        if let Some(descriptor) = detect_windows_channel(channel, folder, executables) {
            installations.push(descriptor);
        }
    }

    installations
}

/// Squirrel installs keep versioned `app-*` directories; the newest one
/// holds the current executable.
#[cfg(target_os = "windows")]
fn detect_windows_channel(
    channel: DiscordChannel,
    folder_name: &str,
    executable_names: &[&str],
) -> Option<InstallationDescriptor> {
    let root = dirs::data_local_dir()?.join(folder_name);

    let mut app_dirs: Vec<PathBuf> = std::fs::read_dir(&root)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("app-"))
                .unwrap_or(false)
        })
        .collect();

    app_dirs.sort();
    app_dirs.reverse();

    for dir in app_dirs {
        for exe in executable_names {
            let path = dir.join(exe);
            if path.exists() {
                return Some(descriptor_for(channel, path));
            }
        }
    }

    None
}

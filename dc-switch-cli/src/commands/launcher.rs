use anyhow::Result;
use clap::Subcommand;
use dc_switch_core::channel::ChannelPreference;
use dc_switch_core::{Database, DiscordChannel, SwitchEngine, SwitchOutcome};
use dialoguer::{theme::ColorfulTheme, Select};
use std::sync::Arc;

use crate::commands::profile;
use crate::output;

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show the current launcher settings
    Show,

    /// Change launcher settings
    Set {
        /// Preferred release channel: auto, stable, ptb, or canary
        #[arg(long)]
        channel: Option<String>,

        /// Path to a custom client executable
        #[arg(long)]
        custom_path: Option<String>,

        /// Remove a previously set custom executable path
        #[arg(long)]
        clear_custom_path: bool,
    },
}

fn open_engine() -> Result<(SwitchEngine, Arc<Database>)> {
    let db = Arc::new(Database::init()?);
    Ok((SwitchEngine::new(db.clone()), db))
}

pub async fn detect(format: Option<String>) -> Result<()> {
    let (engine, _db) = open_engine()?;
    let installations = match engine.detect_installations().await {
        Ok(found) => found,
        Err(dc_switch_core::CoreError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    if format.as_deref() == Some("json") {
        println!("{}", serde_json::to_string_pretty(&installations)?);
        return Ok(());
    }

    if installations.is_empty() {
        println!("No client installation detected.");
        println!("Set one explicitly with 'dc-switch settings set --custom-path <path>'.");
        return Ok(());
    }

    let mut table = output::create_table(vec!["Channel", "Executable", "User data"]);
    for install in &installations {
        table.add_row(vec![
            install.label.clone(),
            install.executable_path.display().to_string(),
            install.user_data_root.display().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn login(channel: Option<String>) -> Result<()> {
    let channel = match channel {
        Some(raw) => Some(
            DiscordChannel::from_str(&raw)
                .ok_or_else(|| anyhow::anyhow!("Invalid channel: {}", raw))?,
        ),
        None => None,
    };

    let (engine, _db) = open_engine()?;
    report(engine.prepare_login(channel).await?);
    Ok(())
}

pub async fn capture(id: String) -> Result<()> {
    let (engine, db) = open_engine()?;
    let target = profile::resolve(&db, &id)?;
    report(engine.capture_token(&target.id).await?);
    Ok(())
}

pub async fn switch(id: Option<String>) -> Result<()> {
    let (engine, db) = open_engine()?;

    let target = match id {
        Some(needle) => profile::resolve(&db, &needle)?,
        None => match pick_profile(&db)? {
            Some(profile) => profile,
            None => return Ok(()),
        },
    };

    report(engine.switch_to_profile(&target.id).await?);
    Ok(())
}

/// Interactive profile picker with arrow key selection.
fn pick_profile(db: &Database) -> Result<Option<dc_switch_core::Profile>> {
    let profiles = db.list_profiles()?;
    if profiles.is_empty() {
        println!("No profiles yet. Use 'dc-switch profile add' to create one.");
        return Ok(None);
    }

    let items: Vec<String> = profiles
        .iter()
        .map(|p| {
            let marker = if p.has_token { "" } else { " (no saved token)" };
            format!("{}{}", p.nickname, marker)
        })
        .collect();

    let selection = match Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Switch to account (↑↓ to move, Enter to select, Esc to exit)")
        .items(&items)
        .default(0)
        .interact_opt()
    {
        Ok(Some(idx)) => idx,
        Ok(None) => return Ok(None),
        Err(e) => {
            // Not a TTY; show the list and let the user rerun with an ID.
            eprintln!("Interactive mode not available: {}", e);
            for (i, p) in profiles.iter().enumerate() {
                println!("{}. {} ({})", i + 1, p.nickname, p.id);
            }
            return Ok(None);
        }
    };

    Ok(Some(profiles[selection].clone()))
}

pub fn handle_settings(cmd: SettingsCommands) -> Result<()> {
    match cmd {
        SettingsCommands::Show => show_settings(),
        SettingsCommands::Set {
            channel,
            custom_path,
            clear_custom_path,
        } => set_settings(channel, custom_path, clear_custom_path),
    }
}

fn show_settings() -> Result<()> {
    let db = Database::init()?;
    let settings = db.get_launcher_settings()?;

    println!("Preferred channel: {}", settings.preferred_channel.as_str());
    println!(
        "Custom executable: {}",
        settings.custom_executable_path.as_deref().unwrap_or("-")
    );
    Ok(())
}

fn set_settings(
    channel: Option<String>,
    custom_path: Option<String>,
    clear_custom_path: bool,
) -> Result<()> {
    let db = Database::init()?;
    let mut settings = db.get_launcher_settings()?;

    if let Some(raw) = channel {
        settings.preferred_channel = ChannelPreference::from_str(&raw)
            .ok_or_else(|| anyhow::anyhow!("Invalid channel: {}", raw))?;
    }
    if clear_custom_path {
        settings.custom_executable_path = None;
    }
    if let Some(path) = custom_path {
        settings.custom_executable_path = Some(path);
    }

    let saved = db.save_launcher_settings(settings)?;
    println!("✓ Settings updated");
    println!("  Preferred channel: {}", saved.preferred_channel.as_str());
    println!(
        "  Custom executable: {}",
        saved.custom_executable_path.as_deref().unwrap_or("-")
    );
    Ok(())
}

fn report(outcome: SwitchOutcome) {
    match outcome {
        SwitchOutcome::TokenCaptured { profile } => {
            println!("✓ Captured credential onto profile: {}", profile.nickname);
        }
        SwitchOutcome::TokenInjected { nickname } => {
            println!("✓ Switched to: {}", nickname);
        }
        SwitchOutcome::LaunchedForLogin { channel } => {
            println!("✓ {} restarted on its login screen.", channel.label());
            println!("  Sign in, quit the client, then run 'dc-switch capture <profile>'.");
        }
        SwitchOutcome::NoOp => {
            println!("Login already pending; finish signing in first.");
        }
    }
}

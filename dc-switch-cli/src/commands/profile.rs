use anyhow::Result;
use dc_switch_core::profile::{normalize_avatar_color, normalize_nickname};
use dc_switch_core::{Database, Profile};
use clap::Subcommand;
use std::io::{self, Write};

use crate::output;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List all profiles
    #[command(alias = "ls")]
    List {
        /// Output format: json (default is a table)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Show detailed profile information
    #[command(alias = "info")]
    Show {
        /// Profile ID or nickname
        id: String,
    },

    /// Add a new profile
    #[command(alias = "new")]
    Add {
        /// Nickname (prompted for when omitted)
        nickname: Option<String>,

        /// Avatar color as a hex value like #4F7BFF
        #[arg(long)]
        color: Option<String>,
    },

    /// Rename a profile
    Rename {
        /// Profile ID or nickname
        id: String,

        /// New nickname
        nickname: String,
    },

    /// Delete a profile and its saved credential
    #[command(alias = "rm")]
    Delete {
        /// Profile ID or nickname
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn handle(cmd: ProfileCommands) -> Result<()> {
    match cmd {
        ProfileCommands::List { format } => list(format),
        ProfileCommands::Show { id } => show(id),
        ProfileCommands::Add { nickname, color } => add(nickname, color),
        ProfileCommands::Rename { id, nickname } => rename(id, nickname),
        ProfileCommands::Delete { id, yes } => delete(id, yes),
    }
}

/// Look a profile up by exact ID first, then by case-insensitive nickname.
pub fn resolve(db: &Database, needle: &str) -> Result<Profile> {
    if let Some(profile) = db.get_profile(needle)? {
        return Ok(profile);
    }
    db.list_profiles()?
        .into_iter()
        .find(|p| p.nickname.eq_ignore_ascii_case(needle))
        .ok_or_else(|| anyhow::anyhow!("Profile not found: {}", needle))
}

fn list(format: Option<String>) -> Result<()> {
    let db = Database::init()?;
    let profiles = db.list_profiles()?;

    if format.as_deref() == Some("json") {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    if profiles.is_empty() {
        println!("No profiles yet. Use 'dc-switch profile add' to create one.");
        return Ok(());
    }

    let mut table = output::create_table(vec!["ID", "Nickname", "Color", "Token", "Created"]);
    for profile in &profiles {
        table.add_row(vec![
            comfy_table::Cell::new(&profile.id),
            comfy_table::Cell::new(&profile.nickname),
            comfy_table::Cell::new(&profile.avatar_color),
            output::token_cell(profile.has_token),
            comfy_table::Cell::new(format_created(profile.created_at_ms)),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn format_created(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn show(id: String) -> Result<()> {
    let db = Database::init()?;
    let profile = resolve(&db, &id)?;

    println!("ID: {}", profile.id);
    println!("Nickname: {}", profile.nickname);
    println!("Avatar color: {}", profile.avatar_color);
    println!("Created: {}", format_created(profile.created_at_ms));
    println!(
        "Token: {}",
        if profile.has_token { "saved" } else { "none" }
    );
    Ok(())
}

fn add(nickname: Option<String>, color: Option<String>) -> Result<()> {
    let db = Database::init()?;

    let raw_nickname = match nickname {
        Some(value) => value,
        None => prompt("Nickname")?,
    };
    let nickname = normalize_nickname(&raw_nickname)?;
    if db.nickname_taken(&nickname, None)? {
        anyhow::bail!("A profile named '{}' already exists", nickname);
    }
    let avatar_color = normalize_avatar_color(color.as_deref())?;

    let profile = Profile::new(nickname, avatar_color);
    db.save_profile(&profile)?;

    println!("✓ Added profile: {} ({})", profile.nickname, profile.id);
    println!("  Capture a credential with 'dc-switch capture {}'", profile.nickname);
    Ok(())
}

fn rename(id: String, nickname: String) -> Result<()> {
    let db = Database::init()?;
    let mut profile = resolve(&db, &id)?;

    let nickname = normalize_nickname(&nickname)?;
    if db.nickname_taken(&nickname, Some(&profile.id))? {
        anyhow::bail!("A profile named '{}' already exists", nickname);
    }

    profile.nickname = nickname;
    db.save_profile(&profile)?;

    println!("✓ Renamed profile {} to '{}'", profile.id, profile.nickname);
    Ok(())
}

fn delete(id: String, yes: bool) -> Result<()> {
    let db = Database::init()?;
    let profile = resolve(&db, &id)?;

    if !yes {
        print!(
            "Delete profile '{}' ({})? Its saved credential is discarded. [y/N]: ",
            profile.nickname, profile.id
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    db.delete_profile(&profile.id)?;
    println!("✓ Deleted profile: {}", profile.nickname);
    Ok(())
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{}: ", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

//! DC Switch Core Library
//!
//! Token capture and switch engine for Discord credential profiles:
//! installation discovery, client process lifecycle, credential store codec
//! and the three-phase switch protocol, plus the profile catalog and
//! launcher settings shared by every frontend.

pub mod channel;
pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod locator;
pub mod process;
pub mod profile;
pub mod settings;
pub mod store;

// Re-export commonly used types
pub use channel::{ChannelPreference, DiscordChannel};
pub use config::get_app_config_dir;
pub use database::Database;
pub use engine::{SwitchEngine, SwitchOutcome};
pub use error::CoreError;
pub use locator::InstallationDescriptor;
pub use profile::Profile;
pub use settings::LauncherSettings;

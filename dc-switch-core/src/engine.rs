//! Switch protocol
//!
//! Orchestrates the three user-facing phases (prepare-login, capture,
//! switch) over the locator, process controller and store codec. Phases for
//! the same channel are serialized through a keyed async mutex; distinct
//! channels may be driven concurrently, each with its own session and store.
//!
//! The one ordering that must always hold: the client is confirmed stopped
//! before any store read or write in the same phase.

use crate::channel::DiscordChannel;
use crate::database::Database;
use crate::error::{CoreError, Result};
use crate::locator::{self, InstallationDescriptor};
use crate::process;
use crate::profile::Profile;
use crate::store::{codec, StoreHandle};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a protocol phase. Consumed by the caller, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum SwitchOutcome {
    TokenCaptured { profile: Profile },
    TokenInjected { nickname: String },
    LaunchedForLogin { channel: DiscordChannel },
    NoOp,
}

/// Per-channel protocol state. Terminal outcomes (captured, switched) drop
/// the channel back to `Idle`; only an in-flight login lingers, and that
/// state is re-enterable so capture can be retried without relaunching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    LoginPending,
}

/// Token capture and switch engine.
///
/// The engine holds no persistent token state of its own: tokens flow
/// between the profile catalog and the client's store and nowhere else.
pub struct SwitchEngine {
    db: Arc<Database>,
    channel_locks: Mutex<HashMap<DiscordChannel, Arc<AsyncMutex<()>>>>,
    phases: Mutex<HashMap<DiscordChannel, Phase>>,
    store_root_override: Option<PathBuf>,
    stop_timeout: Duration,
}

impl SwitchEngine {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            channel_locks: Mutex::new(HashMap::new()),
            phases: Mutex::new(HashMap::new()),
            store_root_override: None,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }

    /// Override the user-data root the store handle is derived from.
    /// Used by tests to point the engine at a scratch store.
    pub fn with_store_root(mut self, root: PathBuf) -> Self {
        self.store_root_override = Some(root);
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Enumerate viable installations using the saved launcher settings.
    pub async fn detect_installations(&self) -> Result<Vec<InstallationDescriptor>> {
        let settings = self.db.get_launcher_settings()?;
        let custom = settings.custom_executable_path.as_ref().map(PathBuf::from);
        locator::locate(settings.preferred_channel, custom.as_deref())
    }

    /// Stop the client, neutralize the stored credential so the login screen
    /// appears, and relaunch. Leaves the channel in a pending-login state
    /// that `capture_token` completes.
    pub async fn prepare_login(&self, channel: Option<DiscordChannel>) -> Result<SwitchOutcome> {
        let target = self.resolve_target(channel)?;
        let lock = self.channel_lock(target.channel);
        let _guard = lock.lock().await;

        if self.phase(target.channel) == Phase::LoginPending {
            log::debug!("{} already pending login", target.channel);
            return Ok(SwitchOutcome::NoOp);
        }

        process::ensure_stopped(target.channel, self.stop_timeout).await?;

        // A fresh install has no store yet; anything else that prevents the
        // clear only means the login screen may not appear, so warn and
        // continue rather than blocking the launch.
        if let Err(e) = codec::clear_credential(&self.store_handle(&target)) {
            log::warn!("could not clear stored credential: {e}");
        }

        process::launch(&target)?;
        self.set_phase(target.channel, Phase::LoginPending);
        Ok(SwitchOutcome::LaunchedForLogin {
            channel: target.channel,
        })
    }

    /// Pull the credential out of the store and save it on the profile.
    ///
    /// The user must have logged in and closed the client (or this call
    /// closes it) so the store is flushed and unlocked. Also legal without a
    /// prior `prepare_login`, for logins that happened outside this tool.
    pub async fn capture_token(&self, profile_id: &str) -> Result<SwitchOutcome> {
        let profile = self
            .db
            .get_profile(profile_id)?
            .ok_or_else(|| CoreError::ProfileNotFound(profile_id.to_string()))?;

        let target = self.resolve_target(None)?;
        let lock = self.channel_lock(target.channel);
        let _guard = lock.lock().await;

        process::ensure_stopped(target.channel, self.stop_timeout).await?;

        let token = match codec::read_credential(&self.store_handle(&target)) {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.set_phase(target.channel, Phase::Idle);
                return Err(CoreError::NoCredentialFound);
            }
            Err(e) => return Err(e),
        };

        self.db.set_profile_token(profile_id, Some(&token))?;
        self.set_phase(target.channel, Phase::Idle);
        log::info!("captured credential for profile '{}'", profile.nickname);

        let updated = Profile {
            has_token: true,
            ..profile
        };
        Ok(SwitchOutcome::TokenCaptured { profile: updated })
    }

    /// Inject a profile's saved token into the store and relaunch.
    ///
    /// The no-token check happens before any process or store operation, so
    /// a failed switch never perturbs the store. The stop-write-launch
    /// sequence always runs in full: a client started outside this tool must
    /// be accounted for even when no session is known.
    pub async fn switch_to_profile(&self, profile_id: &str) -> Result<SwitchOutcome> {
        let profile = self
            .db
            .get_profile(profile_id)?
            .ok_or_else(|| CoreError::ProfileNotFound(profile_id.to_string()))?;
        let token = self
            .db
            .get_profile_token(profile_id)?
            .ok_or_else(|| CoreError::NoSavedToken(profile.nickname.clone()))?;

        let target = self.resolve_target(None)?;
        let lock = self.channel_lock(target.channel);
        let _guard = lock.lock().await;

        let result: Result<()> = async {
            process::ensure_stopped(target.channel, self.stop_timeout).await?;
            codec::write_credential(&self.store_handle(&target), &token)?;
            process::launch(&target)?;
            Ok(())
        }
        .await;

        self.set_phase(target.channel, Phase::Idle);
        result?;

        log::info!("switched to profile '{}'", profile.nickname);
        Ok(SwitchOutcome::TokenInjected {
            nickname: profile.nickname,
        })
    }

    fn resolve_target(&self, channel: Option<DiscordChannel>) -> Result<InstallationDescriptor> {
        let settings = self.db.get_launcher_settings()?;
        let mut target = locator::resolve_launch_target(&settings)?;
        if let Some(channel) = channel {
            if target.channel != channel {
                let custom = settings.custom_executable_path.as_ref().map(PathBuf::from);
                target = locator::locate(settings.preferred_channel, custom.as_deref())?
                    .into_iter()
                    .find(|d| d.channel == channel)
                    .ok_or_else(|| {
                        CoreError::NotFound(format!("channel '{channel}' is not installed"))
                    })?;
            }
        }
        Ok(target)
    }

    fn store_handle(&self, target: &InstallationDescriptor) -> StoreHandle {
        match &self.store_root_override {
            Some(root) => StoreHandle::for_user_data_root(root),
            None => StoreHandle::for_user_data_root(&target.user_data_root),
        }
    }

    fn channel_lock(&self, channel: DiscordChannel) -> Arc<AsyncMutex<()>> {
        let mut locks = self.channel_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(channel)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn phase(&self, channel: DiscordChannel) -> Phase {
        let phases = self.phases.lock().unwrap_or_else(|e| e.into_inner());
        phases.get(&channel).copied().unwrap_or_default()
    }

    fn set_phase(&self, channel: DiscordChannel, phase: Phase) {
        let mut phases = self.phases.lock().unwrap_or_else(|e| e.into_inner());
        phases.insert(channel, phase);
    }
}

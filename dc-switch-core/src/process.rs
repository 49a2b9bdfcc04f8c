//! Process controller
//!
//! Starts, waits for, and terminates the client. This is the correctness
//! boundary for the whole engine: the credential store has no multi-writer
//! protocol, so exclusive access is enforced solely by making sure no client
//! process is alive before the store is touched. Detection goes through the
//! OS process table rather than our own session handles, because the client
//! may have been started outside this tool.

use crate::channel::DiscordChannel;
use crate::error::{CoreError, Result};
use crate::locator::InstallationDescriptor;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use sysinfo::{ProcessRefreshKind, Signal, System};
use tokio::process::{Child, Command};

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Runtime handle to a launched client process. Exists from launch until the
/// process is confirmed exited; dropping it abandons the process without
/// killing it.
#[derive(Debug)]
pub struct ProcessSession {
    channel: DiscordChannel,
    child: Child,
}

impl ProcessSession {
    pub fn channel(&self) -> DiscordChannel {
        self.channel
    }

    /// Suspend until the launched process exits or the deadline passes.
    /// Returns `Ok(false)` on deadline, so callers can offer "wait longer"
    /// versus "abort".
    pub async fn wait_for_exit(&mut self, timeout: Duration) -> Result<bool> {
        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(status) => {
                let status = status.map_err(|e| CoreError::LaunchFailed(e.to_string()))?;
                log::debug!("{} exited with {status}", self.channel.label());
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }
}

/// Start the client executable for an installation.
pub fn launch(descriptor: &InstallationDescriptor) -> Result<ProcessSession> {
    let binary = resolve_binary(descriptor)?;

    let child = Command::new(&binary)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CoreError::LaunchFailed(format!("{}: {e}", binary.display())))?;

    log::info!(
        "launched {} ({})",
        descriptor.label,
        descriptor.executable_path.display()
    );
    Ok(ProcessSession {
        channel: descriptor.channel,
        child,
    })
}

/// On macOS a detected installation is the `.app` bundle; the real binary
/// sits under Contents/MacOS. Everywhere else the executable path is usable
/// as-is.
fn resolve_binary(descriptor: &InstallationDescriptor) -> Result<PathBuf> {
    let path = &descriptor.executable_path;
    if path.extension().map(|e| e == "app").unwrap_or(false) {
        let app_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Discord");
        let inner = path.join("Contents").join("MacOS").join(app_name);
        if !inner.is_file() {
            return Err(CoreError::LaunchFailed(format!(
                "could not find binary inside {}: expected {}",
                path.display(),
                inner.display()
            )));
        }
        return Ok(inner);
    }
    if !path.is_file() {
        return Err(CoreError::LaunchFailed(format!(
            "executable vanished: {}",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// Make sure no client process for this channel is alive.
///
/// Requests graceful termination first, escalates to a hard kill halfway
/// through the deadline, and polls the process table until it is clear.
/// Returns immediately when nothing is running. `StopTimeout` means the
/// store may still be held open; callers must not proceed to store
/// manipulation on that outcome.
pub async fn ensure_stopped(channel: DiscordChannel, timeout: Duration) -> Result<()> {
    let mut sys = System::new();
    let deadline = tokio::time::Instant::now() + timeout;
    let escalate_at = tokio::time::Instant::now() + timeout / 2;
    let mut requested = false;
    let mut escalated = false;

    loop {
        sys.refresh_processes_specifics(ProcessRefreshKind::new());
        let live: Vec<_> = sys
            .processes()
            .values()
            .filter(|p| channel.process_names().contains(&p.name()))
            .collect();

        if live.is_empty() {
            if requested {
                log::info!("{} confirmed stopped", channel.label());
            }
            return Ok(());
        }

        let now = tokio::time::Instant::now();
        if !requested {
            log::info!(
                "stopping {} ({} process(es))",
                channel.label(),
                live.len()
            );
            for process in &live {
                if process.kill_with(Signal::Term).is_none() {
                    process.kill();
                }
            }
            requested = true;
        } else if !escalated && now >= escalate_at {
            log::warn!("{} ignored termination request, killing", channel.label());
            for process in &live {
                process.kill();
            }
            escalated = true;
        }

        if now >= deadline {
            return Err(CoreError::StopTimeout(timeout));
        }
        tokio::time::sleep(STOP_POLL_INTERVAL).await;
    }
}

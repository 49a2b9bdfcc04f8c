//! Credential store access
//!
//! The client persists its browser-style local storage in a LevelDB
//! directory under the channel's user-data root. This module reads and
//! rewrites the single credential value inside that store while leaving
//! every other key and the store's manifest/log bookkeeping exactly as the
//! client wrote it.
//!
//! ## Architecture
//!
//! ```text
//! store/
//! ├── mod.rs        - StoreHandle + quiescence probe
//! ├── codec.rs      - credential read/write/clear over the LevelDB engine
//! └── location.rs   - log-vs-sorted-run record classification
//! ```
//!
//! The store has no multi-writer protocol. Callers must have confirmed the
//! client is stopped (see [`crate::process::ensure_stopped`]) before calling
//! into [`codec`]; the exclusive-lock probe here is the final safety net,
//! not a substitute for that check.

pub mod codec;
pub mod location;

use crate::error::{CoreError, Result};
use fs4::FileExt;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reference to one on-disk store instance: the LevelDB directory holding a
/// channel's local storage.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    dir: PathBuf,
}

impl StoreHandle {
    /// Store location under a channel's user-data root.
    pub fn for_user_data_root(root: &Path) -> Self {
        Self {
            dir: root.join("Local Storage").join("leveldb"),
        }
    }

    /// Handle pointing directly at a LevelDB directory.
    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    /// Verify no other process holds the store open, by probing an exclusive
    /// lock on the store's `LOCK` file. The probe is released immediately;
    /// a stale `LOCK` left behind by a dead client is then removed so the
    /// engine can take its own lock on open.
    pub(crate) fn ensure_quiescent(&self) -> Result<()> {
        if !self.exists() {
            return Err(CoreError::StoreUnreadable(format!(
                "store directory does not exist: {}",
                self.dir.display()
            )));
        }

        let lock_path = self.dir.join("LOCK");
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&lock_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                let _ = file.unlock();
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                return Err(CoreError::StoreLocked(lock_path.display().to_string()));
            }
            #[cfg(windows)]
            Err(err) if matches!(err.raw_os_error(), Some(32 | 33)) => {
                return Err(CoreError::StoreLocked(lock_path.display().to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        drop(file);
        let _ = std::fs::remove_file(&lock_path);
        Ok(())
    }
}

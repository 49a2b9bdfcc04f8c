//! Credential codec
//!
//! Locates, extracts and overwrites the single credential value inside the
//! client's LevelDB store, driving the framing (length-prefixed log records,
//! sorted tables, MANIFEST) through the embedded engine so a rewritten store
//! reopens without triggering repair.
//!
//! The on-disk key is an external contract of the client, not of this tool:
//! the constants below are every variant the client has been observed to
//! produce, matched by exact byte equality.

use crate::error::{CoreError, Result};
use crate::store::location::{self, RecordLocation};
use crate::store::StoreHandle;
use rusty_leveldb::{LdbIterator, Options, Status, StatusCode, DB};

/// Local-storage key variants holding the credential, newest origin first.
const TOKEN_KEYS: &[&[u8]] = &[
    b"_https://discord.com\x00\x01token",
    b"_https://discord.com/\x00\x01token",
    b"_https://discord.com\x00token",
    b"_https://discord.com/\x00token",
    b"_https://discordapp.com\x00\x01token",
    b"_https://discordapp.com/\x00\x01token",
];

/// Marker prefix the client puts on encrypted credential values.
const ENCRYPTED_VALUE_MARKER: &str = "dQw4w9WgXcQ:";

/// Scan the store for the credential and return its current value.
///
/// Requires the store to be quiescent; fails with `StoreLocked` otherwise
/// and with `StoreUnreadable` when the files are missing or unrecognized.
/// `Ok(None)` means the key was never set (or holds an empty value).
pub fn read_credential(handle: &StoreHandle) -> Result<Option<String>> {
    handle.ensure_quiescent()?;
    let mut db = open(handle)?;

    // Known key variants first.
    for key in TOKEN_KEYS {
        if let Some(raw) = db.get(key) {
            if let Some(token) = extract_token_value(&raw) {
                if looks_like_token(&token) {
                    log_location(handle, key);
                    return Ok(Some(token));
                }
            }
        }
    }

    // Fallback: the key layout has shifted across client versions, so scan
    // every record for the encrypted-value marker.
    let mut iter = db
        .new_iter()
        .map_err(|e| CoreError::StoreUnreadable(format!("iteration failed: {e}")))?;

    let mut key_buf = Vec::new();
    let mut val_buf = Vec::new();

    iter.reset();
    while iter.advance() {
        if iter.current(&mut key_buf, &mut val_buf) {
            if let Some(token) = extract_token_value(&val_buf) {
                if token.starts_with(ENCRYPTED_VALUE_MARKER) {
                    log_location(handle, &key_buf);
                    return Ok(Some(token));
                }
            }
        }
    }

    Ok(None)
}

/// Replace the credential value in place, preserving every other key.
///
/// When no credential key exists yet, one is created with the client's own
/// encoding so a first-ever write is indistinguishable from one the client
/// produced.
pub fn write_credential(handle: &StoreHandle, token: &str) -> Result<()> {
    handle.ensure_quiescent()?;
    let mut db = open(handle)?;

    // Rewrite whichever key variant the client currently uses.
    let key = TOKEN_KEYS
        .iter()
        .find(|k| db.get(*k).is_some())
        .copied()
        .unwrap_or(TOKEN_KEYS[0]);

    let value = encode_token_value(token);
    db.put(key, &value)
        .map_err(|e| CoreError::StoreUnreadable(format!("token write failed: {e}")))?;
    db.flush()
        .map_err(|e| CoreError::StoreUnreadable(format!("store flush failed: {e}")))?;

    log::info!("credential written to store at {}", handle.directory().display());
    Ok(())
}

/// Remove every credential key variant so the client presents its login
/// screen. A store that does not exist yet has nothing to clear.
pub fn clear_credential(handle: &StoreHandle) -> Result<()> {
    if !handle.exists() {
        return Ok(());
    }
    handle.ensure_quiescent()?;
    let mut db = open(handle)?;

    for key in TOKEN_KEYS {
        let _ = db.delete(key);
    }
    db.flush()
        .map_err(|e| CoreError::StoreUnreadable(format!("store flush failed: {e}")))?;

    log::info!("credential cleared from store at {}", handle.directory().display());
    Ok(())
}

fn open(handle: &StoreHandle) -> Result<DB> {
    DB::open(handle.directory(), Options::default()).map_err(|e| map_open_error(handle, e))
}

fn map_open_error(handle: &StoreHandle, status: Status) -> CoreError {
    if status.code == StatusCode::LockError {
        return CoreError::StoreLocked(handle.directory().display().to_string());
    }
    CoreError::StoreUnreadable(format!("{}: {status}", handle.directory().display()))
}

fn log_location(handle: &StoreHandle, key: &[u8]) {
    let location = location::classify(handle, key);
    match location {
        RecordLocation::WriteAheadLog => log::debug!("credential record located in write-ahead log"),
        RecordLocation::SortedRun => log::debug!("credential record located in sorted run"),
    }
}

/// Pull the credential string out of a raw stored value. Values carry an
/// optional one-byte encoding prefix (0x00 UTF-16, 0x01 Latin-1) and are
/// JSON-quoted.
fn extract_token_value(raw: &[u8]) -> Option<String> {
    if raw.is_empty() {
        return None;
    }

    let data = if raw[0] == 0x00 || raw[0] == 0x01 {
        &raw[1..]
    } else {
        raw
    };

    let s = std::str::from_utf8(data).ok()?;
    let s = s.trim_matches('"').trim();

    if s.is_empty() {
        return None;
    }

    Some(s.to_string())
}

/// Wrap a credential string the way the client stores it: Latin-1 prefix
/// byte followed by the JSON-quoted token. The record's length prefix is
/// recomputed by the engine from this buffer; no fixed width is assumed.
fn encode_token_value(token: &str) -> Vec<u8> {
    let mut value = Vec::with_capacity(token.len() + 3);
    value.push(0x01);
    value.extend_from_slice(format!("\"{token}\"").as_bytes());
    value
}

fn looks_like_token(token: &str) -> bool {
    token.contains(':') || token.len() > 30
}

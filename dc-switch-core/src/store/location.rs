//! Record location classification
//!
//! A key in the store lives either in the mutable write-ahead log or in a
//! compacted sorted run, depending on the client's compaction state at the
//! moment of read. The LevelDB engine reads both transparently; this
//! classifier only reports which representation currently holds the record,
//! as a diagnostic for the capture path.

use crate::store::StoreHandle;
use std::fs;

/// Where a record currently lives inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLocation {
    /// Still in the mutable log (`*.log`), not yet compacted.
    WriteAheadLog,
    /// Compacted into a sorted table (`*.ldb`).
    SortedRun,
}

/// Classify a key that is known to be present in the store.
///
/// The live log is small and rewritten from scratch on every compaction, so
/// a raw byte scan is reliable: log records carry the key bytes verbatim,
/// while sorted runs prefix-compress them.
pub fn classify(handle: &StoreHandle, key: &[u8]) -> RecordLocation {
    let Ok(entries) = fs::read_dir(handle.directory()) else {
        return RecordLocation::SortedRun;
    };

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.extension().map(|e| e == "log").unwrap_or(false) {
            if let Ok(bytes) = fs::read(&path) {
                if contains(&bytes, key) {
                    return RecordLocation::WriteAheadLog;
                }
            }
        }
    }

    RecordLocation::SortedRun
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

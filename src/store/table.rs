//! Table implementation
//!
//! HashMap-backed table with deletion-triggered compaction. Not shared:
//! the engine loop owns the only instance, so no locking is involved.

use std::collections::HashMap;
use std::mem;

use bytes::Bytes;

/// In-memory table of live entries
pub(crate) struct Table {
    entries: HashMap<String, Bytes>,

    /// Deletions since the last compaction
    deletions: usize,

    /// Deletions that trigger a compaction
    threshold: usize,

    /// Compactions performed over the table's lifetime
    compactions: u64,
}

impl Table {
    /// Create an empty table that compacts every `threshold` deletions
    pub(crate) fn new(threshold: usize) -> Self {
        Self {
            entries: HashMap::new(),
            deletions: 0,
            threshold: threshold.max(1),
            compactions: 0,
        }
    }

    /// Insert or overwrite a key
    pub(crate) fn set(&mut self, key: String, value: Bytes) {
        self.entries.insert(key, value);
    }

    /// Look up a key
    pub(crate) fn get(&self, key: &str) -> Option<Bytes> {
        self.entries.get(key).cloned()
    }

    /// Remove a key if present
    ///
    /// The deletion counter advances whether or not the key existed, and a
    /// compaction runs as soon as it reaches the threshold. Returns `true`
    /// if an entry was removed.
    pub(crate) fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();

        self.deletions += 1;
        if self.deletions >= self.threshold {
            self.compact();
        }

        removed
    }

    /// Copy all live entries into a fresh map and reset the deletion counter
    fn compact(&mut self) {
        let old = mem::take(&mut self.entries);
        let capacity_before = old.capacity();

        self.entries = old.into_iter().collect();
        self.deletions = 0;
        self.compactions += 1;

        tracing::debug!(
            live_keys = self.entries.len(),
            capacity_before,
            capacity_after = self.entries.capacity(),
            "compacted storage"
        );
    }

    /// Number of live entries
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Deletions since the last compaction
    pub(crate) fn pending_deletions(&self) -> usize {
        self.deletions
    }

    /// Compactions performed so far
    pub(crate) fn compactions(&self) -> u64 {
        self.compactions
    }
}

use std::cell::Cell;

use serde::Serialize;

/// Snapshot of ordered-index statistics at a point in time.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStatsSnapshot {
    /// Number of key/value pairs inserted
    pub inserts: u64,
    /// Number of leaf splits performed
    pub leaf_splits: u64,
    /// Number of internal node splits performed
    pub internal_splits: u64,
    /// Number of times a split grew a new root
    pub root_splits: u64,
    /// Number of range searches answered
    pub range_searches: u64,
}

/// Statistics counters for a single ordered index.
///
/// Counters use [`Cell`] so read-only searches can record themselves, which
/// makes this type (and every index holding it) `!Sync`.
#[derive(Default, Debug)]
pub struct IndexStats {
    inserts: Cell<u64>,
    leaf_splits: Cell<u64>,
    internal_splits: Cell<u64>,
    root_splits: Cell<u64>,
    range_searches: Cell<u64>,
}

impl IndexStats {
    /// Returns the number of inserts applied.
    pub fn inserts(&self) -> u64 {
        self.inserts.get()
    }

    /// Returns the number of leaf splits.
    pub fn leaf_splits(&self) -> u64 {
        self.leaf_splits.get()
    }

    /// Returns the number of internal node splits.
    pub fn internal_splits(&self) -> u64 {
        self.internal_splits.get()
    }

    /// Returns the number of splits that produced a new root.
    pub fn root_splits(&self) -> u64 {
        self.root_splits.get()
    }

    /// Returns the number of range searches answered.
    pub fn range_searches(&self) -> u64 {
        self.range_searches.get()
    }

    pub(crate) fn inc_inserts(&self) {
        bump(&self.inserts);
    }

    pub(crate) fn inc_leaf_splits(&self) {
        bump(&self.leaf_splits);
    }

    pub(crate) fn inc_internal_splits(&self) {
        bump(&self.internal_splits);
    }

    pub(crate) fn inc_root_splits(&self) {
        bump(&self.root_splits);
    }

    pub(crate) fn inc_range_searches(&self) {
        bump(&self.range_searches);
    }

    /// Creates a snapshot of all current statistics.
    pub fn snapshot(&self) -> IndexStatsSnapshot {
        IndexStatsSnapshot {
            inserts: self.inserts(),
            leaf_splits: self.leaf_splits(),
            internal_splits: self.internal_splits(),
            root_splits: self.root_splits(),
            range_searches: self.range_searches(),
        }
    }

    /// Emits current statistics to the tracing infrastructure.
    pub fn emit_tracing(&self, index: &str) {
        let snapshot = self.snapshot();
        tracing::info!(
            target: "larder::btree::stats",
            index,
            inserts = snapshot.inserts,
            leaf_splits = snapshot.leaf_splits,
            internal_splits = snapshot.internal_splits,
            root_splits = snapshot.root_splits,
            range_searches = snapshot.range_searches,
            "btree stats snapshot"
        );
    }
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get().saturating_add(1));
}

//! Daily request quota per identifier.
//!
//! Persisted as `{ identifier: { "date": "YYYY-MM-DD", "count": n } }`.
//! Day rollover is lazy: an entry stamped with an earlier UTC day is reset
//! the next time it is touched. There is no background timer, so
//! `remaining` may write when it is the first access of a new day.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use vibe_protocol::{Clock, QuotaEntry, SystemClock, DAILY_LIMIT, QUOTA_DOCUMENT};

use crate::document::{Document, DocumentBackend, Outcome};
use crate::StateError;

pub type QuotaMap = BTreeMap<String, QuotaEntry>;

pub struct QuotaLedger {
    entries: Document<QuotaMap>,
    clock: Arc<dyn Clock>,
    daily_limit: u32,
}

impl QuotaLedger {
    pub fn new(entries: Document<QuotaMap>, clock: Arc<dyn Clock>, daily_limit: u32) -> Self {
        Self { entries, clock, daily_limit }
    }

    /// File-backed ledger under `data_dir` with the wall clock.
    pub fn open(data_dir: &Path, daily_limit: u32) -> Self {
        Self::new(
            Document::file(data_dir.join(QUOTA_DOCUMENT)),
            Arc::new(SystemClock),
            daily_limit,
        )
    }

    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(Document::memory(QUOTA_DOCUMENT), clock, DAILY_LIMIT)
    }

    pub fn with_backend(
        backend: Arc<dyn DocumentBackend>,
        clock: Arc<dyn Clock>,
        daily_limit: u32,
    ) -> Self {
        Self::new(Document::new(QUOTA_DOCUMENT, backend), clock, daily_limit)
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Admit and count one request, or refuse without counting.
    ///
    /// The first request of a day is always admitted.
    pub fn check_and_consume(&self, identifier: &str) -> Result<bool, StateError> {
        let today = self.clock.today();
        let limit = self.daily_limit;
        self.entries.update(|map| match map.get_mut(identifier) {
            Some(entry) if entry.is_current(today) => {
                if entry.count >= limit {
                    Outcome::Unchanged(false)
                } else {
                    entry.count += 1;
                    Outcome::Dirty(true)
                }
            }
            _ => {
                map.insert(identifier.to_string(), QuotaEntry::new(today, 1));
                Outcome::Dirty(true)
            }
        })
    }

    /// Requests left today. Resets a stale entry to zero as a side effect.
    pub fn remaining(&self, identifier: &str) -> Result<u32, StateError> {
        let today = self.clock.today();
        let limit = self.daily_limit;
        self.entries.update(|map| match map.get(identifier) {
            Some(entry) if entry.is_current(today) => Outcome::Unchanged(entry.remaining(limit)),
            _ => {
                map.insert(identifier.to_string(), QuotaEntry::new(today, 0));
                Outcome::Dirty(limit)
            }
        })
    }

    /// Stored entry for `identifier`, as persisted (possibly stale).
    pub fn entry(&self, identifier: &str) -> Option<QuotaEntry> {
        self.entries.read().get(identifier).copied()
    }

    /// Drop every entry; all identifiers start fresh.
    pub fn reset_all(&self) -> Result<(), StateError> {
        self.entries.replace(&QuotaMap::new())
    }
}

use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use crate::record::{EventRecord, UserId};

/// Persistent event-history collaborator consumed by the adaptation engine.
///
/// Each adaptation performs one read (for prediction) and one append (after
/// substitution). Concurrent requests may interleave read-then-write; the
/// engine tolerates training on a snapshot that is stale by the time it is
/// used, so implementations need no cross-request locking beyond their own
/// internal consistency.
pub trait HistoryStore: Send + Sync {
    /// Appends one record.
    fn append(&self, record: EventRecord) -> Result<()>;

    /// Returns every stored record across users.
    fn query_all(&self) -> Result<Vec<EventRecord>>;

    /// Returns every record owned by `user`.
    fn query_user(&self, user: &UserId) -> Result<Vec<EventRecord>> {
        Ok(self
            .query_all()?
            .into_iter()
            .filter(|record| &record.user_id == user)
            .collect())
    }

    /// Removes every record owned by `user`; returns the removed count.
    fn reset_user(&self, user: &UserId) -> Result<usize>;

    /// Removes every record; returns the removed count.
    fn reset_all(&self) -> Result<usize>;
}

/// In-memory reference store backed by a read-write lock.
#[derive(Debug, Default, Clone)]
pub struct MemoryHistoryStore {
    records: Arc<RwLock<Vec<EventRecord>>>,
}

impl MemoryHistoryStore {
    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true when no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&self, record: EventRecord) -> Result<()> {
        self.records.write().push(record);
        Ok(())
    }

    fn query_all(&self) -> Result<Vec<EventRecord>> {
        Ok(self.records.read().clone())
    }

    fn reset_user(&self, user: &UserId) -> Result<usize> {
        let mut guard = self.records.write();
        let before = guard.len();
        guard.retain(|record| &record.user_id != user);
        Ok(before - guard.len())
    }

    fn reset_all(&self) -> Result<usize> {
        let mut guard = self.records.write();
        let removed = guard.len();
        guard.clear();
        Ok(removed)
    }
}

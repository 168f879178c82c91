use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use parking_lot::Mutex;

use crate::{
    record::{EventRecord, UserId},
    store::HistoryStore,
};

/// Result of loading the backing file.
#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    /// Records that parsed cleanly, in file order.
    pub records: Vec<EventRecord>,
    /// Lines that failed to parse and were skipped.
    pub skipped: usize,
}

/// Append-only JSON-lines history store.
///
/// Malformed lines are skipped at load time and surfaced through
/// [`HistorySnapshot::skipped`]; they never fail a query.
#[derive(Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl FileHistoryStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating history dir {}", parent.display()))?;
        }
        if !path.exists() {
            fs::write(&path, b"")
                .with_context(|| format!("creating history file {}", path.display()))?;
        }
        Ok(Self {
            path,
            io_lock: Mutex::new(()),
        })
    }

    /// Loads the backing file, counting malformed lines instead of failing.
    pub fn snapshot(&self) -> Result<HistorySnapshot> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading history file {}", self.path.display()))?;
        let mut records = Vec::new();
        let mut skipped = 0;
        for line in raw.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EventRecord>(line) {
                Ok(record) => records.push(record),
                Err(_) => skipped += 1,
            }
        }
        Ok(HistorySnapshot { records, skipped })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rewrite(&self, records: &[EventRecord]) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)
                .with_context(|| format!("creating {}", tmp.display()))?;
            for record in records {
                serde_json::to_writer(&mut file, record)?;
                file.write_all(b"\n")?;
            }
            file.flush()?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

impl HistoryStore for FileHistoryStore {
    fn append(&self, record: EventRecord) -> Result<()> {
        let _guard = self.io_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening history file {}", self.path.display()))?;
        serde_json::to_writer(&mut file, &record)?;
        file.write_all(b"\n")?;
        file.flush()?;
        Ok(())
    }

    fn query_all(&self) -> Result<Vec<EventRecord>> {
        Ok(self.snapshot()?.records)
    }

    fn reset_user(&self, user: &UserId) -> Result<usize> {
        let _guard = self.io_lock.lock();
        let snapshot = self.snapshot()?;
        let kept: Vec<EventRecord> = snapshot
            .records
            .iter()
            .filter(|record| &record.user_id != user)
            .cloned()
            .collect();
        let removed = snapshot.records.len() - kept.len();
        self.rewrite(&kept)?;
        Ok(removed)
    }

    fn reset_all(&self) -> Result<usize> {
        let _guard = self.io_lock.lock();
        let removed = self.snapshot()?.records.len();
        self.rewrite(&[])?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn user(tail: char) -> UserId {
        UserId::parse(&format!("64a1f0b2c3d4e5f60123456{tail}")).unwrap()
    }

    #[test]
    fn appends_and_reloads() {
        let dir = tempdir().unwrap();
        let store = FileHistoryStore::open(dir.path().join("history.jsonl")).unwrap();
        store
            .append(EventRecord::new(user('1'), "party", "monday", 3))
            .unwrap();
        store
            .append(EventRecord::new(user('1'), "trip", "friday", 2))
            .unwrap();
        let records = store.query_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].event_category, "trip");
    }

    #[test]
    fn skips_malformed_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let store = FileHistoryStore::open(&path).unwrap();
        store
            .append(EventRecord::new(user('1'), "party", "monday", 3))
            .unwrap();
        let mut raw = fs::read_to_string(&path).unwrap();
        raw.push_str("{not json}\n");
        fs::write(&path, raw).unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.skipped, 1);
    }

    #[test]
    fn resets_rewrite_the_file() {
        let dir = tempdir().unwrap();
        let store = FileHistoryStore::open(dir.path().join("history.jsonl")).unwrap();
        store
            .append(EventRecord::new(user('1'), "party", "monday", 3))
            .unwrap();
        store
            .append(EventRecord::new(user('2'), "illness", "sunday", 2))
            .unwrap();
        assert_eq!(store.reset_user(&user('1')).unwrap(), 1);
        let remaining = store.query_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].event_category, "illness");
        assert_eq!(store.reset_all().unwrap(), 1);
        assert!(store.query_all().unwrap().is_empty());
    }
}

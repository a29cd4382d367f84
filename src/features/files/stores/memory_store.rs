use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::models::FileRecord;
use crate::features::files::stores::RecordStore;

struct Entry {
    /// Insertion sequence number, used to keep listings stable
    seq: u64,
    record: FileRecord,
}

#[derive(Default)]
struct State {
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

/// Process-lifetime record store guarded by a single read/write lock
#[derive(Default)]
pub struct InMemoryRecordStore {
    state: RwLock<State>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert_unique(&self, record: FileRecord) -> Result<bool> {
        let mut state = self.state.write().await;

        if state.entries.contains_key(&record.code) {
            return Ok(false);
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state
            .entries
            .insert(record.code.clone(), Entry { seq, record });

        Ok(true)
    }

    async fn contains(&self, code: &str) -> Result<bool> {
        Ok(self.state.read().await.entries.contains_key(code))
    }

    async fn find(&self, code: &str) -> Result<Option<FileRecord>> {
        Ok(self
            .state
            .read()
            .await
            .entries
            .get(code)
            .map(|entry| entry.record.clone()))
    }

    async fn remove_if(&self, code: &str, id: Uuid) -> Result<Option<FileRecord>> {
        let mut state = self.state.write().await;

        match state.entries.get(code) {
            Some(entry) if entry.record.id == id => {
                Ok(state.entries.remove(code).map(|entry| entry.record))
            }
            _ => Ok(None),
        }
    }

    async fn snapshot(&self) -> Result<Vec<FileRecord>> {
        let state = self.state.read().await;

        let mut entries: Vec<&Entry> = state.entries.values().collect();
        entries.sort_by_key(|entry| entry.seq);

        Ok(entries.into_iter().map(|entry| entry.record.clone()).collect())
    }

    async fn take_expired(&self, now: DateTime<Utc>) -> Result<Vec<FileRecord>> {
        let mut state = self.state.write().await;

        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.record.is_expired(now))
            .map(|(code, _)| code.clone())
            .collect();

        Ok(expired
            .iter()
            .filter_map(|code| state.entries.remove(code))
            .map(|entry| entry.record)
            .collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.state.read().await.entries.len())
    }
}

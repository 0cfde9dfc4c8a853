//! In-process entry store.
//!
//! Same filter and ordering semantics as [`PgEntryStore`](super::PgEntryStore).
//! Used by the HTTP tests and by `STORAGE_BACKEND=memory`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::EntryStore;
use crate::error::Result;
use crate::models::{Entry, EntryFilter, EntryPatch, NewEntry};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct InMemoryEntryStore {
    entries: RwLock<HashMap<Uuid, Entry>>,
    clock: Clock,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Store whose timestamps come from `clock` instead of the system time.
    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock: Arc::new(clock),
        }
    }

    /// Current time at the microsecond precision Postgres stores.
    fn now(&self) -> DateTime<Utc> {
        (self.clock)().trunc_subsecs(6)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryEntryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn insert(&self, entry: NewEntry) -> Result<Entry> {
        let now = self.now();
        let stored = Entry {
            id: Uuid::new_v4(),
            title: entry.title,
            body: entry.body,
            is_draft: entry.is_draft,
            created_at: now,
            updated_at: now,
        };

        self.entries.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        let entries = self.entries.read().await;
        let mut matched: Vec<Entry> = entries
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Entry>> {
        Ok(self.entries.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, patch: EntryPatch) -> Result<Option<Entry>> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(&id) else {
            return Ok(None);
        };

        patch.apply_to(entry);
        entry.updated_at = self.now().max(entry.created_at);
        Ok(Some(entry.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.entries.write().await.remove(&id).is_some())
    }
}

//! EntryService: the gateway between the HTTP layer and an [`EntryStore`].
//!
//! Validates wire input, builds the typed filter or patch, calls the store
//! once, and turns absence into [`DiaryError::NotFound`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::EntryStore;
use crate::error::{DiaryError, Result};
use crate::models::{CreateEntryRequest, Entry, ListEntriesQuery, UpdateEntryRequest};

/// Acknowledgement returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Clone)]
pub struct EntryService {
    store: Arc<dyn EntryStore>,
}

impl EntryService {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreateEntryRequest) -> Result<Entry> {
        let new_entry = request.validate()?;
        let entry = self.store.insert(new_entry).await?;
        info!(entry_id = %entry.id, is_draft = entry.is_draft, "Created entry");
        Ok(entry)
    }

    pub async fn list(&self, query: ListEntriesQuery) -> Result<Vec<Entry>> {
        let filter = query.into_filter()?;
        debug!(?filter, "Listing entries");
        self.store.find(&filter).await
    }

    pub async fn get(&self, id: &str) -> Result<Entry> {
        let uuid = parse_entry_id(id)?;
        self.store
            .get(uuid)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update(&self, id: &str, request: UpdateEntryRequest) -> Result<Entry> {
        let uuid = parse_entry_id(id)?;
        let patch = request.validate()?;
        let entry = self
            .store
            .update(uuid, patch)
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(entry_id = %entry.id, "Updated entry");
        Ok(entry)
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteResponse> {
        let uuid = parse_entry_id(id)?;
        if !self.store.delete(uuid).await? {
            return Err(not_found(id));
        }
        info!(entry_id = %uuid, "Deleted entry");
        Ok(DeleteResponse {
            message: "Entry deleted successfully".to_string(),
        })
    }
}

/// A malformed id cannot name a stored entry, so it is reported as NotFound.
fn parse_entry_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| not_found(id))
}

fn not_found(id: &str) -> DiaryError {
    warn!(entry_id = id, "Entry not found");
    DiaryError::entry_not_found(id)
}

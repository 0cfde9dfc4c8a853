//! Entry store port and its Postgres adapter.
//!
//! All SQL is runtime-checked (`sqlx::query_as`, not `sqlx::query!`) so the
//! crate builds without a live database.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Entry, EntryFilter, EntryPatch, NewEntry};

const ENTRY_COLUMNS: &str = "id, title, body, is_draft, created_at, updated_at";

/// Persistence port for diary entries.
///
/// Each call is a single-document operation; absence is reported as `None`
/// (or `false`) and turned into a NotFound by the caller.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Store a new entry, assigning its id and both timestamps.
    async fn insert(&self, entry: NewEntry) -> Result<Entry>;

    /// All entries matching `filter`, newest `created_at` first.
    async fn find(&self, filter: &EntryFilter) -> Result<Vec<Entry>>;

    async fn get(&self, id: Uuid) -> Result<Option<Entry>>;

    /// Apply `patch` and refresh `updated_at`. Returns the full updated entry.
    async fn update(&self, id: Uuid, patch: EntryPatch) -> Result<Option<Entry>>;

    /// Hard delete. Returns whether an entry was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Postgres-backed entry store.
#[derive(Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn insert(&self, entry: NewEntry) -> Result<Entry> {
        let id = Uuid::new_v4();

        let entry = sqlx::query_as::<_, Entry>(&format!(
            r#"
            INSERT INTO entries (id, title, body, is_draft, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(entry.title)
        .bind(entry.body)
        .bind(entry.is_draft)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create entry")?;

        Ok(entry)
    }

    async fn find(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE 1=1"));

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", escape_like(search));
            query_builder.push(" AND (title ILIKE ");
            query_builder.push_bind(pattern.clone());
            query_builder.push(" OR body ILIKE ");
            query_builder.push_bind(pattern);
            query_builder.push(")");
        }

        if let Some(from) = filter.created_from {
            query_builder.push(" AND created_at >= ");
            query_builder.push_bind(from);
        }

        if let Some(to) = filter.created_to {
            query_builder.push(" AND created_at <= ");
            query_builder.push_bind(to);
        }

        query_builder.push(" ORDER BY created_at DESC");
        debug!(sql = query_builder.sql(), "Listing entries");

        let entries = query_builder
            .build_query_as::<Entry>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list entries")?;

        Ok(entries)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Entry>> {
        let entry = sqlx::query_as::<_, Entry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch entry")?;

        Ok(entry)
    }

    async fn update(&self, id: Uuid, patch: EntryPatch) -> Result<Option<Entry>> {
        let entry = sqlx::query_as::<_, Entry>(&format!(
            r#"
            UPDATE entries
            SET title = COALESCE($2, title),
                body = COALESCE($3, body),
                is_draft = COALESCE($4, is_draft),
                updated_at = GREATEST(NOW(), created_at)
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.body)
        .bind(patch.is_draft)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update entry")?;

        Ok(entry)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete entry")?;

        Ok(result.rows_affected() > 0)
    }
}

/// Escape `ILIKE` metacharacters so user input is matched literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

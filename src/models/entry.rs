//! Diary entry types: the stored record, the wire-level request bodies, and
//! the validated inputs handed to an [`EntryStore`](crate::database::EntryStore).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{DiaryError, Result};

/// Maximum title length, counted in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// A stored diary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub is_draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/entries`.
///
/// Every field is optional at the wire level so a missing `title` is reported
/// as a validation failure naming the field instead of a generic decode error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub is_draft: Option<bool>,
}

/// Body of `PUT /api/entries/:id`. Absent and `null` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub is_draft: Option<bool>,
}

/// Validated input for creating an entry. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub title: String,
    pub body: String,
    pub is_draft: bool,
}

/// Validated partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub is_draft: Option<bool>,
}

impl CreateEntryRequest {
    pub fn validate(self) -> Result<NewEntry> {
        let title = self
            .title
            .ok_or_else(|| DiaryError::validation("title is required"))?;
        let body = self
            .body
            .ok_or_else(|| DiaryError::validation("body is required"))?;

        validate_title(&title)?;
        validate_body(&body)?;

        Ok(NewEntry {
            title,
            body,
            is_draft: self.is_draft.unwrap_or(false),
        })
    }
}

impl UpdateEntryRequest {
    pub fn validate(self) -> Result<EntryPatch> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(body) = &self.body {
            validate_body(body)?;
        }

        Ok(EntryPatch {
            title: self.title,
            body: self.body,
            is_draft: self.is_draft,
        })
    }
}

impl EntryPatch {
    /// Apply the supplied fields to `entry` in place. Timestamps are the caller's concern.
    pub fn apply_to(&self, entry: &mut Entry) {
        if let Some(title) = &self.title {
            entry.title = title.clone();
        }
        if let Some(body) = &self.body {
            entry.body = body.clone();
        }
        if let Some(is_draft) = self.is_draft {
            entry.is_draft = is_draft;
        }
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(DiaryError::validation("title should not be empty"));
    }
    reject_nul("title", title)?;
    let chars = title.chars().count();
    if chars > TITLE_MAX_CHARS {
        return Err(DiaryError::validation(format!(
            "title must be at most {TITLE_MAX_CHARS} characters (got {chars})"
        )));
    }
    Ok(())
}

fn validate_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(DiaryError::validation("body should not be empty"));
    }
    reject_nul("body", body)
}

/// Postgres text cannot hold U+0000.
fn reject_nul(field: &str, value: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(DiaryError::validation(format!(
            "{field} must not contain NUL characters"
        )));
    }
    Ok(())
}

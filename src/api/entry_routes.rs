//! Diary entry endpoints
//!
//! ## Endpoints
//!
//! - `POST   /api/entries`     - create an entry (201)
//! - `GET    /api/entries`     - list, optional `search`, `startDate`, `endDate`
//! - `GET    /api/entries/:id` - fetch one
//! - `PUT    /api/entries/:id` - partial update
//! - `DELETE /api/entries/:id` - hard delete
//! - `GET    /api/health`      - liveness

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{StatusCode, Uri},
    response::Json,
};
use serde_json::{json, Value};

use crate::api::error::AppError;
use crate::error::DiaryError;
use crate::models::{CreateEntryRequest, Entry, ListEntriesQuery, UpdateEntryRequest};
use crate::service::{DeleteResponse, EntryService};

/// POST /api/entries
///
/// ```text
/// {"title": "My first thought", "body": "I imagine she has a beautiful smile...", "isDraft": false}
/// ```
pub async fn create_entry(
    State(service): State<EntryService>,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Entry>), AppError> {
    let Json(request) = payload?;
    let entry = service.create(request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/entries?search=smile&startDate=2026-01-01&endDate=2026-01-31
pub async fn list_entries(
    State(service): State<EntryService>,
    query: Result<Query<ListEntriesQuery>, QueryRejection>,
) -> Result<Json<Vec<Entry>>, AppError> {
    let Query(query) = query?;
    Ok(Json(service.list(query).await?))
}

pub async fn get_entry(
    State(service): State<EntryService>,
    path: Result<Path<String>, PathRejection>,
    uri: Uri,
) -> Result<Json<Entry>, AppError> {
    let id = entry_id(path, &uri)?;
    Ok(Json(service.get(&id).await?))
}

/// PUT /api/entries/:id. Only the supplied fields change; an empty body is an
/// empty patch.
pub async fn update_entry(
    State(service): State<EntryService>,
    path: Result<Path<String>, PathRejection>,
    uri: Uri,
    body: Bytes,
) -> Result<Json<Entry>, AppError> {
    let id = entry_id(path, &uri)?;
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        UpdateEntryRequest::default()
    } else {
        let Json(request) = Json::<UpdateEntryRequest>::from_bytes(&body)?;
        request
    };
    Ok(Json(service.update(&id, request).await?))
}

pub async fn delete_entry(
    State(service): State<EntryService>,
    path: Result<Path<String>, PathRejection>,
    uri: Uri,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = entry_id(path, &uri)?;
    Ok(Json(service.delete(&id).await?))
}

/// An id segment that cannot be decoded cannot name an entry: NotFound,
/// reported with the raw segment as sent.
fn entry_id(path: Result<Path<String>, PathRejection>, uri: &Uri) -> Result<String, AppError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(_) => {
            let raw = uri.path().rsplit('/').next().unwrap_or_default();
            Err(DiaryError::entry_not_found(raw).into())
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

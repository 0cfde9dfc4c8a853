//! HTTP-level tests for the diary entry API.
//!
//! Drives the real router with `tower::ServiceExt::oneshot` against the
//! in-memory entry store; no database needed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use diary_api::api::build_router;
use diary_api::database::InMemoryEntryStore;
use diary_api::service::EntryService;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

// ── Test app builders ──────────────────────────────────────────

fn build_test_app() -> axum::Router {
    build_router(EntryService::new(Arc::new(InMemoryEntryStore::new())))
}

/// App whose store stamps successive inserts/updates with `times`, in order.
fn build_test_app_at(times: Vec<DateTime<Utc>>) -> axum::Router {
    let next = AtomicUsize::new(0);
    let store = InMemoryEntryStore::with_clock(move || {
        let i = next.fetch_add(1, Ordering::SeqCst);
        times[i.min(times.len() - 1)]
    });
    build_router(EntryService::new(Arc::new(store)))
}

// ── Request helpers ────────────────────────────────────────────

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create(app: &axum::Router, title: &str, body: &str) -> Value {
    let (status, json) = send(
        app,
        Method::POST,
        "/api/entries",
        Some(json!({ "title": title, "body": body })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    json
}

fn titles(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect()
}

// ── Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let app = build_test_app();
    let (status, json) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_create_then_get() {
    let app = build_test_app();
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({
            "title": "My first thought",
            "body": "I imagine she has a beautiful smile...",
            "isDraft": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/api/entries/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "My first thought");
    assert_eq!(fetched["body"], "I imagine she has a beautiful smile...");
    assert_eq!(fetched["isDraft"], true);
}

#[tokio::test]
async fn test_create_defaults_is_draft() {
    let app = build_test_app();
    let created = create(&app, "t", "b").await;
    assert_eq!(created["isDraft"], false);
}

#[tokio::test]
async fn test_create_validation() {
    let app = build_test_app();

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "title": "", "body": "b" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["statusCode"], 400);
    assert_eq!(json["error"], "Bad Request");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "title": "a".repeat(201), "body": "b" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "title": "a".repeat(200), "body": "b" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "title": "t" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("body"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "title": "t", "body": "b", "isDraft": "yes" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_title_only() {
    let t0 = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2026, 1, 10, 9, 30, 0).unwrap();
    let app = build_test_app_at(vec![t0, t1]);

    let created = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "title": "before", "body": "unchanged", "isDraft": true })),
    )
    .await
    .1;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/entries/{id}"),
        Some(json!({ "title": "after" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "after");
    assert_eq!(updated["body"], "unchanged");
    assert_eq!(updated["isDraft"], true);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_ne!(updated["updatedAt"], created["updatedAt"]);
}

#[tokio::test]
async fn test_update_rejects_empty_title() {
    let app = build_test_app();
    let id = create(&app, "t", "b").await["id"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/entries/{id}"),
        Some(json!({ "title": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_then_get() {
    let app = build_test_app();
    let id = create(&app, "t", "b").await["id"].as_str().unwrap().to_string();

    let (status, json) = send(&app, Method::DELETE, &format!("/api/entries/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Entry deleted successfully");

    let (status, json) = send(&app, Method::GET, &format!("/api/entries/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], format!("Entry with ID {id} not found"));

    let (status, _) = send(&app, Method::DELETE, &format!("/api/entries/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_and_malformed_ids() {
    let app = build_test_app();

    let (status, json) = send(&app, Method::GET, "/api/entries/65abc123def456789", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["statusCode"], 404);
    assert_eq!(json["error"], "Not Found");
    assert_eq!(json["message"], "Entry with ID 65abc123def456789 not found");

    let unknown = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/entries/{unknown}"),
        Some(json!({ "body": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_undecodable_id_is_not_found() {
    let app = build_test_app();
    create(&app, "t", "b").await;

    for (method, body) in [
        (Method::GET, None),
        (Method::PUT, Some(json!({ "title": "x" }))),
        (Method::DELETE, None),
    ] {
        let (status, json) = send(&app, method.clone(), "/api/entries/%FF", body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["error"], "Not Found");
        assert_eq!(json["message"], "Entry with ID %FF not found");
    }
}

#[tokio::test]
async fn test_update_malformed_id_is_not_found() {
    let app = build_test_app();
    let (status, json) = send(
        &app,
        Method::PUT,
        "/api/entries/not-a-uuid",
        Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Entry with ID not-a-uuid not found");
}

#[tokio::test]
async fn test_update_empty_patch_refreshes_updated_at() {
    let t0 = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2026, 1, 10, 9, 30, 0).unwrap();
    let app = build_test_app_at(vec![t0, t1]);

    let created = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "title": "kept", "body": "also kept", "isDraft": true })),
    )
    .await
    .1;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/entries/{id}"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "kept");
    assert_eq!(updated["body"], "also kept");
    assert_eq!(updated["isDraft"], true);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_ne!(updated["updatedAt"], created["updatedAt"]);
}

#[tokio::test]
async fn test_update_without_body_is_empty_patch() {
    let app = build_test_app();
    let id = create(&app, "t", "b").await["id"].as_str().unwrap().to_string();

    let (status, updated) = send(&app, Method::PUT, &format!("/api/entries/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "t");
    assert_eq!(updated["body"], "b");

    let req = Request::builder()
        .method(Method::PUT)
        .uri(format!("/api/entries/{id}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_nul_characters() {
    let app = build_test_app();
    let (status, json) = send(
        &app,
        Method::POST,
        "/api/entries",
        Some(json!({ "title": "a\u{0}b", "body": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("NUL"));

    let (_, list) = send(&app, Method::GET, "/api/entries", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_search() {
    let app = build_test_app();
    create(&app, "Her SMILE", "first day").await;
    create(&app, "Rain", "she smiled at me").await;
    create(&app, "Work", "long meeting").await;

    let (status, list) = send(&app, Method::GET, "/api/entries?search=smile", None).await;
    assert_eq!(status, StatusCode::OK);
    let mut found = titles(&list);
    found.sort();
    assert_eq!(found, ["Her SMILE", "Rain"]);

    let (_, all) = send(&app, Method::GET, "/api/entries?search=", None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_date_range_newest_first() {
    let app = build_test_app_at(vec![
        Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 1, 31, 18, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
    ]);
    for title in ["dec", "jan-1", "jan-15", "jan-31", "feb"] {
        create(&app, title, "b").await;
    }

    let (status, list) = send(
        &app,
        Method::GET,
        "/api/entries?startDate=2026-01-01&endDate=2026-01-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&list), ["jan-31", "jan-15", "jan-1"]);

    let (_, list) = send(&app, Method::GET, "/api/entries?startDate=2026-01-31", None).await;
    assert_eq!(titles(&list), ["feb", "jan-31"]);

    let (_, list) = send(&app, Method::GET, "/api/entries", None).await;
    assert_eq!(titles(&list), ["feb", "jan-31", "jan-15", "jan-1", "dec"]);
}

#[tokio::test]
async fn test_list_inverted_range_is_empty() {
    let app = build_test_app_at(vec![
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
    ]);
    for title in ["jan-1", "jan-15", "feb"] {
        create(&app, title, "b").await;
    }

    let (status, list) = send(
        &app,
        Method::GET,
        "/api/entries?startDate=2026-02-01&endDate=2026-01-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_list_rejects_bad_date() {
    let app = build_test_app();
    let (status, json) = send(&app, Method::GET, "/api/entries?startDate=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("startDate"));
}

#[tokio::test]
async fn test_cors_preflight_allows_credentials() {
    let app = build_test_app();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/entries")
        .header(header::ORIGIN, "http://localhost:8081")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let headers = resp.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:8081"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("PUT"));
    assert!(methods.contains("DELETE"));
}

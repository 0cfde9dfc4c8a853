//! Router construction for the diary server.

use axum::{http::Method, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::api::entry_routes;
use crate::service::EntryService;

/// Build the full axum router with all routes and middleware.
pub fn build_router(service: EntryService) -> Router {
    Router::new()
        .route("/api/health", get(entry_routes::health))
        .route(
            "/api/entries",
            get(entry_routes::list_entries).post(entry_routes::create_entry),
        )
        .route(
            "/api/entries/:id",
            get(entry_routes::get_entry)
                .put(entry_routes::update_entry)
                .delete(entry_routes::delete_entry),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(service)
}

/// Any origin, with credentials. A literal `*` is rejected by browsers when
/// credentials are allowed, so the request origin is echoed back instead.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

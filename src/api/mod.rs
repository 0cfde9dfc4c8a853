//! HTTP surface: route table, handlers, and error responses.

pub mod entry_routes;
pub mod error;
pub mod router;

pub use error::AppError;
pub use router::build_router;

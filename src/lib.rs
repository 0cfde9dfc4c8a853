//! Diary entry REST server.
//!
//! Five operations over `/api/entries` (create, list with search and date
//! range, get, partial update, delete) backed by an [`database::EntryStore`].
//! The store is acquired once at startup and passed explicitly into
//! [`service::EntryService`], which the router shares as state.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod service;

pub use error::{DiaryError, Result};

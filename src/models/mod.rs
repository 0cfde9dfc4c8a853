//! Domain and wire types for diary entries.

pub mod entry;
pub mod query;

pub use entry::{
    CreateEntryRequest, Entry, EntryPatch, NewEntry, UpdateEntryRequest, TITLE_MAX_CHARS,
};
pub use query::{EntryFilter, ListEntriesQuery};

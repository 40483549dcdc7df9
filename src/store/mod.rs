//! Backends for the document store that holds all user data.
//!
//! The store is a tree of JSON values addressed by slash-separated paths.
//! [DocumentStore] is the seam the rest of the application talks through;
//! [RestStore] speaks the hosted database's HTTP protocol and [MemoryStore]
//! keeps the same tree in process memory for local runs and tests.

mod document;
mod memory;
mod rest;

pub use document::{DocumentStore, StoreError};
pub use memory::MemoryStore;
pub use rest::RestStore;

use crate::{auth::UserId, month_key::MonthKey};

/// The path of one month's partition of a user's collection.
pub(crate) fn month_path(user: &UserId, collection: &str, month: MonthKey) -> String {
    format!("users/{user}/{collection}/{month}")
}

/// The path of a single record within a month partition.
pub(crate) fn record_path(user: &UserId, collection: &str, month: MonthKey, id: &str) -> String {
    format!("users/{user}/{collection}/{month}/{id}")
}

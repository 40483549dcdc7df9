//! The seam between the application and the document store.

use async_trait::async_trait;
use serde_json::Value;

/// A transport failure reported by a document store backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    /// The HTTP status of the failed request, when the backend is remote.
    pub status: Option<u16>,
    /// A description of the failure.
    pub message: String,
}

impl StoreError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub(crate) fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

/// Point operations on a path-addressed tree of JSON values.
///
/// Paths are slash-separated, e.g. `users/u1/transactions/04_2025`. An absent
/// path reads as `None`; writing creates any intermediate collections. These
/// are the only operations the application needs from its database, which is
/// what lets the in-memory backend stand in for the hosted one.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the value at `path`, or `None` if nothing is stored there.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Overwrite the value at `path`.
    async fn put(&self, path: &str, value: &Value) -> Result<(), StoreError>;

    /// Remove the value at `path`. Removing an absent path is not an error.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    /// Whether any value is stored at `path`.
    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        Ok(self.get(path).await?.is_some())
    }

    /// Append `value` under `path` with a store-generated unique id and
    /// return the id.
    async fn push(&self, path: &str, value: &Value) -> Result<String, StoreError>;
}

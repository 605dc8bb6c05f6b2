//! Persistence collaborator.

use std::future::Future;

use rested_core::FilterExpression;
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored record: a JSON object.
pub type Item = Map<String, Value>;

/// Failure reported by a [`Store`].
///
/// `NotFound` and `AlreadyExists` are mapped into the error taxonomy by
/// [`ModelResource`](crate::ModelResource). The remaining variants are
/// unclassified and propagate out of dispatch.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No item with the given key.
    #[error("item '{key}' not found")]
    NotFound {
        /// The missing key.
        key: String,
    },

    /// Primary key collision.
    #[error("item already exists")]
    AlreadyExists {
        /// The colliding key, if known.
        key: Option<String>,
    },

    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// Creates a collision error for `key`.
    pub fn already_exists(key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            key: Some(key.into()),
        }
    }

    /// Creates a not found error for `key`.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }
}

/// Storage backend behind a [`ModelResource`](crate::ModelResource).
///
/// Implementations own their retry, timeout and cancellation policy.
/// Returned futures must be `Send`.
pub trait Store: Send + Sync + 'static {
    /// Persists a new item and returns it as stored (with its key filled in).
    fn create(&self, item: Item) -> impl Future<Output = Result<Item, StoreError>> + Send;

    /// Loads one item; `None` if absent.
    fn get(&self, pk: &str) -> impl Future<Output = Result<Option<Item>, StoreError>> + Send;

    /// Merges `changes` into an item and returns the result; `None` if absent.
    fn update(
        &self,
        pk: &str,
        changes: Item,
    ) -> impl Future<Output = Result<Option<Item>, StoreError>> + Send;

    /// Removes an item; `false` if it did not exist.
    fn delete(&self, pk: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Returns every item matching all `filters`.
    fn query(
        &self,
        filters: &[FilterExpression],
    ) -> impl Future<Output = Result<Vec<Item>, StoreError>> + Send;
}

//! Article persistence.
//!
//! Handlers only see [`ArticleStore`], injected through the router state.
//! Every operation is one atomic document operation; none of them retry.

mod disk;
mod memory;
mod timed;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::article::{Article, ArticleFields};

pub use disk::SledStore;
pub use memory::MemoryStore;
pub use timed::TimedStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Malformed article id `{0}`")]
    MalformedId(String),

    #[error("No article with id `{0}`")]
    NotFound(String),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("storage backend: {0}")]
    Backend(#[from] sled::Error),

    #[error("document codec: {0}")]
    Codec(#[from] serde_json::Error),
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// All articles in insertion order.
    async fn list(&self) -> Result<Vec<Article>, StoreError>;

    /// Persists a new article under a fresh id and returns it.
    async fn create(&self, fields: ArticleFields) -> Result<Article, StoreError>;

    /// `Ok(None)` when no article has `id`.
    async fn get_by_id(&self, id: &str) -> Result<Option<Article>, StoreError>;

    /// Replaces every field of an existing article and returns the updated
    /// record. Fails with [`StoreError::NotFound`] rather than creating one.
    async fn update_by_id(&self, id: &str, fields: ArticleFields) -> Result<Article, StoreError>;

    /// Removes the article if present. Deleting a missing id succeeds.
    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;

    /// Cheap round-trip used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Parses an article id. Anything that is not a UUID is
/// [`StoreError::MalformedId`], never "not found".
pub fn parse_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::MalformedId(id.to_owned()))
}

/// A fresh id. UUID v7 ids sort by creation time.
pub(crate) fn new_id() -> Uuid {
    Uuid::now_v7()
}

pub(crate) fn article(id: Uuid, fields: ArticleFields) -> Article {
    Article { id: id.hyphenated().to_string(), fields }
}

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ArticleStore, StoreError, article, new_id, parse_id};
use crate::article::{Article, ArticleFields};

const TREE: &str = "articles";

/// On-disk document store backed by sled.
///
/// Each article is one JSON document in the `articles` tree, keyed by the
/// 16 raw bytes of its id. Writes are flushed before the call returns.
pub struct SledStore {
    db: sled::Db,
    tree: sled::Tree,
}

/// What is written to disk. `seq` comes from sled's monotonic id generator
/// and fixes the listing order.
#[derive(Deserialize, Serialize)]
struct Document {
    seq: u64,
    #[serde(flatten)]
    article: Article,
}

impl SledStore {
    /// Opens (or creates) the database directory at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let db = sled::open(path)?;
        info!(path = %path.display(), recovered = db.was_recovered(), "article store opened");
        Self::with_db(db)
    }

    /// A store that lives in a temporary directory removed on drop.
    pub fn temporary() -> Result<Self, StoreError> {
        Self::with_db(sled::Config::new().temporary(true).open()?)
    }

    fn with_db(db: sled::Db) -> Result<Self, StoreError> {
        let tree = db.open_tree(TREE)?;
        Ok(Self { db, tree })
    }

    async fn flush(&self) -> Result<(), StoreError> {
        self.tree.flush_async().await?;
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> Result<Document, StoreError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[async_trait]
impl ArticleStore for SledStore {
    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        let mut documents = self
            .tree
            .iter()
            .values()
            .map(|value| decode(&value?))
            .collect::<Result<Vec<_>, _>>()?;
        documents.sort_by_key(|d| d.seq);
        Ok(documents.into_iter().map(|d| d.article).collect())
    }

    async fn create(&self, fields: ArticleFields) -> Result<Article, StoreError> {
        let id = new_id();
        let document = Document { seq: self.db.generate_id()?, article: article(id, fields) };
        self.tree.insert(id.as_bytes(), serde_json::to_vec(&document)?)?;
        self.flush().await?;
        Ok(document.article)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Article>, StoreError> {
        let key = parse_id(id)?;
        match self.tree.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?.article)),
            None => Ok(None),
        }
    }

    async fn update_by_id(&self, id: &str, fields: ArticleFields) -> Result<Article, StoreError> {
        let key = parse_id(id)?;
        let replacement = article(key, fields);

        // The closure never inserts: a concurrent delete stays deleted.
        let mut failure = None;
        let updated = self.tree.update_and_fetch(key.as_bytes(), |old| {
            let old = old?;
            let encoded = decode(old).and_then(|previous| {
                let document = Document { seq: previous.seq, article: replacement.clone() };
                Ok(serde_json::to_vec(&document)?)
            });
            match encoded {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    failure = Some(e);
                    Some(old.to_vec())
                }
            }
        })?;

        if let Some(e) = failure {
            return Err(e);
        }
        if updated.is_none() {
            return Err(StoreError::NotFound(id.to_owned()));
        }
        self.flush().await?;
        Ok(replacement)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let key = parse_id(id)?;
        if self.tree.remove(key.as_bytes())?.is_some() {
            self.flush().await?;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.size_on_disk()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    fn store() -> SledStore {
        SledStore::temporary().unwrap()
    }

    #[tokio::test]
    async fn create_then_get() {
        contract::create_then_get(&store()).await;
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        contract::list_keeps_insertion_order(&store()).await;
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        contract::update_replaces_fields(&store()).await;
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        contract::update_missing_is_not_found(&store()).await;
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        contract::delete_is_idempotent(&store()).await;
    }

    #[tokio::test]
    async fn malformed_ids_are_errors() {
        contract::malformed_ids_are_errors(&store()).await;
    }

    #[tokio::test]
    async fn articles_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let store = SledStore::open(dir.path()).unwrap();
            store.create(contract::fields("kept")).await.unwrap().id
        };

        let store = SledStore::open(dir.path()).unwrap();
        let found = store.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.fields.title, "kept");
        assert!(store.ping().await.is_ok());
    }
}

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{ArticleStore, StoreError, article, new_id, parse_id};
use crate::article::{Article, ArticleFields};

/// Process-local store. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    articles: RwLock<Vec<Article>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.articles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.read().is_empty()
    }
}

/// Ids are compared in canonical form so `{…}` or uppercase spellings of
/// the same UUID still match.
fn canonical(id: &str) -> Result<String, StoreError> {
    Ok(parse_id(id)?.hyphenated().to_string())
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        Ok(self.articles.read().clone())
    }

    async fn create(&self, fields: ArticleFields) -> Result<Article, StoreError> {
        let created = article(new_id(), fields);
        self.articles.write().push(created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Article>, StoreError> {
        let id = canonical(id)?;
        Ok(self.articles.read().iter().find(|a| a.id == id).cloned())
    }

    async fn update_by_id(&self, id: &str, fields: ArticleFields) -> Result<Article, StoreError> {
        let key = canonical(id)?;
        let mut articles = self.articles.write();
        let existing = articles
            .iter_mut()
            .find(|a| a.id == key)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        existing.fields = fields;
        Ok(existing.clone())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let id = canonical(id)?;
        self.articles.write().retain(|a| a.id != id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[tokio::test]
    async fn create_then_get() {
        contract::create_then_get(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        contract::list_keeps_insertion_order(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        contract::update_replaces_fields(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        contract::update_missing_is_not_found(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        contract::delete_is_idempotent(&store).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn malformed_ids_are_errors() {
        contract::malformed_ids_are_errors(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn uppercase_ids_match() {
        let store = MemoryStore::new();
        let created = store.create(contract::fields("A")).await.unwrap();
        let found = store.get_by_id(&created.id.to_uppercase()).await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(created.id));
    }
}

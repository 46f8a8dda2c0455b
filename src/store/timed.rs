use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use super::{ArticleStore, StoreError};
use crate::article::{Article, ArticleFields};

/// Bounds every call to the wrapped store. A call that outlives `limit` is
/// abandoned with [`StoreError::Timeout`] so a wedged backend cannot hang a
/// request forever.
pub struct TimedStore {
    inner: Arc<dyn ArticleStore>,
    limit: Duration,
}

impl TimedStore {
    pub fn new(inner: Arc<dyn ArticleStore>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        timeout(self.limit, op)
            .await
            .unwrap_or(Err(StoreError::Timeout(self.limit)))
    }
}

#[async_trait]
impl ArticleStore for TimedStore {
    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        self.bounded(self.inner.list()).await
    }

    async fn create(&self, fields: ArticleFields) -> Result<Article, StoreError> {
        self.bounded(self.inner.create(fields)).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Article>, StoreError> {
        self.bounded(self.inner.get_by_id(id)).await
    }

    async fn update_by_id(&self, id: &str, fields: ArticleFields) -> Result<Article, StoreError> {
        self.bounded(self.inner.update_by_id(id, fields)).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        self.bounded(self.inner.delete_by_id(id)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(self.inner.ping()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::store::contract;

    /// Never answers.
    struct Wedged;

    #[async_trait]
    impl ArticleStore for Wedged {
        async fn list(&self) -> Result<Vec<Article>, StoreError> {
            std::future::pending().await
        }
        async fn create(&self, _: ArticleFields) -> Result<Article, StoreError> {
            std::future::pending().await
        }
        async fn get_by_id(&self, _: &str) -> Result<Option<Article>, StoreError> {
            std::future::pending().await
        }
        async fn update_by_id(&self, _: &str, _: ArticleFields) -> Result<Article, StoreError> {
            std::future::pending().await
        }
        async fn delete_by_id(&self, _: &str) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn wedged_backend_times_out() {
        let limit = Duration::from_millis(20);
        let store = TimedStore::new(Arc::new(Wedged), limit);
        match store.list().await {
            Err(StoreError::Timeout(d)) => assert_eq!(d, limit),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(matches!(store.ping().await, Err(StoreError::Timeout(_))));
    }

    #[tokio::test]
    async fn healthy_backend_passes_through() {
        let store = TimedStore::new(Arc::new(MemoryStore::new()), Duration::from_secs(1));
        contract::create_then_get(&store).await;
        contract::update_replaces_fields(&store).await;
    }
}

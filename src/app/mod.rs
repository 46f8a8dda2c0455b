//! The article application: state, route table and handlers.

pub mod articles;
pub mod pages;

use std::sync::Arc;

use crate::article::ARTICLE_SCHEMA;
use crate::config::{Settings, StoreBackend};
use crate::error::Error;
use crate::health;
use crate::method::Method;
use crate::middleware::validate;
use crate::router::Router;
use crate::store::{ArticleStore, MemoryStore, SledStore, TimedStore};
use crate::views::Views;

/// Everything a handler needs, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub views: Arc<Views>,
}

impl AppState {
    pub fn new(store: Arc<dyn ArticleStore>, views: Views) -> Self {
        Self { store, views: Arc::new(views) }
    }

    /// Opens the configured store behind the per-operation timeout and loads
    /// the templates.
    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        let backend: Arc<dyn ArticleStore> = match settings.store {
            StoreBackend::Sled => Arc::new(SledStore::open(&settings.data_dir)?),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };
        let store = Arc::new(TimedStore::new(backend, settings.store_timeout));
        let views = Views::load(settings.templates_dir.as_deref())?;
        Ok(Self::new(store, views))
    }
}

/// The full route table.
///
/// Create and update share one schema check; everything else goes straight
/// to its handler. Unmatched requests and every error end in
/// [`pages::error`].
pub fn router(state: AppState) -> Router<AppState> {
    Router::with_state(state)
        .on(Method::Get,    "/",                   pages::home)
        .on(Method::Get,    "/articles",           articles::index)
        .on(Method::Get,    "/articles/new",       articles::new)
        .on(Method::Post,   "/articles",           validate(&ARTICLE_SCHEMA, articles::create))
        .on(Method::Get,    "/articles/{id}",      articles::show)
        .on(Method::Get,    "/articles/{id}/edit", articles::edit)
        .on(Method::Put,    "/articles/{id}",      validate(&ARTICLE_SCHEMA, articles::update))
        .on(Method::Delete, "/articles/{id}",      articles::destroy)
        .on(Method::Get,    "/healthz",            health::liveness)
        .on(Method::Get,    "/readyz",             health::readiness)
        .on_error(pages::error)
}

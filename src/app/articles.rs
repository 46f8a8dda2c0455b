//! Article CRUD handlers.
//!
//! Each handler does at most one store call, then renders a view or
//! redirects. Failures go back to the router with `?`.

use serde_json::json;
use tracing::info;

use super::AppState;
use crate::article::{Article, ArticleFields};
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// `GET /articles`
pub async fn index(_req: Request, state: AppState) -> Result<Response, Error> {
    let articles = state.store.list().await?;
    state.views.page("articles/index", &json!({ "articles": articles }))
}

/// `GET /articles/new`
pub async fn new(_req: Request, state: AppState) -> Result<Response, Error> {
    state.views.page("articles/new", &json!({}))
}

/// `POST /articles`
pub async fn create(req: Request, state: AppState) -> Result<Response, Error> {
    let fields = ArticleFields::from_form(req.form()?)?;
    let article = state.store.create(fields).await?;
    info!(id = %article.id, "article created");
    Ok(Response::redirect(&format!("/articles/{}", article.id)))
}

/// `GET /articles/{id}`
pub async fn show(req: Request, state: AppState) -> Result<Response, Error> {
    let article = find(&req, &state).await?;
    state.views.page("articles/show", &json!({ "article": article }))
}

/// `GET /articles/{id}/edit`
pub async fn edit(req: Request, state: AppState) -> Result<Response, Error> {
    let article = find(&req, &state).await?;
    state.views.page("articles/edit", &json!({ "article": article }))
}

/// `PUT /articles/{id}`
pub async fn update(req: Request, state: AppState) -> Result<Response, Error> {
    let id = path_id(&req)?;
    let fields = ArticleFields::from_form(req.form()?)?;
    let article = state.store.update_by_id(id, fields).await?;
    info!(id = %article.id, "article updated");
    Ok(Response::redirect(&format!("/articles/{}", article.id)))
}

/// `DELETE /articles/{id}`
pub async fn destroy(req: Request, state: AppState) -> Result<Response, Error> {
    let id = path_id(&req)?;
    state.store.delete_by_id(id).await?;
    info!(id, "article deleted");
    Ok(Response::redirect("/articles"))
}

fn path_id(req: &Request) -> Result<&str, Error> {
    req.param("id").ok_or(Error::RouteNotFound)
}

async fn find(req: &Request, state: &AppState) -> Result<Article, Error> {
    let id = path_id(req)?;
    state
        .store
        .get_by_id(id)
        .await?
        .ok_or(Error::NotFound("Article"))
}

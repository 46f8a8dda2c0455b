//! Pages that are not about a single article, and the error page.

use serde_json::json;
use tracing::error;

use super::AppState;
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

pub async fn home(_req: Request, state: AppState) -> Result<Response, Error> {
    state.views.page("home", &json!({}))
}

/// The error responder: renders the `error` view with the failure's status
/// and message. Falls back to plain text if the view itself fails.
pub fn error(err: Error, state: &AppState) -> Response {
    let status = err.status();
    let message = err.message();

    let context = json!({ "message": message, "status": status.as_u16() });
    match state.views.render("error", &context) {
        Ok(html) => Response::builder().status(status).html(html),
        Err(e) => {
            error!(error = %e, "error view failed to render");
            Response::builder().status(status).text(message)
        }
    }
}

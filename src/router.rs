//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router also owns the
//! application state handed to every handler and the error responder that
//! turns every failure into a page.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::response::Response;

/// Largest request body read before the request fails with `413`.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Terminal stage for every failed request.
pub type ErrorResponder<S> = Arc<dyn Fn(Error, &S) -> Response + Send + Sync + 'static>;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain naturally.
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    on_error: ErrorResponder<S>,
    body_limit: usize,
    state: S,
}

impl Router<()> {
    pub fn new() -> Self {
        Self::with_state(())
    }
}

impl Default for Router<()> {
    fn default() -> Self { Self::new() }
}

impl<S> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// A router whose handlers each receive a clone of `state`.
    pub fn with_state(state: S) -> Self {
        Self {
            routes: HashMap::new(),
            on_error: Arc::new(plain_error::<S>),
            body_limit: DEFAULT_BODY_LIMIT,
            state,
        }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    /// Static segments win over parameters, so `/articles/new` and
    /// `/articles/{id}` coexist.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Replace the error responder.
    ///
    /// The responder receives every error a request produced: unmatched
    /// routes, validation failures, handler errors and panics. The default
    /// writes the status and message as plain text.
    pub fn on_error<F>(mut self, responder: F) -> Self
    where
        F: Fn(Error, &S) -> Response + Send + Sync + 'static,
    {
        self.on_error = Arc::new(responder);
        self
    }

    /// Caps how many body bytes are buffered per request. Larger bodies end
    /// in [`Error::PayloadTooLarge`] before any handler runs.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Route one request in-process and produce its response.
    ///
    /// This is the same path the server takes for every connection.
    pub async fn respond<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        crate::server::dispatch(self, req).await
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler<S>, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    pub(crate) fn max_body(&self) -> usize {
        self.body_limit
    }

    pub(crate) fn handle_error(&self, err: Error) -> Response {
        (self.on_error)(err, &self.state)
    }
}

fn plain_error<S>(err: Error, _state: &S) -> Response {
    Response::builder().status(err.status()).text(err.message())
}

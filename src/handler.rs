//! Handler trait, type erasure, and failure capture.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in one
//! `HashMap<Method, Tree>`, so each is hidden behind `dyn ErasedHandler<S>`.
//!
//! ```text
//! async fn show(req: Request, state: AppState) -> Result<Response, Error>
//!        ↓ router.on(Method::Get, "/articles/{id}", show)
//! show.into_boxed_handler()                    ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(show))                    ← stored as BoxedHandler<S>
//!        ↓
//! handler.call(req, state)  at request time    ← one vtable dispatch
//!        ↓
//! Box::pin(catch_unwind(show(req, state)))     ← Result<Response, Error>
//! ```
//!
//! # Failure capture
//!
//! Every erased handler resolves to `Result<Response, Error>`. A returned
//! `Err` and a panic inside the handler future both surface as an `Err`, which
//! dispatch hands to the router's error responder. Nothing a handler does can
//! take the connection task down.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoOutcome, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future.
///
/// `Send + 'static` let tokio move the future across threads safely.
pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// What every erased handler resolves to.
pub(crate) type Outcome = Result<Response, Error>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler<S> {
    fn call(&self, req: Request, state: S) -> BoxFuture<Outcome>;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler<S> = Arc<dyn ErasedHandler<S> + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Satisfied automatically for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request, state: S) -> impl IntoOutcome
/// ```
///
/// and for the combinators in [`middleware`](crate::middleware). The trait is
/// sealed: only this crate can add implementations.
pub trait Handler<S>: sealed::Sealed<S> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler<S>;
}

pub(crate) mod sealed {
    pub trait Sealed<S> {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R, S> sealed::Sealed<S> for F
where
    F: Fn(Request, S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R, S> Handler<S> for F
where
    F: Fn(Request, S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
    S: 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler<S> {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Holds a concrete handler `F` and implements [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R, S> ErasedHandler<S> for FnHandler<F>
where
    F: Fn(Request, S) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, req: Request, state: S) -> BoxFuture<Outcome> {
        let fut = (self.0)(req, state);
        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(out) => out.into_outcome(),
                Err(payload) => Err(Error::Panic(panic_message(payload.as_ref()))),
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

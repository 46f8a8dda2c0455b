//! # sunrise-press
//!
//! A small server-rendered article CMS. List, create, view, edit and delete
//! articles through HTML pages; articles live in an embedded document store.
//!
//! ## Layout
//!
//! The HTTP layer is small:
//!
//! - Radix-tree routing: O(path-length) lookup via [`matchit`]
//! - Async I/O: tokio + hyper, HTTP/1.1 and HTTP/2
//! - Graceful shutdown: SIGTERM / Ctrl-C, drains in-flight requests
//! - One error responder: every failure becomes one rendered error page
//!
//! The application sits on top of it: [`app`] holds the route table and
//! handlers, [`store`] the persistence, [`views`] the Handlebars templates.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use sunrise_press::app::{self, AppState};
//! use sunrise_press::{Server, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sunrise_press::Error> {
//!     let settings = Settings::from_env()?;
//!     let state = AppState::from_settings(&settings)?;
//!     Server::bind(settings.addr).serve(app::router(state)).await
//! }
//! ```
//!
//! Handlers take the request and a clone of the router state, and return
//! `Result<Response, Error>`:
//!
//! ```rust
//! use sunrise_press::{Error, Method, Request, Response, Router};
//!
//! async fn hello(req: Request, greeting: &'static str) -> Result<Response, Error> {
//!     let name = req.param("name").ok_or(Error::RouteNotFound)?;
//!     Ok(Response::text(format!("{greeting}, {name}")))
//! }
//!
//! let router = Router::with_state("hello").on(Method::Get, "/hello/{name}", hello);
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod app;
pub mod article;
pub mod config;
pub mod health;
pub mod middleware;
pub mod store;
pub mod telemetry;
pub mod views;

pub use config::Settings;
pub use error::{DEFAULT_MESSAGE, Error};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoOutcome, IntoResponse, Response, ResponseBuilder};
pub use router::{DEFAULT_BODY_LIMIT, ErrorResponder, Router};
pub use server::Server;

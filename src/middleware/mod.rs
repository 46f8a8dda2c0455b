//! Middleware layer.
//!
//! Cross-cutting stages that run around route handlers:
//!
//! - [`trace`]: per-request span with method, path, status, latency
//! - [`method_override`]: lets a `POST` form declare `PUT`, `PATCH` or `DELETE`
//! - [`validate`]: schema check of a form body before the handler runs

pub mod method_override;
pub mod trace;
pub mod validate;

pub use validate::{Schema, Validated, validate};

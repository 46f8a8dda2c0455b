//! Per-request tracing span.

use std::time::Instant;

use tracing::{Span, field, info, info_span};

use crate::response::Response;

/// Opens the span every log line of a request is recorded under.
///
/// `status` and `latency_ms` start empty and are filled in by
/// [`record_completion`].
pub(crate) fn request_span(method: &http::Method, uri: &http::Uri) -> Span {
    info_span!(
        "request",
        method = %method,
        path = %uri.path(),
        status = field::Empty,
        latency_ms = field::Empty,
    )
}

pub(crate) fn record_completion(response: &Response, started: Instant) {
    let span = Span::current();
    let status = response.status_code().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    span.record("status", status);
    span.record("latency_ms", latency_ms);
    info!(status, latency_ms, "request completed");
}

//! Method override for HTML forms.
//!
//! Browsers only submit `GET` and `POST`. A `POST` may name the verb it
//! stands for, checked in this order:
//!
//! 1. the `X-HTTP-Method-Override` header
//! 2. the `_method` query parameter (`/articles/42?_method=DELETE`)
//! 3. the `_method` field of a urlencoded form body
//!
//! Only `PUT`, `PATCH` and `DELETE` are accepted as overrides, and only a
//! `POST` is ever rewritten.

use tracing::debug;

use crate::method::Method;
use crate::request::Request;

pub const HEADER: &str = "x-http-method-override";
pub const FIELD: &str = "_method";

/// Rewrites the request method in place when a valid override is present.
pub fn apply(req: &mut Request) {
    if req.method() != Method::Post {
        return;
    }

    if let Some(method) = requested(req) {
        debug!(from = %req.method(), to = %method, "method override");
        req.method = method;
    }
}

fn requested(req: &Request) -> Option<Method> {
    let candidate = req
        .header(HEADER)
        .map(str::to_owned)
        .or_else(|| req.query_param(FIELD))
        .or_else(|| form_field(req))?;

    match candidate.trim().to_ascii_uppercase().parse::<Method>() {
        Ok(m @ (Method::Put | Method::Patch | Method::Delete)) => Some(m),
        _ => None,
    }
}

fn form_field(req: &Request) -> Option<String> {
    let is_form = req
        .header(http::header::CONTENT_TYPE.as_str())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if !is_form {
        return None;
    }

    req.form()
        .ok()?
        .get(FIELD)
        .and_then(|v| v.as_str())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::HeaderMap;
    use http::header::CONTENT_TYPE;

    use super::*;

    fn post(uri: &str, headers: HeaderMap, body: &str) -> Request {
        Request::new(Method::Post, &uri.parse().unwrap(), headers, Bytes::from(body.to_owned()))
    }

    fn form_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/x-www-form-urlencoded".parse().unwrap());
        headers
    }

    #[test]
    fn query_parameter_overrides_post() {
        let mut req = post("/articles/1?_method=DELETE", HeaderMap::new(), "");
        apply(&mut req);
        assert_eq!(req.method(), Method::Delete);
    }

    #[test]
    fn form_field_overrides_post() {
        let mut req = post("/articles/1", form_headers(), "_method=put&article[title]=A");
        apply(&mut req);
        assert_eq!(req.method(), Method::Put);
    }

    #[test]
    fn header_wins_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER, "PATCH".parse().unwrap());
        let mut req = post("/articles/1?_method=DELETE", headers, "");
        apply(&mut req);
        assert_eq!(req.method(), Method::Patch);
    }

    #[test]
    fn only_post_is_rewritten() {
        let uri = "/articles/1?_method=DELETE".parse().unwrap();
        let mut req = Request::new(Method::Get, &uri, HeaderMap::new(), Bytes::new());
        apply(&mut req);
        assert_eq!(req.method(), Method::Get);
    }

    #[test]
    fn unsafe_targets_are_ignored() {
        let mut req = post("/articles?_method=GET", HeaderMap::new(), "");
        apply(&mut req);
        assert_eq!(req.method(), Method::Post);

        let mut req = post("/articles?_method=BOGUS", HeaderMap::new(), "");
        apply(&mut req);
        assert_eq!(req.method(), Method::Post);
    }
}

//! Form validation stage.
//!
//! [`validate`] wraps a handler so the request body is checked against a
//! [`Schema`] first. A body that passes reaches the handler untouched. A body
//! that fails never reaches it: the stage resolves to one
//! [`Error::Validation`] carrying every violation, comma-joined, and the
//! router's error responder renders it with status 400.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, Outcome, sealed};
use crate::request::Request;

/// Required string fields nested under one root key.
///
/// `Schema { root: "article", fields: &["title"] }` accepts
/// `article[title]=A` and rejects a missing, non-string, or empty title.
/// Keys under `root` that the schema does not name are rejected too.
#[derive(Debug)]
pub struct Schema {
    pub root: &'static str,
    pub fields: &'static [&'static str],
}

impl Schema {
    /// Every violation in `form`, in field order. Empty when valid.
    pub fn violations(&self, form: &Value) -> Vec<String> {
        let root = self.root;
        let object = match form.get(root) {
            None | Some(Value::Null) => return vec![format!(r#""{root}" is required"#)],
            Some(Value::Object(object)) => object,
            Some(_) => return vec![format!(r#""{root}" must be of type object"#)],
        };

        let mut violations = Vec::new();
        for field in self.fields {
            let label = format!("{root}.{field}");
            match object.get(*field) {
                None | Some(Value::Null) => violations.push(format!(r#""{label}" is required"#)),
                Some(Value::String(s)) if s.is_empty() => {
                    violations.push(format!(r#""{label}" is not allowed to be empty"#));
                }
                Some(Value::String(_)) => {}
                Some(_) => violations.push(format!(r#""{label}" must be a string"#)),
            }
        }

        for key in object.keys() {
            if !self.fields.contains(&key.as_str()) {
                violations.push(format!(r#""{root}.{key}" is not allowed"#));
            }
        }

        violations
    }

    pub fn check(&self, form: &Value) -> Result<(), Error> {
        let violations = self.violations(form);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(violations.join(",")))
        }
    }
}

/// Runs `schema` against the request body before `handler`.
pub fn validate<S, H>(schema: &'static Schema, handler: H) -> Validated<S>
where
    S: 'static,
    H: Handler<S>,
{
    Validated { schema, inner: handler.into_boxed_handler() }
}

/// A handler guarded by a [`Schema`]. Built by [`validate`].
pub struct Validated<S> {
    schema: &'static Schema,
    inner: BoxedHandler<S>,
}

impl<S> sealed::Sealed<S> for Validated<S> {}

impl<S> Handler<S> for Validated<S>
where
    S: 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler<S> {
        Arc::new(self)
    }
}

impl<S> ErasedHandler<S> for Validated<S> {
    fn call(&self, req: Request, state: S) -> BoxFuture<Outcome> {
        let checked = req.form().and_then(|form| self.schema.check(form));
        match checked {
            Ok(()) => self.inner.call(req, state),
            Err(err) => Box::pin(std::future::ready(Err(err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::HeaderMap;
    use http::header::CONTENT_TYPE;
    use serde_json::json;

    use super::*;
    use crate::method::Method;
    use crate::response::Response;

    static SCHEMA: Schema = Schema { root: "article", fields: &["title", "image"] };

    #[test]
    fn complete_form_passes() {
        let form = json!({ "article": { "title": "A", "image": "http://x/y.png" } });
        assert!(SCHEMA.violations(&form).is_empty());
        assert!(SCHEMA.check(&form).is_ok());
    }

    #[test]
    fn missing_root_is_one_violation() {
        assert_eq!(SCHEMA.violations(&json!({})), vec![r#""article" is required"#]);
        assert_eq!(
            SCHEMA.violations(&json!({ "article": "x" })),
            vec![r#""article" must be of type object"#],
        );
    }

    #[test]
    fn every_field_violation_is_reported_and_joined() {
        let form = json!({ "article": { "title": "", "extra": "1" } });
        let err = SCHEMA.check(&form).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#""article.title" is not allowed to be empty,"article.image" is required,"article.extra" is not allowed"#,
        );
    }

    #[test]
    fn non_string_values_are_rejected() {
        let form = json!({ "article": { "title": ["A", "B"], "image": { "x": "1" } } });
        assert_eq!(
            SCHEMA.violations(&form),
            vec![r#""article.title" must be a string"#, r#""article.image" must be a string"#],
        );
    }

    async fn accept(_req: Request, _state: ()) -> Response {
        Response::text("accepted")
    }

    fn post(body: &str) -> Request {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/x-www-form-urlencoded".parse().unwrap());
        Request::new(Method::Post, &"/articles".parse().unwrap(), headers, Bytes::from(body.to_owned()))
    }

    #[tokio::test]
    async fn valid_body_reaches_the_handler() {
        let handler = validate(&SCHEMA, accept).into_boxed_handler();
        let res = handler.call(post("article[title]=A&article[image]=i"), ()).await.unwrap();
        assert_eq!(res.body, Bytes::from_static(b"accepted"));
    }

    #[tokio::test]
    async fn invalid_body_short_circuits() {
        let handler = validate(&SCHEMA, accept).into_boxed_handler();
        let err = handler.call(post("article[title]=A"), ()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg == r#""article.image" is required"#));
    }
}

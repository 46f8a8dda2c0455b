//! Incoming HTTP request type and form decoding.

use std::collections::HashMap;
use std::sync::OnceLock;

use bytes::Bytes;
use http::HeaderMap;
use http::header::CONTENT_TYPE;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::method::Method;

/// An incoming HTTP request with its body fully buffered.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    form: OnceLock<Value>,
}

impl Request {
    pub(crate) fn new(method: Method, uri: &http::Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
            headers,
            body,
            params: HashMap::new(),
            form: OnceLock::new(),
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Header lookup. Values that are not visible ASCII are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/articles/{id}`, `req.param("id")` on `/articles/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// First value of a query-string parameter.
    pub fn query_param(&self, key: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Decodes the body into a JSON object.
    ///
    /// `application/json` bodies are parsed as-is. Form bodies use bracket
    /// keys for nesting, so `article[title]=A` becomes
    /// `{"article": {"title": "A"}}`. Any other content type yields an empty
    /// object. The body is decoded once; later calls return the same value.
    pub fn form(&self) -> Result<&Value, Error> {
        if let Some(form) = self.form.get() {
            return Ok(form);
        }
        let form = self.decode_form()?;
        Ok(self.form.get_or_init(|| form))
    }

    fn decode_form(&self) -> Result<Value, Error> {
        let content_type = self.header(CONTENT_TYPE.as_str()).unwrap_or_default();

        if content_type.starts_with("application/json") {
            if self.body.is_empty() {
                return Ok(Value::Object(Map::new()));
            }
            return serde_json::from_slice(&self.body).map_err(|e| Error::BadRequest(e.to_string()));
        }

        if content_type.is_empty() || content_type.starts_with("application/x-www-form-urlencoded") {
            return Ok(parse_form(&self.body));
        }

        Ok(Value::Object(Map::new()))
    }
}

/// Parses `application/x-www-form-urlencoded` bytes into a nested object.
///
/// A repeated key turns its value into an array; `key[]` always appends.
fn parse_form(body: &[u8]) -> Value {
    let mut root = Map::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        let segments = key_segments(&key);
        insert(&mut root, &segments, Value::String(value.into_owned()));
    }
    Value::Object(root)
}

/// Bracket segments split off one key. Anything nested deeper is kept as a
/// single literal segment.
const MAX_DEPTH: usize = 5;

/// `article[title]` → `["article", "title"]`. Keys with unbalanced brackets
/// are kept whole. Past [`MAX_DEPTH`] brackets the remainder of the key,
/// brackets included, becomes the last segment.
fn key_segments(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_owned()];
    };
    if open == 0 {
        return vec![key.to_owned()];
    }

    let mut segments = vec![key[..open].to_owned()];
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        if segments.len() > MAX_DEPTH {
            segments.push(rest.to_owned());
            return segments;
        }
        let Some(close) = inner.find(']') else {
            return vec![key.to_owned()];
        };
        segments.push(inner[..close].to_owned());
        rest = &inner[close + 1..];
    }
    if !rest.is_empty() {
        return vec![key.to_owned()];
    }
    segments
}

fn insert(map: &mut Map<String, Value>, segments: &[String], value: Value) {
    let (head, tail) = match segments {
        [] => return,
        [head, tail @ ..] => (head, tail),
    };

    match tail {
        [] => match map.get_mut(head) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(head.clone(), value);
            }
        },
        [next] if next.is_empty() => match map.get_mut(head) {
            Some(Value::Array(items)) => items.push(value),
            Some(_) => {}
            None => {
                map.insert(head.clone(), Value::Array(vec![value]));
            }
        },
        _ => {
            let entry = map.entry(head.clone()).or_insert_with(|| Value::Object(Map::new()));
            // A scalar already sits where a nested object is wanted; keep the first one.
            if let Value::Object(child) = entry {
                insert(child, tail, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, ct.parse().unwrap());
        }
        let uri: http::Uri = "/articles?_method=PUT&x=1".parse().unwrap();
        Request::new(Method::Post, &uri, headers, Bytes::from(body.to_owned()))
    }

    #[test]
    fn bracket_keys_nest() {
        let form = parse_form(b"article[title]=A&article[description]=B&plain=c");
        assert_eq!(form, json!({ "article": { "title": "A", "description": "B" }, "plain": "c" }));
    }

    #[test]
    fn values_are_percent_decoded() {
        let form = parse_form(b"article%5Bimage%5D=http%3A%2F%2Fx%2Fy.png&article[title]=a+b");
        assert_eq!(form, json!({ "article": { "image": "http://x/y.png", "title": "a b" } }));
    }

    #[test]
    fn repeated_keys_become_arrays() {
        let form = parse_form(b"article[title]=A&article[title]=B&tags[]=x");
        assert_eq!(form, json!({ "article": { "title": ["A", "B"] }, "tags": ["x"] }));
    }

    #[test]
    fn unbalanced_brackets_stay_flat() {
        let form = parse_form(b"article[title=A&[x]=1");
        assert_eq!(form, json!({ "article[title": "A", "[x]": "1" }));
    }

    #[test]
    fn nesting_stops_at_max_depth() {
        let form = parse_form(b"a[b][c][d][e][f][g][h]=1");
        assert_eq!(form, json!({ "a": { "b": { "c": { "d": { "e": { "f": { "[g][h]": "1" } } } } } } }));
    }

    #[test]
    fn very_deep_keys_are_decoded_without_recursing() {
        let mut body = String::from("a");
        for _ in 0..200_000 {
            body.push_str("[x]");
        }
        body.push_str("=1");

        let form = parse_form(body.as_bytes());
        let mut node = &form["a"];
        for _ in 0..MAX_DEPTH {
            node = &node["x"];
        }
        assert_eq!(node.as_object().map(|o| o.len()), Some(1));
    }

    #[test]
    fn scalar_is_not_replaced_by_object() {
        let form = parse_form(b"article=x&article[title]=A");
        assert_eq!(form, json!({ "article": "x" }));
    }

    #[test]
    fn form_reads_urlencoded_and_json() {
        let req = request(Some("application/x-www-form-urlencoded"), "article[title]=A");
        assert_eq!(req.form().unwrap(), &json!({ "article": { "title": "A" } }));

        let req = request(Some("application/json"), r#"{"article":{"title":"A"}}"#);
        assert_eq!(req.form().unwrap(), &json!({ "article": { "title": "A" } }));

        let req = request(Some("application/json"), "{nope");
        assert!(matches!(req.form(), Err(Error::BadRequest(_))));

        let req = request(Some("text/plain"), "article[title]=A");
        assert_eq!(req.form().unwrap(), &json!({}));
    }

    #[test]
    fn form_is_decoded_once() {
        let req = request(Some("application/x-www-form-urlencoded"), "article[title]=A");
        let first: *const Value = req.form().unwrap();
        let second: *const Value = req.form().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn query_params_are_decoded() {
        let req = request(None, "");
        assert_eq!(req.query_param("_method").as_deref(), Some("PUT"));
        assert_eq!(req.query_param("missing"), None);
        assert_eq!(req.path(), "/articles");
    }
}

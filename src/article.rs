//! The article record and its form schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::middleware::Schema;

/// Body shape accepted by the create and update routes:
/// `article[title]`, `article[description]`, `article[content]`, `article[image]`.
pub static ARTICLE_SCHEMA: Schema = Schema {
    root: "article",
    fields: &["title", "description", "content", "image"],
};

/// The editable part of an article.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ArticleFields {
    pub title: String,
    pub description: String,
    pub content: String,
    pub image: String,
}

impl ArticleFields {
    /// Reads the `article` object out of a decoded form body.
    ///
    /// Run [`ARTICLE_SCHEMA`] first; this only reports the first mismatch.
    pub fn from_form(form: &Value) -> Result<Self, Error> {
        let article = form.get(ARTICLE_SCHEMA.root).cloned().unwrap_or(Value::Null);
        serde_json::from_value(article).map_err(|e| Error::Validation(e.to_string()))
    }
}

/// A stored article. `id` is assigned by the store and never changes.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Article {
    pub id: String,
    #[serde(flatten)]
    pub fields: ArticleFields,
}

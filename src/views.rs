//! Server-side HTML rendering with Handlebars.
//!
//! Every page template wraps itself in the shared `layout` partial:
//!
//! ```handlebars
//! {{#> layout title="Articles"}}
//!   <ul>{{#each articles}}<li>{{title}}</li>{{/each}}</ul>
//! {{/layout}}
//! ```
//!
//! Rendering is strict: a template that reads a variable missing from its
//! context fails with a render error instead of printing nothing. Helper
//! arguments such as the `title` in `{{#if title}}` may still be absent.
//!
//! The templates ship inside the binary. A directory may override any of
//! them with a file named `<name>.hbs` (e.g. `articles/show.hbs`).

use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;
use tracing::info;

use crate::error::Error;
use crate::response::Response;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout", include_str!("../templates/layout.hbs")),
    ("home", include_str!("../templates/home.hbs")),
    ("error", include_str!("../templates/error.hbs")),
    ("articles/index", include_str!("../templates/articles/index.hbs")),
    ("articles/new", include_str!("../templates/articles/new.hbs")),
    ("articles/show", include_str!("../templates/articles/show.hbs")),
    ("articles/edit", include_str!("../templates/articles/edit.hbs")),
];

/// The template registry. Built once at startup and shared read-only.
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    /// Only the templates compiled into the binary.
    pub fn embedded() -> Result<Self, Error> {
        Self::load(None)
    }

    /// Embedded templates, each replaced by `<dir>/<name>.hbs` when that file
    /// exists.
    pub fn load(dir: Option<&Path>) -> Result<Self, Error> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);

        for (name, source) in TEMPLATES {
            match dir.map(|d| d.join(format!("{name}.hbs"))) {
                Some(path) if path.is_file() => {
                    info!(template = name, path = %path.display(), "template override");
                    registry.register_template_file(name, &path)?;
                }
                _ => registry.register_template_string(name, source)?,
            }
        }

        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, Error> {
        Ok(self.registry.render(name, context)?)
    }

    /// Renders `name` into a `200 OK` HTML response.
    pub fn page<T: Serialize>(&self, name: &str, context: &T) -> Result<Response, Error> {
        self.render(name, context).map(Response::html)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn every_embedded_template_compiles() {
        let views = Views::embedded().unwrap();
        for (name, _) in TEMPLATES {
            assert!(views.registry.has_template(name), "{name} missing");
        }
    }

    #[test]
    fn pages_share_the_layout() {
        let views = Views::embedded().unwrap();
        let html = views.render("home", &json!({})).unwrap();
        assert!(html.contains("<html"));
        assert!(html.contains("Sunrise Press"));
    }

    #[test]
    fn article_fields_are_escaped() {
        let views = Views::embedded().unwrap();
        let context = json!({
            "article": {
                "id": "1",
                "title": "<script>alert(1)</script>",
                "description": "d",
                "content": "c",
                "image": "http://x/y.png",
            }
        });
        let html = views.render("articles/show", &context).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn unknown_template_is_a_render_error() {
        let views = Views::embedded().unwrap();
        assert!(matches!(views.render("missing", &json!({})), Err(Error::Render(_))));
    }

    #[test]
    fn missing_variables_fail_to_render() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("home.hbs"), "hello {{visitor}}").unwrap();

        let views = Views::load(Some(dir.path())).unwrap();
        assert!(matches!(views.render("home", &json!({})), Err(Error::Render(_))));
        assert_eq!(views.render("home", &json!({ "visitor": "ann" })).unwrap(), "hello ann");
    }

    #[test]
    fn layout_title_is_optional() {
        let views = Views::embedded().unwrap();
        let html = views.render("home", &json!({})).unwrap();
        assert!(html.contains("<title>Sunrise Press</title>"));

        let html = views.render("articles/new", &json!({})).unwrap();
        assert!(html.contains("<title>New article · Sunrise Press</title>"));
    }

    #[test]
    fn directory_overrides_single_templates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("home.hbs"), "custom home").unwrap();

        let views = Views::load(Some(dir.path())).unwrap();
        assert_eq!(views.render("home", &json!({})).unwrap(), "custom home");
        let html = views.render("error", &json!({ "message": "embedded error page" })).unwrap();
        assert!(html.contains("embedded error page"));
    }
}

//! Shared types passed between the resolution stage and the build pipeline.
//!
//! Everything here is serializable so a plan can be dumped as JSON and
//! inspected, the same way each stage's output is meant to be readable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form frontmatter, as found at the top of a content page or supplied
/// by the user as an override for a generated page.
pub type Frontmatter = Map<String, Value>;

/// Correlation metadata attached to every emitted descriptor.
///
/// `pid` is the classifier id; `id` is the classifier id for index pages and
/// enhancers, and the scope value for per-value scope pages. The external
/// pipeline joins pages, enhancers and pagination state on these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlation {
    pub pid: String,
    pub id: String,
}

impl Correlation {
    /// Correlation for a classifier-level descriptor (`pid == id`).
    pub fn classifier(id: &str) -> Self {
        Self {
            pid: id.to_string(),
            id: id.to_string(),
        }
    }

    /// Correlation for a scope page nested under a classifier.
    pub fn scope(classifier_id: &str, value: &str) -> Self {
        Self {
            pid: classifier_id.to_string(),
            id: value.to_string(),
        }
    }
}

/// A synthetic page injected into the build with no source file behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtraPage {
    /// Target route, e.g. `/posts/`.
    pub permalink: String,
    pub frontmatter: Frontmatter,
    pub meta: Correlation,
}

impl ExtraPage {
    /// Build an index page whose frontmatter is `{ layout, title }` with the
    /// user overrides merged last, so override keys win on collision.
    pub fn new(
        permalink: &str,
        layout: String,
        title: &str,
        overrides: &Frontmatter,
        meta: Correlation,
    ) -> Self {
        let mut frontmatter = Frontmatter::new();
        frontmatter.insert("layout".into(), Value::String(layout));
        frontmatter.insert("title".into(), Value::String(title.to_string()));
        for (key, value) in overrides {
            frontmatter.insert(key.clone(), value.clone());
        }
        Self {
            permalink: permalink.to_string(),
            frontmatter,
            meta,
        }
    }

    pub fn layout(&self) -> Option<&str> {
        self.frontmatter.get("layout").and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.frontmatter.get("title").and_then(Value::as_str)
    }
}

/// A discovered content page, as seen by the classification phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Stable identity, typically the source path relative to the content root.
    pub key: String,
    /// Normalized route path, e.g. `/posts/my-article`.
    pub path: String,
    #[serde(default)]
    pub frontmatter: Frontmatter,
}

impl Page {
    pub fn new(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            frontmatter: Frontmatter::new(),
        }
    }

    pub fn with_frontmatter(mut self, frontmatter: Frontmatter) -> Self {
        self.frontmatter = frontmatter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overrides(value: Value) -> Frontmatter {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn extra_page_has_layout_and_title() {
        let page = ExtraPage::new(
            "/posts/",
            "IndexPost".into(),
            "Posts",
            &Frontmatter::new(),
            Correlation::classifier("posts"),
        );
        assert_eq!(page.layout(), Some("IndexPost"));
        assert_eq!(page.title(), Some("Posts"));
        assert_eq!(page.meta.id, "posts");
        assert_eq!(page.meta.pid, "posts");
    }

    #[test]
    fn user_overrides_win_over_computed_fields() {
        let page = ExtraPage::new(
            "/posts/",
            "IndexPost".into(),
            "Posts",
            &overrides(json!({ "title": "Custom", "layout": "Mine", "sidebar": false })),
            Correlation::classifier("posts"),
        );
        assert_eq!(page.title(), Some("Custom"));
        assert_eq!(page.layout(), Some("Mine"));
        assert_eq!(page.frontmatter.get("sidebar"), Some(&json!(false)));
    }

    #[test]
    fn scope_correlation_nests_value_under_classifier() {
        let meta = Correlation::scope("tag", "rust");
        assert_eq!(meta.pid, "tag");
        assert_eq!(meta.id, "rust");
    }
}

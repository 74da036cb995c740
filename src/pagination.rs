//! Pagination policy resolution.
//!
//! Every classification (a directory, or one value of a metadata key) is
//! listed across numbered pages. This module decides the *policy* for that
//! listing; it never looks at the pages themselves until [`PaginationSettings::paginate`]
//! is called by a later phase.
//!
//! ## Precedence
//!
//! Each field is resolved independently, highest first:
//!
//! ```text
//! classifier [pagination]  >  [global_pagination]  >  built-in constant
//! ```
//!
//! | Field | Built-in |
//! |-------|----------|
//! | `per_page` | `10` |
//! | `sort_by` | `"date"` |
//! | `sort_order` | `"desc"` (newest first) |
//! | `route_base` | the classifier's index path |
//! | `layout` | `DirectoryPagination` / `FrontmatterPagination` |
//! | `prev_text` | `"Prev"` |
//! | `next_text` | `"Next"` |
//!
//! ## Routes
//!
//! Page 1 lives at the route base itself; page `n > 1` lives at
//! `{route_base}page/{n}/`, e.g. `/posts/page/2/`.

use crate::layout::LayoutResolver;
use crate::types::Page;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

pub const DEFAULT_PER_PAGE: usize = 10;
pub const DEFAULT_SORT_BY: &str = "date";
pub const DEFAULT_PREV_TEXT: &str = "Prev";
pub const DEFAULT_NEXT_TEXT: &str = "Next";

/// Which kind of classifier a pagination belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    Directory,
    Metadata,
}

impl ClassifierKind {
    /// Layout used for listing pages when nothing else is configured.
    pub fn default_layout(self) -> &'static str {
        match self {
            ClassifierKind::Directory => "DirectoryPagination",
            ClassifierKind::Metadata => "FrontmatterPagination",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Pagination settings as written by the user, either globally or per
/// classifier. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Items listed on each page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<usize>,
    /// Frontmatter field used to order items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    /// Base route for `page/N/` sub-routes. Defaults to the index path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_text: Option<String>,
}

/// Fully resolved pagination policy. No field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationSettings {
    pub per_page: usize,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub route_base: String,
    pub layout: String,
    pub prev_text: String,
    pub next_text: String,
}

/// Merge classifier overrides, global defaults and built-in constants.
pub fn resolve_pagination(
    kind: ClassifierKind,
    global: &PaginationConfig,
    overrides: &PaginationConfig,
    index_path: &str,
    layouts: &dyn LayoutResolver,
) -> PaginationSettings {
    let per_page = overrides
        .per_page
        .or(global.per_page)
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_PER_PAGE);
    let sort_order = overrides
        .sort_order
        .or(global.sort_order)
        .unwrap_or_default();
    let layout_name = pick(&overrides.layout, &global.layout)
        .unwrap_or_else(|| kind.default_layout().to_string());

    PaginationSettings {
        per_page,
        sort_by: pick(&overrides.sort_by, &global.sort_by)
            .unwrap_or_else(|| DEFAULT_SORT_BY.to_string()),
        sort_order,
        route_base: pick(&overrides.route_base, &global.route_base)
            .unwrap_or_else(|| index_path.to_string()),
        layout: layouts.resolve(&layout_name, Some(kind.default_layout())),
        prev_text: pick(&overrides.prev_text, &global.prev_text)
            .unwrap_or_else(|| DEFAULT_PREV_TEXT.to_string()),
        next_text: pick(&overrides.next_text, &global.next_text)
            .unwrap_or_else(|| DEFAULT_NEXT_TEXT.to_string()),
    }
}

fn pick(overrides: &Option<String>, global: &Option<String>) -> Option<String> {
    overrides.clone().or_else(|| global.clone())
}

/// Title generator for the numbered listing pages of a classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageTitle {
    /// `Page {n} | {title}`
    Classifier { title: String },
    /// `Page {n} - {value} | {title}`
    Scope { value: String, title: String },
}

impl PageTitle {
    pub fn render(&self, number: usize) -> String {
        match self {
            PageTitle::Classifier { title } => format!("Page {number} | {title}"),
            PageTitle::Scope { value, title } => format!("Page {number} - {value} | {title}"),
        }
    }
}

/// Resolved pagination for one classification, keyed for the build pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationDescriptor {
    pub kind: ClassifierKind,
    /// Classifier id, or the scope value for per-value metadata listings.
    pub id: String,
    /// Owning classifier id.
    pub pid: String,
    pub title: PageTitle,
    pub settings: PaginationSettings,
}

impl PaginationDescriptor {
    pub fn for_classifier(
        kind: ClassifierKind,
        id: &str,
        title: &str,
        settings: PaginationSettings,
    ) -> Self {
        Self {
            kind,
            id: id.to_string(),
            pid: id.to_string(),
            title: PageTitle::Classifier {
                title: title.to_string(),
            },
            settings,
        }
    }

    pub fn for_scope(
        classifier_id: &str,
        value: &str,
        title: &str,
        settings: PaginationSettings,
    ) -> Self {
        Self {
            kind: ClassifierKind::Metadata,
            id: value.to_string(),
            pid: classifier_id.to_string(),
            title: PageTitle::Scope {
                value: value.to_string(),
                title: title.to_string(),
            },
            settings,
        }
    }

    /// Title of the 1-based listing page `number`.
    pub fn page_title(&self, number: usize) -> String {
        self.title.render(number)
    }
}

/// One numbered listing page produced by [`PaginationSettings::paginate`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<'a> {
    /// 1-based page number.
    pub number: usize,
    pub url: String,
    pub pages: Vec<&'a Page>,
}

impl PaginationSettings {
    /// Route of the 1-based page `number`.
    pub fn page_url(&self, number: usize) -> String {
        if number <= 1 {
            self.route_base.clone()
        } else if self.route_base.ends_with('/') {
            format!("{}page/{}/", self.route_base, number)
        } else {
            format!("{}/page/{}/", self.route_base, number)
        }
    }

    /// Number of listing pages needed for `total` items. Always at least one,
    /// so an empty classification still has its index.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.per_page).max(1)
    }

    /// Sort member pages by the configured field and split them into
    /// numbered slices.
    ///
    /// Values are compared as strings (ISO dates order correctly); pages
    /// missing the field sort last in either direction. The sort is stable,
    /// so ties keep discovery order.
    pub fn paginate<'a, I>(&self, pages: I) -> Vec<PageSlice<'a>>
    where
        I: IntoIterator<Item = &'a Page>,
    {
        let mut sorted: Vec<&'a Page> = pages.into_iter().collect();
        sorted.sort_by(|a, b| {
            let ka = sort_key(a, &self.sort_by);
            let kb = sort_key(b, &self.sort_by);
            match (ka, kb) {
                (Some(ka), Some(kb)) => match self.sort_order {
                    SortOrder::Asc => ka.cmp(&kb),
                    SortOrder::Desc => kb.cmp(&ka),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });

        let count = self.page_count(sorted.len());
        let mut chunks = sorted.chunks(self.per_page);
        (1..=count)
            .map(|number| PageSlice {
                number,
                url: self.page_url(number),
                pages: chunks.next().map(<[_]>::to_vec).unwrap_or_default(),
            })
            .collect()
    }
}

fn sort_key(page: &Page, field: &str) -> Option<String> {
    match page.frontmatter.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{DEFAULT_LAYOUT, ThemeLayouts};
    use serde_json::json;

    fn layouts() -> ThemeLayouts {
        ThemeLayouts::default()
    }

    fn dated(key: &str, date: &str) -> Page {
        Page::new(key, format!("/posts/{key}"))
            .with_frontmatter(json!({ "date": date }).as_object().cloned().unwrap())
    }

    #[test]
    fn built_in_defaults() {
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &PaginationConfig::default(),
            &PaginationConfig::default(),
            "/posts/",
            &layouts(),
        );
        assert_eq!(settings.per_page, 10);
        assert_eq!(settings.sort_by, "date");
        assert_eq!(settings.sort_order, SortOrder::Desc);
        assert_eq!(settings.route_base, "/posts/");
        assert_eq!(settings.layout, "DirectoryPagination");
        assert_eq!(settings.prev_text, "Prev");
        assert_eq!(settings.next_text, "Next");
    }

    #[test]
    fn metadata_kind_uses_its_own_layout() {
        let settings = resolve_pagination(
            ClassifierKind::Metadata,
            &PaginationConfig::default(),
            &PaginationConfig::default(),
            "/tag/rust/",
            &layouts(),
        );
        assert_eq!(settings.layout, "FrontmatterPagination");
        assert_eq!(settings.route_base, "/tag/rust/");
    }

    #[test]
    fn global_beats_built_in() {
        let global = PaginationConfig {
            per_page: Some(5),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &global,
            &PaginationConfig::default(),
            "/posts/",
            &layouts(),
        );
        assert_eq!(settings.per_page, 5);
        assert_eq!(settings.sort_order, SortOrder::Asc);
        assert_eq!(settings.sort_by, "date");
    }

    #[test]
    fn override_beats_global() {
        let global = PaginationConfig {
            per_page: Some(5),
            sort_by: Some("updated".into()),
            ..Default::default()
        };
        let overrides = PaginationConfig {
            per_page: Some(3),
            ..Default::default()
        };
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &global,
            &overrides,
            "/posts/",
            &layouts(),
        );
        assert_eq!(settings.per_page, 3);
        // Fields the override leaves unset still come from the global layer
        assert_eq!(settings.sort_by, "updated");
    }

    #[test]
    fn route_base_override() {
        let overrides = PaginationConfig {
            route_base: Some("/archive/".into()),
            ..Default::default()
        };
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &PaginationConfig::default(),
            &overrides,
            "/posts/",
            &layouts(),
        );
        assert_eq!(settings.route_base, "/archive/");
        assert_eq!(settings.page_url(2), "/archive/page/2/");
    }

    #[test]
    fn zero_per_page_falls_back_to_built_in() {
        let overrides = PaginationConfig {
            per_page: Some(0),
            ..Default::default()
        };
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &PaginationConfig::default(),
            &overrides,
            "/posts/",
            &layouts(),
        );
        assert_eq!(settings.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn unknown_layout_falls_back_to_kind_default() {
        let overrides = PaginationConfig {
            layout: Some("NoSuchLayout".into()),
            ..Default::default()
        };
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &PaginationConfig::default(),
            &overrides,
            "/posts/",
            &layouts(),
        );
        assert_eq!(settings.layout, "DirectoryPagination");
    }

    #[test]
    fn layout_falls_back_to_theme_default_when_theme_lacks_pagination() {
        let bare = ThemeLayouts::new(["Layout"], DEFAULT_LAYOUT);
        let settings = resolve_pagination(
            ClassifierKind::Metadata,
            &PaginationConfig::default(),
            &PaginationConfig::default(),
            "/tag/",
            &bare,
        );
        assert_eq!(settings.layout, "Layout");
    }

    #[test]
    fn page_urls() {
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &PaginationConfig::default(),
            &PaginationConfig::default(),
            "/posts/",
            &layouts(),
        );
        assert_eq!(settings.page_url(1), "/posts/");
        assert_eq!(settings.page_url(2), "/posts/page/2/");
        assert_eq!(settings.page_url(10), "/posts/page/10/");
    }

    #[test]
    fn page_count_is_at_least_one() {
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &PaginationConfig::default(),
            &PaginationConfig {
                per_page: Some(2),
                ..Default::default()
            },
            "/posts/",
            &layouts(),
        );
        assert_eq!(settings.page_count(0), 1);
        assert_eq!(settings.page_count(2), 1);
        assert_eq!(settings.page_count(3), 2);
    }

    #[test]
    fn paginate_sorts_newest_first_and_chunks() {
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &PaginationConfig::default(),
            &PaginationConfig {
                per_page: Some(2),
                ..Default::default()
            },
            "/posts/",
            &layouts(),
        );
        let pages = vec![
            dated("a", "2024-01-01"),
            dated("b", "2024-03-01"),
            dated("c", "2024-02-01"),
        ];
        let slices = settings.paginate(&pages);

        assert_eq!(slices.len(), 2);
        let first: Vec<&str> = slices[0].pages.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(first, vec!["b", "c"]);
        assert_eq!(slices[1].number, 2);
        assert_eq!(slices[1].url, "/posts/page/2/");
        assert_eq!(slices[1].pages[0].key, "a");
    }

    #[test]
    fn paginate_ascending() {
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &PaginationConfig {
                sort_order: Some(SortOrder::Asc),
                ..Default::default()
            },
            &PaginationConfig::default(),
            "/posts/",
            &layouts(),
        );
        let pages = vec![dated("late", "2024-05-01"), dated("early", "2023-01-01")];
        let slices = settings.paginate(&pages);
        let keys: Vec<&str> = slices[0].pages.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["early", "late"]);
    }

    #[test]
    fn paginate_puts_undated_pages_last() {
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &PaginationConfig::default(),
            &PaginationConfig::default(),
            "/posts/",
            &layouts(),
        );
        let pages = vec![
            Page::new("undated", "/posts/undated"),
            dated("dated", "2024-01-01"),
        ];
        let slices = settings.paginate(&pages);
        let keys: Vec<&str> = slices[0].pages.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["dated", "undated"]);
    }

    #[test]
    fn paginate_empty_yields_single_index_page() {
        let settings = resolve_pagination(
            ClassifierKind::Directory,
            &PaginationConfig::default(),
            &PaginationConfig::default(),
            "/posts/",
            &layouts(),
        );
        let slices = settings.paginate(std::iter::empty());
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].url, "/posts/");
        assert!(slices[0].pages.is_empty());
    }

    #[test]
    fn classifier_page_title() {
        let title = PageTitle::Classifier {
            title: "Tech".into(),
        };
        assert_eq!(title.render(2), "Page 2 | Tech");
    }

    #[test]
    fn scope_page_title() {
        let title = PageTitle::Scope {
            value: "rust".into(),
            title: "Tag".into(),
        };
        assert_eq!(title.render(3), "Page 3 - rust | Tag");
    }

    #[test]
    fn scope_descriptor_nests_under_classifier() {
        let settings = resolve_pagination(
            ClassifierKind::Metadata,
            &PaginationConfig::default(),
            &PaginationConfig::default(),
            "/tag/rust/",
            &layouts(),
        );
        let descriptor = PaginationDescriptor::for_scope("tag", "rust", "Tag", settings);
        assert_eq!(descriptor.kind, ClassifierKind::Metadata);
        assert_eq!(descriptor.id, "rust");
        assert_eq!(descriptor.pid, "tag");
        assert_eq!(descriptor.page_title(1), "Page 1 - rust | Tag");
    }

    #[test]
    fn config_parses_from_toml() {
        let config: PaginationConfig = toml::from_str(
            r#"
per_page = 4
sort_order = "asc"
"#,
        )
        .unwrap();
        assert_eq!(config.per_page, Some(4));
        assert_eq!(config.sort_order, Some(SortOrder::Asc));
        assert_eq!(config.sort_by, None);
    }

    #[test]
    fn config_rejects_unknown_keys() {
        let result: Result<PaginationConfig, _> = toml::from_str("lengthPerPage = 4");
        assert!(result.is_err());
    }
}

//! Directory-based classification.
//!
//! A directory classifier turns one content directory into a listing. For
//! each classifier whose directory exists and whose index path is non-empty,
//! three things are emitted, all tagged with the classifier id:
//!
//! ```text
//! ExtraPage      /posts/                  layout IndexPost, title "Posts"
//! PageEnhancer   /posts/<anything>        layout Post, permalink /:year/:month/:day/:slug
//! Pagination     /posts/page/N/           "Page N | Posts"
//! ```
//!
//! ## Page matching
//!
//! The enhancer's [`PathFilter`] carves out the classifier's own index and
//! pagination routes *before* the directory prefix test, so the listing
//! pages never receive item-level overrides:
//!
//! | Path | Matches |
//! |------|---------|
//! | `/posts/my-article` | yes |
//! | `/posts/` | no (index) |
//! | `/posts/page/3/` | no (pagination) |
//! | `/other/x` | no |

use crate::config::DirectoryClassifier;
use crate::layout::LayoutResolver;
use crate::naming::upper_first;
use crate::pagination::{
    ClassifierKind, PaginationConfig, PaginationDescriptor, resolve_pagination,
};
use crate::plan::{PlanError, ResolveContext, Warning};
use crate::types::{Correlation, ExtraPage, Frontmatter};
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::io;
use std::path::Path;

pub const DEFAULT_INDEX_LAYOUT: &str = "IndexPost";
pub const DEFAULT_ITEM_LAYOUT: &str = "Post";
pub const DEFAULT_ITEM_PERMALINK: &str = "/:year/:month/:day/:slug";

/// Answers whether a classifier's source directory exists.
///
/// An `Err` means the probe itself failed (e.g. permission denied) and is
/// propagated to the caller rather than treated as "missing".
pub trait DirectoryProbe: Sync {
    fn exists(&self, path: &Path) -> io::Result<bool>;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl DirectoryProbe for FsProbe {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }
}

/// A directory classifier with every default applied.
///
/// This is the single place the directory defaults live:
///
/// | Field | Default |
/// |-------|---------|
/// | `index_path` | `/{id}/` |
/// | `layout` | `IndexPost` |
/// | `item_layout` | `Post` |
/// | `item_permalink` | `/:year/:month/:day/:slug` |
/// | `title` | id with first letter capitalized |
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDirectory {
    pub id: String,
    pub dirname: String,
    pub index_path: String,
    pub layout: String,
    pub item_layout: String,
    pub item_permalink: String,
    pub title: String,
    pub frontmatter: Frontmatter,
    pub pagination: PaginationConfig,
}

impl ResolvedDirectory {
    pub fn from_classifier(classifier: &DirectoryClassifier) -> Self {
        let id = classifier.id.clone();
        Self {
            dirname: classifier.dirname.trim_matches('/').to_string(),
            index_path: classifier
                .path
                .clone()
                .unwrap_or_else(|| format!("/{id}/")),
            layout: classifier
                .layout
                .clone()
                .unwrap_or_else(|| DEFAULT_INDEX_LAYOUT.to_string()),
            item_layout: classifier
                .item_layout
                .clone()
                .unwrap_or_else(|| DEFAULT_ITEM_LAYOUT.to_string()),
            item_permalink: classifier
                .item_permalink
                .clone()
                .unwrap_or_else(|| DEFAULT_ITEM_PERMALINK.to_string()),
            title: classifier.title.clone().unwrap_or_else(|| upper_first(&id)),
            frontmatter: classifier.frontmatter.clone().unwrap_or_default(),
            pagination: classifier.pagination.clone().unwrap_or_default(),
            id,
        }
    }
}

/// Predicate selecting the pages that belong to a directory classifier.
///
/// The pagination sub-route pattern is compiled once when the filter is
/// built and reused for every page.
#[derive(Debug, Clone, Serialize)]
pub struct PathFilter {
    prefix: String,
    index_path: String,
    #[serde(serialize_with = "serialize_pattern")]
    pagination_route: Regex,
}

fn serialize_pattern<S: Serializer>(pattern: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(pattern.as_str())
}

impl PathFilter {
    pub fn new(dirname: &str, index_path: &str) -> Result<Self, regex::Error> {
        let dirname = dirname.trim_matches('/');
        let pattern = format!(r"^/{}/page/\d+/", regex::escape(dirname));
        let pagination_route = Regex::new(&pattern)?;
        Ok(Self {
            prefix: format!("/{dirname}/"),
            index_path: index_path.to_string(),
            pagination_route,
        })
    }

    /// `/{dirname}/`, the route prefix every member shares.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, path: &str) -> bool {
        !path.is_empty()
            && path != self.index_path
            && !self.pagination_route.is_match(path)
            && path.starts_with(&self.prefix)
    }
}

/// Overrides applied to every page a directory classifier selects.
#[derive(Debug, Clone, Serialize)]
pub struct PageEnhancer {
    pub filter: PathFilter,
    /// `layout` and `permalink` for matching pages.
    pub frontmatter: Frontmatter,
    pub meta: Correlation,
}

impl PageEnhancer {
    pub fn matches(&self, path: &str) -> bool {
        self.filter.matches(path)
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }
}

/// Everything one directory classifier contributes to the plan.
#[derive(Debug, Clone)]
pub struct DirectoryOutput {
    pub extra_page: ExtraPage,
    pub enhancer: PageEnhancer,
    pub pagination: PaginationDescriptor,
}

/// Outcome of resolving one directory classifier.
#[derive(Debug)]
pub enum DirectoryResolution {
    /// The source directory does not exist; nothing is emitted.
    Missing(Warning),
    /// The index path resolved to empty; nothing is emitted, nothing reported.
    Disabled,
    Resolved(Box<DirectoryOutput>),
}

/// Resolve one directory classifier.
///
/// The existence check runs before any defaulting, so a missing directory is
/// reported even if the classifier would also have been disabled.
pub fn resolve_directory(
    classifier: &DirectoryClassifier,
    global: &PaginationConfig,
    ctx: &ResolveContext<'_>,
) -> Result<DirectoryResolution, PlanError> {
    let target = ctx.content_root.join(classifier.dirname.trim_matches('/'));
    let exists = ctx
        .probe
        .exists(&target)
        .map_err(|source| PlanError::Probe {
            path: target.clone(),
            source,
        })?;
    if !exists {
        return Ok(DirectoryResolution::Missing(Warning::MissingDirectory {
            id: classifier.id.clone(),
            path: target,
        }));
    }

    let resolved = ResolvedDirectory::from_classifier(classifier);
    if resolved.index_path.is_empty() {
        tracing::debug!(id = %resolved.id, "directory classifier disabled by empty path");
        return Ok(DirectoryResolution::Disabled);
    }

    let output = build_output(&resolved, global, ctx.layouts)?;
    Ok(DirectoryResolution::Resolved(Box::new(output)))
}

fn build_output(
    resolved: &ResolvedDirectory,
    global: &PaginationConfig,
    layouts: &dyn LayoutResolver,
) -> Result<DirectoryOutput, PlanError> {
    let extra_page = ExtraPage::new(
        &resolved.index_path,
        layouts.resolve(&resolved.layout, None),
        &resolved.title,
        &resolved.frontmatter,
        Correlation::classifier(&resolved.id),
    );

    let mut frontmatter = Frontmatter::new();
    frontmatter.insert(
        "layout".into(),
        Value::String(layouts.resolve(&resolved.item_layout, Some(DEFAULT_ITEM_LAYOUT))),
    );
    frontmatter.insert(
        "permalink".into(),
        Value::String(resolved.item_permalink.clone()),
    );
    let enhancer = PageEnhancer {
        filter: PathFilter::new(&resolved.dirname, &resolved.index_path)?,
        frontmatter,
        meta: Correlation::classifier(&resolved.id),
    };

    let pagination = PaginationDescriptor::for_classifier(
        ClassifierKind::Directory,
        &resolved.id,
        &resolved.title,
        resolve_pagination(
            ClassifierKind::Directory,
            global,
            &resolved.pagination,
            &resolved.index_path,
            layouts,
        ),
    );

    Ok(DirectoryOutput {
        extra_page,
        enhancer,
        pagination,
    })
}

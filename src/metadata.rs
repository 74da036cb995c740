//! Frontmatter-based classification.
//!
//! A metadata classifier groups pages by the values of one or more
//! frontmatter keys (`tag`, `tags`, `category`, ...). Unlike directory
//! classifiers, its membership cannot be known when the plan is resolved, so
//! resolution is split in two:
//!
//! 1. **Configure**: [`resolve_metadata`] emits the classifier's index page and
//!    a descriptor holding an empty [`ClassificationMap`].
//! 2. **Populate**: the descriptor's [`ClassificationHandler`] folds every
//!    discovered page into the map. Afterwards [`MetadataClassificationDescriptor::scope_pages`]
//!    derives one listing page (and pagination) per value.
//!
//! ## Value extraction
//!
//! For each configured key, in order, the page's value is read:
//!
//! | Frontmatter | Contributes |
//! |-------------|-------------|
//! | `tags = "rust"` | `rust` |
//! | `tags = ["rust", "go"]` | `rust`, `go` |
//! | `year = 2024` | `2024` |
//! | `draft = true` | `true` |
//! | missing, `false`, `0`, `""`, tables | nothing |
//!
//! Values are never de-duplicated: a page carrying the same value under two
//! keys, or folded twice, is listed twice.

use crate::config::MetadataClassifier;
use crate::layout::LayoutResolver;
use crate::naming::{scope_route, upper_first};
use crate::pagination::{
    ClassifierKind, PaginationConfig, PaginationDescriptor, resolve_pagination,
};
use crate::types::{Correlation, ExtraPage, Frontmatter, Page};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const DEFAULT_INDEX_LAYOUT: &str = "FrontmatterKey";
pub const DEFAULT_SCOPE_LAYOUT: &str = "FrontmatterPagination";
pub const DEFAULT_SCOPE_TITLE: &str = "{value} {title}";

/// A metadata classifier with every default applied.
///
/// | Field | Default |
/// |-------|---------|
/// | `index_path` | none (empty disables) |
/// | `layout` | `FrontmatterKey` |
/// | `scope_layout` | `FrontmatterPagination` |
/// | `scope_title` | `{value} {title}` |
/// | `title` | id with first letter capitalized |
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMetadata {
    pub id: String,
    pub keys: Vec<String>,
    pub index_path: String,
    pub layout: String,
    pub scope_layout: String,
    pub scope_title: TitleTemplate,
    pub title: String,
    pub frontmatter: Frontmatter,
    pub pagination: PaginationConfig,
}

impl ResolvedMetadata {
    pub fn from_classifier(classifier: &MetadataClassifier) -> Self {
        let id = classifier.id.clone();
        Self {
            keys: classifier.keys.clone(),
            index_path: classifier.path.clone().unwrap_or_default(),
            layout: classifier
                .layout
                .clone()
                .unwrap_or_else(|| DEFAULT_INDEX_LAYOUT.to_string()),
            scope_layout: classifier
                .scope_layout
                .clone()
                .unwrap_or_else(|| DEFAULT_SCOPE_LAYOUT.to_string()),
            scope_title: TitleTemplate::new(
                classifier.scope_title.as_deref().unwrap_or(DEFAULT_SCOPE_TITLE),
            ),
            title: classifier.title.clone().unwrap_or_else(|| upper_first(&id)),
            frontmatter: classifier.frontmatter.clone().unwrap_or_default(),
            pagination: classifier.pagination.clone().unwrap_or_default(),
            id,
        }
    }
}

/// Title of a per-value scope page.
///
/// Placeholders `{value}`, `{title}` and `{id}` are substituted; any other
/// text is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TitleTemplate(String);

impl TitleTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, id: &str, title: &str, value: &str) -> String {
        self.0
            .replace("{value}", value)
            .replace("{title}", title)
            .replace("{id}", id)
    }
}

/// Pages carrying one value of a classifier's keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeBucket {
    pub value: String,
    /// Route of the value's listing page, e.g. `/tag/rust/`.
    pub path: String,
    /// Keys of member pages, in insertion order.
    pub page_keys: Vec<String>,
}

impl ScopeBucket {
    /// Member pages looked up in `pages` by key, in bucket order.
    pub fn members<'a>(&self, pages: &'a [Page]) -> Vec<&'a Page> {
        let by_key: HashMap<&str, &Page> = pages.iter().map(|p| (p.key.as_str(), p)).collect();
        self.page_keys
            .iter()
            .filter_map(|key| by_key.get(key.as_str()).copied())
            .collect()
    }
}

/// Ordered value → pages accumulator for one metadata classifier.
///
/// Values keep first-seen order and pages keep insertion order; nothing is
/// re-sorted here. Sorting is the pagination phase's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationMap {
    keys: Vec<String>,
    index_path: String,
    buckets: Vec<ScopeBucket>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl ClassificationMap {
    pub fn new(keys: Vec<String>, index_path: impl Into<String>) -> Self {
        Self {
            keys,
            index_path: index_path.into(),
            buckets: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Fold one page into the map. Returns the number of insertions made.
    pub fn fold(&mut self, page: &Page) -> usize {
        let mut inserted = 0;
        for key in &self.keys {
            let Some(value) = page.frontmatter.get(key) else {
                continue;
            };
            let values: Vec<String> = match value {
                Value::Array(items) => items.iter().filter_map(scope_value).collect(),
                other => scope_value(other).into_iter().collect(),
            };
            for value in values {
                let position = match self.positions.get(&value) {
                    Some(&position) => position,
                    None => {
                        self.buckets.push(ScopeBucket {
                            path: scope_route(&self.index_path, &value),
                            value: value.clone(),
                            page_keys: Vec::new(),
                        });
                        let position = self.buckets.len() - 1;
                        self.positions.insert(value, position);
                        position
                    }
                };
                self.buckets[position].page_keys.push(page.key.clone());
                inserted += 1;
            }
        }
        inserted
    }

    pub fn get(&self, value: &str) -> Option<&ScopeBucket> {
        self.positions.get(value).map(|&i| &self.buckets[i])
    }

    /// Values in first-seen order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.value.as_str())
    }

    pub fn buckets(&self) -> &[ScopeBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

fn scope_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Folds pages into one classifier's shared map.
///
/// Cheap to clone; every clone appends to the same map, so handlers can be
/// handed to several discovery threads. Each fold holds the lock for the
/// whole find-or-create-then-append step.
#[derive(Debug, Clone)]
pub struct ClassificationHandler {
    id: String,
    map: Arc<Mutex<ClassificationMap>>,
}

impl ClassificationHandler {
    fn new(id: &str, map: ClassificationMap) -> Self {
        Self {
            id: id.to_string(),
            map: Arc::new(Mutex::new(map)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn handle(&self, page: &Page) -> usize {
        self.lock().fold(page)
    }

    fn lock(&self) -> MutexGuard<'_, ClassificationMap> {
        // A panicking fold cannot leave a bucket half-written
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Metadata classifier output, populated lazily by its handler.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataClassificationDescriptor {
    pub id: String,
    pub title: String,
    pub keys: Vec<String>,
    pub index_path: String,
    /// Raw override; resolved per value in [`Self::scope_pages`].
    pub pagination: PaginationConfig,
    pub scope_layout: String,
    pub scope_title: TitleTemplate,
    #[serde(rename = "map", serialize_with = "serialize_snapshot")]
    handler: ClassificationHandler,
}

fn serialize_snapshot<S: Serializer>(
    handler: &ClassificationHandler,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    handler.lock().buckets().serialize(serializer)
}

/// Per-value listing pages derived from a populated classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScopePages {
    pub extra_pages: Vec<ExtraPage>,
    pub paginations: Vec<PaginationDescriptor>,
}

impl MetadataClassificationDescriptor {
    pub fn handler(&self) -> ClassificationHandler {
        self.handler.clone()
    }

    /// Copy of the map as it stands now.
    pub fn snapshot(&self) -> ClassificationMap {
        self.handler.lock().clone()
    }

    /// One scope page and one pagination per value, in map order.
    pub fn scope_pages(
        &self,
        global: &PaginationConfig,
        layouts: &dyn LayoutResolver,
    ) -> ScopePages {
        let map = self.snapshot();
        let layout = layouts.resolve(&self.scope_layout, Some(DEFAULT_SCOPE_LAYOUT));
        let mut out = ScopePages::default();
        for bucket in map.buckets() {
            let title = self.scope_title.render(&self.id, &self.title, &bucket.value);
            out.extra_pages.push(ExtraPage::new(
                &bucket.path,
                layout.clone(),
                &title,
                &Frontmatter::new(),
                Correlation::scope(&self.id, &bucket.value),
            ));
            out.paginations.push(PaginationDescriptor::for_scope(
                &self.id,
                &bucket.value,
                &self.title,
                resolve_pagination(
                    ClassifierKind::Metadata,
                    global,
                    &self.pagination,
                    &bucket.path,
                    layouts,
                ),
            ));
        }
        out
    }
}

/// Everything one metadata classifier contributes to the plan.
#[derive(Debug, Clone)]
pub struct MetadataOutput {
    pub extra_page: ExtraPage,
    pub classification: MetadataClassificationDescriptor,
}

/// Resolve one metadata classifier. `None` when its index path is absent or
/// empty.
pub fn resolve_metadata(
    classifier: &MetadataClassifier,
    layouts: &dyn LayoutResolver,
) -> Option<MetadataOutput> {
    let resolved = ResolvedMetadata::from_classifier(classifier);
    if resolved.index_path.is_empty() {
        tracing::debug!(id = %resolved.id, "metadata classifier disabled by empty path");
        return None;
    }

    let extra_page = ExtraPage::new(
        &resolved.index_path,
        layouts.resolve(&resolved.layout, Some(DEFAULT_INDEX_LAYOUT)),
        &resolved.title,
        &resolved.frontmatter,
        Correlation::classifier(&resolved.id),
    );
    let map = ClassificationMap::new(resolved.keys.clone(), &resolved.index_path);
    let classification = MetadataClassificationDescriptor {
        handler: ClassificationHandler::new(&resolved.id, map),
        id: resolved.id,
        title: resolved.title,
        keys: resolved.keys,
        index_path: resolved.index_path,
        pagination: resolved.pagination,
        scope_layout: resolved.scope_layout,
        scope_title: resolved.scope_title,
    };

    Some(MetadataOutput {
        extra_page,
        classification,
    })
}

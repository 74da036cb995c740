//! Blog configuration module.
//!
//! Handles loading, validating, and layering `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top, so a user
//! config only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml              # Blog config (optional)
//! ├── posts/                   # Target of a directory classifier
//! │   ├── hello.md
//! │   └── second.md
//! └── about.md
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! [[directories]]
//! id = "post"                          # Join key for everything this classifier emits
//! dirname = "posts"                    # Directory under the content root
//! path = "/posts/"                     # Index route (default "/{id}/", "" disables)
//! layout = "IndexPost"                 # Index page layout
//! item_layout = "Post"                 # Layout applied to every page in the directory
//! item_permalink = "/:year/:month/:day/:slug"
//! title = "Posts"                      # Default: id with first letter capitalized
//!
//! [directories.frontmatter]            # Merged last into the index frontmatter
//! description = "Everything I wrote"
//!
//! [directories.pagination]             # Overrides [global_pagination]
//! per_page = 5
//!
//! [[metadata]]
//! id = "tag"
//! keys = ["tag", "tags"]               # Frontmatter keys to group by
//! path = "/tag/"                       # Required; absent or "" disables
//! layout = "Tags"
//! scope_layout = "Tag"                 # Layout of each per-value page
//! scope_title = "Tag {value}"          # Placeholders: {value}, {title}, {id}
//!
//! [global_pagination]
//! per_page = 10
//! sort_by = "date"
//! sort_order = "desc"
//!
//! [theme]
//! layouts = ["Layout", "IndexPost", "Post"]
//! default_layout = "Layout"
//!
//! [sitemap]
//! hostname = "https://example.com"
//!
//! [comment]
//! service = "vssue"                    # "vssue" or "disqus"; other keys passed through
//!
//! [newsletter]
//! endpoint = "https://example.us1.list-manage.com/subscribe/post?u=..."
//!
//! [feed]
//! canonical_base = "https://example.com"
//! [feed.feeds.json1]
//! enable = false
//! ```
//!
//! Unknown keys are rejected to catch typos early, except inside the
//! free-form `frontmatter` tables and the option tables passed through to
//! auxiliary services.

use crate::pagination::PaginationConfig;
use crate::types::Frontmatter;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Blog configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Directory classifiers, in declaration order.
    pub directories: Vec<DirectoryClassifier>,
    /// Metadata (frontmatter key) classifiers, in declaration order.
    pub metadata: Vec<MetadataClassifier>,
    /// Pagination defaults shared by every classifier.
    pub global_pagination: PaginationConfig,
    /// Layouts the theme provides.
    pub theme: ThemeConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitemap: Option<SitemapConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newsletter: Option<NewsletterConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<FeedConfig>,
}

/// Groups the pages of one content directory into a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryClassifier {
    pub id: String,
    /// Directory name relative to the content root.
    pub dirname: String,
    /// Index route. `None` means `/{id}/`; an empty string disables the classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_permalink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<Frontmatter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Groups pages by the value(s) of one or more frontmatter keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataClassifier {
    pub id: String,
    pub keys: Vec<String>,
    /// Index route. Absent or empty disables the classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_layout: Option<String>,
    /// Title template for per-value scope pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<Frontmatter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Layouts known to the theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub layouts: Vec<String>,
    /// Returned when neither a layout nor its fallback is known.
    pub default_layout: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            layouts: [
                "Layout",
                "IndexPost",
                "Post",
                "FrontmatterKey",
                "FrontmatterPagination",
                "DirectoryPagination",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            default_layout: crate::layout::DEFAULT_LAYOUT.to_string(),
        }
    }
}

/// Sitemap generation. Enabled when `hostname` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    /// Passed through to the sitemap generator untouched.
    #[serde(flatten)]
    pub options: Frontmatter,
}

/// Comment service selection. `service` picks the provider; every other key
/// is passed through to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    pub service: String,
    #[serde(flatten)]
    pub options: Frontmatter,
}

/// Email subscription. Enabled when `endpoint` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsletterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(flatten)]
    pub options: Frontmatter,
}

/// Feed generation. Enabled when `canonical_base` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_base: Option<String>,
    /// Defaults to `/{dirname}/` of every existing directory classifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts_directories: Option<Vec<String>>,
    pub feeds: FeedFormats,
    #[serde(flatten)]
    pub options: Frontmatter,
}

/// Per-format feed switches. A format is on unless `enable = false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedFormats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rss2: Option<FeedToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atom1: Option<FeedToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json1: Option<FeedToggle>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedToggle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(flatten)]
    pub options: Frontmatter,
}

impl FeedToggle {
    pub fn is_enabled(toggle: Option<&FeedToggle>) -> bool {
        toggle.and_then(|t| t.enable).unwrap_or(true)
    }
}

impl BlogConfig {
    /// Reject configurations the resolvers cannot give a meaning to.
    ///
    /// Ids are the join key for everything a classifier emits, so they must
    /// be non-empty and unique across both classifier kinds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        let ids = self
            .directories
            .iter()
            .map(|d| d.id.as_str())
            .chain(self.metadata.iter().map(|m| m.id.as_str()));
        for id in ids {
            if id.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "classifier id must not be empty".into(),
                ));
            }
            if !seen.insert(id) {
                return Err(ConfigError::Validation(format!(
                    "duplicate classifier id: {id}"
                )));
            }
        }
        for directory in &self.directories {
            if directory.dirname.trim_matches('/').is_empty() {
                return Err(ConfigError::Validation(format!(
                    "directories.{}: dirname must not be empty",
                    directory.id
                )));
            }
        }
        for classifier in &self.metadata {
            if classifier.keys.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "metadata.{}: keys must not be empty",
                    classifier.id
                )));
            }
        }
        let paginations = std::iter::once(&self.global_pagination)
            .chain(self.directories.iter().filter_map(|d| d.pagination.as_ref()))
            .chain(self.metadata.iter().filter_map(|m| m.pagination.as_ref()));
        for pagination in paginations {
            if pagination.per_page == Some(0) {
                return Err(ConfigError::Validation(
                    "pagination.per_page must be at least 1".into(),
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(BlogConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so an
///   array of classifiers is replaced, never appended to.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BlogConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BlogConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<BlogConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Blog Configuration
# =========================
# Place this file in the content root. Every section is optional.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Directory classifiers
# ---------------------------------------------------------------------------
# Each one turns a content directory into a paginated listing. Pages inside
# the directory receive the item layout and permalink.
[[directories]]
id = "post"
dirname = "_posts"
# Index route. Defaults to "/{id}/". Set to "" to disable the classifier.
path = "/"
# layout = "IndexPost"
# item_layout = "Post"
# item_permalink = "/:year/:month/:day/:slug"
# title = "Post"

# ---------------------------------------------------------------------------
# Metadata classifiers
# ---------------------------------------------------------------------------
# Each one groups pages by the value(s) of frontmatter keys. Every distinct
# value gets its own scope page at "{path}{value}/".
[[metadata]]
id = "tag"
keys = ["tag", "tags"]
path = "/tag/"
# layout = "FrontmatterKey"
# scope_layout = "FrontmatterPagination"
# scope_title = "{value} {title}"

# ---------------------------------------------------------------------------
# Pagination defaults (per-classifier [*.pagination] tables win)
# ---------------------------------------------------------------------------
[global_pagination]
# per_page = 10
# sort_by = "date"
# sort_order = "desc"
# prev_text = "Prev"
# next_text = "Next"

# ---------------------------------------------------------------------------
# Theme
# ---------------------------------------------------------------------------
[theme]
layouts = ["Layout", "IndexPost", "Post", "FrontmatterKey", "FrontmatterPagination", "DirectoryPagination"]
default_layout = "Layout"

# ---------------------------------------------------------------------------
# Auxiliary services (uncomment to enable)
# ---------------------------------------------------------------------------
# [sitemap]
# hostname = "https://example.com"
#
# [comment]
# service = "vssue"        # or "disqus"
#
# [newsletter]
# endpoint = "https://example.us1.list-manage.com/subscribe/post?u=..."
#
# [feed]
# canonical_base = "https://example.com"
"##
}

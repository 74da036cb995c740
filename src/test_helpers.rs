//! Shared test utilities for the simple-blog test suite.
//!
//! Provides classifier builders, a scripted [`DirectoryProbe`], page
//! builders, and a small on-disk blog fixture.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_blog();
//! let pages = scan_pages(tmp.path()).unwrap();
//! let first = find_page(&pages, "/posts/first");
//! assert_eq!(first.key, "posts/first.md");
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::config::{DirectoryClassifier, MetadataClassifier};
use crate::directory::DirectoryProbe;
use crate::types::Page;
use serde_json::Value;

// =========================================================================
// Classifier builders
// =========================================================================

/// Directory classifier with only the required fields set.
pub fn directory(id: &str, dirname: &str) -> DirectoryClassifier {
    DirectoryClassifier {
        id: id.into(),
        dirname: dirname.into(),
        ..Default::default()
    }
}

/// Metadata classifier with keys and index path set.
pub fn metadata(id: &str, keys: &[&str], path: &str) -> MetadataClassifier {
    MetadataClassifier {
        id: id.into(),
        keys: keys.iter().map(|k| k.to_string()).collect(),
        path: Some(path.into()),
        ..Default::default()
    }
}

// =========================================================================
// Directory probe
// =========================================================================

/// Probe answering from a fixed list of directory names instead of the disk.
///
/// A path exists when it ends with one of the listed names. Every probed path
/// is recorded.
#[derive(Debug, Default)]
pub struct StubProbe {
    existing: Vec<PathBuf>,
    fail: bool,
    probed: Mutex<Vec<PathBuf>>,
}

impl StubProbe {
    pub fn with<const N: usize>(names: [&str; N]) -> Self {
        Self {
            existing: names.into_iter().map(PathBuf::from).collect(),
            ..Default::default()
        }
    }

    /// Probe whose every check fails with an I/O error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn probed(&self) -> Vec<PathBuf> {
        self.probed.lock().unwrap().clone()
    }
}

impl DirectoryProbe for StubProbe {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        self.probed.lock().unwrap().push(path.to_path_buf());
        if self.fail {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        Ok(self.existing.iter().any(|name| path.ends_with(name)))
    }
}

// =========================================================================
// Pages
// =========================================================================

/// Page with frontmatter given as a JSON object literal.
pub fn page(key: &str, path: &str, frontmatter: Value) -> Page {
    let frontmatter = frontmatter
        .as_object()
        .cloned()
        .unwrap_or_else(|| panic!("frontmatter for '{key}' must be an object"));
    Page::new(key, path).with_frontmatter(frontmatter)
}

/// Find a page by route. Panics if not found.
pub fn find_page<'a>(pages: &'a [Page], path: &str) -> &'a Page {
    pages.iter().find(|p| p.path == path).unwrap_or_else(|| {
        let paths = page_paths(pages);
        panic!("page '{path}' not found. Available: {paths:?}")
    })
}

/// All page routes in order.
pub fn page_paths(pages: &[Page]) -> Vec<&str> {
    pages.iter().map(|p| p.path.as_str()).collect()
}

// =========================================================================
// Fixture setup
// =========================================================================

const BLOG_CONFIG: &str = r#"
[[directories]]
id = "post"
dirname = "posts"
path = "/posts/"

[[directories]]
id = "note"
dirname = "notes"

[[directories]]
id = "draft"
dirname = "drafts"

[[metadata]]
id = "tag"
keys = ["tag", "tags"]
path = "/tag/"

[comment]
service = "vssue"
owner = "me"
"#;

const BLOG_FILES: &[(&str, &str)] = &[
    ("index.md", "+++\ntitle = \"Home\"\n+++\nWelcome.\n"),
    ("about.md", "# About\n\nNo frontmatter here.\n"),
    ("posts/index.md", "+++\ntitle = \"All posts\"\n+++\n"),
    (
        "posts/first.md",
        "+++\ntitle = \"First\"\ndate = 2024-01-10\ntags = [\"rust\", \"go\"]\n+++\nHello.\n",
    ),
    (
        "posts/second.md",
        "+++\ntitle = \"Second\"\ndate = 2024-02-01\ntags = [\"go\"]\n+++\n",
    ),
    (
        "posts/2024/recap.md",
        "+++\ntitle = \"Recap\"\ndate = 2024-12-31\ntags = [\"rust\"]\n+++\n",
    ),
    (
        "notes/idea.md",
        "+++\ntitle = \"Idea\"\ndate = 2024-03-03\ntag = \"ideas\"\n+++\n",
    ),
];

/// Write a small blog (config plus seven pages) to a temp directory.
///
/// `drafts/` is configured but deliberately absent.
pub fn setup_blog() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("config.toml"), BLOG_CONFIG).unwrap();
    for (relative, content) in BLOG_FILES {
        let path = tmp.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
    tmp
}

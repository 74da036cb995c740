//! Content discovery.
//!
//! Walks the content root for markdown pages and reads their frontmatter, so
//! the CLI can run the populate phase against a real site.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                         # Content root
//! ├── config.toml                  # Blog config (not a page)
//! ├── index.md                     # → /
//! ├── about.md                     # → /about
//! ├── posts/
//! │   ├── index.md                 # → /posts/
//! │   ├── hello.md                 # → /posts/hello
//! │   └── 2024/
//! │       └── recap.md             # → /posts/2024/recap
//! └── .drafts/                     # Hidden: skipped entirely
//! ```
//!
//! ## Frontmatter
//!
//! Only a leading TOML block fenced by `+++` lines is read. Bodies are never
//! interpreted. A file without a fence has empty frontmatter.
//!
//! ```text
//! +++
//! title = "Hello"
//! date = 2024-03-01
//! tags = ["rust", "blogging"]
//! +++
//! Body text...
//! ```
//!
//! TOML datetimes become RFC 3339 strings so they sort correctly as text.
//!
//! ## Ordering
//!
//! Pages are returned in sorted path order. Frontmatter is read in parallel,
//! but the result order never depends on scheduling.

use crate::naming::route_for;
use crate::types::{Frontmatter, Page};
use rayon::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

const FENCE: &str = "+++";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid frontmatter in {}: {source}", .path.display())]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Unterminated frontmatter in {0}")]
    Unterminated(PathBuf),
}

/// Discover every markdown page under `root`.
pub fn scan_pages(root: &Path) -> Result<Vec<Page>, ScanError> {
    let files = collect_markdown(root)?;
    tracing::debug!(root = %root.display(), files = files.len(), "markdown files found");

    files
        .par_iter()
        .map(|relative| read_page(root, relative))
        .collect()
}

fn collect_markdown(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            // strip_prefix cannot fail for entries yielded under root
            if let Ok(relative) = entry.path().strip_prefix(root) {
                files.push(relative.to_path_buf());
            }
        }
    }
    files.sort();
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

fn read_page(root: &Path, relative: &Path) -> Result<Page, ScanError> {
    let full = root.join(relative);
    let content = fs::read_to_string(&full)?;
    let frontmatter = match parse_frontmatter(&content) {
        Ok(Some(frontmatter)) => frontmatter,
        Ok(None) => return Err(ScanError::Unterminated(full)),
        Err(source) => return Err(ScanError::Frontmatter { path: full, source }),
    };

    let key = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    Ok(Page::new(key, route_for(relative)).with_frontmatter(frontmatter))
}

/// Parse the leading `+++` block of `content`.
///
/// Returns `Ok(Some(empty))` when there is no fence, and `Ok(None)` when the
/// opening fence is never closed.
pub fn parse_frontmatter(content: &str) -> Result<Option<Frontmatter>, toml::de::Error> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines();
    if lines.next().map(str::trim_end) != Some(FENCE) {
        return Ok(Some(Frontmatter::new()));
    }

    let mut block = Vec::new();
    for line in lines {
        if line.trim_end() == FENCE {
            let table: toml::Table = toml::from_str(&block.join("\n"))?;
            return Ok(Some(
                table.into_iter().map(|(k, v)| (k, to_json(v))).collect(),
            ));
        }
        block.push(line);
    }
    Ok(None)
}

fn to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(to_json).collect()),
        toml::Value::Table(table) => {
            Value::Object(table.into_iter().map(|(k, v)| (k, to_json(v))).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{find_page, page_paths, setup_blog};
    use serde_json::json;
    use tempfile::TempDir;

    // =========================================================================
    // Frontmatter
    // =========================================================================

    #[test]
    fn no_fence_is_empty_frontmatter() {
        let fm = parse_frontmatter("# Just a heading\n").unwrap().unwrap();
        assert!(fm.is_empty());
    }

    #[test]
    fn fenced_block_parsed() {
        let fm = parse_frontmatter("+++\ntitle = \"Hello\"\ntags = [\"rust\", \"go\"]\n+++\nBody")
            .unwrap()
            .unwrap();
        assert_eq!(fm.get("title"), Some(&json!("Hello")));
        assert_eq!(fm.get("tags"), Some(&json!(["rust", "go"])));
    }

    #[test]
    fn datetime_becomes_string() {
        let fm = parse_frontmatter("+++\ndate = 2024-03-01\n+++\n").unwrap().unwrap();
        assert_eq!(fm.get("date"), Some(&json!("2024-03-01")));
    }

    #[test]
    fn scalars_and_nested_tables() {
        let fm = parse_frontmatter("+++\nyear = 2024\ndraft = false\n[extra]\nscore = 1.5\n+++\n")
            .unwrap()
            .unwrap();
        assert_eq!(fm.get("year"), Some(&json!(2024)));
        assert_eq!(fm.get("draft"), Some(&json!(false)));
        assert_eq!(fm.get("extra"), Some(&json!({ "score": 1.5 })));
    }

    #[test]
    fn unterminated_fence_detected() {
        assert!(parse_frontmatter("+++\ntitle = \"x\"\n").unwrap().is_none());
    }

    #[test]
    fn invalid_toml_is_error() {
        assert!(parse_frontmatter("+++\ntitle = \n+++\n").is_err());
    }

    #[test]
    fn byte_order_mark_ignored() {
        let fm = parse_frontmatter("\u{feff}+++\ntitle = \"x\"\n+++\n").unwrap().unwrap();
        assert_eq!(fm.get("title"), Some(&json!("x")));
    }

    // =========================================================================
    // Walking
    // =========================================================================

    #[test]
    fn scan_finds_pages_in_sorted_order() {
        let tmp = setup_blog();
        let pages = scan_pages(tmp.path()).unwrap();
        assert_eq!(
            page_paths(&pages),
            vec![
                "/about",
                "/",
                "/notes/idea",
                "/posts/2024/recap",
                "/posts/first",
                "/posts/",
                "/posts/second",
            ]
        );
    }

    #[test]
    fn scan_keys_are_relative_paths() {
        let tmp = setup_blog();
        let pages = scan_pages(tmp.path()).unwrap();
        let page = find_page(&pages, "/posts/2024/recap");
        assert_eq!(page.key, "posts/2024/recap.md");
        assert_eq!(page.frontmatter.get("tags"), Some(&json!(["rust"])));
    }

    #[test]
    fn scan_skips_hidden_and_non_markdown() {
        let tmp = setup_blog();
        std::fs::create_dir(tmp.path().join(".drafts")).unwrap();
        std::fs::write(tmp.path().join(".drafts/secret.md"), "x").unwrap();
        std::fs::write(tmp.path().join("posts/image.png"), "x").unwrap();
        let pages = scan_pages(tmp.path()).unwrap();
        assert!(pages.iter().all(|p| !p.key.contains("secret")));
        assert!(pages.iter().all(|p| p.key.ends_with(".md")));
    }

    #[test]
    fn scan_reports_bad_frontmatter_with_path() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("broken.md"), "+++\ntitle = \n+++\n").unwrap();
        let err = scan_pages(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::Frontmatter { .. }));
        assert!(err.to_string().contains("broken.md"));
    }

    #[test]
    fn scan_reports_unterminated_frontmatter() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("open.md"), "+++\ntitle = \"x\"\n").unwrap();
        let err = scan_pages(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::Unterminated(_)));
    }

    #[test]
    fn scan_empty_root() {
        let tmp = TempDir::new().unwrap();
        assert!(scan_pages(tmp.path()).unwrap().is_empty());
    }
}

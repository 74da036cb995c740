//! CLI output formatting for the plan and classify commands.
//!
//! # Information-First Display
//!
//! Every classifier is shown by its identity (position, title, id) first,
//! with routes and layouts as indented context lines. Descriptors that the
//! plan stores in separate sequences (index page, enhancer, pagination) are
//! joined back together by classifier id, so each classifier reads as one
//! block.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! Directories
//! 001 Posts [post] → /posts/
//!     Layout: IndexPost
//!     Items: /posts/* → Post, /:year/:month/:day/:slug
//!     Pagination: 10 per page, date desc, DirectoryPagination
//!
//! Metadata
//! 001 Tag [tag] → /tag/
//!     Keys: tag, tags
//!     Layout: FrontmatterKey
//!     Scope: FrontmatterPagination, "{value} {title}"
//!
//! Services
//!     comment (vssue)
//!
//! Warnings
//!     Invalid directory classifier: draft, content/drafts doesn't exist!
//! ```
//!
//! ## Classify
//!
//! ```text
//! Directories
//! 001 Posts [post] (3 pages)
//!     /posts/
//!         001 Recap
//!             Source: posts/2024/recap.md
//!
//! Metadata
//! 001 Tag [tag] (2 values)
//!     rust → /tag/rust/ (2 pages)
//!         001 Recap
//!             Source: posts/2024/recap.md
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::layout::LayoutResolver;
use crate::pagination::{PageSlice, PaginationConfig, PaginationSettings, SortOrder};
use crate::plan::{BlogPlan, ClassificationPlan};
use crate::services::Delegate;
use crate::types::Page;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Classifier header: positional index, title, id, then a detail suffix.
///
/// ```text
/// 001 Posts [post] → /posts/
/// 001 Posts [post] (3 pages)
/// ```
fn classifier_header(index: usize, title: &str, id: &str, detail: &str) -> String {
    format!("{} {} [{}]{}", format_index(index), title, id, detail)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn sort_label(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "asc",
        SortOrder::Desc => "desc",
    }
}

fn pagination_line(settings: &PaginationSettings) -> String {
    format!(
        "Pagination: {} per page, {} {}, {}",
        settings.per_page,
        settings.sort_by,
        sort_label(settings.sort_order),
        settings.layout
    )
}

fn page_title(page: &Page) -> &str {
    page.frontmatter
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or(&page.key)
}

/// Lines for numbered listing pages: route, then each member with its source.
fn slice_lines(slices: &[PageSlice<'_>], depth: usize, lines: &mut Vec<String>) {
    let base = indent(depth);
    for slice in slices {
        lines.push(format!("{}{}", base, slice.url));
        for (i, page) in slice.pages.iter().enumerate() {
            lines.push(format!("{}    {} {}", base, format_index(i + 1), page_title(page)));
            lines.push(format!("{}        Source: {}", base, page.key));
        }
    }
}

// ============================================================================
// Plan output
// ============================================================================

/// Format the resolved plan: one block per classifier, then services and
/// warnings.
pub fn format_plan_output(plan: &BlogPlan) -> Vec<String> {
    let classification = &plan.classification;
    let mut lines = Vec::new();

    lines.push("Directories".to_string());
    if classification.page_enhancers.is_empty() {
        lines.push("    (none)".to_string());
    }
    for (i, enhancer) in classification.page_enhancers.iter().enumerate() {
        let id = enhancer.id();
        let index_page = classification.extra_page(id);
        let title = index_page.and_then(|p| p.title()).unwrap_or(id);
        let route = index_page.map(|p| p.permalink.as_str()).unwrap_or("");
        lines.push(classifier_header(i + 1, title, id, &format!(" → {route}")));
        if let Some(layout) = index_page.and_then(|p| p.layout()) {
            lines.push(format!("    Layout: {}", layout));
        }
        let item_layout = enhancer.frontmatter.get("layout").and_then(|v| v.as_str());
        let permalink = enhancer.frontmatter.get("permalink").and_then(|v| v.as_str());
        lines.push(format!(
            "    Items: {}* → {}, {}",
            enhancer.filter.prefix(),
            item_layout.unwrap_or(""),
            permalink.unwrap_or("")
        ));
        if let Some(pagination) = classification.pagination(id) {
            lines.push(format!("    {}", pagination_line(&pagination.settings)));
        }
    }

    lines.push(String::new());
    lines.push("Metadata".to_string());
    if classification.classifications.is_empty() {
        lines.push("    (none)".to_string());
    }
    for (i, descriptor) in classification.classifications.iter().enumerate() {
        let index_page = classification.extra_page(&descriptor.id);
        lines.push(classifier_header(
            i + 1,
            &descriptor.title,
            &descriptor.id,
            &format!(" → {}", descriptor.index_path),
        ));
        lines.push(format!("    Keys: {}", descriptor.keys.join(", ")));
        if let Some(layout) = index_page.and_then(|p| p.layout()) {
            lines.push(format!("    Layout: {}", layout));
        }
        lines.push(format!(
            "    Scope: {}, \"{}\"",
            descriptor.scope_layout,
            descriptor.scope_title.as_str()
        ));
    }

    if !plan.services.delegates.is_empty() {
        lines.push(String::new());
        lines.push("Services".to_string());
        for delegate in &plan.services.delegates {
            let line = match delegate {
                Delegate::Comment(options) => {
                    format!("    comment ({})", options.service.as_str())
                }
                Delegate::Sitemap(options) => format!("    sitemap ({})", options.hostname),
                Delegate::Feed(options) => format!(
                    "    feed ({})",
                    options.posts_directories.join(", ")
                ),
                other => format!("    {}", other.name()),
            };
            lines.push(line);
        }
    }

    let warnings: Vec<String> = plan.diagnostics().map(|w| w.to_string()).collect();
    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push("Warnings".to_string());
        for warning in warnings {
            lines.push(format!("    {}", warning));
        }
    }

    lines
}

/// Print plan output to stdout.
pub fn print_plan_output(plan: &BlogPlan) {
    for line in format_plan_output(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Classify output
// ============================================================================

/// Format classifier membership after the populate phase.
///
/// Directory members and each metadata value are shown split into their
/// numbered listing pages, in listing order.
pub fn format_classification_output(
    plan: &ClassificationPlan,
    pages: &[Page],
    global: &PaginationConfig,
    layouts: &dyn LayoutResolver,
) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Directories".to_string());
    for (i, enhancer) in plan.page_enhancers.iter().enumerate() {
        let id = enhancer.id();
        let members = plan.directory_members(id, pages);
        let title = plan
            .extra_page(id)
            .and_then(|p| p.title())
            .unwrap_or(id);
        lines.push(classifier_header(
            i + 1,
            title,
            id,
            &format!(" ({})", plural(members.len(), "page")),
        ));
        if let Some(pagination) = plan.pagination(id) {
            let slices = pagination.settings.paginate(members);
            slice_lines(&slices, 1, &mut lines);
        }
    }

    lines.push(String::new());
    lines.push("Metadata".to_string());
    for (i, descriptor) in plan.classifications.iter().enumerate() {
        let map = descriptor.snapshot();
        let scope = descriptor.scope_pages(global, layouts);
        lines.push(classifier_header(
            i + 1,
            &descriptor.title,
            &descriptor.id,
            &format!(" ({})", plural(map.len(), "value")),
        ));
        for (bucket, pagination) in map.buckets().iter().zip(&scope.paginations) {
            let members = bucket.members(pages);
            lines.push(format!(
                "    {} → {} ({})",
                bucket.value,
                bucket.path,
                plural(bucket.page_keys.len(), "page")
            ));
            let slices = pagination.settings.paginate(members);
            if slices.len() == 1 {
                for (j, page) in slices[0].pages.iter().enumerate() {
                    lines.push(format!("        {} {}", format_index(j + 1), page_title(page)));
                    lines.push(format!("            Source: {}", page.key));
                }
            } else {
                slice_lines(&slices, 2, &mut lines);
            }
        }
    }

    lines
}

/// Print classification output to stdout.
pub fn print_classification_output(
    plan: &ClassificationPlan,
    pages: &[Page],
    global: &PaginationConfig,
    layouts: &dyn LayoutResolver,
) {
    for line in format_classification_output(plan, pages, global, layouts) {
        println!("{}", line);
    }
}

//! Populate phase: fold discovered pages into metadata classifications.
//!
//! Runs after [`crate::plan::resolve_plan`] and after page discovery. Every
//! classification handler sees every page, in page order, so bucket and
//! value order is fully determined by the input order.

use crate::layout::LayoutResolver;
use crate::metadata::{MetadataClassificationDescriptor, ScopePages};
use crate::pagination::PaginationConfig;
use crate::types::Page;

/// Fold `pages` into every classification. Returns the total number of
/// bucket insertions.
pub fn populate(classifications: &[MetadataClassificationDescriptor], pages: &[Page]) -> usize {
    let handlers: Vec<_> = classifications.iter().map(|c| c.handler()).collect();
    let mut inserted = 0;
    for page in pages {
        for handler in &handlers {
            inserted += handler.handle(page);
        }
    }
    tracing::debug!(
        pages = pages.len(),
        classifications = classifications.len(),
        inserted,
        "classifications populated"
    );
    inserted
}

/// Scope pages of every classification, concatenated in classification
/// order.
pub fn scope_pages(
    classifications: &[MetadataClassificationDescriptor],
    global: &PaginationConfig,
    layouts: &dyn LayoutResolver,
) -> ScopePages {
    let mut all = ScopePages::default();
    for classification in classifications {
        let scope = classification.scope_pages(global, layouts);
        all.extra_pages.extend(scope.extra_pages);
        all.paginations.extend(scope.paginations);
    }
    all
}

//! Classification plan assembly.
//!
//! Runs every classifier through its resolver, in declaration order, and
//! collects the results into the four ordered sequences the build pipeline
//! consumes:
//!
//! ```text
//! BlogConfig ──┬── directories ──→ resolve_directory ──┬──→ page_enhancers
//!              │                                       ├──→ extra_pages
//!              │                                       └──→ paginations
//!              └── metadata ─────→ resolve_metadata ───┬──→ extra_pages
//!                                                      └──→ classifications
//! ```
//!
//! ## Diagnostics
//!
//! Invalid entries never abort resolution. A classifier pointing at a missing
//! directory, or a comment block naming an unknown service, is excluded and a
//! [`Warning`] is recorded (and logged). A classifier whose index path is
//! configured empty is dropped without a warning: that is treated as a
//! deliberate switch-off, not a mistake.
//!
//! The only error that escapes is a failing existence probe, since "could not
//! check" and "does not exist" must not be confused.

use crate::config::BlogConfig;
use crate::directory::{DirectoryProbe, DirectoryResolution, PageEnhancer, resolve_directory};
use crate::layout::LayoutResolver;
use crate::metadata::{MetadataClassificationDescriptor, resolve_metadata};
use crate::pagination::PaginationDescriptor;
use crate::services::{self, Services};
use crate::types::{ExtraPage, Page};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Could not check classifier directory {}: {source}", .path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid pagination route pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A recoverable configuration problem. The offending entry is excluded and
/// everything else proceeds.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    #[error("Invalid directory classifier: {id}, {} doesn't exist!", .path.display())]
    MissingDirectory { id: String, path: PathBuf },
    #[error("Invalid comment service: {service}")]
    UnknownCommentService { service: String },
}

/// Collaborators the resolvers consult.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Directory classifiers are resolved relative to this root.
    pub content_root: &'a Path,
    pub layouts: &'a dyn LayoutResolver,
    pub probe: &'a dyn DirectoryProbe,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        content_root: &'a Path,
        layouts: &'a dyn LayoutResolver,
        probe: &'a dyn DirectoryProbe,
    ) -> Self {
        Self {
            content_root,
            layouts,
            probe,
        }
    }
}

/// Output of the configuration phase.
///
/// Directory descriptors are complete. Metadata classifications carry empty
/// accumulators that the populate phase fills in.
#[derive(Debug, Default, Serialize)]
pub struct ClassificationPlan {
    pub page_enhancers: Vec<PageEnhancer>,
    pub extra_pages: Vec<ExtraPage>,
    pub paginations: Vec<PaginationDescriptor>,
    pub classifications: Vec<MetadataClassificationDescriptor>,
    /// `/{dirname}/` for every directory classifier whose directory exists,
    /// including ones disabled by an empty path.
    pub source_directories: Vec<String>,
    pub diagnostics: Vec<Warning>,
}

impl ClassificationPlan {
    fn record(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.diagnostics.push(warning);
    }

    /// First enhancer, in declaration order, whose filter accepts `path`.
    pub fn enhancer_for(&self, path: &str) -> Option<&PageEnhancer> {
        self.page_enhancers.iter().find(|e| e.matches(path))
    }

    /// Pages whose first matching enhancer belongs to classifier `id`, in
    /// input order.
    pub fn directory_members<'a>(&self, id: &str, pages: &'a [Page]) -> Vec<&'a Page> {
        pages
            .iter()
            .filter(|page| self.enhancer_for(&page.path).is_some_and(|e| e.id() == id))
            .collect()
    }

    pub fn extra_page(&self, id: &str) -> Option<&ExtraPage> {
        self.extra_pages.iter().find(|p| p.meta.id == id)
    }

    pub fn pagination(&self, id: &str) -> Option<&PaginationDescriptor> {
        self.paginations.iter().find(|p| p.id == id)
    }

    pub fn classification(&self, id: &str) -> Option<&MetadataClassificationDescriptor> {
        self.classifications.iter().find(|c| c.id == id)
    }
}

/// Resolve every classifier in `config` into a [`ClassificationPlan`].
pub fn resolve_plan(
    config: &BlogConfig,
    ctx: &ResolveContext<'_>,
) -> Result<ClassificationPlan, PlanError> {
    let mut plan = ClassificationPlan::default();

    for classifier in &config.directories {
        match resolve_directory(classifier, &config.global_pagination, ctx)? {
            DirectoryResolution::Missing(warning) => plan.record(warning),
            DirectoryResolution::Disabled => {
                plan.source_directories
                    .push(source_directory(&classifier.dirname));
            }
            DirectoryResolution::Resolved(output) => {
                plan.source_directories
                    .push(source_directory(&classifier.dirname));
                plan.extra_pages.push(output.extra_page);
                plan.page_enhancers.push(output.enhancer);
                plan.paginations.push(output.pagination);
            }
        }
    }

    for classifier in &config.metadata {
        if let Some(output) = resolve_metadata(classifier, ctx.layouts) {
            plan.extra_pages.push(output.extra_page);
            plan.classifications.push(output.classification);
        }
    }

    tracing::debug!(
        enhancers = plan.page_enhancers.len(),
        extra_pages = plan.extra_pages.len(),
        paginations = plan.paginations.len(),
        classifications = plan.classifications.len(),
        "classification plan resolved"
    );
    Ok(plan)
}

fn source_directory(dirname: &str) -> String {
    format!("/{}/", dirname.trim_matches('/'))
}

/// The classification plan together with the auxiliary services.
#[derive(Debug, Serialize)]
pub struct BlogPlan {
    pub classification: ClassificationPlan,
    pub services: Services,
}

impl BlogPlan {
    /// Every warning recorded while resolving, classifiers first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Warning> {
        self.classification
            .diagnostics
            .iter()
            .chain(self.services.diagnostics.iter())
    }
}

/// Resolve the classification plan, then compose auxiliary services.
pub fn resolve(config: &BlogConfig, ctx: &ResolveContext<'_>) -> Result<BlogPlan, PlanError> {
    let classification = resolve_plan(config, ctx)?;
    let services = services::compose(config, &classification.source_directories);
    Ok(BlogPlan {
        classification,
        services,
    })
}

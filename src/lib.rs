//! # Simple Blog
//!
//! Turns a blog's classifier configuration into the pages, page overrides,
//! listings and auxiliary services a static site build needs. Your content
//! directories and frontmatter are the data source: a directory of posts
//! becomes a paginated listing, and every tag value becomes a page of its own.
//!
//! # Architecture: Two-Phase Resolution
//!
//! ```text
//! 1. Configure  config.toml  →  ClassificationPlan   (no page content needed)
//! 2. Populate   pages        →  ClassificationMap    (one fold per page)
//! ```
//!
//! The configure phase is synchronous and side-effect free apart from the
//! directory existence checks and recorded warnings. Everything it emits for
//! directory classifiers is final. Metadata classifiers cannot know their
//! values until pages are seen, so they emit an empty accumulator plus a
//! handler; the populate phase folds pages into it, after which per-value
//! scope pages can be derived.
//!
//! Every emitted descriptor carries its classifier id, which is the join key
//! the rest of a build pipeline uses to connect index pages, item overrides
//! and listings.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`plan`] | Configure phase: runs every classifier, collects the ordered plan and warnings |
//! | [`directory`] | Directory classifiers: index page, item enhancer, pagination |
//! | [`metadata`] | Frontmatter classifiers: index page, classification map and handler, scope pages |
//! | [`populate`] | Populate phase: folds pages into every classification |
//! | [`pagination`] | Pagination precedence, listing routes, sorting into numbered pages |
//! | [`layout`] | Total layout-name resolution against the theme's layouts |
//! | [`services`] | Sitemap, comment, newsletter and feed delegates plus service flags |
//! | [`config`] | `config.toml` loading, stock-default layering, validation |
//! | [`scan`] | Markdown discovery and `+++` TOML frontmatter reading for the CLI |
//! | [`naming`] | Title and route conventions |
//! | [`types`] | Shared descriptor types (`Page`, `ExtraPage`, `Correlation`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Warnings Are Data
//!
//! A misconfigured classifier should not stop a blog from building. Missing
//! directories and unknown comment services become [`plan::Warning`] values
//! stored on the plan (and logged through `tracing`), so callers and tests can
//! inspect them. Only a failing filesystem probe is an error.
//!
//! ## One Defaults Table Per Classifier Kind
//!
//! Defaults are applied in exactly one place per kind
//! ([`directory::ResolvedDirectory::from_classifier`],
//! [`metadata::ResolvedMetadata::from_classifier`]). Everything downstream
//! works on fully-resolved values.
//!
//! ## Shared Accumulators
//!
//! A classification map sits behind `Arc<Mutex<_>>`. Handlers are cheap
//! clones that may be driven from several threads; the find-or-create-then-
//! append step is always done under one lock.

pub mod config;
pub mod directory;
pub mod layout;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod pagination;
pub mod plan;
pub mod populate;
pub mod scan;
pub mod services;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

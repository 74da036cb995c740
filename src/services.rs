//! Auxiliary services that ride along with the blog.
//!
//! Sitemap, comments, newsletter and feeds are not built here; they are
//! handed to external generators as typed [`Delegate`]s. This module decides
//! which delegates to enable and with which options, and summarizes the
//! result as [`ServiceFlags`] for themes to switch UI on and off.
//!
//! | Config | Enabled when | Delegates |
//! |--------|--------------|-----------|
//! | `[sitemap]` | `hostname` set | `sitemap`, `last-updated` |
//! | `[comment]` | `service` is `vssue` or `disqus` | `comment` |
//! | `[newsletter]` | `endpoint` set | `newsletter` |
//! | `[feed]` | `canonical_base` set | `feed` |
//!
//! Empty strings count as unset.

use crate::config::{BlogConfig, FeedFormats, FeedToggle};
use crate::plan::Warning;
use crate::types::Frontmatter;
use serde::Serialize;

/// Routes the sitemap leaves out unless `exclude` is configured.
pub const DEFAULT_SITEMAP_EXCLUDE: &[&str] = &["/404.html"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentService {
    Vssue,
    Disqus,
}

impl CommentService {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "vssue" => Some(CommentService::Vssue),
            "disqus" => Some(CommentService::Disqus),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommentService::Vssue => "vssue",
            CommentService::Disqus => "disqus",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapOptions {
    pub hostname: String,
    pub exclude: Vec<String>,
    #[serde(flatten)]
    pub options: Frontmatter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentOptions {
    pub service: CommentService,
    /// Everything in `[comment]` except `service`.
    #[serde(flatten)]
    pub options: Frontmatter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsletterOptions {
    pub endpoint: String,
    #[serde(flatten)]
    pub options: Frontmatter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedOptions {
    pub canonical_base: String,
    pub posts_directories: Vec<String>,
    pub feeds: FeedFormats,
    #[serde(flatten)]
    pub options: Frontmatter,
}

/// An external generator to enable, with its options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "delegate", content = "options", rename_all = "kebab-case")]
pub enum Delegate {
    Sitemap(SitemapOptions),
    LastUpdated,
    Comment(CommentOptions),
    Newsletter(NewsletterOptions),
    Feed(FeedOptions),
}

impl Delegate {
    pub fn name(&self) -> &'static str {
        match self {
            Delegate::Sitemap(_) => "sitemap",
            Delegate::LastUpdated => "last-updated",
            Delegate::Comment(_) => "comment",
            Delegate::Newsletter(_) => "newsletter",
            Delegate::Feed(_) => "feed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentFlags {
    pub enabled: bool,
    /// Empty when disabled.
    pub service: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmailFlags {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedFlags {
    pub rss: bool,
    pub atom: bool,
    pub json: bool,
}

/// Which services a theme should expose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceFlags {
    pub comment: CommentFlags,
    pub email: EmailFlags,
    pub feed: FeedFlags,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Services {
    pub delegates: Vec<Delegate>,
    pub flags: ServiceFlags,
    pub diagnostics: Vec<Warning>,
}

/// The section and its switch value, when the section is present and the
/// switch is a non-empty string.
fn enabled<T>(
    section: &Option<T>,
    switch: impl Fn(&T) -> Option<&String>,
) -> Option<(&T, &String)> {
    let section = section.as_ref()?;
    let value = switch(section).filter(|v| !v.is_empty())?;
    Some((section, value))
}

/// Decide delegates and flags.
///
/// `source_directories` are the `/{dirname}/` routes of existing directory
/// classifiers; they become the feed's default `posts_directories`.
pub fn compose(config: &BlogConfig, source_directories: &[String]) -> Services {
    let mut services = Services::default();

    if let Some((sitemap, hostname)) = enabled(&config.sitemap, |s| s.hostname.as_ref()) {
        let exclude = sitemap.exclude.clone().unwrap_or_else(|| {
            DEFAULT_SITEMAP_EXCLUDE
                .iter()
                .map(|s| s.to_string())
                .collect()
        });
        services.delegates.push(Delegate::Sitemap(SitemapOptions {
            hostname: hostname.clone(),
            exclude,
            options: sitemap.options.clone(),
        }));
        services.delegates.push(Delegate::LastUpdated);
    }

    if let Some(comment) = &config.comment {
        match CommentService::parse(&comment.service) {
            Some(service) => {
                services.delegates.push(Delegate::Comment(CommentOptions {
                    service,
                    options: comment.options.clone(),
                }));
                services.flags.comment = CommentFlags {
                    enabled: true,
                    service: service.as_str().to_string(),
                };
            }
            None => {
                let warning = Warning::UnknownCommentService {
                    service: comment.service.clone(),
                };
                tracing::warn!("{warning}");
                services.diagnostics.push(warning);
            }
        }
    }

    if let Some((newsletter, endpoint)) = enabled(&config.newsletter, |n| n.endpoint.as_ref()) {
        services.delegates.push(Delegate::Newsletter(NewsletterOptions {
            endpoint: endpoint.clone(),
            options: newsletter.options.clone(),
        }));
        services.flags.email.enabled = true;
    }

    if let Some((feed, canonical_base)) = enabled(&config.feed, |f| f.canonical_base.as_ref()) {
        let feeds = &feed.feeds;
        services.flags.feed = FeedFlags {
            rss: FeedToggle::is_enabled(feeds.rss2.as_ref()),
            atom: FeedToggle::is_enabled(feeds.atom1.as_ref()),
            json: FeedToggle::is_enabled(feeds.json1.as_ref()),
        };
        services.delegates.push(Delegate::Feed(FeedOptions {
            canonical_base: canonical_base.clone(),
            posts_directories: feed
                .posts_directories
                .clone()
                .unwrap_or_else(|| source_directories.to_vec()),
            feeds: feeds.clone(),
            options: feed.options.clone(),
        }));
    }

    tracing::debug!(
        delegates = ?services.delegates.iter().map(Delegate::name).collect::<Vec<_>>(),
        "auxiliary services composed"
    );
    services
}

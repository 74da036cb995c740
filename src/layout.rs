//! Layout name resolution.
//!
//! Classifiers refer to layouts by symbolic name (`IndexPost`, `Post`,
//! `FrontmatterKey`, ...). The theme decides which of those names actually
//! exist. Resolution is total: an unknown name falls back to the supplied
//! fallback if the theme knows it, and otherwise to the theme's default
//! layout. Nothing in the plan ever ends up without a layout.

use crate::config::ThemeConfig;
use std::collections::BTreeSet;

/// Identifier returned when neither the name nor the fallback is known.
pub const DEFAULT_LAYOUT: &str = "Layout";

/// Maps a symbolic layout name to a concrete layout identifier.
pub trait LayoutResolver: Sync {
    fn resolve(&self, name: &str, fallback: Option<&str>) -> String;
}

/// Layouts provided by a theme, as listed in `[theme]`.
#[derive(Debug, Clone)]
pub struct ThemeLayouts {
    known: BTreeSet<String>,
    default: String,
}

impl ThemeLayouts {
    pub fn new<I, S>(names: I, default: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: names.into_iter().map(Into::into).collect(),
            default: default.into(),
        }
    }

    pub fn from_config(theme: &ThemeConfig) -> Self {
        Self::new(theme.layouts.iter().cloned(), theme.default_layout.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.known.contains(name)
    }
}

impl Default for ThemeLayouts {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

impl LayoutResolver for ThemeLayouts {
    fn resolve(&self, name: &str, fallback: Option<&str>) -> String {
        if self.contains(name) {
            return name.to_string();
        }
        match fallback {
            Some(fallback) if self.contains(fallback) => fallback.to_string(),
            _ => self.default.clone(),
        }
    }
}

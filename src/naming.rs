//! Naming and route conventions shared by the resolvers and the content scan.
//!
//! ## Titles
//!
//! A classifier without an explicit title displays its id with the first
//! character upper-cased: `posts` → "Posts", `tag` → "Tag".
//!
//! ## Routes
//!
//! Content files map to normalized routes relative to the content root:
//! - `posts/hello.md` → `/posts/hello`
//! - `posts/index.md`, `posts/README.md` → `/posts/`
//! - `index.md` → `/`
//!
//! Scope pages (one per metadata value) live under their classifier's index:
//! `/tag/` + `rust` → `/tag/rust/`.

use std::path::{Component, Path};

/// Upper-case the first character, leaving the rest untouched.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalized route for a content file, given its path relative to the
/// content root.
pub fn route_for(relative: &Path) -> String {
    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let Some(file) = segments.pop() else {
        return "/".to_string();
    };
    let stem = Path::new(&file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(file);

    let mut route = String::from("/");
    for segment in &segments {
        route.push_str(segment);
        route.push('/');
    }
    if !is_directory_index(&stem) {
        route.push_str(&stem);
    }
    route
}

fn is_directory_index(stem: &str) -> bool {
    stem.eq_ignore_ascii_case("index") || stem.eq_ignore_ascii_case("readme")
}

/// Route of the scope page for `value` under a classifier index path.
pub fn scope_route(index_path: &str, value: &str) -> String {
    if index_path.ends_with('/') {
        format!("{index_path}{value}/")
    } else {
        format!("{index_path}/{value}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_first_capitalizes_id() {
        assert_eq!(upper_first("posts"), "Posts");
        assert_eq!(upper_first("tech"), "Tech");
    }

    #[test]
    fn upper_first_keeps_rest() {
        assert_eq!(upper_first("myPosts"), "MyPosts");
    }

    #[test]
    fn upper_first_empty() {
        assert_eq!(upper_first(""), "");
    }

    #[test]
    fn upper_first_non_ascii() {
        assert_eq!(upper_first("école"), "École");
    }

    #[test]
    fn route_for_nested_page() {
        assert_eq!(route_for(Path::new("posts/hello.md")), "/posts/hello");
    }

    #[test]
    fn route_for_deeply_nested_page() {
        assert_eq!(
            route_for(Path::new("posts/2024/hello-world.md")),
            "/posts/2024/hello-world"
        );
    }

    #[test]
    fn route_for_directory_index() {
        assert_eq!(route_for(Path::new("posts/index.md")), "/posts/");
        assert_eq!(route_for(Path::new("posts/README.md")), "/posts/");
    }

    #[test]
    fn route_for_root_index() {
        assert_eq!(route_for(Path::new("index.md")), "/");
    }

    #[test]
    fn route_for_top_level_page() {
        assert_eq!(route_for(Path::new("about.md")), "/about");
    }

    #[test]
    fn scope_route_appends_value() {
        assert_eq!(scope_route("/tag/", "rust"), "/tag/rust/");
    }

    #[test]
    fn scope_route_inserts_missing_slash() {
        assert_eq!(scope_route("/tag", "rust"), "/tag/rust/");
    }
}

/*
 * paths.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Portable relative links between output files.
 */

//! Portable relative links between output files.
//!
//! All paths here are relative to the project output directory and are
//! computed lexically, without touching the filesystem.

use std::path::{Component, Path};

/// Convert a host path to a forward-slash string.
pub fn path_with_forward_slashes(path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Lexically normalized path segments (`.` dropped, `..` applied).
///
/// A `..` that would climb above the start is kept, so the path still
/// points outside the output directory rather than being silently clamped.
fn segments(path: &str) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Path from the directory containing `from_file` to `to_file`, using `/`
/// separators regardless of platform.
///
/// ```
/// use quarto_book_crossref::paths::relative_path;
///
/// assert_eq!(relative_path("a.html", "b.html"), "b.html");
/// assert_eq!(relative_path("part1/a.html", "b.html"), "../b.html");
/// assert_eq!(relative_path("a.html", "part2/b.html"), "part2/b.html");
/// ```
pub fn relative_path(from_file: &str, to_file: &str) -> String {
    let mut from_dir = segments(from_file);
    from_dir.pop();
    let to = segments(to_file);

    let common = from_dir
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_dir.len() - common];
    parts.extend(&to[common..]);
    parts.join("/")
}

/// Normalize a project-relative path into the form used as index file keys.
pub fn normalize_output_path(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    let joined: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    segments(&joined.join("/")).join("/")
}

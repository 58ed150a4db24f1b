/*
 * contents.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Typed book contents and the chapter render list.
 */

//! Book contents.
//!
//! `book.chapters` and `book.appendices` in `_quarto.yml` are lists of
//! plain file names, parts that group chapters, sidebar-style sections,
//! and links. They decode into [`ContentsItem`]; the render list is read
//! off the tree in document order.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CrossrefError, Result};

/// Input extensions an execution engine can render.
pub const RENDERABLE_EXTENSIONS: &[&str] = &["qmd", "md", "ipynb", "rmd"];

/// One node of the book contents tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ContentsItem {
    /// `- intro.qmd`
    Href(String),

    /// `- part: part1.qmd` (or a plain title) with nested chapters.
    Part {
        part: String,
        #[serde(default)]
        chapters: Vec<ContentsItem>,
    },

    /// `- section: Title` with nested contents.
    Section {
        section: String,
        #[serde(default)]
        contents: Vec<ContentsItem>,
    },

    /// `- href: intro.qmd` with an optional display text.
    Link {
        href: String,
        #[serde(default)]
        text: Option<String>,
    },

    /// Anything else; contributes no inputs.
    Unknown(Value),
}

/// The chapter lists of a book project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookConfig {
    pub chapters: Vec<ContentsItem>,
    pub appendices: Vec<ContentsItem>,
}

impl BookConfig {
    /// Read `chapters` and `appendices` from the `book` table.
    pub fn from_value(book: &Value, config_path: &Path) -> Result<Self> {
        Ok(Self {
            chapters: contents_list(book, "chapters", config_path)?,
            appendices: contents_list(book, "appendices", config_path)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty() && self.appendices.is_empty()
    }
}

fn contents_list(book: &Value, key: &str, config_path: &Path) -> Result<Vec<ContentsItem>> {
    match book.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| CrossrefError::Config {
            path: config_path.to_path_buf(),
            message: format!("book.{} must be a list: {}", key, e),
        }),
    }
}

/// Inputs to render, in reading order: chapters first, then appendices.
///
/// Only files that exist under `project_dir` with a renderable extension
/// are listed.
pub fn book_render_list(project_dir: &Path, book: &BookConfig) -> Vec<String> {
    let mut inputs = Vec::new();
    for item in book.chapters.iter().chain(&book.appendices) {
        collect_inputs(project_dir, item, &mut inputs);
    }
    inputs
}

fn collect_inputs(project_dir: &Path, item: &ContentsItem, inputs: &mut Vec<String>) {
    match item {
        ContentsItem::Href(href) | ContentsItem::Link { href, .. } => {
            push_if_renderable(project_dir, href, inputs);
        }
        ContentsItem::Part { part, chapters } => {
            push_if_renderable(project_dir, part, inputs);
            for chapter in chapters {
                collect_inputs(project_dir, chapter, inputs);
            }
        }
        ContentsItem::Section { contents, .. } => {
            for child in contents {
                collect_inputs(project_dir, child, inputs);
            }
        }
        ContentsItem::Unknown(_) => {}
    }
}

fn push_if_renderable(project_dir: &Path, href: &str, inputs: &mut Vec<String>) {
    if is_renderable_input(project_dir, href) {
        inputs.push(href.to_string());
    } else {
        tracing::debug!(href, "Skipping book contents entry that is not a renderable file");
    }
}

/// Whether `href` names an existing input file an engine can render.
pub fn is_renderable_input(project_dir: &Path, href: &str) -> bool {
    let path = project_dir.join(href);
    let renderable_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            RENDERABLE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        });
    renderable_ext && path.is_file()
}

/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for book cross-reference resolution.
 */

//! Error types for quarto-book-crossref

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a cross-reference pass.
///
/// Only merge-time and project loading problems are errors. Resolution
/// itself never fails: unknown references degrade to visible `?key`
/// markers in the output document.
#[derive(Error, Debug)]
pub enum CrossrefError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid crossref index {}: {source}", .path.display())]
    InvalidIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid input target index {}: {source}", .path.display())]
    InvalidTargetIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("No Quarto project found at {}", .0.display())]
    ProjectNotFound(PathBuf),

    #[error(transparent)]
    Dom(#[from] quarto_html_dom::Error),
}

impl CrossrefError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CrossrefError>;

/*
 * post_render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Book cross-reference post-render pass.
 */

//! Post-render pass.
//!
//! Runs after every chapter of a book has been rendered once. The index
//! merge is a barrier: no document is touched until every format's index
//! is complete. Documents are then resolved in parallel, each owning its
//! own tree and sharing the read-only indexes.

use std::path::PathBuf;

use quarto_html_dom::{HtmlDom, parse_document};
use rayon::prelude::*;

use crate::error::{CrossrefError, Result};
use crate::format::is_multi_file_book_format;
use crate::merge::{MergeOptions, crossref_index_for_output_file, merge_crossref_indexes};
use crate::project::ProjectContext;
use crate::resolve::{ResolveStats, resolve_crossrefs};
use crate::targets::TargetResolver;

/// A rendered document loaded for post-processing.
#[derive(Debug)]
pub struct OutputFile {
    /// Absolute path of the rendered file
    pub path: PathBuf,

    /// Name of the format it was rendered to
    pub format: String,

    pub doc: HtmlDom,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>, format: impl Into<String>, doc: HtmlDom) -> Self {
        Self {
            path: path.into(),
            format: format.into(),
            doc,
        }
    }

    /// Read and parse a rendered file.
    pub fn load(path: impl Into<PathBuf>, format: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let html = std::fs::read_to_string(&path).map_err(|e| CrossrefError::io(&path, e))?;
        let doc = parse_document(&html);
        Ok(Self::new(path, format, doc))
    }

    /// Serialize the document back to its path.
    pub fn write(&self) -> Result<()> {
        let html = self.doc.to_html()?;
        std::fs::write(&self.path, html).map_err(|e| CrossrefError::io(&self.path, e))
    }

    fn is_multi_file(&self) -> bool {
        is_multi_file_book_format(&self.format)
    }
}

/// What the pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostRenderSummary {
    /// Indexes built, one per multi-file format.
    pub indexes: usize,

    /// Output files (relative to the output directory) that were resolved.
    pub files: Vec<String>,

    /// Placeholder counts over all resolved files.
    pub stats: ResolveStats,
}

/// Resolve cross-references in `outputs` in place.
///
/// Outputs in single-file formats, outside the project output directory,
/// or not registered in any index are left untouched.
pub fn book_crossrefs_post_render(
    project: &ProjectContext,
    outputs: &mut [OutputFile],
    resolver: &dyn TargetResolver,
) -> Result<PostRenderSummary> {
    book_crossrefs_post_render_with(project, outputs, resolver, &MergeOptions::default())
}

/// [`book_crossrefs_post_render`] with explicit merge options.
pub fn book_crossrefs_post_render_with(
    project: &ProjectContext,
    outputs: &mut [OutputFile],
    resolver: &dyn TargetResolver,
    options: &MergeOptions,
) -> Result<PostRenderSummary> {
    if !outputs.iter().any(OutputFile::is_multi_file) {
        tracing::debug!("No multi-file outputs, skipping book crossrefs");
        return Ok(PostRenderSummary::default());
    }

    let chapters = project.book_render_list();
    let indexes = merge_crossref_indexes(&chapters, resolver, options)?;

    let resolved: Vec<(String, ResolveStats)> = outputs
        .par_iter_mut()
        .filter(|output| output.is_multi_file())
        .filter_map(|output| {
            let Some(file) = project.output_relative(&output.path) else {
                tracing::debug!(
                    path = %output.path.display(),
                    "Output outside the project output directory"
                );
                return None;
            };
            let index = crossref_index_for_output_file(&file, &indexes)?;
            let stats = resolve_crossrefs(&file, &mut output.doc, index);
            Some((file, stats))
        })
        .collect();

    let mut summary = PostRenderSummary {
        indexes: indexes.len(),
        ..Default::default()
    };
    for (file, stats) in resolved {
        summary.stats += stats;
        summary.files.push(file);
    }

    tracing::info!(
        files = summary.files.len(),
        resolved = summary.stats.resolved,
        unresolved = summary.stats.unresolved,
        "Book crossrefs resolved"
    );
    Ok(summary)
}

/// Load, resolve and rewrite rendered files on disk.
///
/// `files` pairs each rendered path with its format name. Only files the
/// pass actually resolved are written back.
pub fn book_crossrefs_post_render_files(
    project: &ProjectContext,
    files: &[(PathBuf, String)],
    resolver: &dyn TargetResolver,
) -> Result<PostRenderSummary> {
    let mut outputs = files
        .iter()
        .filter(|(_, format)| is_multi_file_book_format(format))
        .map(|(path, format)| OutputFile::load(path.as_path(), format.as_str()))
        .collect::<Result<Vec<_>>>()?;

    let summary = book_crossrefs_post_render(project, &mut outputs, resolver)?;

    for output in &outputs {
        let resolved = project
            .output_relative(&output.path)
            .is_some_and(|file| summary.files.contains(&file));
        if resolved {
            output.write()?;
        }
    }
    Ok(summary)
}

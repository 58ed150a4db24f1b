/*
 * targets.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-chapter output targets and crossref artifact locations.
 */

//! Output targets of each chapter.
//!
//! Every chapter render records which file it produced for each format.
//! The merger asks a [`TargetResolver`] for that record and for the place
//! where the chapter's crossref artifact was written.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CrossrefError, Result};

/// Output of one chapter in one format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FormatTarget {
    /// Output file name, relative to the chapter's directory.
    #[serde(default)]
    pub output_file: Option<String>,
}

impl FormatTarget {
    pub fn new(output_file: impl Into<String>) -> Self {
        Self {
            output_file: Some(output_file.into()),
        }
    }
}

/// Formats a chapter was rendered to, keyed by format name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTarget {
    pub formats: BTreeMap<String, FormatTarget>,
}

impl InputTarget {
    pub fn with_format(mut self, format: impl Into<String>, target: FormatTarget) -> Self {
        self.formats.insert(format.into(), target);
        self
    }
}

/// Supplies render results to the index merger.
pub trait TargetResolver: Sync {
    /// Output targets recorded for a project-relative input, or `None` if
    /// the input has not been rendered.
    fn input_target(&self, input: &str) -> Result<Option<InputTarget>>;

    /// Location of the crossref artifact for an output file (normalized,
    /// relative to the project output directory).
    fn crossref_index_path(&self, output_file: &str) -> PathBuf;
}

/// Reads targets and artifacts from the project scratch directory.
///
/// ```text
/// .quarto/idx/<input>.json          input target index
/// .quarto/xref/<output-file>.json   crossref artifact
/// ```
#[derive(Debug, Clone)]
pub struct ScratchDirTargets {
    scratch_dir: PathBuf,
}

#[derive(Deserialize)]
struct RawInputTarget {
    #[serde(default)]
    formats: BTreeMap<String, RawFormat>,
}

#[derive(Deserialize)]
struct RawFormat {
    #[serde(default)]
    pandoc: RawPandoc,
}

#[derive(Default, Deserialize)]
struct RawPandoc {
    #[serde(default, rename = "output-file")]
    output_file: Option<String>,
}

impl ScratchDirTargets {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Location of the input target index for a project-relative input.
    pub fn input_target_path(&self, input: &str) -> PathBuf {
        self.scratch_dir.join("idx").join(format!("{}.json", input))
    }
}

impl TargetResolver for ScratchDirTargets {
    fn input_target(&self, input: &str) -> Result<Option<InputTarget>> {
        let path = self.input_target_path(input);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CrossrefError::io(path, e)),
        };

        let raw: RawInputTarget = serde_json::from_str(&content)
            .map_err(|source| CrossrefError::InvalidTargetIndex { path, source })?;

        let formats = raw
            .formats
            .into_iter()
            .map(|(name, format)| {
                let target = FormatTarget {
                    output_file: format.pandoc.output_file,
                };
                (name, target)
            })
            .collect();
        Ok(Some(InputTarget { formats }))
    }

    fn crossref_index_path(&self, output_file: &str) -> PathBuf {
        self.scratch_dir
            .join("xref")
            .join(format!("{}.json", output_file))
    }
}

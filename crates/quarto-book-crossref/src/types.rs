/*
 * types.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Data model for book cross-reference indexes.
 */

//! Data model shared by the merger, formatter and resolver.
//!
//! Per-chapter index artifacts are produced by each chapter's own render and
//! read back here as [`IndexArtifact`]s. The merger folds them into one
//! [`CrossrefIndex`] per output format.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Option key for the global label style.
pub const LABELS_OPTION: &str = "labels";

/// Option key controlling chapter-number prefixes.
pub const CHAPTERS_OPTION: &str = "chapters";

/// Option key selecting letters instead of numbers for chapters.
pub const CHAPTERS_ALPHA_OPTION: &str = "chapters-alpha";

/// Suffix of per-type label style keys (`fig-labels`, `tbl-labels`, ...).
pub const TYPE_LABELS_SUFFIX: &str = "-labels";

/// Entity type encoded in a reference key.
///
/// `fig:intro` is a `fig`. Any key that does not start with word characters
/// followed by a colon is treated as a figure.
pub fn ref_type(key: &str) -> &str {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    match key.split_once(':') {
        Some((prefix, _)) if !prefix.is_empty() && prefix.chars().all(is_word) => prefix,
        _ => "fig",
    }
}

/// Position of a numbered entity, assigned by its chapter's render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossrefOrder {
    /// 1-based position within the entity's type.
    pub number: u32,

    /// Hierarchical section path. Index 0 is the chapter; zero means the
    /// entity is not part of that level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Vec<u32>>,
}

impl CrossrefOrder {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            section: None,
        }
    }

    pub fn with_section(mut self, section: impl Into<Vec<u32>>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Chapter-level value of the section path, if any.
    pub fn chapter(&self) -> Option<u32> {
        self.section.as_ref().and_then(|s| s.first().copied())
    }
}

/// A merged index entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossrefEntry {
    /// `type:identifier`
    pub key: String,

    /// Key of the parent entity for subreferences.
    pub parent: Option<String>,

    /// Output file (project output relative) that defines the entity.
    pub file: String,

    pub order: CrossrefOrder,
}

/// An entry as it appears in a per-chapter artifact, before the merger
/// knows which output file owns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactEntry {
    pub key: String,

    #[serde(default)]
    pub parent: Option<String>,

    pub order: CrossrefOrder,
}

impl ArtifactEntry {
    pub fn into_entry(self, file: &str) -> CrossrefEntry {
        CrossrefEntry {
            key: self.key,
            parent: self.parent,
            file: file.to_string(),
            order: self.order,
        }
    }
}

/// Per-chapter index artifact written by the chapter render.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IndexArtifact {
    #[serde(default)]
    pub options: Option<CrossrefOptions>,

    #[serde(default)]
    pub entries: Vec<ArtifactEntry>,
}

/// Raw value of a label option.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LabelStyle {
    /// A style keyword such as `arabic`, `roman`, `romani` or `alpha a`.
    Named(String),
    /// Explicit labels, reused cyclically.
    List(Vec<String>),
}

impl LabelStyle {
    pub fn named(style: impl Into<String>) -> Self {
        Self::Named(style.into())
    }

    pub fn list<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(labels.into_iter().map(Into::into).collect())
    }

    /// Interpret the raw value.
    pub fn scheme(&self) -> NumberingScheme<'_> {
        match self {
            LabelStyle::List(labels) => NumberingScheme::List(labels),
            LabelStyle::Named(style) => NumberingScheme::parse(style),
        }
    }
}

/// An interpreted label style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingScheme<'a> {
    List(&'a [String]),
    Alpha { start: char },
    Roman { lowercase: bool },
    Arabic,
}

impl<'a> NumberingScheme<'a> {
    /// Parse a style keyword. Unrecognized keywords mean arabic.
    pub fn parse(style: &'a str) -> Self {
        if let Some(rest) = style.strip_prefix("alpha ") {
            let start = rest.trim_end().chars().last().unwrap_or('a');
            NumberingScheme::Alpha { start }
        } else if style.starts_with("roman") {
            NumberingScheme::Roman {
                lowercase: style.ends_with('i'),
            }
        } else {
            NumberingScheme::Arabic
        }
    }
}

/// Numbering options recorded for one output file.
///
/// Decoding is lenient: keys this engine does not know, and known keys with
/// values of the wrong type, are dropped rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct CrossrefOptions {
    /// Global label style (`labels`).
    pub labels: Option<LabelStyle>,

    /// Per-type label styles, keyed by type (`fig` for `fig-labels`).
    pub type_labels: BTreeMap<String, LabelStyle>,

    /// Chapter-number prefixing; anything but an explicit `false` enables it.
    pub chapters: Option<bool>,

    /// Render chapter indices as letters.
    pub chapters_alpha: Option<bool>,
}

impl CrossrefOptions {
    pub fn with_labels(mut self, style: LabelStyle) -> Self {
        self.labels = Some(style);
        self
    }

    pub fn with_type_labels(mut self, ref_type: &str, style: LabelStyle) -> Self {
        self.type_labels.insert(ref_type.to_string(), style);
        self
    }

    pub fn with_chapters(mut self, enabled: bool) -> Self {
        self.chapters = Some(enabled);
        self
    }

    pub fn with_chapters_alpha(mut self, alpha: bool) -> Self {
        self.chapters_alpha = Some(alpha);
        self
    }

    /// Style for `ref_type`: the per-type option, else the global one.
    pub fn label_style(&self, ref_type: &str) -> Option<&LabelStyle> {
        self.type_labels.get(ref_type).or(self.labels.as_ref())
    }

    pub fn chapters_enabled(&self) -> bool {
        self.chapters != Some(false)
    }

    pub fn chapters_alpha(&self) -> bool {
        self.chapters_alpha.unwrap_or(false)
    }
}

fn label_style_value(key: &str, value: Value) -> Option<LabelStyle> {
    match value {
        Value::String(style) if style.is_empty() => None,
        Value::String(style) => Some(LabelStyle::Named(style)),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(LabelStyle::List),
        other => {
            tracing::debug!(key, value = %other, "Ignoring crossref label option");
            None
        }
    }
}

impl From<Map<String, Value>> for CrossrefOptions {
    fn from(map: Map<String, Value>) -> Self {
        let mut options = CrossrefOptions::default();
        for (key, value) in map {
            match key.as_str() {
                LABELS_OPTION => options.labels = label_style_value(&key, value),
                CHAPTERS_OPTION => options.chapters = value.as_bool(),
                CHAPTERS_ALPHA_OPTION => options.chapters_alpha = value.as_bool(),
                _ => {
                    if let Some(ref_type) = key.strip_suffix(TYPE_LABELS_SUFFIX)
                        && !ref_type.is_empty()
                        && let Some(style) = label_style_value(&key, value)
                    {
                        options.type_labels.insert(ref_type.to_string(), style);
                    }
                }
            }
        }
        options
    }
}

/// Global cross-reference index for one output format.
///
/// Read-only once built; see [`crate::merge::CrossrefIndexBuilder`].
#[derive(Debug, Clone, Default)]
pub struct CrossrefIndex {
    pub(crate) format: String,
    pub(crate) files: HashMap<String, CrossrefOptions>,
    pub(crate) entries: HashMap<String, CrossrefEntry>,
}

impl CrossrefIndex {
    /// Name of the output format this index serves.
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn files(&self) -> &HashMap<String, CrossrefOptions> {
        &self.files
    }

    pub fn entries(&self) -> &HashMap<String, CrossrefEntry> {
        &self.entries
    }

    pub fn entry(&self, key: &str) -> Option<&CrossrefEntry> {
        self.entries.get(key)
    }

    pub fn contains_file(&self, file: &str) -> bool {
        self.files.contains_key(file)
    }

    /// Options registered for an output file.
    pub fn options_for(&self, file: &str) -> Option<&CrossrefOptions> {
        self.files.get(file)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

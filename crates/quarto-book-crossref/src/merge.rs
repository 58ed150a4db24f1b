/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Merges per-chapter crossref artifacts into per-format indexes.
 */

//! Index merger.
//!
//! Each chapter render leaves one artifact per output format. Merging reads
//! them all (in parallel), then folds them in reading order into one
//! [`CrossrefIndex`] per multi-file format. The fold is sequential so the
//! collision policy sees chapters in a fixed order.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hashlink::LinkedHashMap;
use rayon::prelude::*;

use crate::error::{CrossrefError, Result};
use crate::format::is_multi_file_book_format;
use crate::paths::normalize_output_path;
use crate::targets::TargetResolver;
use crate::types::{CrossrefEntry, CrossrefIndex, CrossrefOptions, IndexArtifact};

/// What to do when two entries share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Keep the entry seen first in reading order.
    #[default]
    FirstWins,
    /// Replace the earlier entry.
    LastWins,
}

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub collision: CollisionPolicy,
}

/// Accumulates artifacts for one output format.
#[derive(Debug)]
pub struct CrossrefIndexBuilder {
    format: String,
    files: HashMap<String, CrossrefOptions>,
    entries: HashMap<String, CrossrefEntry>,
    collision: CollisionPolicy,
}

impl CrossrefIndexBuilder {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            files: HashMap::new(),
            entries: HashMap::new(),
            collision: CollisionPolicy::default(),
        }
    }

    pub fn with_collision_policy(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    /// Fold a chapter's artifact in under the output file it belongs to.
    ///
    /// Registering the same output file again replaces its options.
    pub fn add_artifact(&mut self, output_file: &str, artifact: IndexArtifact) {
        self.files
            .insert(output_file.to_string(), artifact.options.unwrap_or_default());
        for entry in artifact.entries {
            self.add_entry(entry.into_entry(output_file));
        }
    }

    /// Insert one entry, applying the collision policy.
    ///
    /// An entry whose file has not been registered gets default options.
    pub fn add_entry(&mut self, entry: CrossrefEntry) {
        self.files.entry(entry.file.clone()).or_default();

        let Some(existing) = self.entries.get(&entry.key) else {
            self.entries.insert(entry.key.clone(), entry);
            return;
        };

        match self.collision {
            CollisionPolicy::FirstWins => {
                tracing::warn!(
                    format = %self.format,
                    key = %entry.key,
                    kept = %existing.file,
                    discarded = %entry.file,
                    "Duplicate crossref key, keeping first definition"
                );
            }
            CollisionPolicy::LastWins => {
                tracing::warn!(
                    format = %self.format,
                    key = %entry.key,
                    kept = %entry.file,
                    discarded = %existing.file,
                    "Duplicate crossref key, keeping last definition"
                );
                self.entries.insert(entry.key.clone(), entry);
            }
        }
    }

    pub fn build(self) -> CrossrefIndex {
        CrossrefIndex {
            format: self.format,
            files: self.files,
            entries: self.entries,
        }
    }
}

/// An artifact read from disk, tagged with where it belongs.
#[derive(Debug)]
struct LoadedArtifact {
    format: String,
    output_file: String,
    artifact: IndexArtifact,
}

/// Read a crossref artifact.
///
/// A missing file is `Ok(None)`. Content that is not valid JSON of the
/// expected shape is [`CrossrefError::InvalidIndex`].
pub fn read_index_artifact(path: &Path) -> Result<Option<IndexArtifact>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CrossrefError::io(path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| CrossrefError::InvalidIndex {
            path: path.to_path_buf(),
            source,
        })
}

/// Output path of a chapter, relative to the project output directory.
fn chapter_output_path(chapter: &str, output_file: &str) -> String {
    let dir = Path::new(chapter).parent().unwrap_or(Path::new(""));
    normalize_output_path(dir.join(output_file))
}

fn load_chapter(chapter: &str, resolver: &dyn TargetResolver) -> Result<Vec<LoadedArtifact>> {
    let Some(target) = resolver.input_target(chapter)? else {
        tracing::debug!(chapter, "No render target recorded, skipping");
        return Ok(Vec::new());
    };

    let mut loaded = Vec::new();
    for (format, format_target) in target.formats {
        if !is_multi_file_book_format(&format) {
            continue;
        }
        let Some(output_file) = format_target.output_file else {
            continue;
        };

        let output_file = chapter_output_path(chapter, &output_file);
        let path: PathBuf = resolver.crossref_index_path(&output_file);
        match read_index_artifact(&path)? {
            Some(artifact) => loaded.push(LoadedArtifact {
                format,
                output_file,
                artifact,
            }),
            None => {
                tracing::debug!(
                    chapter,
                    format = %format,
                    path = %path.display(),
                    "No crossref artifact, chapter contributes nothing"
                );
            }
        }
    }
    Ok(loaded)
}

/// Build one index per multi-file output format from the chapters'
/// artifacts.
///
/// `chapters` are project-relative inputs in reading order. Indexes are
/// returned in order of first appearance of their format.
pub fn merge_crossref_indexes(
    chapters: &[String],
    resolver: &dyn TargetResolver,
    options: &MergeOptions,
) -> Result<Vec<CrossrefIndex>> {
    let loaded = chapters
        .par_iter()
        .map(|chapter| load_chapter(chapter, resolver))
        .collect::<Result<Vec<_>>>()?;

    let mut builders: LinkedHashMap<String, CrossrefIndexBuilder> = LinkedHashMap::new();
    for artifact in loaded.into_iter().flatten() {
        builders
            .entry(artifact.format.clone())
            .or_insert_with(|| {
                CrossrefIndexBuilder::new(artifact.format.clone())
                    .with_collision_policy(options.collision)
            })
            .add_artifact(&artifact.output_file, artifact.artifact);
    }

    let indexes: Vec<CrossrefIndex> = builders
        .into_iter()
        .map(|(_, builder)| builder.build())
        .collect();

    for index in &indexes {
        tracing::info!(
            format = %index.format(),
            files = index.files().len(),
            entries = index.len(),
            "Merged book crossref index"
        );
    }
    Ok(indexes)
}

/// The index that has `file` registered, if any.
pub fn crossref_index_for_output_file<'a>(
    file: &str,
    indexes: &'a [CrossrefIndex],
) -> Option<&'a CrossrefIndex> {
    indexes.iter().find(|index| index.contains_file(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::{FormatTarget, InputTarget};
    use crate::types::{ArtifactEntry, CrossrefOrder, LabelStyle};
    use std::fs;
    use tempfile::TempDir;

    fn artifact_entry(key: &str, number: u32) -> ArtifactEntry {
        ArtifactEntry {
            key: key.to_string(),
            parent: None,
            order: CrossrefOrder::new(number),
        }
    }

    fn artifact(entries: Vec<ArtifactEntry>) -> IndexArtifact {
        IndexArtifact {
            options: None,
            entries,
        }
    }

    /// In-memory targets rooted at a temporary artifact directory.
    struct FixtureTargets {
        dir: TempDir,
        inputs: HashMap<String, InputTarget>,
    }

    impl FixtureTargets {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                inputs: HashMap::new(),
            }
        }

        fn chapter(&mut self, input: &str, formats: &[(&str, &str)]) {
            let mut target = InputTarget::default();
            for (format, output) in formats {
                target = target.with_format(*format, FormatTarget::new(*output));
            }
            self.inputs.insert(input.to_string(), target);
        }

        fn artifact(&self, output_file: &str, json: &str) {
            let path = self.crossref_index_path(output_file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, json).unwrap();
        }
    }

    impl TargetResolver for FixtureTargets {
        fn input_target(&self, input: &str) -> Result<Option<InputTarget>> {
            Ok(self.inputs.get(input).cloned())
        }

        fn crossref_index_path(&self, output_file: &str) -> PathBuf {
            self.dir.path().join(format!("{}.json", output_file))
        }
    }

    fn chapters(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builder_first_wins() {
        let mut builder = CrossrefIndexBuilder::new("html");
        builder.add_artifact("a.html", artifact(vec![artifact_entry("fig:x", 1)]));
        builder.add_artifact("b.html", artifact(vec![artifact_entry("fig:x", 7)]));
        let index = builder.build();

        let entry = index.entry("fig:x").unwrap();
        assert_eq!(entry.file, "a.html");
        assert_eq!(entry.order.number, 1);
        assert!(index.contains_file("b.html"));
    }

    #[test]
    fn test_builder_last_wins() {
        let mut builder =
            CrossrefIndexBuilder::new("html").with_collision_policy(CollisionPolicy::LastWins);
        builder.add_artifact("a.html", artifact(vec![artifact_entry("fig:x", 1)]));
        builder.add_artifact("b.html", artifact(vec![artifact_entry("fig:x", 7)]));
        let index = builder.build();

        assert_eq!(index.entry("fig:x").unwrap().file, "b.html");
    }

    #[test]
    fn test_duplicates_within_one_artifact_follow_policy() {
        let mut builder = CrossrefIndexBuilder::new("html");
        builder.add_artifact(
            "a.html",
            artifact(vec![artifact_entry("tbl:t", 1), artifact_entry("tbl:t", 2)]),
        );
        assert_eq!(builder.build().entry("tbl:t").unwrap().order.number, 1);

        let mut builder =
            CrossrefIndexBuilder::new("html").with_collision_policy(CollisionPolicy::LastWins);
        builder.add_artifact(
            "a.html",
            artifact(vec![artifact_entry("tbl:t", 1), artifact_entry("tbl:t", 2)]),
        );
        assert_eq!(builder.build().entry("tbl:t").unwrap().order.number, 2);
    }

    #[test]
    fn test_reregistering_file_replaces_options() {
        let mut builder = CrossrefIndexBuilder::new("html");
        builder.add_artifact(
            "a.html",
            IndexArtifact {
                options: Some(CrossrefOptions::default().with_labels(LabelStyle::named("roman"))),
                entries: vec![],
            },
        );
        builder.add_artifact("a.html", artifact(vec![]));
        let index = builder.build();
        assert_eq!(index.options_for("a.html"), Some(&CrossrefOptions::default()));
    }

    #[test]
    fn test_merge_tags_entries_with_output_file() {
        let mut targets = FixtureTargets::new();
        targets.chapter("intro.qmd", &[("html", "intro.html"), ("pdf", "book.pdf")]);
        targets.chapter("part1/a.qmd", &[("html", "a.html")]);
        targets.artifact(
            "intro.html",
            r#"{ "entries": [ { "key": "sec:intro", "order": { "number": 1, "section": [1] } } ] }"#,
        );
        targets.artifact(
            "part1/a.html",
            r#"{ "options": { "chapters": true },
                 "entries": [ { "key": "fig:a", "order": { "number": 1, "section": [2] } } ] }"#,
        );
        // Single-file formats are never read.
        targets.artifact("book.pdf", "not json");

        let indexes = merge_crossref_indexes(
            &chapters(&["intro.qmd", "part1/a.qmd"]),
            &targets,
            &MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(indexes.len(), 1);
        let index = &indexes[0];
        assert_eq!(index.format(), "html");
        assert_eq!(index.entry("sec:intro").unwrap().file, "intro.html");
        assert_eq!(index.entry("fig:a").unwrap().file, "part1/a.html");
        assert_eq!(
            index.options_for("part1/a.html").unwrap().chapters,
            Some(true)
        );

        for entry in index.entries().values() {
            assert!(index.contains_file(&entry.file));
        }
    }

    #[test]
    fn test_missing_artifacts_and_targets_contribute_nothing() {
        let mut targets = FixtureTargets::new();
        targets.chapter("a.qmd", &[("html", "a.html")]);

        let indexes = merge_crossref_indexes(
            &chapters(&["a.qmd", "unrendered.qmd"]),
            &targets,
            &MergeOptions::default(),
        )
        .unwrap();
        assert!(indexes.is_empty());
    }

    #[test]
    fn test_unparseable_artifact_is_fatal() {
        let mut targets = FixtureTargets::new();
        targets.chapter("a.qmd", &[("html", "a.html")]);
        targets.artifact("a.html", "{ \"entries\": [ { \"key\": 3 } ] }");

        let err = merge_crossref_indexes(&chapters(&["a.qmd"]), &targets, &MergeOptions::default())
            .unwrap_err();
        assert!(matches!(err, CrossrefError::InvalidIndex { .. }));
    }

    #[test]
    fn test_collision_across_chapters_uses_reading_order() {
        let mut targets = FixtureTargets::new();
        for name in ["a", "b", "c"] {
            let output = format!("{}.html", name);
            targets.chapter(&format!("{}.qmd", name), &[("html", output.as_str())]);
            targets.artifact(
                &output,
                r#"{ "entries": [ { "key": "eq:dup", "order": { "number": 1 } } ] }"#,
            );
        }

        let order = chapters(&["c.qmd", "a.qmd", "b.qmd"]);
        let first = merge_crossref_indexes(&order, &targets, &MergeOptions::default()).unwrap();
        assert_eq!(first[0].entry("eq:dup").unwrap().file, "c.html");

        let last = merge_crossref_indexes(
            &order,
            &targets,
            &MergeOptions {
                collision: CollisionPolicy::LastWins,
            },
        )
        .unwrap();
        assert_eq!(last[0].entry("eq:dup").unwrap().file, "b.html");
    }

    #[test]
    fn test_formats_in_order_of_first_appearance() {
        let mut targets = FixtureTargets::new();
        targets.chapter("a.qmd", &[("html", "a.html")]);
        targets.chapter("b.qmd", &[("gfm", "b.md"), ("html", "b.html")]);
        targets.artifact("a.html", "{}");
        targets.artifact("b.md", "{}");
        targets.artifact("b.html", "{}");

        let indexes = merge_crossref_indexes(
            &chapters(&["a.qmd", "b.qmd"]),
            &targets,
            &MergeOptions::default(),
        )
        .unwrap();
        let formats: Vec<&str> = indexes.iter().map(|i| i.format()).collect();
        assert_eq!(formats, vec!["html", "gfm"]);

        assert_eq!(
            crossref_index_for_output_file("b.md", &indexes).map(|i| i.format()),
            Some("gfm")
        );
        assert!(crossref_index_for_output_file("c.html", &indexes).is_none());
    }
}

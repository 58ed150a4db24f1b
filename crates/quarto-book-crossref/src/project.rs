/*
 * project.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Project context for book cross-reference passes.
 */

//! Project context management.
//!
//! The project context provides:
//! - Project root directory (containing `_quarto.yml`)
//! - Parsed configuration, including the typed book contents
//! - Output directory resolution
//! - The ordered chapter render list

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::contents::{BookConfig, book_render_list};
use crate::error::{CrossrefError, Result};
use crate::paths::normalize_output_path;

/// Output directory of a book project when `output-dir` is not set.
pub const DEFAULT_BOOK_OUTPUT_DIR: &str = "_book";

/// Project type enumeration
///
/// Only books get a crossref pass; every other `project.type` is `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectType {
    /// Any project that is not a book
    #[default]
    Default,
    /// Book project
    Book,
}

impl From<&str> for ProjectType {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("book") {
            ProjectType::Book
        } else {
            ProjectType::Default
        }
    }
}

/// Parsed project configuration from `_quarto.yml`
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    pub project_type: ProjectType,

    /// Output directory (relative to project root)
    pub output_dir: Option<PathBuf>,

    /// Chapters and appendices from the `book` table
    pub book: BookConfig,
}

/// Project context for a cross-reference pass
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Directory containing `_quarto.yml`
    pub dir: PathBuf,

    pub config: ProjectConfig,

    /// Output directory (resolved, absolute path)
    pub output_dir: PathBuf,
}

impl ProjectContext {
    /// Discover the project containing `path`.
    ///
    /// Looks for `_quarto.yml` (or `_quarto.yaml`) in `path` itself, or its
    /// directory when `path` is a file, and then in each parent.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path = path
            .canonicalize()
            .map_err(|_| CrossrefError::ProjectNotFound(path.to_path_buf()))?;

        let search_dir = if path.is_file() {
            path.parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| CrossrefError::ProjectNotFound(path.clone()))?
        } else {
            path.clone()
        };

        let (dir, config) = Self::find_project_config(&search_dir)?
            .ok_or(CrossrefError::ProjectNotFound(path))?;

        Ok(Self::new(dir, config))
    }

    /// Build a context from an already parsed configuration.
    pub fn new(dir: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        let dir = dir.into();
        let output_dir = match (&config.output_dir, config.project_type) {
            (Some(output_dir), _) => dir.join(output_dir),
            (None, ProjectType::Book) => dir.join(DEFAULT_BOOK_OUTPUT_DIR),
            (None, _) => dir.clone(),
        };
        Self {
            dir,
            config,
            output_dir,
        }
    }

    /// Search for `_quarto.yml` in directory and parents
    fn find_project_config(start_dir: &Path) -> Result<Option<(PathBuf, ProjectConfig)>> {
        for dir in start_dir.ancestors() {
            for name in ["_quarto.yml", "_quarto.yaml"] {
                let config_path = dir.join(name);
                if config_path.is_file() {
                    let config = Self::parse_config(&config_path)?;
                    return Ok(Some((dir.to_path_buf(), config)));
                }
            }
        }
        Ok(None)
    }

    /// Parse a `_quarto.yml` file
    pub fn parse_config(path: &Path) -> Result<ProjectConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| CrossrefError::io(path, e))?;
        Self::parse_config_str(&content, path)
    }

    pub(crate) fn parse_config_str(content: &str, path: &Path) -> Result<ProjectConfig> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| CrossrefError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let project = value.get("project").cloned().unwrap_or(Value::Null);

        let project_type = project
            .get("type")
            .and_then(|v| v.as_str())
            .map(ProjectType::from)
            .unwrap_or_default();

        let output_dir = project
            .get("output-dir")
            .and_then(|v| v.as_str())
            .map(PathBuf::from);

        let book = match value.get("book") {
            Some(book) => BookConfig::from_value(book, path)?,
            None => BookConfig::default(),
        };

        Ok(ProjectConfig {
            project_type,
            output_dir,
            book,
        })
    }

    pub fn project_type(&self) -> ProjectType {
        self.config.project_type
    }

    pub fn is_book(&self) -> bool {
        self.project_type() == ProjectType::Book
    }

    /// Project-relative chapter inputs in reading order.
    ///
    /// Empty for projects that are not books.
    pub fn book_render_list(&self) -> Vec<String> {
        if !self.is_book() {
            return Vec::new();
        }
        book_render_list(&self.dir, &self.config.book)
    }

    /// Path of `file` relative to the output directory, in index key form.
    ///
    /// Returns `None` when `file` does not live under the output directory.
    pub fn output_relative(&self, file: &Path) -> Option<String> {
        if let Ok(relative) = file.strip_prefix(&self.output_dir) {
            return Some(normalize_output_path(relative));
        }
        let file = file.canonicalize().ok()?;
        let output_dir = self.output_dir.canonicalize().ok()?;
        file.strip_prefix(&output_dir)
            .ok()
            .map(normalize_output_path)
    }

    /// The project scratch directory.
    pub fn scratch_dir(&self) -> PathBuf {
        self.dir.join(".quarto")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_project_type_from_string() {
        assert_eq!(ProjectType::from("book"), ProjectType::Book);
        assert_eq!(ProjectType::from("Book"), ProjectType::Book);
        assert_eq!(ProjectType::from("website"), ProjectType::Default);
        assert_eq!(ProjectType::from("manuscript"), ProjectType::Default);
        assert_eq!(ProjectType::from("unknown"), ProjectType::Default);
    }

    #[test]
    fn test_book_output_dir_default() {
        let config = ProjectContext::parse_config_str(
            "project:\n  type: book\n",
            Path::new("_quarto.yml"),
        )
        .unwrap();
        let project = ProjectContext::new("/proj", config);
        assert_eq!(project.output_dir, PathBuf::from("/proj/_book"));

        let config = ProjectContext::parse_config_str(
            "project:\n  type: book\n  output-dir: docs\n",
            Path::new("_quarto.yml"),
        )
        .unwrap();
        let project = ProjectContext::new("/proj", config);
        assert_eq!(project.output_dir, PathBuf::from("/proj/docs"));

        let config = ProjectContext::parse_config_str(
            "project:\n  type: website\n",
            Path::new("_quarto.yml"),
        )
        .unwrap();
        let project = ProjectContext::new("/proj", config);
        assert_eq!(project.output_dir, PathBuf::from("/proj"));
    }

    #[test]
    fn test_non_book_project_has_no_render_list() {
        let config = ProjectContext::parse_config_str(
            "project:\n  type: website\nbook:\n  chapters:\n    - index.qmd\n",
            Path::new("_quarto.yml"),
        )
        .unwrap();
        assert_eq!(config.project_type, ProjectType::Default);
        assert_eq!(config.book.chapters.len(), 1);

        let project = ProjectContext::new("/proj", config);
        assert!(!project.is_book());
        assert!(project.book_render_list().is_empty());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = ProjectContext::parse_config_str("project: [", Path::new("_quarto.yml"))
            .unwrap_err();
        assert!(matches!(err, CrossrefError::Config { .. }));
    }

    #[test]
    fn test_discover_from_nested_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("_quarto.yml"),
            "project:\n  type: book\nbook:\n  chapters:\n    - index.qmd\n    - part1/a.qmd\n",
        )
        .unwrap();
        fs::create_dir(temp.path().join("part1")).unwrap();
        fs::write(temp.path().join("index.qmd"), "").unwrap();
        fs::write(temp.path().join("part1/a.qmd"), "").unwrap();

        let project = ProjectContext::discover(temp.path().join("part1/a.qmd")).unwrap();
        assert!(project.is_book());
        assert_eq!(project.dir, temp.path().canonicalize().unwrap());
        assert_eq!(project.book_render_list(), vec!["index.qmd", "part1/a.qmd"]);
    }

    #[test]
    fn test_discover_without_config() {
        let temp = TempDir::new().unwrap();
        // Guard against a stray _quarto.yml in an ancestor of the temp dir.
        if temp.path().ancestors().any(|d| d.join("_quarto.yml").exists()) {
            return;
        }
        let err = ProjectContext::discover(temp.path()).unwrap_err();
        assert!(matches!(err, CrossrefError::ProjectNotFound(_)));
    }

    #[test]
    fn test_output_relative() {
        let config = ProjectContext::parse_config_str(
            "project:\n  type: book\n",
            Path::new("_quarto.yml"),
        )
        .unwrap();
        let project = ProjectContext::new("/proj", config);
        assert_eq!(
            project.output_relative(Path::new("/proj/_book/part1/a.html")),
            Some("part1/a.html".to_string())
        );
    }
}

//! Cross-reference numbering and resolution for multi-file Quarto books
//!
//! Each chapter of a book is rendered on its own. A chapter can number its
//! own figures, tables and sections, but references to entities in other
//! chapters are left as placeholders. This crate runs after all chapters
//! are rendered: it merges the per-chapter numbering data into one index per
//! output format and rewrites every placeholder into a numbered,
//! correctly linked reference.
//!
//! # Architecture
//!
//! - [`merge_crossref_indexes`] - folds per-chapter artifacts into
//!   [`CrossrefIndex`]es, one per multi-file format
//! - [`resolve_crossrefs`] - rewrites the placeholders of one document
//! - [`format_crossref`] - turns an entity's order into its display label
//! - [`relative_path`] - portable links between output files
//! - [`book_crossrefs_post_render`] - the whole pass over a book's outputs
//!
//! # Example
//!
//! ```no_run
//! use quarto_book_crossref::{ProjectContext, ScratchDirTargets, book_crossrefs_post_render_files};
//!
//! let project = ProjectContext::discover("my-book")?;
//! let targets = ScratchDirTargets::new(project.scratch_dir());
//! let outputs = vec![(project.output_dir.join("intro.html"), "html".to_string())];
//! let summary = book_crossrefs_post_render_files(&project, &outputs, &targets)?;
//! println!("resolved {} references", summary.stats.resolved);
//! # Ok::<(), quarto_book_crossref::CrossrefError>(())
//! ```

pub mod contents;
pub mod error;
pub mod format;
pub mod merge;
pub mod numbering;
pub mod paths;
pub mod post_render;
pub mod project;
pub mod resolve;
pub mod targets;
pub mod types;

pub use contents::{BookConfig, ContentsItem, book_render_list};
pub use error::{CrossrefError, Result};
pub use format::{FormatIdentifier, is_multi_file_book_format};
pub use merge::{
    CollisionPolicy, CrossrefIndexBuilder, MergeOptions, crossref_index_for_output_file,
    merge_crossref_indexes,
};
pub use numbering::{format_crossref, number_option};
pub use paths::{path_with_forward_slashes, relative_path};
pub use post_render::{
    OutputFile, PostRenderSummary, book_crossrefs_post_render, book_crossrefs_post_render_files,
    book_crossrefs_post_render_with,
};
pub use project::{ProjectConfig, ProjectContext, ProjectType};
pub use resolve::{ResolveStats, UNRESOLVED_REF_CLASS, resolve_crossrefs};
pub use targets::{FormatTarget, InputTarget, ScratchDirTargets, TargetResolver};
pub use types::{
    ArtifactEntry, CrossrefEntry, CrossrefIndex, CrossrefOptions, CrossrefOrder, IndexArtifact,
    LabelStyle, NumberingScheme, ref_type,
};

/*
 * format.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Output format identification for book cross-references.
 */

//! Output format identification.
//!
//! Cross-reference merging only applies to formats whose book output is
//! split into one file per chapter. Single-file formats (PDF, Word, EPUB)
//! resolve their references inside the one document they produce.

/// Known output writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatIdentifier {
    Html,
    Pdf,
    Docx,
    Epub,
    Typst,
    Revealjs,
    /// GitHub-flavored Markdown
    Gfm,
    CommonMark,
    Markdown,
    /// Any writer this crate does not know about
    Other,
}

impl FormatIdentifier {
    /// Get the format name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatIdentifier::Html => "html",
            FormatIdentifier::Pdf => "pdf",
            FormatIdentifier::Docx => "docx",
            FormatIdentifier::Epub => "epub",
            FormatIdentifier::Typst => "typst",
            FormatIdentifier::Revealjs => "revealjs",
            FormatIdentifier::Gfm => "gfm",
            FormatIdentifier::CommonMark => "commonmark",
            FormatIdentifier::Markdown => "markdown",
            FormatIdentifier::Other => "other",
        }
    }

    /// Identify the default writer behind a format name.
    ///
    /// Pandoc extension modifiers are stripped (`gfm+tex_math_dollars` is
    /// `gfm`) and extension-provided formats are identified by their base
    /// writer (`acm-html` is `html`).
    pub fn from_format_name(name: &str) -> Self {
        let base = name
            .split(['+', '-'])
            .next()
            .unwrap_or(name)
            .to_lowercase();
        match Self::try_from(base.as_str()) {
            Ok(identifier) => identifier,
            Err(_) => name
                .split('+')
                .next()
                .and_then(|n| n.rsplit('-').next())
                .and_then(|writer| Self::try_from(writer).ok())
                .unwrap_or(FormatIdentifier::Other),
        }
    }

    /// Whether a book in this format is rendered to one file per chapter.
    pub fn is_multi_file_book_format(&self) -> bool {
        matches!(
            self,
            FormatIdentifier::Html
                | FormatIdentifier::Gfm
                | FormatIdentifier::CommonMark
                | FormatIdentifier::Markdown
        )
    }
}

impl std::fmt::Display for FormatIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for FormatIdentifier {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "html" => Ok(FormatIdentifier::Html),
            "pdf" => Ok(FormatIdentifier::Pdf),
            "docx" => Ok(FormatIdentifier::Docx),
            "epub" => Ok(FormatIdentifier::Epub),
            "typst" => Ok(FormatIdentifier::Typst),
            "revealjs" => Ok(FormatIdentifier::Revealjs),
            "gfm" => Ok(FormatIdentifier::Gfm),
            "commonmark" => Ok(FormatIdentifier::CommonMark),
            "markdown" | "md" => Ok(FormatIdentifier::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Whether output in the named format takes part in book crossref merging.
pub fn is_multi_file_book_format(format_name: &str) -> bool {
    FormatIdentifier::from_format_name(format_name).is_multi_file_book_format()
}

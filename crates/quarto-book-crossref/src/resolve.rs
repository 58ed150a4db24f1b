/*
 * resolve.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rewrites unresolved reference placeholders in a rendered document.
 */

//! Reference resolver.
//!
//! A chapter render cannot number references to entities in other
//! chapters, so it emits a placeholder instead:
//!
//! ```html
//! <a href="#fig:plot"><span class="quarto-unresolved-ref">fig:plot</span></a>
//! ```
//!
//! Once the book's index is merged, each placeholder is replaced with the
//! formatted label, and its link is pointed at the file that defines the
//! entity. Keys the index does not know become a visible `?key` marker.

use quarto_html_dom::{Attribute, HtmlDom, NodeId};

use crate::numbering::format_crossref;
use crate::paths::relative_path;
use crate::types::{CrossrefIndex, CrossrefOptions, ref_type};

/// Class marking a reference the chapter render could not resolve.
pub const UNRESOLVED_REF_CLASS: &str = "quarto-unresolved-ref";

/// Outcome counts for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Placeholders replaced with a label.
    pub resolved: usize,
    /// Placeholders whose key is not in the index.
    pub unresolved: usize,
}

impl ResolveStats {
    pub fn total(&self) -> usize {
        self.resolved + self.unresolved
    }
}

impl std::ops::AddAssign for ResolveStats {
    fn add_assign(&mut self, other: Self) {
        self.resolved += other.resolved;
        self.unresolved += other.unresolved;
    }
}

/// The `<a>` wrapping `placeholder` when it links to the key itself.
fn self_link(dom: &HtmlDom, placeholder: NodeId, key: &str) -> Option<NodeId> {
    let parent = dom.parent(placeholder)?;
    let is_self_link = dom.tag_name(parent) == Some("a")
        && dom
            .attr(parent, "href")
            .and_then(|href| href.strip_prefix('#'))
            == Some(key);
    is_self_link.then_some(parent)
}

/// Resolve every placeholder in `dom`, a rendered copy of `file`.
///
/// `file` is the document's path relative to the project output
/// directory. Never fails; see [`ResolveStats`] for what happened.
pub fn resolve_crossrefs(file: &str, dom: &mut HtmlDom, index: &CrossrefIndex) -> ResolveStats {
    // Collect first: resolving detaches links and would disturb a live walk.
    let placeholders = dom.elements_with_class(UNRESOLVED_REF_CLASS);

    let default_options = CrossrefOptions::default();
    let mut stats = ResolveStats::default();

    for placeholder in placeholders {
        let key = dom.text_content(placeholder);
        let type_name = ref_type(&key);
        let link = self_link(dom, placeholder, &key);

        let Some(entry) = index.entry(&key) else {
            stats.unresolved += 1;
            if let Some(link) = link
                && dom.parent(link).is_some()
            {
                let marker = dom.create_html_element(
                    "span",
                    vec![Attribute::new("class", UNRESOLVED_REF_CLASS)],
                );
                dom.append_text(marker, &format!("?{}", key));
                dom.insert_before(link, marker);
                dom.detach(link);
            }
            continue;
        };

        let parent = match &entry.parent {
            Some(parent_key) => {
                let parent = index.entry(parent_key);
                if parent.is_none() {
                    tracing::warn!(
                        file,
                        key = %key,
                        parent = %parent_key,
                        "Subreference parent missing from crossref index"
                    );
                }
                parent
            }
            None => None,
        };

        let options = index.options_for(&entry.file).unwrap_or(&default_options);
        let label = format_crossref(type_name, options, entry, parent);
        dom.set_text_content(placeholder, label);
        dom.remove_attr(placeholder, "class");

        if let Some(link) = link
            && entry.file != file
        {
            let href = format!("{}#{}", relative_path(file, &entry.file), key);
            dom.set_attr(link, "href", href);
        }
        stats.resolved += 1;
    }

    tracing::debug!(
        file,
        resolved = stats.resolved,
        unresolved = stats.unresolved,
        "Resolved book crossrefs"
    );
    stats
}

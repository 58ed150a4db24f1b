//! Arena-backed HTML documents for Quarto post-render passes.
//!
//! Post-render passes (such as book cross-reference resolution) need to find
//! marker elements in already-rendered HTML, rewrite their content and
//! attributes, and write the result back out. This crate provides:
//!
//! - [`HtmlDom`]: an arena-allocated tree with query and mutation helpers
//! - [`parse_document`]: standards-compliant parsing via html5ever
//! - [`HtmlDom::to_html`] / [`HtmlDom::write_html`]: HTML5 serialization
//!
//! # Example
//!
//! ```rust
//! use quarto_html_dom::parse_document;
//!
//! let mut dom = parse_document(r#"<p><span class="quarto-unresolved-ref">fig:a</span></p>"#);
//! let refs = dom.elements_with_class("quarto-unresolved-ref");
//! assert_eq!(refs.len(), 1);
//! assert_eq!(dom.text_content(refs[0]), "fig:a");
//!
//! dom.set_text_content(refs[0], "1");
//! dom.remove_attr(refs[0], "class");
//! assert!(dom.to_html().unwrap().contains("<p><span>1</span></p>"));
//! ```

pub mod arena;
pub mod error;
pub mod serialize;
pub mod tree_sink;

pub use arena::{Attribute, Children, Descendants, HtmlDom, Node, NodeData, NodeId};
pub use error::{Error, Result};
pub use tree_sink::HtmlSink;

use html5ever::driver::ParseOpts;
use html5ever::tendril::TendrilSink;

/// Parse a complete HTML document.
///
/// Fragments are accepted too; the parser supplies the implied `html`,
/// `head` and `body` elements.
pub fn parse_document(html: &str) -> HtmlDom {
    html5ever::parse_document(HtmlSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
}

//! HTML5 serialization of an [`HtmlDom`] through html5ever's serializer.

use std::io::{self, Write};

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope};

use crate::arena::{HtmlDom, NodeData, NodeId};
use crate::error::Result;

/// A node borrowed together with its document, for handing to html5ever.
struct SerializableNode<'a> {
    dom: &'a HtmlDom,
    id: NodeId,
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match traversal_scope {
            TraversalScope::IncludeNode => write_node(self.dom, self.id, serializer),
            TraversalScope::ChildrenOnly(_) => write_children(self.dom, self.id, serializer),
        }
    }
}

fn write_children<S: Serializer>(dom: &HtmlDom, id: NodeId, serializer: &mut S) -> io::Result<()> {
    for child in dom.children(id) {
        write_node(dom, child, serializer)?;
    }
    Ok(())
}

fn write_node<S: Serializer>(dom: &HtmlDom, id: NodeId, serializer: &mut S) -> io::Result<()> {
    let Some(node) = dom.get(id) else {
        return Ok(());
    };
    match &node.data {
        NodeData::Document => write_children(dom, id, serializer),
        NodeData::Doctype { name, .. } => serializer.write_doctype(name),
        NodeData::Element { name, attrs } => {
            serializer.start_elem(
                name.clone(),
                attrs.iter().map(|a| (&a.name, a.value.as_str())),
            )?;
            write_children(dom, id, serializer)?;
            serializer.end_elem(name.clone())
        }
        NodeData::Text(text) => serializer.write_text(text),
        NodeData::Comment(text) => serializer.write_comment(text),
        NodeData::ProcessingInstruction { target, data } => {
            serializer.write_processing_instruction(target, data)
        }
    }
}

fn write_scoped<W: Write>(dom: &HtmlDom, id: NodeId, scope: TraversalScope, writer: W) -> Result<()> {
    let opts = SerializeOpts {
        traversal_scope: scope,
        ..Default::default()
    };
    html5ever::serialize::serialize(writer, &SerializableNode { dom, id }, opts)?;
    Ok(())
}

impl HtmlDom {
    /// Write the whole document as HTML5.
    pub fn write_html<W: Write>(&self, writer: W) -> Result<()> {
        write_scoped(
            self,
            self.document(),
            TraversalScope::ChildrenOnly(None),
            writer,
        )
    }

    /// Serialize the whole document to a string.
    pub fn to_html(&self) -> Result<String> {
        let mut out = Vec::new();
        self.write_html(&mut out)?;
        Ok(String::from_utf8(out)?)
    }

    /// Serialize a single node, including its own tags.
    pub fn outer_html(&self, id: NodeId) -> Result<String> {
        let mut out = Vec::new();
        write_scoped(self, id, TraversalScope::IncludeNode, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, id: NodeId) -> Result<String> {
        let mut out = Vec::new();
        write_scoped(self, id, TraversalScope::ChildrenOnly(None), &mut out)?;
        Ok(String::from_utf8(out)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_document;

    #[test]
    fn test_document_round_trip_keeps_doctype_and_structure() {
        let dom = parse_document(
            "<!DOCTYPE html><html><head><title>T</title></head><body><p class=\"x\">Hi &amp; bye</p></body></html>",
        );
        let html = dom.to_html().unwrap();
        assert_eq!(
            html,
            "<!DOCTYPE html><html><head><title>T</title></head><body><p class=\"x\">Hi &amp; bye</p></body></html>"
        );
    }

    #[test]
    fn test_void_elements_have_no_end_tag() {
        let dom = parse_document("<p>a<br>b<img src=\"x.png\"></p>");
        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(
            dom.outer_html(p).unwrap(),
            "<p>a<br>b<img src=\"x.png\"></p>"
        );
    }

    #[test]
    fn test_inner_html() {
        let dom = parse_document("<div id=\"d\"><em>one</em> two</div>");
        let div = dom.element_by_id("d").unwrap();
        assert_eq!(dom.inner_html(div).unwrap(), "<em>one</em> two");
    }
}

//! Arena-allocated HTML document tree.
//!
//! Nodes live in a single vector and refer to each other by [`NodeId`].
//! Detached nodes stay in the arena; they are simply unreachable from the
//! document root, so ids handed out earlier never dangle.

use html5ever::{LocalName, QualName, ns};

/// Identifier of a node inside an [`HtmlDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// `<!DOCTYPE ...>` declaration.
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    /// Element with its qualified name and attributes in source order.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

/// An element attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Create an attribute in the null namespace, as HTML attributes are.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.into(),
        }
    }
}

/// A node and its tree links.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// A parsed HTML document.
#[derive(Debug, Clone)]
pub struct HtmlDom {
    nodes: Vec<Node>,
    document: NodeId,
}

impl Default for HtmlDom {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlDom {
    /// Create an empty document containing only the root node.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId(0),
        };
        dom.document = dom.alloc(NodeData::Document);
        dom
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    fn slot(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// The document root.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Look up a node. Returns `None` for ids minted by another document.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // ---------------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------------

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.alloc(NodeData::Element { name, attrs })
    }

    /// Create an element in the HTML namespace.
    pub fn create_html_element(&mut self, tag: &str, attrs: Vec<Attribute>) -> NodeId {
        let name = QualName::new(None, ns!(html), LocalName::from(tag));
        self.create_element(name, attrs)
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    pub fn create_doctype(
        &mut self,
        name: impl Into<String>,
        public_id: impl Into<String>,
        system_id: impl Into<String>,
    ) -> NodeId {
        self.alloc(NodeData::Doctype {
            name: name.into(),
            public_id: public_id.into(),
            system_id: system_id.into(),
        })
    }

    pub fn create_processing_instruction(
        &mut self,
        target: impl Into<String>,
        data: impl Into<String>,
    ) -> NodeId {
        self.alloc(NodeData::ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        })
    }

    // ---------------------------------------------------------------------
    // Tree mutation
    // ---------------------------------------------------------------------

    /// Unlink a node from its parent and siblings. Its own children stay
    /// attached to it.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = self.slot(id);
            (node.parent, node.prev_sibling, node.next_sibling)
        };

        match prev {
            Some(prev) => self.slot_mut(prev).next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.slot_mut(parent).first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.slot_mut(next).prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.slot_mut(parent).last_child = prev;
                }
            }
        }

        let node = self.slot_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.slot(parent).last_child;
        {
            let node = self.slot_mut(child);
            node.parent = Some(parent);
            node.prev_sibling = last;
        }
        match last {
            Some(last) => self.slot_mut(last).next_sibling = Some(child),
            None => self.slot_mut(parent).first_child = Some(child),
        }
        self.slot_mut(parent).last_child = Some(child);
    }

    /// Append text to `parent`, merging with a trailing text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(last) = self.slot(parent).last_child
            && let NodeData::Text(existing) = &mut self.slot_mut(last).data
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text);
        self.append(parent, node);
    }

    /// Insert `new_node` immediately before `sibling`. Does nothing when
    /// `sibling` has no parent.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let Some(parent) = self.slot(sibling).parent else {
            return;
        };
        self.detach(new_node);
        let prev = self.slot(sibling).prev_sibling;
        {
            let node = self.slot_mut(new_node);
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = Some(sibling);
        }
        self.slot_mut(sibling).prev_sibling = Some(new_node);
        match prev {
            Some(prev) => self.slot_mut(prev).next_sibling = Some(new_node),
            None => self.slot_mut(parent).first_child = Some(new_node),
        }
    }

    /// Insert text before `sibling`, merging with a preceding text node.
    pub fn insert_text_before(&mut self, sibling: NodeId, text: &str) {
        if let Some(prev) = self.slot(sibling).prev_sibling
            && let NodeData::Text(existing) = &mut self.slot_mut(prev).data
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text);
        self.insert_before(sibling, node);
    }

    /// Move every child of `from` to the end of `to`.
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        let children: Vec<_> = self.children(from).collect();
        for child in children {
            self.append(to, child);
        }
    }

    /// Replace all children of `id` with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: impl Into<String>) {
        let children: Vec<_> = self.children(id).collect();
        for child in children {
            self.detach(child);
        }
        let node = self.create_text(text);
        self.append(id, node);
    }

    // ---------------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            dom: self,
            next: self.slot(id).first_child,
        }
    }

    /// All nodes below `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        Descendants { dom: self, stack }
    }

    /// Elements carrying `class`, in document order.
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants(self.document)
            .filter(|&id| self.has_class(id, class))
            .collect()
    }

    /// First element whose `id` attribute equals `value`.
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(self.document)
            .find(|&id| self.attr(id, "id") == Some(value))
    }

    /// First element with the given tag name.
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.document)
            .find(|&id| self.tag_name(id) == Some(tag))
    }

    // ---------------------------------------------------------------------
    // Element and text accessors
    // ---------------------------------------------------------------------

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.slot(id).data, NodeData::Element { .. })
    }

    /// Local name of an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.slot(id).data {
            NodeData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        }
    }

    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        match &self.slot(id).data {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name.local.as_ref() == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing an existing value. No-op on non-elements.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let NodeData::Element { attrs, .. } = &mut self.slot_mut(id).data {
            let value = value.into();
            match attrs.iter_mut().find(|a| a.name.local.as_ref() == name) {
                Some(existing) => existing.value = value,
                None => attrs.push(Attribute::new(name, value)),
            }
        }
    }

    /// Append an attribute without checking for an existing one.
    pub fn push_attr(&mut self, id: NodeId, attr: Attribute) {
        if let NodeData::Element { attrs, .. } = &mut self.slot_mut(id).data {
            attrs.push(attr);
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        if let NodeData::Element { attrs, .. } = &mut self.slot_mut(id).data {
            let pos = attrs.iter().position(|a| a.name.local.as_ref() == name)?;
            return Some(attrs.remove(pos).value);
        }
        None
    }

    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.attr(id, "class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    /// Concatenated text of `id` and all its descendants, like the DOM's
    /// `textContent`.
    pub fn text_content(&self, id: NodeId) -> String {
        if let NodeData::Text(text) = &self.slot(id).data {
            return text.clone();
        }
        self.descendants(id)
            .filter_map(|d| match &self.slot(d).data {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Iterator over the direct children of a node.
pub struct Children<'a> {
    dom: &'a HtmlDom,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.dom.slot(id).next_sibling;
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    dom: &'a HtmlDom,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(self.dom.children(id));
        self.stack[start..].reverse();
        Some(id)
    }
}

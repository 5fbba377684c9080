//! A small arena-backed document tree.
//!
//! Nodes are addressed by [`NodeId`] and never freed; detaching a node only
//! unlinks it from its parent. The operations mirror the subset of the DOM
//! the emoji walk needs: text splitting, insertion, attribute access and
//! serialization.

mod parse;
mod serialize;

use thiserror::Error;

pub use parse::is_void_element;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    // Vec keeps insertion order for serialization.
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} does not belong to this document")]
    UnknownNode(NodeId),
    #[error("node {0:?} is not a text node")]
    NotText(NodeId),
    #[error("node {0:?} cannot have children")]
    NotContainer(NodeId),
    #[error("offset {offset} is outside the text of node {node:?}")]
    BadOffset { node: NodeId, offset: usize },
    #[error("node {child:?} is not a child of {parent:?}")]
    NotChild { parent: NodeId, child: NodeId },
    #[error("inserting {0:?} would create a cycle")]
    Cycle(NodeId),
    #[error("no element with id `{0}`")]
    MissingRoot(String),
}

pub type Result<T, E = DomError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document with a `<body>` root.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![],
            body: NodeId(0),
        };
        doc.body = doc.create_element("body");
        doc
    }

    /// A document whose body holds the parsed `html` fragment.
    pub fn parse_fragment(html: &str) -> Self {
        let mut doc = Self::new();
        let body = doc.body;
        parse::parse_into(&mut doc, body, html);
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: vec![],
            data,
        });
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: vec![],
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).map(|n| &n.data)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Child nodes that are elements, like `Element.children`.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.element(c).is_some())
            .collect()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id)? {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.text(id).is_some()
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) -> Result<()> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(text) => {
                *text = value.into();
                Ok(())
            }
            _ => Err(DomError::NotText(id)),
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set or overwrite an attribute. Attribute names are lowercased.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        let value = value.into();
        let NodeData::Element(el) = &mut self.node_mut(id)?.data else {
            return Err(DomError::NotContainer(id));
        };
        let name = name.to_ascii_lowercase();
        match el.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => el.attributes.push((name, value)),
        }
        Ok(())
    }

    pub fn class_name(&self, id: NodeId) -> &str {
        self.attr(id, "class").unwrap_or("")
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_name(id).split_ascii_whitespace().any(|c| c == class)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(p) => node = p,
                None => return false,
            }
        }
    }

    /// Unlink `child` from its parent, if any.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. The child is detached from its old parent first.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        if !matches!(self.node(parent)?.data, NodeData::Element(_)) {
            return Err(DomError::NotContainer(parent));
        }
        self.node(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomError::Cycle(child));
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotChild {
                    parent,
                    child: reference,
                });
            }
        }

        self.detach(child)?;

        let children = &mut self.node_mut(parent)?.children;
        let index = reference
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());
        children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Put `replacement` where `old` is and detach `old`.
    pub fn replace_child(&mut self, old: NodeId, replacement: NodeId) -> Result<()> {
        let Some(parent) = self.parent(old) else {
            return Err(DomError::UnknownNode(old));
        };
        self.insert_before(parent, replacement, Some(old))?;
        self.detach(old)
    }

    /// Split a text node at byte `offset`, like `Text.splitText`. The node
    /// keeps `..offset`; a new sibling inserted right after it receives
    /// `offset..` and is returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId> {
        let tail = {
            let NodeData::Text(text) = &mut self.node_mut(id)?.data else {
                return Err(DomError::NotText(id));
            };
            if offset > text.len() || !text.is_char_boundary(offset) {
                return Err(DomError::BadOffset { node: id, offset });
            }
            text.split_off(offset)
        };

        let new = self.create_text(tail);
        if let Some(parent) = self.parent(id) {
            let next = self.next_sibling(id);
            self.insert_before(parent, new, next)?;
        }
        Ok(new)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id)?;
        siblings.get(index + 1).copied()
    }

    /// All nodes below `root` in document order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = vec![];
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// First element below the body (or the body itself) whose `id` matches.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.body)
            .chain(self.descendants(self.body))
            .find(|&n| self.attr(n, "id") == Some(id))
    }

    /// Elements below `root` carrying `class`, in document order.
    pub fn elements_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&n| self.has_class(n, class))
            .collect()
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Replace the children of `id` with the parsed `html` fragment.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<()> {
        if self.element(id).is_none() {
            return Err(DomError::NotContainer(id));
        }
        for child in self.children(id).to_vec() {
            self.detach(child)?;
        }
        parse::parse_into(self, id, html);
        Ok(())
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            serialize::write_node(self, child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize::write_node(self, id, &mut out);
        out
    }
}

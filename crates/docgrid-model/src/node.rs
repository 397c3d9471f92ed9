use std::fmt;
use std::sync::Arc;

use crate::attrs::{AttrValue, Attrs};
use crate::error::{ModelError, Result};
use crate::fragment::Fragment;
use crate::mark::Mark;
use crate::resolved::ResolvedPos;
use crate::schema::NodeType;

struct NodeData {
    node_type: NodeType,
    attrs: Attrs,
    content: Fragment,
    text: Option<String>,
    marks: Vec<Mark>,
    size: usize,
}

/// An immutable document node.
///
/// Cloning is a reference-count bump. Edits build new nodes that share
/// every untouched subtree with the old ones, so [`Node::ptr_eq`] tells
/// whether a subtree survived an edit unchanged.
///
/// ## Position model
///
/// ```text
/// doc
///  0 <table> 1 <row> 2 <cell> 3 <paragraph> 4 "1" 5 </paragraph> 6 </cell> 7 ...
/// ```
///
/// A text node occupies one position per character, a leaf node one
/// position, and any other node its content size plus two (its opening and
/// closing boundaries).
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeData>,
}

impl Node {
    pub(crate) fn new_element(
        node_type: NodeType,
        attrs: Attrs,
        content: Fragment,
        marks: Vec<Mark>,
    ) -> Self {
        let size = if node_type.is_leaf() {
            1
        } else {
            content.size() + 2
        };
        Self {
            inner: Arc::new(NodeData {
                node_type,
                attrs,
                content,
                text: None,
                marks,
                size,
            }),
        }
    }

    pub(crate) fn new_text(node_type: NodeType, text: String, marks: Vec<Mark>) -> Self {
        let size = text.chars().count();
        Self {
            inner: Arc::new(NodeData {
                node_type,
                attrs: Attrs::new(),
                content: Fragment::empty(),
                text: Some(text),
                marks,
                size,
            }),
        }
    }

    /// Identity comparison: true when both handles point at the same node.
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn node_type(&self) -> &NodeType {
        &self.inner.node_type
    }

    pub fn type_name(&self) -> &str {
        self.inner.node_type.name()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.inner.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.inner.attrs.get(name)
    }

    pub fn content(&self) -> &Fragment {
        &self.inner.content
    }

    pub fn marks(&self) -> &[Mark] {
        &self.inner.marks
    }

    pub fn text(&self) -> Option<&str> {
        self.inner.text.as_deref()
    }

    pub fn is_text(&self) -> bool {
        self.inner.text.is_some()
    }

    pub fn is_leaf(&self) -> bool {
        self.is_text() || self.inner.node_type.is_leaf()
    }

    pub fn is_inline(&self) -> bool {
        self.inner.node_type.is_inline()
    }

    pub fn is_textblock(&self) -> bool {
        self.inner.node_type.is_textblock()
    }

    pub fn inline_content(&self) -> bool {
        self.inner.node_type.inline_content()
    }

    /// Number of positions this node occupies in its parent.
    pub fn node_size(&self) -> usize {
        self.inner.size
    }

    pub fn child_count(&self) -> usize {
        self.inner.content.child_count()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.inner.content.child(index)
    }

    pub fn children(&self) -> std::slice::Iter<'_, Node> {
        self.inner.content.iter()
    }

    /// Concatenated text of every text node below this one.
    pub fn text_content(&self) -> String {
        match &self.inner.text {
            Some(text) => text.clone(),
            None => self.inner.content.text_content(),
        }
    }

    /// Same type, attributes and marks with different content.
    pub fn copy(&self, content: Fragment) -> Node {
        Node::new_element(
            self.inner.node_type.clone(),
            self.inner.attrs.clone(),
            content,
            self.inner.marks.clone(),
        )
    }

    /// Same content under a different type, attributes or marks.
    pub(crate) fn with_markup(&self, node_type: NodeType, attrs: Attrs, marks: Vec<Mark>) -> Node {
        Node::new_element(node_type, attrs, self.inner.content.clone(), marks)
    }

    /// The part of this node between two offsets into its content (or, for
    /// text, into its characters).
    pub fn cut(&self, from: usize, to: usize) -> Node {
        match &self.inner.text {
            Some(text) => {
                let sliced: String = text.chars().skip(from).take(to.saturating_sub(from)).collect();
                Node::new_text(self.inner.node_type.clone(), sliced, self.inner.marks.clone())
            }
            None => self.copy(self.inner.content.cut(from, to)),
        }
    }

    /// Merge two text nodes with identical marks.
    pub(crate) fn join_text(&self, other: &Node) -> Option<Node> {
        match (&self.inner.text, &other.inner.text) {
            (Some(left), Some(right)) if self.inner.marks == other.inner.marks => Some(Node::new_text(
                self.inner.node_type.clone(),
                format!("{left}{right}"),
                self.inner.marks.clone(),
            )),
            _ => None,
        }
    }

    /// Resolve a position inside this node's content.
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos> {
        let size = self.inner.content.size();
        if pos > size {
            return Err(ModelError::PositionOutOfRange { pos, size });
        }
        Ok(ResolvedPos::resolve_in(self, pos))
    }

    /// Node starting exactly at `pos` (or the text node around it).
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut node = self;
        let mut pos = pos;
        loop {
            let (index, offset) = node.content().find_index(pos);
            let child = node.child(index)?;
            if offset == pos || child.is_text() {
                return Some(child);
            }
            pos -= offset + 1;
            node = child;
        }
    }

    /// Visit every descendant in document order with the position before it.
    /// Returning `false` from `f` skips that node's children.
    pub fn descendants<F>(&self, f: &mut F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        self.walk(0, f);
    }

    fn walk<F>(&self, start: usize, f: &mut F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        let mut pos = start;
        for child in self.inner.content.iter() {
            if f(child, pos) && !child.content().is_empty() {
                child.walk(pos + 1, f);
            }
            pos += child.node_size();
        }
    }

    /// Whether children `from..to` may be replaced by one node of `node_type`.
    pub fn can_replace_with(&self, from: usize, to: usize, node_type: &NodeType) -> bool {
        self.inner
            .node_type
            .can_replace_with(&self.inner.content, from, to, node_type)
    }

    /// Verify the content of this node and all its descendants.
    pub fn check(&self) -> Result<()> {
        if !self.is_text() && !self.inner.node_type.valid_content(&self.inner.content) {
            return Err(ModelError::InvalidContent {
                node_type: self.type_name().to_string(),
            });
        }
        self.children().try_for_each(Node::check)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Node::ptr_eq(self, other)
            || (self.inner.node_type.name() == other.inner.node_type.name()
                && self.inner.attrs == other.inner.attrs
                && self.inner.marks == other.inner.marks
                && self.inner.text == other.inner.text
                && self.inner.content == other.inner.content)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = match &self.inner.text {
            Some(text) => format!("{text:?}"),
            None if self.inner.content.is_empty() => self.type_name().to_string(),
            None => format!("{}({})", self.type_name(), self.inner.content),
        };
        for mark in self.inner.marks.iter().rev() {
            rendered = format!("{mark}({rendered})");
        }
        f.write_str(&rendered)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

use std::fmt;

use crate::node::Node;

#[derive(Clone)]
struct PathEntry {
    node: Node,
    /// Index of the child the position points into (or before).
    index: usize,
    /// Absolute position of the start of that child.
    offset: usize,
}

/// A position together with the chain of ancestors around it.
///
/// Depth 0 is the document itself; [`ResolvedPos::depth`] is the innermost
/// node the position sits directly inside.
#[derive(Clone)]
pub struct ResolvedPos {
    pos: usize,
    path: Vec<PathEntry>,
    parent_offset: usize,
}

impl ResolvedPos {
    /// Walk down from `doc` to `pos`. Callers check that `pos` is in range.
    pub(crate) fn resolve_in(doc: &Node, pos: usize) -> Self {
        let mut path = Vec::new();
        let mut start = 0;
        let mut parent_offset = pos;
        let mut node = doc.clone();
        loop {
            let (index, offset) = node.content().find_index(parent_offset);
            let rem = parent_offset - offset;
            path.push(PathEntry {
                node: node.clone(),
                index,
                offset: start + offset,
            });
            if rem == 0 {
                break;
            }
            let Some(child) = node.child(index).cloned() else {
                break;
            };
            if child.is_text() {
                break;
            }
            parent_offset = rem - 1;
            start += offset + 1;
            node = child;
        }
        Self {
            pos,
            path,
            parent_offset,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    /// Offset of the position inside its parent's content.
    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    fn entry(&self, depth: usize) -> &PathEntry {
        &self.path[depth.min(self.depth())]
    }

    /// Ancestor at `depth`; depths past the innermost clamp to the parent.
    pub fn node(&self, depth: usize) -> &Node {
        &self.entry(depth).node
    }

    pub fn parent(&self) -> &Node {
        self.node(self.depth())
    }

    pub fn doc(&self) -> &Node {
        self.node(0)
    }

    pub fn index(&self, depth: usize) -> usize {
        self.entry(depth).index
    }

    /// Index of the child after the position at `depth`.
    pub fn index_after(&self, depth: usize) -> usize {
        let depth = depth.min(self.depth());
        let inside_child = depth < self.depth() || self.text_offset() > 0;
        self.index(depth) + usize::from(inside_child)
    }

    /// Position at the start of the content of the ancestor at `depth`.
    pub fn start(&self, depth: usize) -> usize {
        if depth == 0 {
            0
        } else {
            self.entry(depth - 1).offset + 1
        }
    }

    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content().size()
    }

    /// Position before the ancestor at `depth`. The document has none.
    pub fn before(&self, depth: usize) -> Option<usize> {
        if depth == 0 || depth > self.depth() {
            return None;
        }
        Some(self.entry(depth - 1).offset)
    }

    /// Position after the ancestor at `depth`. The document has none.
    pub fn after(&self, depth: usize) -> Option<usize> {
        self.before(depth)
            .map(|before| before + self.node(depth).node_size())
    }

    /// Distance into a text node when the position falls inside one.
    pub fn text_offset(&self) -> usize {
        self.pos - self.entry(self.depth()).offset
    }

    /// Node directly after the position (the rest of a text node when inside
    /// one).
    pub fn node_after(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let child = parent.child(index)?;
        let text_offset = self.text_offset();
        if text_offset > 0 {
            Some(child.cut(text_offset, child.node_size()))
        } else {
            Some(child.clone())
        }
    }

    /// Node directly before the position (the start of a text node when
    /// inside one).
    pub fn node_before(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let text_offset = self.text_offset();
        if text_offset > 0 {
            return parent.child(index).map(|child| child.cut(0, text_offset));
        }
        index.checked_sub(1).and_then(|before| parent.child(before)).cloned()
    }

    /// Whether both positions sit directly inside the same node.
    pub fn same_parent(&self, other: &ResolvedPos) -> bool {
        self.depth() == other.depth()
            && self.start(self.depth()) == other.start(other.depth())
            && Node::ptr_eq(self.parent(), other.parent())
    }

    /// Deepest depth at which both positions share an ancestor.
    pub fn shared_depth(&self, pos: usize) -> usize {
        (1..=self.depth())
            .rev()
            .find(|&depth| self.start(depth) <= pos && self.end(depth) >= pos)
            .unwrap_or(0)
    }
}

impl fmt::Debug for ResolvedPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .path
            .iter()
            .skip(1)
            .map(|entry| format!("{}_{}", entry.node.type_name(), entry.index))
            .collect();
        write!(f, "{}:{}", names.join("/"), self.parent_offset)
    }
}

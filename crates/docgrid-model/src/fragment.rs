use std::fmt;

use crate::node::Node;

/// An ordered run of sibling nodes with its total size cached.
///
/// Adjacent text nodes carrying the same marks are always joined and empty
/// text is dropped, so two fragments with the same content compare equal.
#[derive(Clone, Default, PartialEq)]
pub struct Fragment {
    nodes: Vec<Node>,
    size: usize,
}

impl Fragment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut joined: Vec<Node> = Vec::new();
        let mut size = 0;
        for node in nodes {
            if node.is_text() && node.node_size() == 0 {
                continue;
            }
            size += node.node_size();
            if let Some(last) = joined.last_mut()
                && let Some(merged) = last.join_text(&node)
            {
                *last = merged;
                continue;
            }
            joined.push(node);
        }
        Self {
            nodes: joined,
            size,
        }
    }

    /// Size in positions of all children together.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn text_content(&self) -> String {
        self.nodes.iter().map(Node::text_content).collect()
    }

    /// Concatenate two fragments, joining text across the seam.
    pub fn append(&self, other: &Fragment) -> Fragment {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        Fragment::from_nodes(self.nodes.iter().chain(other.nodes.iter()).cloned())
    }

    /// The part of this fragment between two offsets. Text nodes are split;
    /// element nodes crossing a boundary are cut down to their inner part.
    pub fn cut(&self, from: usize, to: usize) -> Fragment {
        let to = to.min(self.size);
        if from == 0 && to == self.size {
            return self.clone();
        }
        let mut result = Vec::new();
        if to > from {
            let mut pos = 0;
            for child in &self.nodes {
                let end = pos + child.node_size();
                if end > from {
                    let piece = if child.is_text() {
                        child.cut(from.saturating_sub(pos), (to - pos).min(child.node_size()))
                    } else if pos >= from && end <= to {
                        child.clone()
                    } else {
                        child.cut(
                            from.saturating_sub(pos + 1),
                            to.saturating_sub(pos + 1).min(child.content().size()),
                        )
                    };
                    result.push(piece);
                }
                pos = end;
                if pos >= to {
                    break;
                }
            }
        }
        Fragment::from_nodes(result)
    }

    /// A copy with the child at `index` swapped for `node`.
    pub fn replace_child(&self, index: usize, node: Node) -> Fragment {
        let mut nodes = self.nodes.clone();
        match nodes.get_mut(index) {
            Some(slot) => *slot = node,
            None => nodes.push(node),
        }
        Fragment::from_nodes(nodes)
    }

    /// Child index containing `pos` together with the child's start offset.
    ///
    /// A position on a boundary between two children resolves to the later
    /// one; the end of the fragment resolves to `(child_count, size)`.
    pub fn find_index(&self, pos: usize) -> (usize, usize) {
        if pos == 0 {
            return (0, 0);
        }
        if pos >= self.size {
            return (self.nodes.len(), self.size);
        }
        let mut offset = 0;
        for (index, child) in self.nodes.iter().enumerate() {
            let end = offset + child.node_size();
            if end >= pos {
                if end == pos {
                    return (index + 1, end);
                }
                return (index, offset);
            }
            offset = end;
        }
        (self.nodes.len(), self.size)
    }
}

impl From<Node> for Fragment {
    fn from(node: Node) -> Self {
        Fragment::from_nodes([node])
    }
}

impl From<Vec<Node>> for Fragment {
    fn from(nodes: Vec<Node>) -> Self {
        Fragment::from_nodes(nodes)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, node) in self.nodes.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{self}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Schema;
    use pretty_assertions::assert_eq;

    fn paragraph(schema: &Schema, text: &str) -> Node {
        let content = if text.is_empty() {
            Fragment::empty()
        } else {
            Fragment::from(schema.text(text, vec![]).unwrap())
        };
        schema
            .node("paragraph", Default::default(), content, vec![])
            .unwrap()
    }

    #[test]
    fn adjacent_text_is_joined() {
        let schema = Schema::basic();
        let fragment = Fragment::from_nodes([
            schema.text("ab", vec![]).unwrap(),
            schema.text("cd", vec![]).unwrap(),
        ]);
        assert_eq!(fragment.child_count(), 1);
        assert_eq!(fragment.size(), 4);
        assert_eq!(fragment.to_string(), "\"abcd\"");
    }

    #[test]
    fn differently_marked_text_stays_apart() {
        let schema = Schema::basic();
        let strong = schema.mark("strong", Default::default()).unwrap();
        let fragment = Fragment::from_nodes([
            schema.text("ab", vec![strong]).unwrap(),
            schema.text("cd", vec![]).unwrap(),
        ]);
        assert_eq!(fragment.child_count(), 2);
        assert_eq!(fragment.to_string(), "strong(\"ab\"), \"cd\"");
    }

    #[test]
    fn cut_splits_text_and_elements() {
        let schema = Schema::basic();
        let fragment = Fragment::from_nodes([paragraph(&schema, "hello"), paragraph(&schema, "world")]);
        // positions: <p>0 h1 e2 l3 l4 o5 </p>6 <p>7 w8 ...
        let cut = fragment.cut(3, 9);
        assert_eq!(cut.to_string(), "paragraph(\"llo\"), paragraph(\"w\")");
        assert_eq!(fragment.cut(0, 7).to_string(), "paragraph(\"hello\")");
        assert!(fragment.cut(4, 4).is_empty());
    }

    #[test]
    fn find_index_prefers_the_later_child_on_boundaries() {
        let schema = Schema::basic();
        let fragment = Fragment::from_nodes([paragraph(&schema, "ab"), paragraph(&schema, "")]);
        assert_eq!(fragment.find_index(0), (0, 0));
        assert_eq!(fragment.find_index(2), (0, 0));
        assert_eq!(fragment.find_index(4), (1, 4));
        assert_eq!(fragment.find_index(6), (2, 6));
    }

    #[test]
    fn replace_child_keeps_siblings_shared() {
        let schema = Schema::basic();
        let first = paragraph(&schema, "a");
        let fragment = Fragment::from_nodes([first.clone(), paragraph(&schema, "b")]);
        let replaced = fragment.replace_child(1, paragraph(&schema, "c"));
        assert!(Node::ptr_eq(replaced.child(0).unwrap(), &first));
        assert_eq!(replaced.text_content(), "ac");
    }
}

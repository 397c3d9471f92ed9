use std::fmt;
use std::sync::Arc;

use crate::attrs::Attrs;
use crate::error::{ModelError, Result};
use crate::fragment::Fragment;
use crate::mark::Mark;
use crate::node::Node;
use crate::resolved::ResolvedPos;
use crate::schema::NodeType;
use crate::selection::Selection;

use super::step_map::{Mapping, StepMap};

struct TransactionState {
    before: Node,
    doc: Node,
    selection: Selection,
    mapping: Mapping,
    selection_set: bool,
}

/// An immutable edit in progress.
///
/// Every edit returns a new transaction and leaves the receiver untouched.
/// Cloning shares the same state, so [`Transaction::ptr_eq`] tells whether
/// two handles are the very same transaction.
#[derive(Clone)]
pub struct Transaction {
    inner: Arc<TransactionState>,
}

/// Rebuild the ancestors of `pos` from `depth - 1` up to the document, with
/// `node` standing in for the child at `pos.index(depth - 1)`.
fn replace_in_ancestors(pos: &ResolvedPos, depth: usize, node: Node) -> Node {
    (0..depth).rev().fold(node, |child, d| {
        let parent = pos.node(d);
        parent.copy(parent.content().replace_child(pos.index(d), child))
    })
}

impl Transaction {
    /// Start a transaction. The selection must have been resolved against
    /// `doc`.
    pub fn new(doc: Node, selection: Selection) -> Result<Self> {
        if !Node::ptr_eq(selection.doc(), &doc) {
            return Err(ModelError::ForeignSelection);
        }
        Ok(Self {
            inner: Arc::new(TransactionState {
                before: doc.clone(),
                doc,
                selection,
                mapping: Mapping::new(),
                selection_set: false,
            }),
        })
    }

    pub fn doc(&self) -> &Node {
        &self.inner.doc
    }

    /// Document the transaction started from.
    pub fn before(&self) -> &Node {
        &self.inner.before
    }

    pub fn selection(&self) -> &Selection {
        &self.inner.selection
    }

    pub fn mapping(&self) -> &Mapping {
        &self.inner.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !Node::ptr_eq(&self.inner.before, &self.inner.doc)
    }

    /// Whether the selection was set explicitly rather than mapped.
    pub fn selection_set(&self) -> bool {
        self.inner.selection_set
    }

    pub fn ptr_eq(a: &Transaction, b: &Transaction) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    fn with_step(&self, doc: Node, step: StepMap) -> Self {
        let selection = self.inner.selection.map(&doc, &step);
        let mut mapping = self.inner.mapping.clone();
        mapping.push(step);
        Self {
            inner: Arc::new(TransactionState {
                before: self.inner.before.clone(),
                doc,
                selection,
                mapping,
                selection_set: self.inner.selection_set,
            }),
        }
    }

    /// Replace `from..to` with `content`.
    ///
    /// Both ends must sit directly inside the same node, and that node must
    /// accept the resulting children.
    pub fn replace(&self, from: usize, to: usize, content: Fragment) -> Result<Self> {
        if from > to {
            return Err(ModelError::InvalidRange { from, to });
        }
        let doc = self.doc();
        let start = doc.resolve(from)?;
        let end = doc.resolve(to)?;
        if !start.same_parent(&end) {
            return Err(ModelError::RangeCrossesNodes { from, to });
        }

        let depth = start.depth();
        let parent = start.parent();
        let offset = start.start(depth);
        let children = parent.content();
        let replaced = children
            .cut(0, from - offset)
            .append(&content)
            .append(&children.cut(to - offset, children.size()));
        if !parent.node_type().valid_content(&replaced) {
            log::debug!(
                "{} rejects replacing {from}..{to} with {content}",
                parent.type_name()
            );
            return Err(ModelError::InvalidContent {
                node_type: parent.type_name().to_string(),
            });
        }

        let new_doc = replace_in_ancestors(&start, depth, parent.copy(replaced));
        log::trace!("replace {from}..{to} with {} positions", content.size());
        Ok(self.with_step(new_doc, StepMap::new(from, to - from, content.size())))
    }

    pub fn delete(&self, from: usize, to: usize) -> Result<Self> {
        self.replace(from, to, Fragment::empty())
    }

    pub fn insert(&self, pos: usize, content: impl Into<Fragment>) -> Result<Self> {
        self.replace(pos, pos, content.into())
    }

    pub fn replace_with(&self, from: usize, to: usize, content: impl Into<Fragment>) -> Result<Self> {
        self.replace(from, to, content.into())
    }

    /// Change the type, attributes or marks of the node at `pos`, keeping its
    /// content. `None` keeps the current type or marks; attributes given as
    /// `None` reset to the type's defaults.
    pub fn set_node_markup(
        &self,
        pos: usize,
        node_type: Option<&NodeType>,
        attrs: Option<Attrs>,
        marks: Option<Vec<Mark>>,
    ) -> Result<Self> {
        let resolved = self.doc().resolve(pos)?;
        let node = resolved
            .node_after()
            .filter(|node| resolved.text_offset() == 0 && !node.is_text())
            .ok_or(ModelError::NoNodeAt { pos })?;

        let node_type = node_type.unwrap_or(node.node_type()).clone();
        let attrs = node_type.compute_attrs(&attrs.unwrap_or_default());
        let marks = marks.unwrap_or_else(|| node.marks().to_vec());

        let depth = resolved.depth();
        let index = resolved.index(depth);
        if !node_type.valid_content(node.content())
            || !resolved.parent().can_replace_with(index, index + 1, &node_type)
        {
            log::debug!("cannot turn {} at {pos} into {}", node.type_name(), node_type.name());
            return Err(ModelError::InvalidContent {
                node_type: node_type.name().to_string(),
            });
        }

        let updated = node.with_markup(node_type, attrs, marks);
        let new_doc = replace_in_ancestors(&resolved, depth + 1, updated);
        log::trace!("set markup of node at {pos}");
        Ok(self.with_step(new_doc, StepMap::identity()))
    }

    /// Replace the selection. It must be resolved against the current
    /// document.
    pub fn set_selection(&self, selection: Selection) -> Result<Self> {
        if !Node::ptr_eq(selection.doc(), self.doc()) {
            return Err(ModelError::ForeignSelection);
        }
        Ok(Self {
            inner: Arc::new(TransactionState {
                before: self.inner.before.clone(),
                doc: self.inner.doc.clone(),
                selection,
                mapping: self.inner.mapping.clone(),
                selection_set: true,
            }),
        })
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("doc", &self.inner.doc)
            .field("selection", &format_args!("{}", self.inner.selection))
            .field("steps", &self.inner.mapping.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{create_editor, doc, p, row, table, td, td_cursor};
    use pretty_assertions::assert_eq;

    fn two_cells() -> Transaction {
        create_editor(doc([table([row([td_cursor(), td([p("2")])])])])).unwrap()
    }

    #[test]
    fn replace_shares_untouched_subtrees() {
        let tr = two_cells();
        let second_cell = tr.doc().node_at(6).unwrap().clone();
        let edited = tr
            .insert(4, tr.doc().node_type().schema().text("x", vec![]).unwrap())
            .unwrap();
        assert!(edited.doc_changed());
        assert!(!tr.doc_changed());
        assert!(Node::ptr_eq(edited.doc().node_at(7).unwrap(), &second_cell));
        assert_eq!(edited.selection().head(), 5);
        insta::assert_snapshot!(
            edited.doc().to_string(),
            @r#"doc(table(table_row(table_cell(paragraph("x")), table_cell(paragraph("2")))))"#
        );
    }

    #[test]
    fn replace_rejects_invalid_content() {
        let tr = two_cells();
        // removing the only paragraph of a cell leaves it empty
        let err = tr.delete(3, 5).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidContent {
                node_type: "table_cell".into()
            }
        );
    }

    #[test]
    fn replace_requires_a_shared_parent() {
        let tr = two_cells();
        assert_eq!(
            tr.delete(4, 8).unwrap_err(),
            ModelError::RangeCrossesNodes { from: 4, to: 8 }
        );
        assert_eq!(tr.delete(5, 4).unwrap_err(), ModelError::InvalidRange { from: 5, to: 4 });
        assert!(matches!(
            tr.delete(0, 400).unwrap_err(),
            ModelError::PositionOutOfRange { .. }
        ));
    }

    #[test]
    fn set_node_markup_keeps_content() {
        let tr = two_cells();
        let header = tr.doc().node_type().schema().node_type("table_header").unwrap();
        let edited = tr
            .set_node_markup(2, Some(&header), Some(crate::attrs([("colspan", 1)])), None)
            .unwrap();
        insta::assert_snapshot!(
            edited.doc().to_string(),
            @r#"doc(table(table_row(table_header(paragraph), table_cell(paragraph("2")))))"#
        );
        assert_eq!(edited.selection().head(), 4);
        assert_eq!(edited.mapping().len(), 1);
    }

    #[test]
    fn set_node_markup_checks_the_parent() {
        let tr = two_cells();
        let paragraph = tr.doc().node_type().schema().node_type("paragraph").unwrap();
        assert!(tr.set_node_markup(2, Some(&paragraph), None, None).is_err());
    }

    #[test]
    fn set_selection_rejects_foreign_documents() {
        let tr = two_cells();
        let other = doc([p("x")]).node;
        let foreign = Selection::cursor(&other, 1).unwrap();
        assert_eq!(tr.set_selection(foreign).unwrap_err(), ModelError::ForeignSelection);

        let selected = tr.set_selection(Selection::node(tr.doc(), 2).unwrap()).unwrap();
        assert!(selected.selection_set());
        assert!(Node::ptr_eq(selected.doc(), tr.doc()));
    }
}

//! Selections: where the user's cursor or range sits in a document.
//!
//! A selection keeps its positions resolved against the document it was
//! made for, so callers can walk its ancestors without passing the document
//! around. [`crate::Transaction`] refuses selections resolved against a
//! different document.

use std::fmt;

use crate::error::{ModelError, Result};
use crate::node::Node;
use crate::resolved::ResolvedPos;
use crate::schema::TableRole;
use crate::transform::{Assoc, StepMap};

/// A text range, or a cursor when anchor and head coincide.
#[derive(Debug, Clone)]
pub struct TextSelection {
    anchor: ResolvedPos,
    head: ResolvedPos,
}

/// One selected node, addressed by the position before it.
#[derive(Debug, Clone)]
pub struct NodeSelection {
    from: ResolvedPos,
    node: Node,
}

/// A rectangle of table cells spanned by two corner cells.
///
/// Both positions point directly before a cell, inside its row.
#[derive(Debug, Clone)]
pub struct CellSelection {
    anchor_cell: ResolvedPos,
    head_cell: ResolvedPos,
}

impl CellSelection {
    pub fn anchor_cell(&self) -> &ResolvedPos {
        &self.anchor_cell
    }

    pub fn head_cell(&self) -> &ResolvedPos {
        &self.head_cell
    }
}

impl NodeSelection {
    pub fn node(&self) -> &Node {
        &self.node
    }
}

#[derive(Debug, Clone)]
pub enum Selection {
    Text(TextSelection),
    Node(NodeSelection),
    Cell(CellSelection),
}

fn points_at_cell(pos: &ResolvedPos) -> bool {
    pos.parent().node_type().table_role() == Some(TableRole::Row)
        && pos
            .node_after()
            .and_then(|node| node.node_type().table_role())
            .is_some_and(TableRole::is_cell)
}

fn in_same_table(a: &ResolvedPos, b: &ResolvedPos) -> bool {
    a.depth() == b.depth() && a.depth() > 0 && a.start(a.depth() - 1) == b.start(b.depth() - 1)
}

impl Selection {
    /// An empty text selection at `pos`.
    pub fn cursor(doc: &Node, pos: usize) -> Result<Self> {
        let resolved = doc.resolve(pos)?;
        Ok(Selection::Text(TextSelection {
            anchor: resolved.clone(),
            head: resolved,
        }))
    }

    pub fn text(doc: &Node, anchor: usize, head: usize) -> Result<Self> {
        Ok(Selection::Text(TextSelection {
            anchor: doc.resolve(anchor)?,
            head: doc.resolve(head)?,
        }))
    }

    /// Select the node that starts at `pos`.
    pub fn node(doc: &Node, pos: usize) -> Result<Self> {
        let from = doc.resolve(pos)?;
        let node = from
            .node_after()
            .filter(|node| from.text_offset() == 0 && !node.is_text())
            .ok_or(ModelError::NoNodeAt { pos })?;
        Ok(Selection::Node(NodeSelection { from, node }))
    }

    /// Select the cells between two cell positions of the same table.
    pub fn cell(doc: &Node, anchor_cell: usize, head_cell: usize) -> Result<Self> {
        let anchor = doc.resolve(anchor_cell)?;
        let head = doc.resolve(head_cell)?;
        if !points_at_cell(&anchor) {
            return Err(ModelError::NotACell { pos: anchor_cell });
        }
        if !points_at_cell(&head) {
            return Err(ModelError::NotACell { pos: head_cell });
        }
        if !in_same_table(&anchor, &head) {
            return Err(ModelError::CellsInDifferentTables {
                anchor: anchor_cell,
                head: head_cell,
            });
        }
        Ok(Selection::Cell(CellSelection {
            anchor_cell: anchor,
            head_cell: head,
        }))
    }

    /// A cursor at the first place in the document that can hold one.
    pub fn at_start(doc: &Node) -> Self {
        Self::near(doc, 0)
    }

    /// A cursor at `pos` when it sits in inline content, otherwise at the
    /// nearest textblock: the first one starting at or after `pos`, or
    /// failing that the last one ending before it.
    pub fn near(doc: &Node, pos: usize) -> Self {
        let pos = pos.min(doc.content().size());
        let resolved = ResolvedPos::resolve_in(doc, pos);
        if resolved.parent().inline_content() {
            return Self::collapsed(resolved);
        }

        let mut after = None;
        let mut before = None;
        doc.descendants(&mut |node, node_pos| {
            if after.is_some() {
                return false;
            }
            if node.is_textblock() {
                let start = node_pos + 1;
                let end = node_pos + node.node_size() - 1;
                if start >= pos {
                    after = Some(start);
                } else if end <= pos {
                    before = Some(end);
                }
                return false;
            }
            true
        });

        let target = after.or(before).unwrap_or(pos);
        Self::collapsed(ResolvedPos::resolve_in(doc, target))
    }

    fn collapsed(pos: ResolvedPos) -> Self {
        Selection::Text(TextSelection {
            anchor: pos.clone(),
            head: pos,
        })
    }

    pub fn resolved_anchor(&self) -> &ResolvedPos {
        match self {
            Selection::Text(text) => &text.anchor,
            Selection::Node(node) => &node.from,
            Selection::Cell(cell) => &cell.anchor_cell,
        }
    }

    pub fn resolved_head(&self) -> &ResolvedPos {
        match self {
            Selection::Text(text) => &text.head,
            Selection::Node(node) => &node.from,
            Selection::Cell(cell) => &cell.head_cell,
        }
    }

    /// The lower end of the selection, resolved.
    pub fn resolved_from(&self) -> &ResolvedPos {
        let (anchor, head) = (self.resolved_anchor(), self.resolved_head());
        if head.pos() < anchor.pos() { head } else { anchor }
    }

    pub fn doc(&self) -> &Node {
        self.resolved_anchor().doc()
    }

    pub fn anchor(&self) -> usize {
        match self {
            Selection::Node(node) => node.from.pos(),
            _ => self.resolved_anchor().pos(),
        }
    }

    pub fn head(&self) -> usize {
        match self {
            Selection::Node(node) => node.from.pos() + node.node.node_size(),
            _ => self.resolved_head().pos(),
        }
    }

    pub fn from(&self) -> usize {
        self.resolved_from().pos()
    }

    /// The upper end of the selection. For cell selections this is the end
    /// of the later corner cell.
    pub fn to(&self) -> usize {
        match self {
            Selection::Text(text) => text.anchor.pos().max(text.head.pos()),
            Selection::Node(node) => node.from.pos() + node.node.node_size(),
            Selection::Cell(cell) => {
                let last = if cell.head_cell.pos() < cell.anchor_cell.pos() {
                    &cell.anchor_cell
                } else {
                    &cell.head_cell
                };
                last.pos() + last.node_after().map_or(0, |node| node.node_size())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Text(text) => text.anchor.pos() == text.head.pos(),
            _ => false,
        }
    }

    pub fn is_node_selection(&self) -> bool {
        matches!(self, Selection::Node(_))
    }

    pub fn is_cell_selection(&self) -> bool {
        matches!(self, Selection::Cell(_))
    }

    /// Carry the selection over a step into `doc`, the document after it.
    pub fn map(&self, doc: &Node, step: &StepMap) -> Selection {
        let size = doc.content().size();
        let map = |pos: usize| step.map(pos, Assoc::Right).min(size);

        match self {
            Selection::Text(text) => {
                let head = ResolvedPos::resolve_in(doc, map(text.head.pos()));
                if !head.parent().inline_content() {
                    return Selection::near(doc, head.pos());
                }
                let anchor = ResolvedPos::resolve_in(doc, map(text.anchor.pos()));
                let anchor = if anchor.parent().inline_content() {
                    anchor
                } else {
                    head.clone()
                };
                Selection::Text(TextSelection { anchor, head })
            }
            Selection::Node(selected) => {
                let from = selected.from.pos();
                let mapped = map(from);
                if step.touches(from, from + selected.node.node_size()) {
                    return Selection::near(doc, mapped);
                }
                Selection::node(doc, mapped).unwrap_or_else(|_| Selection::near(doc, mapped))
            }
            Selection::Cell(cell) => {
                let anchor = map(cell.anchor_cell.pos());
                let head = map(cell.head_cell.pos());
                Selection::cell(doc, anchor, head).unwrap_or_else(|_| Selection::near(doc, head))
            }
        }
    }
}

impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Selection::Text(a), Selection::Text(b)) => {
                a.anchor.pos() == b.anchor.pos() && a.head.pos() == b.head.pos()
            }
            (Selection::Node(a), Selection::Node(b)) => a.from.pos() == b.from.pos() && a.node == b.node,
            (Selection::Cell(a), Selection::Cell(b)) => {
                a.anchor_cell.pos() == b.anchor_cell.pos() && a.head_cell.pos() == b.head_cell.pos()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Text(_) if self.is_empty() => write!(f, "cursor({})", self.head()),
            Selection::Text(_) => write!(f, "text({}, {})", self.anchor(), self.head()),
            Selection::Node(node) => write!(f, "node({}, {})", node.from.pos(), node.node.type_name()),
            Selection::Cell(_) => write!(f, "cells({}, {})", self.anchor(), self.head()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{doc, hr, p, row, table, td};
    use pretty_assertions::assert_eq;

    // 0 table 1 row 2 cell(2..7) 7 cell(7..12) 12 /row 13 row 14 cell(14..19) 19 cell(19..24) 24 ...
    fn grid() -> Node {
        doc([table([
            row([td([p("1")]), td([p("2")])]),
            row([td([p("3")]), td([p("4")])]),
        ])])
        .node
    }

    #[test]
    fn cell_selection_requires_cells_of_one_table() {
        let doc = grid();
        let selection = Selection::cell(&doc, 2, 19).unwrap();
        assert_eq!(selection.anchor(), 2);
        assert_eq!(selection.head(), 19);
        assert_eq!(selection.to(), 24);
        assert!(selection.is_cell_selection());

        assert_eq!(
            Selection::cell(&doc, 3, 19).unwrap_err(),
            ModelError::NotACell { pos: 3 }
        );
    }

    #[test]
    fn node_selection_spans_the_node() {
        let doc = grid();
        let selection = Selection::node(&doc, 2).unwrap();
        assert_eq!((selection.from(), selection.to()), (2, 7));
        assert_eq!(Selection::node(&doc, 4).unwrap_err(), ModelError::NoNodeAt { pos: 4 });
    }

    #[test]
    fn near_moves_into_the_closest_textblock() {
        let doc = grid();
        assert_eq!(Selection::near(&doc, 2).to_string(), "cursor(4)");
        assert_eq!(Selection::near(&doc, 26).to_string(), "cursor(22)");
        assert_eq!(Selection::at_start(&doc).to_string(), "cursor(4)");

        let only_rule = crate::builder::doc([hr()]).node;
        assert_eq!(Selection::at_start(&only_rule).to_string(), "cursor(0)");
    }

    #[test]
    fn text_selection_maps_through_an_insertion() {
        let doc = grid();
        let selection = Selection::cursor(&doc, 9).unwrap();
        let step = StepMap::new(4, 0, 2);
        let grown = crate::builder::doc([table([
            row([td([p("1xx")]), td([p("2")])]),
            row([td([p("3")]), td([p("4")])]),
        ])])
        .node;
        assert_eq!(selection.map(&grown, &step).to_string(), "cursor(11)");
    }

    #[test]
    fn cell_selection_survives_content_edits() {
        let doc = grid();
        let selection = Selection::cell(&doc, 2, 19).unwrap();
        // first cell's paragraph text removed: 4..5 deleted
        let step = StepMap::new(4, 1, 0);
        let shrunk = crate::builder::doc([table([
            row([td([p("")]), td([p("2")])]),
            row([td([p("3")]), td([p("4")])]),
        ])])
        .node;
        assert_eq!(selection.map(&shrunk, &step).to_string(), "cells(2, 18)");
    }
}

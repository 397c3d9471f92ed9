//! Ancestor and selected-node lookups shared by the table queries and the
//! structural transforms.

use docgrid_model::{CellSelection, Node, NodeType, ResolvedPos, Selection};

use crate::table::TableMap;

/// A node located in the document.
#[derive(Debug, Clone)]
pub struct FoundNode {
    pub node: Node,
    /// Position directly before the node.
    pub pos: usize,
    /// Position of the start of the node's content.
    pub start: usize,
    pub depth: usize,
}

/// One node type or a set of them.
#[derive(Debug, Clone)]
pub struct TypeSet(Vec<NodeType>);

impl TypeSet {
    pub fn contains(&self, node_type: &NodeType) -> bool {
        self.0.iter().any(|candidate| candidate == node_type)
    }
}

impl From<NodeType> for TypeSet {
    fn from(node_type: NodeType) -> Self {
        TypeSet(vec![node_type])
    }
}

impl From<&NodeType> for TypeSet {
    fn from(node_type: &NodeType) -> Self {
        TypeSet(vec![node_type.clone()])
    }
}

impl From<Vec<NodeType>> for TypeSet {
    fn from(node_types: Vec<NodeType>) -> Self {
        TypeSet(node_types)
    }
}

impl From<&[NodeType]> for TypeSet {
    fn from(node_types: &[NodeType]) -> Self {
        TypeSet(node_types.to_vec())
    }
}

impl<const N: usize> From<[NodeType; N]> for TypeSet {
    fn from(node_types: [NodeType; N]) -> Self {
        TypeSet(node_types.to_vec())
    }
}

/// Start of the content of the first cell of a cell selection, in
/// row-major order.
fn first_cell_content(cells: &CellSelection) -> Option<ResolvedPos> {
    let anchor = cells.anchor_cell();
    let table_depth = anchor.depth().checked_sub(1)?;
    let start = anchor.start(table_depth);
    let map = TableMap::new(anchor.node(table_depth)).ok()?;
    let rect = map.rect_between(
        anchor.pos().checked_sub(start)?,
        cells.head_cell().pos().checked_sub(start)?,
    )?;
    let first = *map.cells_in_rect(rect).first()?;
    anchor.doc().resolve(start + first + 1).ok()
}

/// Where ancestor lookups and insertions start: the lower end of the
/// selection, or inside the first selected cell for a cell selection.
pub(crate) fn selection_start(selection: &Selection) -> ResolvedPos {
    if let Selection::Cell(cells) = selection
        && let Some(start) = first_cell_content(cells)
    {
        return start;
    }
    selection.resolved_from().clone()
}

/// Innermost ancestor of the selection start that satisfies `predicate`.
/// The document itself is never returned. A cell selection starts inside
/// its first cell, so that cell and its ancestors are found.
pub fn find_parent_node<P>(predicate: P) -> impl Fn(&Selection) -> Option<FoundNode>
where
    P: Fn(&Node) -> bool,
{
    move |selection| {
        let from = selection_start(selection);
        (1..=from.depth()).rev().find_map(|depth| {
            let node = from.node(depth);
            if !predicate(node) {
                return None;
            }
            Some(FoundNode {
                node: node.clone(),
                pos: from.before(depth)?,
                start: from.start(depth),
                depth,
            })
        })
    }
}

pub fn find_parent_node_of_type(types: impl Into<TypeSet>) -> impl Fn(&Selection) -> Option<FoundNode> {
    let types = types.into();
    find_parent_node(move |node| types.contains(node.node_type()))
}

pub fn has_parent_node_of_type(types: impl Into<TypeSet>) -> impl Fn(&Selection) -> bool {
    let find = find_parent_node_of_type(types);
    move |selection| find(selection).is_some()
}

pub fn is_node_selection(selection: &Selection) -> bool {
    selection.is_node_selection()
}

/// The selected node when the selection is a node selection of one of
/// `types`.
pub fn find_selected_node_of_type(types: impl Into<TypeSet>) -> impl Fn(&Selection) -> Option<FoundNode> {
    let types = types.into();
    move |selection| match selection {
        Selection::Node(selected) if types.contains(selected.node().node_type()) => {
            let from = selection.resolved_from();
            Some(FoundNode {
                node: selected.node().clone(),
                pos: from.pos(),
                start: from.pos() + 1,
                depth: from.depth(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgrid_model::builder::{blockquote, create_editor, doc, p, row, schema, table, td, td_cursor};
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_the_innermost_matching_ancestor() {
        let tr = create_editor(doc([blockquote([blockquote([p("<cursor>")])])])).unwrap();
        let quote = schema().node_type("blockquote").unwrap();
        let found = find_parent_node_of_type(quote)(tr.selection()).unwrap();
        assert_eq!((found.pos, found.start, found.depth), (1, 2, 2));
    }

    #[test]
    fn type_sets_match_any_member() {
        let tr = create_editor(doc([table([row([td_cursor()])])])).unwrap();
        let types = [
            schema().node_type("heading").unwrap(),
            schema().node_type("table_cell").unwrap(),
        ];
        let found = find_parent_node_of_type(types)(tr.selection()).unwrap();
        assert_eq!(found.node.type_name(), "table_cell");
        assert_eq!(found.pos, 2);
        assert!(!has_parent_node_of_type(schema().node_type("blockquote").unwrap())(tr.selection()));
    }

    #[test]
    fn the_document_is_never_a_parent() {
        let tr = create_editor(doc([p("<cursor>")])).unwrap();
        assert!(find_parent_node(|_| true)(tr.selection()).unwrap().depth == 1);
        assert!(find_parent_node(|node| node.type_name() == "doc")(tr.selection()).is_none());
    }

    #[test]
    fn selected_node_of_type() {
        let tr = create_editor(doc([table([row([td([p("a")])])])])).unwrap();
        let tr = tr.set_selection(Selection::node(tr.doc(), 0).unwrap()).unwrap();
        let found = find_selected_node_of_type(schema().node_type("table").unwrap())(tr.selection()).unwrap();
        assert_eq!(found.pos, 0);
        assert!(is_node_selection(tr.selection()));
        assert!(find_selected_node_of_type(schema().node_type("paragraph").unwrap())(tr.selection()).is_none());
    }
}

//! Schema-checked structural edits.
//!
//! Every function here hands back the transaction it was given when the
//! edit does not apply: no matching ancestor, a selection of the wrong
//! kind, or a result the schema would not accept. Callers compare with
//! [`Transaction::ptr_eq`] to tell the two outcomes apart.

use docgrid_model::{Attrs, Mark, ModelError, Node, NodeType, Selection, Transaction};

use crate::error::{Result, unless_rejected};
use crate::find::{TypeSet, find_parent_node_of_type, selection_start};

/// Delete the node starting at `pos`.
///
/// When the parent cannot be left without it (the only block of a
/// document, say) the node is replaced by the parent's minimal content
/// instead.
pub fn remove_node_at_pos(pos: usize) -> impl Fn(&Transaction) -> Result<Transaction> {
    move |tr| {
        let node = tr.doc().node_at(pos).ok_or(ModelError::NoNodeAt { pos })?;
        let end = pos + node.node_size();
        match tr.delete(pos, end) {
            Err(err) if err.is_schema_violation() => {
                let resolved = tr.doc().resolve(pos)?;
                let parent = resolved.parent();
                let Some(fill) = parent.node_type().fill_content() else {
                    log::debug!("{} has no minimal content to refill with", parent.type_name());
                    return Ok(tr.clone());
                };
                log::trace!("refilling {} after removing {}", parent.type_name(), node.type_name());
                unless_rejected(tr.replace(pos, end, fill), tr)
            }
            edit => unless_rejected(edit, tr),
        }
    }
}

/// Swap the node starting at `pos` for `node`, if its parent accepts the
/// new type in that slot.
pub fn replace_node_at_pos(pos: usize, node: Node) -> impl Fn(&Transaction) -> Result<Transaction> {
    move |tr| {
        let old = tr.doc().node_at(pos).ok_or(ModelError::NoNodeAt { pos })?;
        let end = pos + old.node_size();
        let resolved = tr.doc().resolve(pos)?;
        let index = resolved.index(resolved.depth());
        if !resolved.parent().can_replace_with(index, index + 1, node.node_type()) {
            log::debug!(
                "{} does not accept {} in place of {}",
                resolved.parent().type_name(),
                node.type_name(),
                old.type_name()
            );
            return Ok(tr.clone());
        }
        unless_rejected(tr.replace_with(pos, end, node.clone()), tr)
    }
}

pub fn remove_parent_node_of_type(types: impl Into<TypeSet>) -> impl Fn(&Transaction) -> Result<Transaction> {
    let find = find_parent_node_of_type(types);
    move |tr| match find(tr.selection()) {
        Some(parent) => remove_node_at_pos(parent.pos)(tr),
        None => Ok(tr.clone()),
    }
}

pub fn replace_parent_node_of_type(
    types: impl Into<TypeSet>,
    node: Node,
) -> impl Fn(&Transaction) -> Result<Transaction> {
    let find = find_parent_node_of_type(types);
    move |tr| match find(tr.selection()) {
        Some(parent) => replace_node_at_pos(parent.pos, node.clone())(tr),
        None => Ok(tr.clone()),
    }
}

pub fn remove_selected_node(tr: &Transaction) -> Result<Transaction> {
    let selection = tr.selection();
    if !selection.is_node_selection() {
        return Ok(tr.clone());
    }
    unless_rejected(tr.delete(selection.from(), selection.to()), tr)
}

pub fn replace_selected_node(node: Node) -> impl Fn(&Transaction) -> Result<Transaction> {
    move |tr| {
        if !tr.selection().is_node_selection() {
            return Ok(tr.clone());
        }
        let selection = tr.selection();
        replace_node_at_pos(selection.from(), node.clone())(tr)
    }
}

/// Insert `node` at the selection start (the start of the first cell for a
/// cell selection) if its parent allows it there.
/// Otherwise try directly after each enclosing node, innermost first, and
/// insert at the first boundary that accepts it.
pub fn safe_insert(node: Node) -> impl Fn(&Transaction) -> Result<Transaction> {
    move |tr| {
        let from = selection_start(tr.selection());
        let index = from.index(from.depth());
        if from.parent().can_replace_with(index, index, node.node_type()) {
            return unless_rejected(tr.insert(from.pos(), node.clone()), tr);
        }

        for depth in (1..=from.depth()).rev() {
            let Some(pos) = from.after(depth) else {
                continue;
            };
            let boundary = tr.doc().resolve(pos)?;
            let index = boundary.index(boundary.depth());
            if boundary.parent().can_replace_with(index, index, node.node_type()) {
                log::trace!("inserting {} after depth {depth} at {pos}", node.type_name());
                return unless_rejected(tr.insert(pos, node.clone()), tr);
            }
        }

        log::debug!("no place for {} around {}", node.type_name(), from.pos());
        Ok(tr.clone())
    }
}

/// Change the type, marks or attributes of the nearest ancestor of one of
/// `types`. Attributes in `attrs` are merged over the existing ones; `None`
/// for the type or marks keeps the current value.
pub fn set_parent_node_markup(
    types: impl Into<TypeSet>,
    node_type: Option<NodeType>,
    attrs: Attrs,
    marks: Option<Vec<Mark>>,
) -> impl Fn(&Transaction) -> Result<Transaction> {
    let find = find_parent_node_of_type(types);
    move |tr| {
        let Some(parent) = find(tr.selection()) else {
            return Ok(tr.clone());
        };
        let mut merged = parent.node.attrs().clone();
        merged.extend(attrs.iter().map(|(name, value)| (name.clone(), value.clone())));
        let edit = tr.set_node_markup(parent.pos, node_type.as_ref(), Some(merged), marks.clone());
        unless_rejected(edit, tr)
    }
}

/// Select the nearest ancestor of one of `types`, unless a node is already
/// selected.
pub fn select_parent_node_of_type(types: impl Into<TypeSet>) -> impl Fn(&Transaction) -> Result<Transaction> {
    let find = find_parent_node_of_type(types);
    move |tr| {
        if tr.selection().is_node_selection() {
            return Ok(tr.clone());
        }
        match find(tr.selection()) {
            Some(parent) => Ok(tr.set_selection(Selection::node(tr.doc(), parent.pos)?)?),
            None => Ok(tr.clone()),
        }
    }
}

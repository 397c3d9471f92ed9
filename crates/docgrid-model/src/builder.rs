//! Terse document builders over [`Schema::basic`] for tests and benches.
//!
//! Text may carry position tags such as `<cursor>`, `<anchor>`, `<head>` or
//! `<node>`; the builders strip them and record where they fell:
//!
//! ```
//! use docgrid_model::builder::{doc, p, row, table, td, td_cursor};
//!
//! let built = doc([table([row([td_cursor(), td([p("2")])])])]);
//! assert_eq!(built.tags["cursor"], 4);
//! ```
//!
//! [`create_editor`] turns the tags into the initial selection of a
//! transaction.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::attrs::Attrs;
use crate::error::Result;
use crate::fragment::Fragment;
use crate::node::Node;
use crate::schema::{NodeType, Schema};
use crate::selection::Selection;
use crate::transform::Transaction;

static SCHEMA: OnceLock<Schema> = OnceLock::new();
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// The shared basic schema every builder uses.
pub fn schema() -> &'static Schema {
    SCHEMA.get_or_init(Schema::basic)
}

fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"<(\w+)>").expect("Invalid tag regex"))
}

fn node_type(name: &str) -> NodeType {
    schema()
        .node_type(name)
        .expect("Builder node type missing from basic schema")
}

/// A built node and the tag positions found inside it.
///
/// Tags are relative to the position before the node, except for [`doc`]
/// whose tags are document positions.
#[derive(Debug, Clone)]
pub struct Tagged {
    pub node: Node,
    pub tags: BTreeMap<String, usize>,
}

pub enum Child {
    Text(String),
    Node(Tagged),
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<Tagged> for Child {
    fn from(tagged: Tagged) -> Self {
        Child::Node(tagged)
    }
}

/// Anything a builder accepts as its children.
pub trait IntoChildren {
    fn into_children(self) -> Vec<Child>;
}

impl IntoChildren for &str {
    fn into_children(self) -> Vec<Child> {
        vec![self.into()]
    }
}

impl IntoChildren for Tagged {
    fn into_children(self) -> Vec<Child> {
        vec![self.into()]
    }
}

impl<T: Into<Child>, const N: usize> IntoChildren for [T; N] {
    fn into_children(self) -> Vec<Child> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Child>> IntoChildren for Vec<T> {
    fn into_children(self) -> Vec<Child> {
        self.into_iter().map(Into::into).collect()
    }
}

/// Build a node of `name` without validating its content, so fixtures can
/// describe broken documents too.
pub fn element(name: &str, attrs: Attrs, children: impl IntoChildren) -> Tagged {
    let mut nodes = Vec::new();
    let mut tags = BTreeMap::new();
    let mut offset = 0;

    for child in children.into_children() {
        match child {
            Child::Text(text) => {
                let mut clean = String::new();
                let mut last = 0;
                for caps in tag_regex().captures_iter(&text) {
                    let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                        continue;
                    };
                    clean.push_str(&text[last..whole.start()]);
                    tags.insert(name.as_str().to_string(), offset + clean.chars().count());
                    last = whole.end();
                }
                clean.push_str(&text[last..]);
                if let Ok(node) = schema().text(clean, Vec::new()) {
                    offset += node.node_size();
                    nodes.push(node);
                }
            }
            Child::Node(tagged) => {
                for (name, pos) in tagged.tags {
                    tags.insert(name, offset + pos);
                }
                offset += tagged.node.node_size();
                nodes.push(tagged.node);
            }
        }
    }

    let node = node_type(name).create_unchecked(attrs, Fragment::from_nodes(nodes), Vec::new());
    // content offsets become offsets from the position before the node
    let tags = tags.into_iter().map(|(name, pos)| (name, pos + 1)).collect();
    Tagged { node, tags }
}

/// The document root. Its tags are document positions.
pub fn doc(children: impl IntoChildren) -> Tagged {
    let Tagged { node, tags } = element("doc", Attrs::new(), children);
    let tags = tags.into_iter().map(|(name, pos)| (name, pos - 1)).collect();
    Tagged { node, tags }
}

pub fn p(children: impl IntoChildren) -> Tagged {
    element("paragraph", Attrs::new(), children)
}

pub fn blockquote(children: impl IntoChildren) -> Tagged {
    element("blockquote", Attrs::new(), children)
}

pub fn heading(level: i64, children: impl IntoChildren) -> Tagged {
    element("heading", crate::attrs([("level", level)]), children)
}

pub fn hr() -> Tagged {
    element("horizontal_rule", Attrs::new(), Vec::<Child>::new())
}

pub fn table(children: impl IntoChildren) -> Tagged {
    element("table", Attrs::new(), children)
}

pub fn row(children: impl IntoChildren) -> Tagged {
    element("table_row", Attrs::new(), children)
}

pub fn td(children: impl IntoChildren) -> Tagged {
    element("table_cell", Attrs::new(), children)
}

pub fn th(children: impl IntoChildren) -> Tagged {
    element("table_header", Attrs::new(), children)
}

/// A data cell spanning `colspan` columns and `rowspan` rows.
pub fn td_span(colspan: usize, rowspan: usize, children: impl IntoChildren) -> Tagged {
    element(
        "table_cell",
        crate::attrs([("colspan", colspan), ("rowspan", rowspan)]),
        children,
    )
}

/// A data cell holding one empty paragraph.
pub fn td_empty() -> Tagged {
    td([p("")])
}

/// A data cell whose empty paragraph holds the cursor.
pub fn td_cursor() -> Tagged {
    td([p("<cursor>")])
}

fn enclosing_cell(doc: &Node, pos: usize) -> Result<Option<usize>> {
    let resolved = doc.resolve(pos)?;
    Ok((1..=resolved.depth()).rev().find_map(|depth| {
        let is_cell = resolved
            .node(depth)
            .node_type()
            .table_role()
            .is_some_and(|role| role.is_cell());
        if is_cell { resolved.before(depth) } else { None }
    }))
}

/// Start a transaction on a tagged document.
///
/// `<anchor>` and `<head>` in two different cells produce a cell selection
/// between those cells, otherwise a text selection. `<cursor>` gives a
/// cursor and `<node>` selects the node starting there. Without tags the
/// cursor goes to the start of the document.
pub fn create_editor(tagged: Tagged) -> Result<Transaction> {
    let Tagged { node: doc, tags } = tagged;
    let selection = match (
        tags.get("anchor"),
        tags.get("head"),
        tags.get("cursor"),
        tags.get("node"),
    ) {
        (Some(&anchor), Some(&head), _, _) => {
            match (enclosing_cell(&doc, anchor)?, enclosing_cell(&doc, head)?) {
                (Some(anchor_cell), Some(head_cell)) if anchor_cell != head_cell => {
                    Selection::cell(&doc, anchor_cell, head_cell)?
                }
                _ => Selection::text(&doc, anchor, head)?,
            }
        }
        (_, _, Some(&cursor), _) => Selection::cursor(&doc, cursor)?,
        (_, _, _, Some(&node)) => Selection::node(&doc, node)?,
        _ => Selection::at_start(&doc),
    };
    Transaction::new(doc, selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttrValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn tags_are_document_positions() {
        let built = doc([p("ab<cursor>c"), p("<anchor>x<head>")]);
        assert_eq!(built.tags["cursor"], 3);
        assert_eq!(built.tags["anchor"], 6);
        assert_eq!(built.tags["head"], 7);
        assert_eq!(built.node.to_string(), r#"doc(paragraph("abc"), paragraph("x"))"#);
    }

    #[test]
    fn anchor_and_head_in_different_cells_select_cells() {
        let tr = create_editor(doc([table([
            row([td([p("<anchor>")]), td_empty()]),
            row([td([p("<head>")]), td_empty()]),
        ])]))
        .unwrap();
        assert!(tr.selection().is_cell_selection());
        assert_eq!((tr.selection().anchor(), tr.selection().head()), (2, 12));
    }

    #[test]
    fn node_tag_selects_the_following_node() {
        let tr = create_editor(doc([Child::from(p("a")), Child::from("<node>"), Child::from(hr())])).unwrap();
        assert!(tr.selection().is_node_selection());
        assert_eq!((tr.selection().from(), tr.selection().to()), (3, 4));
    }

    #[test]
    fn untagged_documents_start_at_the_first_textblock() {
        let tr = create_editor(doc([blockquote([p("q")])])).unwrap();
        assert_eq!(tr.selection().head(), 2);
    }

    #[test]
    fn span_cells_carry_their_attributes() {
        let cell = td_span(2, 3, [p("x")]).node;
        assert_eq!(cell.attr("colspan"), Some(&AttrValue::Int(2)));
        assert_eq!(cell.attr("rowspan"), Some(&AttrValue::Int(3)));
        assert_eq!(td_empty().node.attr("colspan"), Some(&AttrValue::Int(1)));
    }
}

use docgrid_model::builder::{blockquote, create_editor, doc, hr, p, row, table, td, td_empty};
use docgrid_model::{Fragment, ModelError, Node, Selection, Transaction};
use pretty_assertions::assert_eq;

fn text(tr: &Transaction, value: &str) -> Node {
    tr.doc().node_type().schema().text(value, vec![]).unwrap()
}

#[test]
fn chained_edits_accumulate_a_mapping() {
    let tr = create_editor(doc([p("ab<cursor>"), p("cd")])).unwrap();
    let start = tr.clone();

    let tr = tr.insert(1, text(&tr, "x")).unwrap();
    let tr = tr.delete(6, 7).unwrap();

    assert_eq!(tr.mapping().len(), 2);
    assert_eq!(tr.selection().head(), 4);
    assert!(Node::ptr_eq(tr.before(), start.doc()));
    insta::assert_snapshot!(tr.doc().to_string(), @r#"doc(paragraph("xab"), paragraph("d"))"#);
}

#[test]
fn node_selection_follows_its_node() {
    let tr = create_editor(doc([p("a"), hr()])).unwrap();
    let tr = tr.set_selection(Selection::node(tr.doc(), 3).unwrap()).unwrap();
    let tr = tr.insert(1, text(&tr, "zz")).unwrap();
    assert!(tr.selection().is_node_selection());
    assert_eq!((tr.selection().from(), tr.selection().to()), (5, 6));
}

#[test]
fn deleting_a_selected_node_falls_back_to_a_cursor() {
    let tr = create_editor(doc([p("a"), blockquote([p("q")]), p("b")])).unwrap();
    let tr = tr.set_selection(Selection::node(tr.doc(), 3).unwrap()).unwrap();
    let tr = tr.delete(3, 8).unwrap();
    assert!(!tr.selection().is_node_selection());
    assert_eq!(tr.selection().head(), 4);
    insta::assert_snapshot!(tr.doc().to_string(), @r#"doc(paragraph("a"), paragraph("b"))"#);
}

#[test]
fn replacing_a_row_keeps_the_table_valid() {
    let tr = create_editor(doc([table([row([td([p("<cursor>1")]), td_empty()])])])).unwrap();
    let row_node = tr.doc().node_at(1).unwrap().clone();
    let replacement = Fragment::from_nodes([row_node.clone(), row_node]);
    let tr = tr.replace_with(1, 12, replacement).unwrap();
    insta::assert_snapshot!(
        tr.doc().to_string(),
        @r#"doc(table(table_row(table_cell(paragraph("1")), table_cell(paragraph)), table_row(table_cell(paragraph("1")), table_cell(paragraph))))"#
    );
    assert!(tr.doc().check().is_ok());
}

#[test]
fn tables_reject_non_row_children() {
    let tr = create_editor(doc([table([row([td_empty()])])])).unwrap();
    let err = tr.insert(1, p("").node).unwrap_err();
    assert!(err.is_schema_violation());
    assert_eq!(
        err,
        ModelError::InvalidContent {
            node_type: "table".into()
        }
    );
}

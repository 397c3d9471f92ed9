//! Table grid queries, cell selections and structural edits over a
//! [`docgrid_model`] document.
//!
//! Queries take a [`Selection`](docgrid_model::Selection); edits take a
//! [`Transaction`](docgrid_model::Transaction) and return a new one. Both
//! are curried: configuration first, then the selection or transaction, so
//! they compose by plain function application:
//!
//! ```
//! use docgrid_engine::{empty_selected_cells, select_column};
//! use docgrid_model::builder::{create_editor, doc, p, row, schema, table, td};
//!
//! let tr = create_editor(doc([table([
//!     row([td([p("1<cursor>")]), td([p("2")])]),
//!     row([td([p("3")]), td([p("4")])]),
//! ])]))?;
//! let tr = select_column(0)(&tr)?;
//! let tr = empty_selected_cells(schema())(&tr)?;
//! assert_eq!(
//!     tr.doc().to_string(),
//!     r#"doc(table(table_row(table_cell(paragraph), table_cell(paragraph("2"))), table_row(table_cell(paragraph), table_cell(paragraph("4")))))"#
//! );
//! # Ok::<(), docgrid_engine::EngineError>(())
//! ```
//!
//! When an edit does not apply the input transaction itself comes back,
//! which [`Transaction::ptr_eq`](docgrid_model::Transaction::ptr_eq)
//! detects.

pub mod error;
pub mod find;
pub mod table;
pub mod transforms;

pub use error::{EngineError, Result};
pub use find::{
    FoundNode, TypeSet, find_parent_node, find_parent_node_of_type, find_selected_node_of_type,
    has_parent_node_of_type, is_node_selection,
};
pub use table::{
    CellRef, Rect, TableMap, TableProblem, empty_selected_cells, find_cell_rect, find_table,
    get_cells_in_column, get_cells_in_row, get_cells_in_table, get_selected_cells,
    is_cell_selection, is_column_selected, is_row_selected, is_table_selected, select_column,
    select_row, select_table,
};
pub use transforms::{
    remove_node_at_pos, remove_parent_node_of_type, remove_selected_node, replace_node_at_pos,
    replace_parent_node_of_type, replace_selected_node, safe_insert, select_parent_node_of_type,
    set_parent_node_markup,
};

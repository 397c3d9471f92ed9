//! Table queries: locating the enclosing table, mapping it to a grid and
//! pulling cells out of rows, columns or the whole grid.

mod map;
mod select;

pub use map::{Rect, TableMap, TableProblem};
pub use select::{
    empty_selected_cells, is_column_selected, is_row_selected, is_table_selected, select_column,
    select_row, select_table,
};

use docgrid_model::{Node, Selection, TableRole};

use crate::find::{FoundNode, find_parent_node};

/// A cell and the position directly before it.
#[derive(Debug, Clone)]
pub struct CellRef {
    pub pos: usize,
    pub node: Node,
}

/// The table enclosing the selection, if any.
pub fn find_table(selection: &Selection) -> Option<FoundNode> {
    find_parent_node(|node| node.node_type().table_role() == Some(TableRole::Table))(selection)
}

pub fn is_cell_selection(selection: &Selection) -> bool {
    selection.is_cell_selection()
}

/// A located table together with its grid.
pub(crate) struct Grid {
    pub(crate) table: FoundNode,
    pub(crate) map: TableMap,
}

impl Grid {
    pub(crate) fn around(selection: &Selection) -> Option<Self> {
        let table = find_table(selection)?;
        match TableMap::new(&table.node) {
            Ok(map) => Some(Self { table, map }),
            Err(err) => {
                log::debug!("no grid for {}: {err}", table.node.type_name());
                None
            }
        }
    }

    /// Turn grid positions into cell references with document positions.
    pub(crate) fn cells(&self, positions: impl IntoIterator<Item = usize>) -> Vec<CellRef> {
        positions
            .into_iter()
            .filter_map(|relative| {
                let node = self.table.node.node_at(relative)?;
                Some(CellRef {
                    pos: self.table.start + relative,
                    node: node.clone(),
                })
            })
            .collect()
    }

    /// Rectangle spanned by the corner cells of a cell selection in this
    /// table.
    pub(crate) fn selected_rect(&self, selection: &Selection) -> Option<Rect> {
        let Selection::Cell(cells) = selection else {
            return None;
        };
        let anchor = cells.anchor_cell().pos().checked_sub(self.table.start)?;
        let head = cells.head_cell().pos().checked_sub(self.table.start)?;
        self.map.rect_between(anchor, head)
    }
}

fn cells_in(rect: impl Fn(&TableMap) -> Option<Rect>) -> impl Fn(&Selection) -> Option<Vec<CellRef>> {
    move |selection| {
        let grid = Grid::around(selection)?;
        let rect = rect(&grid.map)?;
        Some(grid.cells(grid.map.cells_covering(rect)))
    }
}

/// Cells of column `column` in ascending position order. A cell spanning
/// several rows of the column is listed once.
pub fn get_cells_in_column(column: usize) -> impl Fn(&Selection) -> Option<Vec<CellRef>> {
    cells_in(move |map| map.column_rect(column))
}

/// Cells of row `row` in ascending position order, including cells
/// hanging down into it from rows above.
pub fn get_cells_in_row(row: usize) -> impl Fn(&Selection) -> Option<Vec<CellRef>> {
    cells_in(move |map| map.row_rect(row))
}

/// Every cell of the enclosing table in ascending position order.
pub fn get_cells_in_table(selection: &Selection) -> Option<Vec<CellRef>> {
    cells_in(TableMap::table_rect)(selection)
}

/// Cells inside the rectangle of a cell selection.
pub fn get_selected_cells(selection: &Selection) -> Option<Vec<CellRef>> {
    let grid = Grid::around(selection)?;
    let rect = grid.selected_rect(selection)?;
    let mut positions = grid.map.cells_in_rect(rect);
    positions.sort_unstable();
    Some(grid.cells(positions))
}

/// Grid rectangle covered by the cell at document position `pos`.
pub fn find_cell_rect(selection: &Selection, pos: usize) -> Option<Rect> {
    let grid = Grid::around(selection)?;
    grid.map.find_cell(pos.checked_sub(grid.table.start)?)
}

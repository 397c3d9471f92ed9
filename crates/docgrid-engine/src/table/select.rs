use docgrid_model::{Schema, Selection, Transaction};

use super::{Grid, Rect, TableMap, get_selected_cells};
use crate::error::{Result, unless_rejected};

fn rect_selected(target: impl Fn(&TableMap) -> Option<Rect>) -> impl Fn(&Selection) -> bool {
    move |selection| {
        if !selection.is_cell_selection() {
            return false;
        }
        let Some(grid) = Grid::around(selection) else {
            return false;
        };
        match (grid.selected_rect(selection), target(&grid.map)) {
            (Some(selected), Some(target)) => selected == target,
            _ => false,
        }
    }
}

/// Whether a cell selection covers exactly column `column`.
pub fn is_column_selected(column: usize) -> impl Fn(&Selection) -> bool {
    rect_selected(move |map| map.column_rect(column))
}

/// Whether a cell selection covers exactly row `row`.
pub fn is_row_selected(row: usize) -> impl Fn(&Selection) -> bool {
    rect_selected(move |map| map.row_rect(row))
}

/// Whether a cell selection covers the whole table.
pub fn is_table_selected(selection: &Selection) -> bool {
    rect_selected(TableMap::table_rect)(selection)
}

fn select_rect(target: impl Fn(&TableMap) -> Option<Rect>) -> impl Fn(&Transaction) -> Result<Transaction> {
    move |tr| {
        let Some(grid) = Grid::around(tr.selection()) else {
            log::debug!("selection is not inside a table");
            return Ok(tr.clone());
        };
        let Some(rect) = target(&grid.map) else {
            log::debug!(
                "target outside of {}x{} table",
                grid.map.width,
                grid.map.height
            );
            return Ok(tr.clone());
        };
        let covering = grid.map.cells_covering(rect);
        let first = grid.map.first_in_rect(rect).or(covering.first().copied());
        let last = grid.map.last_in_rect(rect).or(covering.last().copied());
        let (Some(anchor), Some(head)) = (first, last) else {
            return Ok(tr.clone());
        };

        let start = grid.table.start;
        let selection = Selection::cell(tr.doc(), start + anchor, start + head)?;
        Ok(tr.set_selection(selection)?)
    }
}

/// Select every cell of column `column`. Out-of-range columns leave the
/// transaction as it is.
pub fn select_column(column: usize) -> impl Fn(&Transaction) -> Result<Transaction> {
    select_rect(move |map| map.column_rect(column))
}

/// Select every cell of row `row`. Out-of-range rows leave the
/// transaction as it is.
pub fn select_row(row: usize) -> impl Fn(&Transaction) -> Result<Transaction> {
    select_rect(move |map| map.row_rect(row))
}

pub fn select_table(tr: &Transaction) -> Result<Transaction> {
    select_rect(TableMap::table_rect)(tr)
}

/// Reset the content of every selected cell to the minimal content its
/// type accepts in `schema`, keeping the cells themselves.
///
/// Cells are rewritten from the last to the first, so positions captured
/// up front stay valid. Cells that are already empty are left alone; when
/// nothing changes the input transaction is returned.
pub fn empty_selected_cells(schema: &Schema) -> impl Fn(&Transaction) -> Result<Transaction> {
    let schema = schema.clone();
    move |tr| {
        if !tr.selection().is_cell_selection() {
            return Ok(tr.clone());
        }
        let Some(cells) = get_selected_cells(tr.selection()) else {
            return Ok(tr.clone());
        };

        let mut next = tr.clone();
        for cell in cells.iter().rev() {
            let fill = match schema.node_type(cell.node.type_name()) {
                Ok(node_type) => node_type.fill_content(),
                Err(err) => {
                    log::debug!("skipping cell at {}: {err}", cell.pos);
                    continue;
                }
            };
            let Some(fill) = fill else {
                log::debug!("{} has no empty content", cell.node.type_name());
                continue;
            };
            if cell.node.content() == &fill {
                continue;
            }
            let edit = next.replace(cell.pos + 1, cell.pos + cell.node.node_size() - 1, fill);
            let edited = unless_rejected(edit, &next)?;
            if Transaction::ptr_eq(&edited, &next) {
                return Ok(tr.clone());
            }
            next = edited;
        }
        Ok(next)
    }
}

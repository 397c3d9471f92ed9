// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use docgrid_model::Transaction;
use docgrid_model::builder::{Tagged, create_editor, doc, p, row, table, td, td_span};

/// A `rows` x `cols` table with the cursor in the first cell.
#[allow(dead_code)]
pub fn generate_table(rows: usize, cols: usize) -> Tagged {
    let grid: Vec<Tagged> = (0..rows)
        .map(|r| {
            let cells: Vec<Tagged> = (0..cols)
                .map(|c| {
                    let text = if r == 0 && c == 0 {
                        "0<cursor>".to_string()
                    } else {
                        format!("{}", r * cols + c)
                    };
                    td([p(text.as_str())])
                })
                .collect();
            row(cells)
        })
        .collect();
    doc([table(grid)])
}

/// Like [`generate_table`] but every other row opens with a cell spanning two
/// columns and two rows.
#[allow(dead_code)]
pub fn generate_spanning_table(rows: usize, cols: usize) -> Tagged {
    let grid: Vec<Tagged> = (0..rows)
        .map(|r| {
            let mut cells = Vec::new();
            let mut c = 0;
            if r % 2 == 0 && r + 1 < rows && cols >= 2 {
                let text = if r == 0 { "span<cursor>" } else { "span" };
                cells.push(td_span(2, 2, [p(text)]));
                c = 2;
            } else if r % 2 == 1 && cols >= 2 {
                c = 2;
            }
            for col in c..cols {
                cells.push(td([p(format!("{}", r * cols + col).as_str())]));
            }
            row(cells)
        })
        .collect();
    doc([table(grid)])
}

#[allow(dead_code)]
pub fn editor(tagged: Tagged) -> Transaction {
    create_editor(tagged).unwrap()
}

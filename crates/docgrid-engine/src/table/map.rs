use std::collections::BTreeSet;

use docgrid_model::{AttrValue, Node, TableRole};

use crate::error::{EngineError, Result};

/// A rectangle of grid coordinates: columns `left..right`, rows
/// `top..bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl Rect {
    pub fn union(self, other: Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Structural defects found while mapping a table. The map is still built;
/// affected coordinates may be holes or belong to the earlier cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableProblem {
    /// The cell at `pos` overlaps `n` coordinates already taken by earlier
    /// cells. Its remaining coordinates are still filled.
    Collision { row: usize, pos: usize, n: usize },
    /// Row `row` ends `n` coordinates short of the table width.
    Missing { row: usize, n: usize },
    /// The cell at `pos` spans `n` rows past the end of the table.
    OverlongRowspan { pos: usize, n: usize },
}

fn span(cell: &Node, name: &str) -> usize {
    cell.attr(name)
        .and_then(AttrValue::as_int)
        .and_then(|value| usize::try_from(value).ok())
        .filter(|value| *value > 0)
        .unwrap_or(1)
}

/// Row-major grid of a table.
///
/// Every coordinate holds the position of the cell covering it, relative to
/// the start of the table's content (the first cell of the first row sits
/// at 1). A cell spanning several coordinates appears at each of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMap {
    pub width: usize,
    pub height: usize,
    pub map: Vec<Option<usize>>,
    pub problems: Vec<TableProblem>,
}

impl TableMap {
    /// Compute the grid of `table`.
    pub fn new(table: &Node) -> Result<Self> {
        if table.node_type().table_role() != Some(TableRole::Table) {
            return Err(EngineError::NotATable {
                node_type: table.type_name().to_string(),
            });
        }

        let width = Self::find_width(table);
        let height = table.child_count();
        let mut map: Vec<Option<usize>> = vec![None; width * height];
        let mut problems = Vec::new();
        let mut map_pos = 0;
        let mut pos = 0;

        for (row, row_node) in table.children().enumerate() {
            pos += 1;
            let mut cells = row_node.children();
            loop {
                while map_pos < map.len() && map[map_pos].is_some() {
                    map_pos += 1;
                }
                let Some(cell) = cells.next() else {
                    break;
                };
                let colspan = span(cell, "colspan");
                let rowspan = span(cell, "rowspan");
                let mut collided = 0;
                for h in 0..rowspan {
                    if row + h >= height {
                        problems.push(TableProblem::OverlongRowspan {
                            pos,
                            n: rowspan - h,
                        });
                        break;
                    }
                    let start = map_pos + h * width;
                    for w in 0..colspan {
                        match map.get_mut(start + w) {
                            Some(slot) if slot.is_none() => *slot = Some(pos),
                            _ => collided += 1,
                        }
                    }
                }
                if collided > 0 {
                    problems.push(TableProblem::Collision {
                        row,
                        pos,
                        n: collided,
                    });
                }
                map_pos += colspan;
                pos += cell.node_size();
            }

            let expected = (row + 1) * width;
            let mut missing = 0;
            while map_pos < expected {
                if map[map_pos].is_none() {
                    missing += 1;
                }
                map_pos += 1;
            }
            if missing > 0 {
                problems.push(TableProblem::Missing { row, n: missing });
            }
            pos += 1;
        }

        for problem in &problems {
            log::warn!("table structure problem: {problem:?}");
        }

        Ok(Self {
            width,
            height,
            map,
            problems,
        })
    }

    /// Widest row once cells hanging down from earlier rows are counted.
    fn find_width(table: &Node) -> usize {
        let rows: Vec<&Node> = table.children().collect();
        let mut width = 0;
        let mut has_rowspan = false;
        for (index, row) in rows.iter().enumerate() {
            let mut row_width = 0;
            if has_rowspan {
                for (prev_index, prev) in rows[..index].iter().enumerate() {
                    row_width += prev
                        .children()
                        .filter(|cell| prev_index + span(cell, "rowspan") > index)
                        .map(|cell| span(cell, "colspan"))
                        .sum::<usize>();
                }
            }
            for cell in row.children() {
                row_width += span(cell, "colspan");
                has_rowspan |= span(cell, "rowspan") > 1;
            }
            width = width.max(row_width);
        }
        width
    }

    fn at(&self, row: usize, col: usize) -> Option<usize> {
        self.map.get(row * self.width + col).copied().flatten()
    }

    /// Rectangle covered by the cell at relative position `pos`.
    pub fn find_cell(&self, pos: usize) -> Option<Rect> {
        let index = self.map.iter().position(|entry| *entry == Some(pos))?;
        let left = index % self.width;
        let top = index / self.width;
        let mut right = left + 1;
        while right < self.width && self.at(top, right) == Some(pos) {
            right += 1;
        }
        let mut bottom = top + 1;
        while bottom < self.height && self.at(bottom, left) == Some(pos) {
            bottom += 1;
        }
        Some(Rect {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Smallest rectangle holding both cells.
    pub fn rect_between(&self, a: usize, b: usize) -> Option<Rect> {
        Some(self.find_cell(a)?.union(self.find_cell(b)?))
    }

    pub fn column_rect(&self, col: usize) -> Option<Rect> {
        (col < self.width).then_some(Rect {
            left: col,
            top: 0,
            right: col + 1,
            bottom: self.height,
        })
    }

    pub fn row_rect(&self, row: usize) -> Option<Rect> {
        (row < self.height).then_some(Rect {
            left: 0,
            top: row,
            right: self.width,
            bottom: row + 1,
        })
    }

    pub fn table_rect(&self) -> Option<Rect> {
        (self.width > 0 && self.height > 0).then_some(Rect {
            left: 0,
            top: 0,
            right: self.width,
            bottom: self.height,
        })
    }

    /// Position at the top-left coordinate of `rect`.
    pub fn first_in_rect(&self, rect: Rect) -> Option<usize> {
        self.at(rect.top, rect.left)
    }

    /// Position at the bottom-right coordinate of `rect`.
    pub fn last_in_rect(&self, rect: Rect) -> Option<usize> {
        self.at(rect.bottom.checked_sub(1)?, rect.right.checked_sub(1)?)
    }

    /// Cells that start inside `rect`, in row-major order. Cells reaching
    /// in from outside the rectangle are left out.
    pub fn cells_in_rect(&self, rect: Rect) -> Vec<usize> {
        let mut seen = BTreeSet::new();
        let mut result = Vec::new();
        for row in rect.top..rect.bottom.min(self.height) {
            for col in rect.left..rect.right.min(self.width) {
                let Some(pos) = self.at(row, col) else {
                    continue;
                };
                if !seen.insert(pos) {
                    continue;
                }
                let from_left = col == rect.left && col > 0 && self.at(row, col - 1) == Some(pos);
                let from_above = row == rect.top && row > 0 && self.at(row - 1, col) == Some(pos);
                if !from_left && !from_above {
                    result.push(pos);
                }
            }
        }
        result
    }

    /// Every distinct cell covering at least one coordinate of `rect`, in
    /// ascending position order. Holes are skipped.
    pub fn cells_covering(&self, rect: Rect) -> Vec<usize> {
        let mut cells = BTreeSet::new();
        for row in rect.top..rect.bottom.min(self.height) {
            for col in rect.left..rect.right.min(self.width) {
                cells.extend(self.at(row, col));
            }
        }
        cells.into_iter().collect()
    }
}

#![forbid(unsafe_code)]

//! Table structure queries and attribute accessors.
//!
//! Row groups are transparent: a table's rows are its direct rows plus the
//! rows of any direct row group, in document order.

use tableplus_layout::ColumnWidths;

use crate::node::{AttrValue, Node, NodeType};

/// Table attribute holding the serialized width vector.
pub const COLUMN_WIDTHS: &str = "columnWidths";
/// Table attribute blocking interactive resizing.
pub const LOCKED: &str = "locked";
/// Table attribute with the border colour.
pub const BORDER_COLOR: &str = "borderColor";
/// Header cell attribute with the highlight colour.
pub const BACKGROUND_COLOR: &str = "backgroundColor";
/// Row attribute with the text alignment.
pub const TEXT_ALIGN: &str = "textAlign";

/// A row located inside a table.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    pub node: &'a Node,
    /// Position directly before the row.
    pub pos: usize,
}

impl RowRef<'_> {
    /// Position of the start of the row's content.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.pos + 1
    }

    /// Position of the end of the row's content.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start() + self.node.content_size()
    }
}

/// Rows of the table starting at `table_pos`, looking through row groups.
#[must_use]
pub fn table_rows(table: &Node, table_pos: usize) -> Vec<RowRef<'_>> {
    let mut rows = Vec::new();
    let start = table_pos + 1;
    for (offset, child) in table.children_with_offsets() {
        match child.kind() {
            NodeType::TableRow => rows.push(RowRef {
                node: child,
                pos: start + offset,
            }),
            NodeType::TableRowGroup => {
                let group_start = start + offset + 1;
                rows.extend(
                    child
                        .children_with_offsets()
                        .filter(|(_, row)| row.kind() == NodeType::TableRow)
                        .map(|(inner, row)| RowRef {
                            node: row,
                            pos: group_start + inner,
                        }),
                );
            }
            _ => {}
        }
    }
    rows
}

/// Highest cell count over the table's rows.
#[must_use]
pub fn max_cell_count(table: &Node) -> usize {
    table_rows(table, 0)
        .iter()
        .map(|row| row.node.child_count())
        .max()
        .unwrap_or(0)
}

/// A cell of the authoritative row, by index and absolute range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub index: usize,
    /// Position directly before the cell.
    pub from: usize,
    /// Position directly after the cell.
    pub to: usize,
}

/// The row that defines a table's column count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoritativeRow {
    /// Position of the start of the row's content.
    pub from: usize,
    /// Position of the end of the row's content.
    pub to: usize,
    pub cells: Vec<CellSpan>,
}

impl AuthoritativeRow {
    /// Number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether `from..to` lies within the row's content.
    #[must_use]
    pub fn contains_range(&self, from: usize, to: usize) -> bool {
        self.from <= from && to <= self.to
    }

    /// Indices of the cells lying fully inside `from..to`.
    #[must_use]
    pub fn cells_within(&self, from: usize, to: usize) -> Vec<usize> {
        self.cells
            .iter()
            .filter(|cell| from <= cell.from && cell.to <= to)
            .map(|cell| cell.index)
            .collect()
    }

    /// Number of cells ending at or before `pos`, i.e. the column index an
    /// insertion at `pos` lands on.
    #[must_use]
    pub fn insertion_index(&self, pos: usize) -> usize {
        self.cells.iter().filter(|cell| cell.to <= pos).count()
    }
}

/// The first row with the highest cell count of the table at `table_pos`.
#[must_use]
pub fn authoritative_row(doc: &Node, table_pos: usize) -> Option<AuthoritativeRow> {
    let table = doc.node_at(table_pos).filter(|n| n.kind() == NodeType::Table)?;
    let rows = table_rows(table, table_pos);
    let mut best: Option<&RowRef<'_>> = None;
    for row in &rows {
        if best.is_none_or(|b| row.node.child_count() > b.node.child_count()) {
            best = Some(row);
        }
    }
    let row = best?;
    let cells = row
        .node
        .children_with_offsets()
        .enumerate()
        .map(|(index, (offset, cell))| CellSpan {
            index,
            from: row.start() + offset,
            to: row.start() + offset + cell.node_size(),
        })
        .collect();
    Some(AuthoritativeRow {
        from: row.start(),
        to: row.end(),
        cells,
    })
}

/// The stored width vector; empty when absent or malformed.
#[must_use]
pub fn column_widths(table: &Node) -> ColumnWidths {
    match table.attr(COLUMN_WIDTHS) {
        Some(AttrValue::String(raw)) => ColumnWidths::parse(raw),
        Some(AttrValue::Number(n)) if n.is_finite() => ColumnWidths::new(vec![*n]),
        _ => ColumnWidths::empty(),
    }
}

/// The stored vector if it fits the column count, else equal widths.
#[must_use]
pub fn effective_column_widths(table: &Node) -> ColumnWidths {
    let count = max_cell_count(table);
    let stored = column_widths(table);
    if stored.fits(count) {
        stored
    } else {
        ColumnWidths::equal(count)
    }
}

/// Whether interactive resizing is blocked.
#[must_use]
pub fn is_locked(table: &Node) -> bool {
    table.attr(LOCKED).is_some_and(AttrValue::is_truthy)
}

/// Border colour, if set.
#[must_use]
pub fn border_color(table: &Node) -> Option<&str> {
    table.attr_str(BORDER_COLOR)
}

/// Header highlight colour, if set.
#[must_use]
pub fn header_background(cell: &Node) -> Option<&str> {
    cell.attr_str(BACKGROUND_COLOR)
}

/// Header cells belonging to the table at `table_pos` (not to tables
/// nested inside it), paired with their positions, in document order.
#[must_use]
pub fn header_cells(table: &Node, table_pos: usize) -> Vec<(usize, &Node)> {
    let mut out = Vec::new();
    for row in table_rows(table, table_pos) {
        for (offset, cell) in row.node.children_with_offsets() {
            if cell.kind() == NodeType::TableHeader {
                out.push((row.start() + offset, cell));
            }
        }
    }
    out
}

/// Every table in `doc` with its position, outermost first.
#[must_use]
pub fn tables(doc: &Node) -> Vec<(usize, &Node)> {
    let mut out = Vec::new();
    collect_tables(doc, 0, &mut out);
    out
}

fn collect_tables<'a>(node: &'a Node, content_start: usize, out: &mut Vec<(usize, &'a Node)>) {
    for (offset, child) in node.children_with_offsets() {
        if child.is_text() {
            continue;
        }
        let pos = content_start + offset;
        if child.kind() == NodeType::Table {
            out.push((pos, child));
        }
        collect_tables(child, pos + 1, out);
    }
}

/// Position of the innermost table containing `pos`.
#[must_use]
pub fn table_around(doc: &Node, pos: usize) -> Option<usize> {
    crate::host::find_parent_node_of_type(doc, pos, NodeType::Table).map(|found| found.pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{cell, doc, header, p, row, row_group, table};

    #[test]
    fn rows_look_through_groups() {
        let t = table(vec![
            row(vec![header("a"), header("b")]),
            row_group(vec![row(vec![cell("c"), cell("d"), cell("e")])]),
        ]);
        let rows = table_rows(&t, 0);
        assert_eq!(rows.len(), 2);
        // first row: 1..13 (two cells of size 5); the group opens at 13.
        assert_eq!(rows[0].pos, 1);
        assert_eq!(rows[1].pos, 14);
        assert_eq!(max_cell_count(&t), 3);
    }

    #[test]
    fn authoritative_row_prefers_first_maximum() {
        let d = doc(vec![table(vec![
            row(vec![cell("a")]),
            row(vec![cell("b"), cell("c")]),
            row(vec![cell("d"), cell("e")]),
        ])]);
        let row = authoritative_row(&d, 0).expect("table");
        // row 0 spans 1..8; second row opens at 8.
        assert_eq!(row.from, 9);
        assert_eq!(row.cell_count(), 2);
        assert_eq!(row.cells[0], CellSpan { index: 0, from: 9, to: 14 });
        assert_eq!(row.cells[1], CellSpan { index: 1, from: 14, to: 19 });
        assert_eq!(row.to, 19);
        assert_eq!(row.cells_within(14, 19), vec![1]);
        assert_eq!(row.insertion_index(14), 1);
        assert_eq!(row.insertion_index(9), 0);
        assert!(authoritative_row(&d, 1).is_none());
    }

    #[test]
    fn widths_attribute_parsing() {
        let t = table(vec![row(vec![cell("a"), cell("b")])]).with_attr(COLUMN_WIDTHS, "40,60");
        assert_eq!(column_widths(&t).as_slice(), &[40.0, 60.0]);
        assert_eq!(effective_column_widths(&t).as_slice(), &[40.0, 60.0]);

        let bad = t.clone().with_attr(COLUMN_WIDTHS, "40,x");
        assert!(column_widths(&bad).is_empty());
        assert_eq!(effective_column_widths(&bad).as_slice(), &[50.0, 50.0]);

        let short = t.with_attr(COLUMN_WIDTHS, "100");
        assert_eq!(effective_column_widths(&short).as_slice(), &[50.0, 50.0]);
    }

    #[test]
    fn flags_and_colours() {
        let t = table(vec![]).with_attr(LOCKED, true).with_attr(BORDER_COLOR, "");
        assert!(is_locked(&t));
        assert_eq!(border_color(&t), None);
        assert!(!is_locked(&table(vec![])));
        let h = header("x").with_attr(BACKGROUND_COLOR, "#fff");
        assert_eq!(header_background(&h), Some("#fff"));
    }

    #[test]
    fn header_cells_skip_nested_tables() {
        let nested = table(vec![row(vec![header("n")])]);
        let outer_cell = crate::node::Node::new(
            NodeType::TableCell,
            crate::node::Attrs::new(),
            vec![nested],
        );
        let t = table(vec![row(vec![header("a"), outer_cell])]);
        let headers = header_cells(&t, 0);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].0, 2);
    }

    #[test]
    fn tables_lists_outer_then_nested() {
        let nested = table(vec![row(vec![cell("n")])]);
        let outer_cell = crate::node::Node::new(
            NodeType::TableCell,
            crate::node::Attrs::new(),
            vec![nested],
        );
        let d = doc(vec![p("x"), table(vec![row(vec![outer_cell])])]);
        let found: Vec<usize> = tables(&d).into_iter().map(|(pos, _)| pos).collect();
        // p 0..3, table 3, row 4, cell 5, nested table 6.
        assert_eq!(found, vec![3, 6]);
        assert_eq!(table_around(&d, 8), Some(6));
        assert_eq!(table_around(&d, 1), None);
    }
}

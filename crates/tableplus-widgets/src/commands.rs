#![forbid(unsafe_code)]

//! Table commands bound to the selection.
//!
//! Every command reads the table around the selection head, builds one
//! transaction, and dispatches it through the host. Each returns whether
//! it applied.
//!
//! # Failure Modes
//!
//! - **No table at the selection**: the command returns `false`.
//! - **Host refuses the transaction**: logged at `warn`, returns `false`.
//! - **Locked table**: only [`TableCommand::UnsetTableAlign`] refuses;
//!   locking gates interactive resizing, not commands.
//!
//! Column duplication inserts into rows top to bottom, so the first row of
//! the table to grow is the widest one and the width vector follows it.

use std::fmt;

use tableplus_doc::builders::empty_like;
use tableplus_doc::table::{
    BACKGROUND_COLOR, BORDER_COLOR, COLUMN_WIDTHS, LOCKED, TEXT_ALIGN, header_background,
    is_locked, max_cell_count, table_rows,
};
use tableplus_doc::{
    Assoc, AttrValue, EditorHost, FoundNode, Node, NodeType, Transaction, TransactionOrigin,
    find_parent_node_of_type, find_parent_table_of_selection, for_each_descendant,
};
use tableplus_layout::ColumnWidths;

/// Row text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Start,
    End,
    Justify,
}

impl TextAlign {
    /// Parse a CSS `text-align` keyword.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "start" => Some(Self::Start),
            "end" => Some(Self::End),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Start => "start",
            Self::End => "end",
            Self::Justify => "justify",
        }
    }
}

impl fmt::Display for TextAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table command.
#[derive(Debug, Clone, PartialEq)]
pub enum TableCommand {
    SetTableAlign(TextAlign),
    UnsetTableAlign,
    ToggleTableLock,
    /// `None` clears every header's colour.
    SetHeaderBackground(Option<String>),
    /// `None` clears the border colour.
    SetTableBorderColor(Option<String>),
    DuplicateRow { with_content: bool },
    DuplicateColumn { with_content: bool },
    SetColumnWidths(ColumnWidths),
    EqualizeColumnWidths,
}

impl TableCommand {
    /// Stable name, also used as the transaction origin.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetTableAlign(_) => "setTableAlign",
            Self::UnsetTableAlign => "unsetTableAlign",
            Self::ToggleTableLock => "toggleTableLock",
            Self::SetHeaderBackground(_) => "setHeaderBackground",
            Self::SetTableBorderColor(_) => "setTableBorderColor",
            Self::DuplicateRow { .. } => "duplicateRow",
            Self::DuplicateColumn { .. } => "duplicateColumn",
            Self::SetColumnWidths(_) => "setColumnWidths",
            Self::EqualizeColumnWidths => "equalizeColumnWidths",
        }
    }

    /// Run against `host`. Returns whether a transaction was dispatched.
    pub fn run(&self, host: &mut dyn EditorHost) -> bool {
        let tr = {
            let state = host.state();
            let Some(table) = find_parent_table_of_selection(state) else {
                tracing::debug!(message = "command.no_table", command = self.name());
                return false;
            };
            let mut tr = state.tr().with_origin(TransactionOrigin::Command(self.name()));
            let built = match self {
                Self::SetTableAlign(align) => set_table_align(&mut tr, &table, *align),
                Self::UnsetTableAlign => unset_table_align(&mut tr, &table),
                Self::ToggleTableLock => {
                    tr.set_node_attr(table.pos, LOCKED, !is_locked(table.node)).is_ok()
                }
                Self::SetHeaderBackground(color) => {
                    set_header_background(&mut tr, &table, color.as_deref())
                }
                Self::SetTableBorderColor(color) => tr
                    .set_node_attr(table.pos, BORDER_COLOR, color.clone())
                    .is_ok(),
                Self::DuplicateRow { with_content } => {
                    duplicate_row(&mut tr, state.selection().head, &table, *with_content)
                }
                Self::DuplicateColumn { with_content } => {
                    duplicate_column(&mut tr, state.selection().head, &table, *with_content)
                }
                Self::SetColumnWidths(widths) => set_column_widths(&mut tr, &table, widths),
                Self::EqualizeColumnWidths => {
                    let widths = ColumnWidths::equal(max_cell_count(table.node));
                    set_column_widths(&mut tr, &table, &widths)
                }
            };
            if !built {
                return false;
            }
            tr
        };

        let steps = tr.steps().len();
        match host.dispatch(tr) {
            Ok(()) => {
                tracing::debug!(message = "command.run", command = self.name(), steps);
                true
            }
            Err(err) => {
                tracing::warn!(message = "command.failed", command = self.name(), error = %err);
                false
            }
        }
    }
}

/// Rows anywhere inside the table, nested tables included.
fn each_row(table: &FoundNode<'_>, mut visit: impl FnMut(usize, &Node)) {
    for_each_descendant(table.node, |node, offset| {
        if node.kind() == NodeType::TableRow {
            visit(table.start + offset, node);
        }
        true
    });
}

fn set_table_align(tr: &mut Transaction, table: &FoundNode<'_>, align: TextAlign) -> bool {
    let mut rows = Vec::new();
    each_row(table, |pos, _| rows.push(pos));
    !rows.is_empty()
        && rows
            .into_iter()
            .all(|pos| tr.set_node_attr(pos, TEXT_ALIGN, align.as_str()).is_ok())
}

fn unset_table_align(tr: &mut Transaction, table: &FoundNode<'_>) -> bool {
    if is_locked(table.node) {
        return false;
    }
    let mut targets = Vec::new();
    each_row(table, |pos, row| {
        if row.attr(TEXT_ALIGN).is_some_and(AttrValue::is_truthy) {
            let mut attrs = row.attrs().clone();
            attrs.remove(TEXT_ALIGN);
            targets.push((pos, attrs));
        }
    });
    !targets.is_empty()
        && targets
            .into_iter()
            .all(|(pos, attrs)| tr.set_node_attrs(pos, attrs).is_ok())
}

fn set_header_background(tr: &mut Transaction, table: &FoundNode<'_>, color: Option<&str>) -> bool {
    let color = color.filter(|c| !c.is_empty());
    let mut targets = Vec::new();
    for_each_descendant(table.node, |node, offset| {
        if node.kind() == NodeType::TableHeader && header_background(node) != color {
            let mut attrs = node.attrs().clone();
            match color {
                Some(c) => {
                    attrs.insert(BACKGROUND_COLOR.to_string(), AttrValue::from(c));
                }
                None => {
                    attrs.remove(BACKGROUND_COLOR);
                }
            }
            targets.push((table.start + offset, attrs));
        }
        true
    });
    !targets.is_empty()
        && targets
            .into_iter()
            .all(|(pos, attrs)| tr.set_node_attrs(pos, attrs).is_ok())
}

/// Innermost node of `kind` around `head`, if it lies inside `table`.
fn within_table<'a>(
    tr: &'a Transaction,
    head: usize,
    kind: NodeType,
    table: &FoundNode<'_>,
) -> Option<FoundNode<'a>> {
    find_parent_node_of_type(tr.doc(), head, kind).filter(|found| found.depth > table.depth)
}

fn duplicate_row(
    tr: &mut Transaction,
    head: usize,
    table: &FoundNode<'_>,
    with_content: bool,
) -> bool {
    let Some(row) = within_table(tr, head, NodeType::TableRow, table) else {
        return false;
    };
    let copy = if with_content {
        row.node.clone()
    } else {
        row.node
            .with_content(row.node.children().iter().map(empty_like).collect())
    };
    let at = row.pos + row.node.node_size();
    tr.insert(at, vec![copy]).is_ok()
}

fn duplicate_column(
    tr: &mut Transaction,
    head: usize,
    table: &FoundNode<'_>,
    with_content: bool,
) -> bool {
    let cell = [NodeType::TableCell, NodeType::TableHeader]
        .into_iter()
        .filter_map(|kind| within_table(tr, head, kind, table))
        .max_by_key(|found| found.depth);
    let Some(cell) = cell else {
        return false;
    };
    let Some(row) = within_table(tr, head, NodeType::TableRow, table) else {
        return false;
    };
    let Some(index) = row
        .node
        .children_with_offsets()
        .position(|(offset, _)| row.start + offset == cell.pos)
    else {
        return false;
    };

    // (position after the cell, copy) per row, computed on the starting
    // document and mapped as earlier rows grow.
    let inserts: Vec<(usize, Node)> = table_rows(table.node, table.pos)
        .into_iter()
        .filter_map(|row| {
            let (offset, source) = row.node.children_with_offsets().nth(index)?;
            let copy = if with_content {
                source.clone()
            } else {
                empty_like(source)
            };
            Some((row.start() + offset + source.node_size(), copy))
        })
        .collect();

    let mut applied = 0usize;
    for (pos, copy) in inserts {
        let at = tr.mapping().map(pos, Assoc::After);
        if tr.insert(at, vec![copy]).is_err() {
            return false;
        }
        applied += 1;
    }
    applied > 0
}

fn set_column_widths(tr: &mut Transaction, table: &FoundNode<'_>, widths: &ColumnWidths) -> bool {
    if !widths.fits(max_cell_count(table.node)) {
        return false;
    }
    let serialized = widths.serialize();
    if table.node.attr_str(COLUMN_WIDTHS) == Some(serialized.as_str()) {
        return false;
    }
    tr.set_node_attr(table.pos, COLUMN_WIDTHS, serialized).is_ok()
}

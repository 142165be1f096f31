#![forbid(unsafe_code)]

//! Column-width reconciliation.
//!
//! After every dispatched transaction the reconciler looks at the replace
//! steps that added or removed whole cells in a table's authoritative row
//! and rewrites that table's `columnWidths` so its length follows the
//! column count. It also spreads a table's header highlight colour to
//! header cells that have none.
//!
//! # Invariants
//!
//! - The pass never fails: any position that does not resolve, any vector
//!   whose length already disagrees with the row, and any transaction
//!   touching more than one table leaves the widths as they are.
//! - A vector is only written back to the table it was computed for. When
//!   a later step removes, replaces or moves that table, the vector is
//!   dropped rather than landing on whatever now sits at its position.
//! - The pass is idempotent. Its own transaction holds attribute steps
//!   only, and a second run over the resulting document appends nothing.
//! - Widths are never renormalised here. Inserted columns get the average
//!   of the remaining ones, so the total may drift from 100 until the next
//!   drag commit or equalisation.

use std::collections::BTreeMap;

use tableplus_doc::host::find_parent_node_of_type;
use tableplus_doc::table::{
    BACKGROUND_COLOR, COLUMN_WIDTHS, authoritative_row, column_widths, header_background,
    header_cells, tables,
};
use tableplus_doc::{
    EditorState, Mapping, Node, NodeType, ReplaceStep, Transaction, TransactionOrigin,
};
use tableplus_layout::{ColumnWidths, inserted_column_width};
use tracing::{debug, debug_span, trace};
use web_time::Instant;

use crate::config::ReconcileConfig;
use crate::plugin::Plugin;

/// Plugin key of the reconciler.
pub const PLUGIN_KEY: &str = "tablePlusPlugin";

/// What a replace step did to the cells of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEdit {
    /// Removed whole cells, inserted none.
    Remove,
    /// Inserted `count` cells without removing any.
    Insert { count: usize },
    /// Removed whole cells and inserted `count` cells in their place.
    Replace { count: usize },
}

impl CellEdit {
    /// Classify a replace step against the document it was applied to.
    ///
    /// Inserted content made only of cells makes an insertion. A non-empty
    /// range whose ends both sit on cell boundaries of one row makes a
    /// removal. Anything else (text edits inside a cell, whole rows) is not
    /// a cell edit.
    #[must_use]
    pub fn classify(step: &ReplaceStep, before: &Node) -> Option<Self> {
        let inserted = (!step.content.is_empty()
            && step.content.iter().all(|n| n.kind().is_cell()))
        .then_some(step.content.len());
        let removes = step.removes()
            && before
                .resolve(step.from)
                .is_ok_and(|r| r.text_offset() == 0 && r.parent().kind() == NodeType::TableRow);
        match (removes, inserted) {
            (true, None) => Some(Self::Remove),
            (false, Some(count)) => Some(Self::Insert { count }),
            (true, Some(count)) => Some(Self::Replace { count }),
            (false, None) => None,
        }
    }

    /// Whether cells were removed.
    #[must_use]
    pub const fn removes(self) -> bool {
        matches!(self, Self::Remove | Self::Replace { .. })
    }

    /// Number of inserted cells.
    #[must_use]
    pub const fn inserted(self) -> usize {
        match self {
            Self::Remove => 0,
            Self::Insert { count } | Self::Replace { count } => count,
        }
    }
}

/// Why a step did not change a width vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Replace steps in one transaction touched several tables.
    MultiTable,
    /// The step edited a row other than the authoritative one.
    NonAuthoritativeRow,
    /// The stored vector length differs from the row's cell count.
    LengthMismatch,
    /// A position no longer resolves to a table.
    StalePosition,
    /// A later step removed or replaced the edited table.
    TableRemoved,
}

impl SkipReason {
    /// Log label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultiTable => "multi_table",
            Self::NonAuthoritativeRow => "non_authoritative_row",
            Self::LengthMismatch => "length_mismatch",
            Self::StalePosition => "stale_position",
            Self::TableRemoved => "table_removed",
        }
    }
}

/// A cell edit located in one table.
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    step: &'a ReplaceStep,
    before: &'a Node,
    edit: CellEdit,
    /// Table position in `before`.
    table_pos: usize,
    /// Table range in the final document.
    final_pos: usize,
    final_end: usize,
}

/// A corrected vector and the end of the table it belongs to.
#[derive(Debug, Clone, PartialEq)]
struct Pending {
    end: usize,
    widths: ColumnWidths,
}

/// Keeps table width vectors in step with structural edits.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWidthReconciler {
    min_column_share: f64,
}

impl Default for ColumnWidthReconciler {
    fn default() -> Self {
        Self::new(&ReconcileConfig::default())
    }
}

impl ColumnWidthReconciler {
    /// Reconciler using the configured inserted-column floor.
    #[must_use]
    pub fn new(config: &ReconcileConfig) -> Self {
        Self {
            min_column_share: config.min_column_share,
        }
    }

    /// Smallest percentage given to an inserted column.
    #[must_use]
    pub const fn min_column_share(&self) -> f64 {
        self.min_column_share
    }

    /// The corrective transaction for `transactions`, which led to
    /// `new_state`, or `None` when everything is consistent.
    #[must_use]
    pub fn reconcile(
        &self,
        transactions: &[Transaction],
        new_state: &EditorState,
    ) -> Option<Transaction> {
        let _span = debug_span!("reconcile.pass", transactions = transactions.len()).entered();
        let start = Instant::now();

        let mut pending: BTreeMap<usize, Pending> = BTreeMap::new();
        for (index, tr) in transactions.iter().enumerate() {
            if !tr.doc_changed() {
                continue;
            }
            let mut later = Mapping::default();
            for next in &transactions[index + 1..] {
                later.extend(&next.mapping());
            }
            self.collect_widths(tr, &later, &mut pending);
        }

        let mut tr = new_state
            .tr()
            .with_origin(TransactionOrigin::Plugin(PLUGIN_KEY));
        let corrected = apply_widths(&mut tr, &pending);
        let painted = propagate_header_colors(&mut tr);

        debug!(
            target: "tableplus.reconcile",
            corrected_tables = corrected,
            painted_headers = painted,
            duration_us = start.elapsed().as_micros() as u64,
            "reconcile pass finished"
        );
        tr.doc_changed().then_some(tr)
    }

    /// Thread the width vector of the one table `tr` edited through its
    /// cell edits, recording the result under the table's final position.
    fn collect_widths(
        &self,
        tr: &Transaction,
        later: &Mapping,
        pending: &mut BTreeMap<usize, Pending>,
    ) {
        let mut touched: Vec<usize> = Vec::new();
        let mut candidates: Vec<Candidate<'_>> = Vec::new();

        for (i, step) in tr.steps().iter().enumerate() {
            let Some(step) = step.as_replace() else {
                continue;
            };
            let Some(before) = tr.doc_before_step(i) else {
                continue;
            };
            let Some(table) = find_parent_node_of_type(before, step.from, NodeType::Table) else {
                continue;
            };
            let mut to_final = tr.mapping_from(i);
            to_final.extend(later);
            let span_of = |pos: usize, node: &Node| to_final.map_span(pos, pos + node.node_size());

            let edit = CellEdit::classify(step, before);
            let Some((final_pos, final_end)) = span_of(table.pos, table.node) else {
                if edit.is_some() {
                    log_skip(SkipReason::TableRemoved, table.pos);
                }
                continue;
            };
            let mut spanned = vec![final_pos];
            if let Some((pos, _)) = find_parent_node_of_type(before, step.to, NodeType::Table)
                .filter(|other| other.pos != table.pos)
                .and_then(|other| span_of(other.pos, other.node))
            {
                spanned.push(pos);
            }
            for pos in spanned {
                if !touched.contains(&pos) {
                    touched.push(pos);
                }
            }
            if let Some(edit) = edit {
                trace!(target: "tableplus.reconcile", step = i, ?edit, "cell edit");
                candidates.push(Candidate {
                    step,
                    before,
                    edit,
                    table_pos: table.pos,
                    final_pos,
                    final_end,
                });
            }
        }

        if candidates.is_empty() {
            return;
        }
        if touched.len() > 1 {
            log_skip(SkipReason::MultiTable, touched.len());
            return;
        }

        for candidate in candidates {
            let current = pending.get(&candidate.final_pos).map(|p| &p.widths);
            match self.apply_edit(&candidate, current) {
                Ok(widths) => {
                    pending.insert(
                        candidate.final_pos,
                        Pending {
                            end: candidate.final_end,
                            widths,
                        },
                    );
                }
                Err(reason) => log_skip(reason, candidate.table_pos),
            }
        }
    }

    /// Width vector after one cell edit, starting from `current` (or the
    /// vector stored on the table when this is the first edit).
    fn apply_edit(
        &self,
        candidate: &Candidate<'_>,
        current: Option<&ColumnWidths>,
    ) -> Result<ColumnWidths, SkipReason> {
        let Candidate {
            step,
            before,
            edit,
            table_pos,
            ..
        } = *candidate;
        let row = authoritative_row(before, table_pos).ok_or(SkipReason::StalePosition)?;
        if !row.contains_range(step.from, step.to) {
            return Err(SkipReason::NonAuthoritativeRow);
        }
        let current = match current {
            Some(widths) => widths.clone(),
            None => before
                .node_at(table_pos)
                .map(column_widths)
                .ok_or(SkipReason::StalePosition)?,
        };
        if current.len() != row.cell_count() {
            return Err(SkipReason::LengthMismatch);
        }

        let remaining = if edit.removes() {
            let removed = row.cells_within(step.from, step.to);
            match removed.first() {
                Some(&first) => current.without_range(first, removed.len()),
                None => current,
            }
        } else {
            current
        };

        let count = edit.inserted();
        if count == 0 {
            return Ok(remaining);
        }
        let width = inserted_column_width(&remaining, count, self.min_column_share);
        let index = row.insertion_index(step.from);
        Ok(remaining.with_inserted(index, &vec![width; count]))
    }
}

impl Plugin for ColumnWidthReconciler {
    fn key(&self) -> &'static str {
        PLUGIN_KEY
    }

    fn append_transaction(
        &self,
        transactions: &[Transaction],
        _old_state: &EditorState,
        new_state: &EditorState,
    ) -> Option<Transaction> {
        self.reconcile(transactions, new_state)
    }
}

fn log_skip(reason: SkipReason, detail: usize) {
    debug!(
        target: "tableplus.reconcile",
        reason = reason.as_str(),
        detail,
        "width correction skipped"
    );
}

/// Write every pending vector that differs from the stored one. Returns
/// the number of tables corrected.
fn apply_widths(tr: &mut Transaction, pending: &BTreeMap<usize, Pending>) -> usize {
    let mut corrected = 0;
    for (&pos, Pending { end, widths }) in pending {
        let stored = match tr.doc().node_at(pos) {
            Some(node) if node.kind() == NodeType::Table && pos + node.node_size() == *end => {
                column_widths(node).serialize()
            }
            _ => {
                log_skip(SkipReason::StalePosition, pos);
                continue;
            }
        };
        let next = widths.serialize();
        if stored == next {
            continue;
        }
        match tr.set_node_attr(pos, COLUMN_WIDTHS, next.clone()) {
            Ok(_) => {
                debug!(
                    target: "tableplus.reconcile",
                    table = pos,
                    from = %stored,
                    to = %next,
                    "column widths corrected"
                );
                corrected += 1;
            }
            Err(err) => debug!(
                target: "tableplus.reconcile",
                table = pos,
                error = %err,
                "column width correction failed"
            ),
        }
    }
    corrected
}

/// Give every uncoloured header cell its table's first header colour.
/// Returns the number of cells painted.
fn propagate_header_colors(tr: &mut Transaction) -> usize {
    let doc = tr.doc().clone();
    let mut painted = 0;
    for (table_pos, table) in tables(&doc) {
        let headers = header_cells(table, table_pos);
        let Some(color) = headers.iter().find_map(|(_, cell)| header_background(cell)) else {
            continue;
        };
        for (pos, cell) in &headers {
            if header_background(cell).is_some() {
                continue;
            }
            if tr.set_node_attr(*pos, BACKGROUND_COLOR, color).is_ok() {
                painted += 1;
            }
        }
    }
    if painted > 0 {
        debug!(target: "tableplus.reconcile", painted, "header colour propagated");
    }
    painted
}

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tableplus_doc::builders::{cell, doc, row, table};
use tableplus_doc::table::{COLUMN_WIDTHS, authoritative_row, column_widths, max_cell_count};
use tableplus_doc::EditorHost;
use tableplus_layout::ColumnWidths;
use tableplus_runtime::{Editor, TablePlusConfig};

#[derive(Debug, Arbitrary)]
enum Edit {
    Insert { at: u8, count: u8 },
    Delete { start: u8, count: u8 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    shares: Vec<u8>,
    edits: Vec<Edit>,
}

fuzz_target!(|input: Input| {
    // 1..8 columns with positive shares.
    let shares: Vec<f64> = input
        .shares
        .iter()
        .take(8)
        .map(|s| f64::from(*s % 60) + 1.0)
        .collect();
    if shares.is_empty() || input.edits.len() > 16 {
        return;
    }
    let cells = (0..shares.len()).map(|i| cell(&i.to_string())).collect();
    let start = doc(vec![
        table(vec![row(cells)]).with_attr(COLUMN_WIDTHS, ColumnWidths::new(shares).serialize()),
    ]);
    let mut editor = Editor::with_table_plus(start, &TablePlusConfig::default());

    for edit in &input.edits {
        let Some(auth) = authoritative_row(editor.state().doc(), 0) else {
            return;
        };
        let columns = auth.cells.len();
        let mut tr = editor.state().tr();
        let applied = match *edit {
            Edit::Insert { at, count } => {
                let at = usize::from(at) % (columns + 1);
                let count = usize::from(count % 3) + 1;
                let pos = auth.cells.get(at).map_or(auth.to, |c| c.from);
                tr.insert(pos, (0..count).map(|_| cell("n")).collect()).is_ok()
            }
            Edit::Delete { start, count } => {
                // keep at least one column
                if columns < 2 {
                    continue;
                }
                let start = usize::from(start) % columns;
                let count = (usize::from(count) % 3 + 1).min(columns - start).min(columns - 1);
                let from = auth.cells[start].from;
                let to = auth.cells[start + count - 1].to;
                tr.delete(from, to).is_ok()
            }
        };
        if !applied || editor.dispatch(tr).is_err() {
            return;
        }

        let doc = editor.state().doc();
        let Some(t) = doc.child(0) else {
            return;
        };
        let widths = column_widths(t);
        assert_eq!(widths.len(), max_cell_count(t), "{edit:?} left {widths:?}");
        assert!(widths.as_slice().iter().all(|w| w.is_finite() && *w >= 0.0));
    }
});

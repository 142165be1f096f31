//! Diagnostic events emitted while the editor reconciles widths.

use std::sync::{Arc, Mutex};

use tableplus_doc::builders::{cell, doc, row, table};
use tableplus_doc::table::COLUMN_WIDTHS;
use tableplus_doc::{EditorHost, Node};
use tableplus_runtime::{Editor, TablePlusConfig};
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Default, Clone, PartialEq)]
struct Record {
    target: String,
    message: String,
    reason: Option<String>,
}

impl Visit for Record {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "reason" {
            self.reason = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

struct Recorder(Arc<Mutex<Vec<Record>>>);

impl<S: Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut record = Record {
            target: event.metadata().target().to_string(),
            ..Record::default()
        };
        event.record(&mut record);
        self.0.lock().expect("records lock").push(record);
    }
}

fn capture(directives: &str, f: impl FnOnce()) -> Vec<Record> {
    let records = Arc::new(Mutex::new(Vec::new()));
    let layer = Recorder(Arc::clone(&records)).with_filter(EnvFilter::new(directives));
    tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), f);
    let out = records.lock().expect("records lock").clone();
    out
}

fn three_cells(widths: &str) -> Node {
    doc(vec![
        table(vec![row(vec![cell("a"), cell("b"), cell("c")])]).with_attr(COLUMN_WIDTHS, widths),
    ])
}

#[test]
fn length_mismatch_is_reported_as_a_skip() {
    let records = capture("tableplus.reconcile=debug", || {
        let mut editor = Editor::with_table_plus(three_cells("50,50"), &TablePlusConfig::default());
        let mut tr = editor.state().tr();
        tr.delete(7, 12).expect("delete");
        editor.dispatch(tr).expect("dispatch");
    });

    assert!(records.iter().all(|r| r.target == "tableplus.reconcile"));
    let skip = records
        .iter()
        .find(|r| r.message == "width correction skipped")
        .expect("skip event");
    assert_eq!(skip.reason.as_deref(), Some("length_mismatch"));
    assert!(!records.iter().any(|r| r.message == "column widths corrected"));
}

#[test]
fn a_correction_is_logged_by_reconciler_and_editor() {
    let records = capture("tableplus=debug", || {
        let mut editor = Editor::with_table_plus(three_cells("30,30,40"), &TablePlusConfig::default());
        let mut tr = editor.state().tr();
        tr.delete(7, 12).expect("delete");
        editor.dispatch(tr).expect("dispatch");
    });

    let messages: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.target.as_str(), r.message.as_str()))
        .collect();
    assert!(messages.contains(&("tableplus.reconcile", "column widths corrected")));
    assert!(messages.contains(&("tableplus.editor", "appended transaction")));
    assert!(messages.contains(&("tableplus.editor", "dispatched")));
}

#[test]
fn filter_hides_reconciler_detail_at_info() {
    let records = capture("info", || {
        let mut editor = Editor::with_table_plus(three_cells("30,30,40"), &TablePlusConfig::default());
        let mut tr = editor.state().tr();
        tr.delete(7, 12).expect("delete");
        editor.dispatch(tr).expect("dispatch");
    });
    assert!(records.is_empty(), "{records:?}");
}

#[test]
fn removing_the_edited_table_is_reported() {
    let records = capture("tableplus.reconcile=debug", || {
        let mut editor = Editor::with_table_plus(three_cells("30,30,40"), &TablePlusConfig::default());
        let mut tr = editor.state().tr();
        tr.delete(7, 12).expect("delete cell");
        tr.delete(0, 14).expect("delete table");
        editor.dispatch(tr).expect("dispatch");
    });

    let skip = records
        .iter()
        .find(|r| r.message == "width correction skipped")
        .expect("skip event");
    assert_eq!(skip.reason.as_deref(), Some("table_removed"));
    assert!(!records.iter().any(|r| r.message == "column widths corrected"));
}

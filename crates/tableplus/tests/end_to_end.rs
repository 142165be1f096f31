//! Whole-system scenarios: edits, reconciliation, drags, and commands
//! running against one in-memory editor.

use tableplus::doc::builders::{cell, doc, header, p, row, row_group, table};
use tableplus::doc::table::{LOCKED, column_widths, header_background, table_rows};
use tableplus::prelude::*;
use tableplus::{BACKGROUND_COLOR, EditorState, NodeType, Selection};

fn widths_of(editor: &Editor, index: usize) -> String {
    let doc = editor.state().doc();
    let (_, t) = tableplus::doc::table::tables(doc)[index];
    column_widths(t).serialize()
}

fn editor(d: Node) -> Editor {
    Editor::with_table_plus(d, &TablePlusConfig::default())
}

#[test]
fn delete_then_insert_keeps_widths_in_step() -> Result<()> {
    let mut editor = editor(doc(vec![
        table(vec![row(vec![cell("a"), cell("b"), cell("c")])]).with_attr(COLUMN_WIDTHS, "30,30,40"),
    ]));

    // cells at 2, 7, 12
    let mut tr = editor.state().tr();
    tr.delete(7, 12)?;
    editor.dispatch(tr)?;
    assert_eq!(widths_of(&editor, 0), "30,40");

    // insert a new second column
    let mut tr = editor.state().tr();
    tr.insert(7, vec![cell("new")])?;
    editor.dispatch(tr)?;
    assert_eq!(widths_of(&editor, 0), "30,35,40");

    // one user transaction plus one correction
    assert_eq!(editor.last_transactions().len(), 2);
    Ok(())
}

#[test]
fn header_colour_spreads_once() -> Result<()> {
    let mut editor = editor(doc(vec![table(vec![
        row(vec![header("A"), header("B"), header("C")]),
        row(vec![cell("1"), cell("2"), cell("3")]),
    ])]));

    // colour only B (at 7)
    let mut tr = editor.state().tr();
    tr.set_node_attr(7, BACKGROUND_COLOR, "#fff")?;
    editor.dispatch(tr)?;

    let t = editor.state().doc().child(0).expect("table");
    let colours: Vec<_> = table_rows(t, 0)[0]
        .node
        .children()
        .iter()
        .map(header_background)
        .collect();
    assert_eq!(colours, vec![Some("#fff"); 3]);
    assert_eq!(editor.last_transactions().len(), 2);

    // settled: an unrelated edit appends nothing
    let mut tr = editor.state().tr();
    tr.insert(22, vec![Node::text("x")])?;
    editor.dispatch(tr)?;
    assert_eq!(editor.last_transactions().len(), 1);
    Ok(())
}

#[test]
fn locked_drag_writes_nothing() {
    let mut editor = editor(doc(vec![
        table(vec![row(vec![cell("a"), cell("b")])])
            .with_attr(COLUMN_WIDTHS, "50,50")
            .with_attr(LOCKED, true),
    ]));
    let hints = Observable::new(DirectionHints::ltr());
    let mut views = TableViews::attach(&editor, TablePlusConfig::default(), hints);
    let bounds = Rect::new(0.0, 0.0, 600.0, 20.0);

    let controller = views.at_mut(0).expect("controller");
    assert!(!controller.pointer_down(0, &PointerEvent::down(300.0, 5.0)));
    assert!(!views.drag(&PointerEvent::moved(100.0, 5.0), bounds));
    let outcome = views.release(0, &PointerEvent::up(100.0, 5.0), &mut editor);

    assert_eq!(outcome, CommitOutcome::Ignored);
    assert_eq!(editor.dispatch_count(), 0);
    assert_eq!(widths_of(&editor, 0), "50,50");
    assert!(views.at(0).expect("controller").view().locked);
}

#[test]
fn drag_commit_then_structural_edit() -> Result<()> {
    let mut editor = editor(doc(vec![
        p("intro"),
        table(vec![row(vec![cell("a"), cell("b"), cell("c")])]).with_attr(COLUMN_WIDTHS, "30,30,40"),
    ]));
    let hints = Observable::new(DirectionHints::ltr());
    let mut views = TableViews::attach(&editor, TablePlusConfig::default(), hints);
    let bounds = Rect::new(0.0, 0.0, 1000.0, 20.0);

    // p("intro") spans 0..7; the table starts at 7
    let controller = views.at_mut(7).expect("controller");
    assert!(controller.pointer_down(1, &PointerEvent::down(600.0, 5.0)));
    assert!(views.drag(&PointerEvent::moved(800.0, 5.0), bounds));
    let outcome = views.release(7, &PointerEvent::up(800.0, 5.0), &mut editor);
    assert_eq!(
        outcome,
        CommitOutcome::Committed(ColumnWidths::new(vec![30.0, 50.0, 20.0]))
    );
    assert_eq!(widths_of(&editor, 0), "30,50,20");

    // remove the first cell; the row opens at 8 with cells at 9, 14, 19
    let mut tr = editor.state().tr();
    tr.delete(9, 14)?;
    editor.dispatch(tr)?;
    assert_eq!(widths_of(&editor, 0), "50,20");

    views.sync(editor.state().doc());
    let controller = views.at(7).expect("controller");
    assert_eq!(controller.column_count(), 2);
    assert_eq!(controller.handle_offsets(), &[50.0, 70.0]);
    Ok(())
}

#[test]
fn duplicate_column_is_reconciled_in_the_same_dispatch() {
    let d = doc(vec![
        table(vec![
            row(vec![header("h1"), header("h2")]),
            row_group(vec![row(vec![cell("a"), cell("b")])]),
        ])
        .with_attr(COLUMN_WIDTHS, "20,80"),
    ]);
    let mut editor = editor(d.clone());
    // inside "h2": header at 8, paragraph at 9, text from 10
    editor.set_state(EditorState::new(d).with_selection(Selection::cursor(10)));

    assert!(TableCommand::DuplicateColumn { with_content: false }.run(&mut editor));
    assert_eq!(widths_of(&editor, 0), "20,80,50");
    let t = editor.state().doc().child(0).expect("table");
    assert!(table_rows(t, 0).iter().all(|r| r.node.child_count() == 3));
}

#[test]
fn nested_tables_keep_their_own_widths() -> Result<()> {
    let inner = table(vec![row(vec![cell("x"), cell("y")])]).with_attr(COLUMN_WIDTHS, "60,40");
    let outer_cell = Node::new(NodeType::TableCell, Default::default(), vec![inner]);
    let mut editor = editor(doc(vec![
        table(vec![row(vec![outer_cell, cell("z")])]).with_attr(COLUMN_WIDTHS, "70,30"),
    ]));
    // outer table 0, row 1, outer cell 2, inner table 3, inner row 4,
    // inner cells at 5 and 10
    let mut tr = editor.state().tr();
    tr.delete(10, 15)?;
    editor.dispatch(tr)?;
    assert_eq!(widths_of(&editor, 0), "70,30");
    assert_eq!(widths_of(&editor, 1), "60");
    Ok(())
}

#[test]
fn equalize_repairs_a_drifted_vector() -> Result<()> {
    let d = doc(vec![
        table(vec![row(vec![cell("a"), cell("b"), cell("c")])]).with_attr(COLUMN_WIDTHS, "30,35,40"),
    ]);
    let mut editor = editor(d.clone());
    editor.set_state(EditorState::new(d).with_selection(Selection::cursor(4)));
    assert!(TableCommand::EqualizeColumnWidths.run(&mut editor));
    assert_eq!(widths_of(&editor, 0), "33,33,34");
    Ok(())
}

#![forbid(unsafe_code)]

//! One resize controller per table in a document.
//!
//! [`TableViews`] plays the host's node-view bookkeeping: after every
//! dispatch, [`TableViews::sync`] walks the document's tables in order and
//! updates the controller already bound to that slot, creates one for a new
//! table, and disposes controllers whose table went away.

use ahash::AHashMap;
use tableplus_core::DirectionHints;
use tableplus_core::event::PointerEvent;
use tableplus_core::geometry::Rect;
use tableplus_core::reactive::Observable;
use tableplus_doc::table::tables;
use tableplus_doc::{EditorHost, Node};
use tableplus_runtime::TablePlusConfig;

use crate::resize::{CommitOutcome, TableResizeController};

/// What a [`TableViews::sync`] call changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub disposed: usize,
}

/// Controllers for every table of one editor, in document order.
#[derive(Debug)]
pub struct TableViews {
    config: TablePlusConfig,
    hints: Observable<DirectionHints>,
    controllers: Vec<TableResizeController>,
    /// Table position to index in `controllers`.
    by_pos: AHashMap<usize, usize>,
}

impl TableViews {
    #[must_use]
    pub fn new(config: TablePlusConfig, hints: Observable<DirectionHints>) -> Self {
        Self {
            config,
            hints,
            controllers: Vec::new(),
            by_pos: AHashMap::new(),
        }
    }

    /// Registry already synced with `host`'s document.
    #[must_use]
    pub fn attach(
        host: &dyn EditorHost,
        config: TablePlusConfig,
        hints: Observable<DirectionHints>,
    ) -> Self {
        let mut views = Self::new(config, hints);
        views.sync(host.state().doc());
        views
    }

    /// Bring the controllers in line with `doc`.
    pub fn sync(&mut self, doc: &Node) -> SyncReport {
        let found = tables(doc);
        let mut report = SyncReport::default();

        for (slot, (pos, node)) in found.iter().enumerate() {
            match self.controllers.get_mut(slot) {
                Some(controller) => {
                    if controller.update(node, *pos) {
                        report.updated += 1;
                    } else {
                        controller.dispose();
                        *controller =
                            TableResizeController::new(node, *pos, &self.config, &self.hints);
                        report.created += 1;
                    }
                }
                None => {
                    self.controllers.push(TableResizeController::new(
                        node,
                        *pos,
                        &self.config,
                        &self.hints,
                    ));
                    report.created += 1;
                }
            }
        }

        for mut stale in self.controllers.drain(found.len()..) {
            stale.dispose();
            report.disposed += 1;
        }

        self.by_pos.clear();
        self.by_pos.extend(
            self.controllers
                .iter()
                .enumerate()
                .map(|(index, c)| (c.table_pos(), index)),
        );

        if report.created > 0 || report.disposed > 0 {
            tracing::debug!(
                message = "views.sync",
                tables = self.controllers.len(),
                created = report.created,
                disposed = report.disposed
            );
        }
        report
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Controllers in document order.
    pub fn iter(&self) -> impl Iterator<Item = &TableResizeController> {
        self.controllers.iter()
    }

    /// Controller of the `index`-th table.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TableResizeController> {
        self.controllers.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TableResizeController> {
        self.controllers.get_mut(index)
    }

    /// Controller of the table starting at `pos`.
    #[must_use]
    pub fn at(&self, pos: usize) -> Option<&TableResizeController> {
        self.by_pos.get(&pos).and_then(|i| self.controllers.get(*i))
    }

    pub fn at_mut(&mut self, pos: usize) -> Option<&mut TableResizeController> {
        let index = *self.by_pos.get(&pos)?;
        self.controllers.get_mut(index)
    }

    /// Start a drag on `handle` of the table at `pos`.
    ///
    /// Drags left running in other tables lost their pointer-up somewhere;
    /// they are cancelled so moves reach the new one. Returns whether the
    /// drag started.
    pub fn press(&mut self, pos: usize, handle: usize, event: &PointerEvent) -> bool {
        let Some(&index) = self.by_pos.get(&pos) else {
            return false;
        };
        for (i, controller) in self.controllers.iter_mut().enumerate() {
            if i != index {
                controller.pointer_cancel();
            }
        }
        self.controllers
            .get_mut(index)
            .is_some_and(|c| c.pointer_down(handle, event))
    }

    /// Complete a drag on the table at `pos`, then re-sync with the
    /// resulting document.
    pub fn release(
        &mut self,
        pos: usize,
        event: &PointerEvent,
        host: &mut dyn EditorHost,
    ) -> CommitOutcome {
        let outcome = match self.at_mut(pos) {
            Some(controller) => controller.pointer_up(event, host),
            None => CommitOutcome::Ignored,
        };
        self.sync(host.state().doc());
        outcome
    }

    /// Forward a pointer-move to whichever controller is dragging.
    pub fn drag(&mut self, event: &PointerEvent, bounds: Rect) -> bool {
        self.controllers
            .iter_mut()
            .find(|c| c.is_dragging())
            .is_some_and(|c| c.pointer_move(event, bounds))
    }

    /// Dispose every controller.
    pub fn clear(&mut self) {
        for controller in &mut self.controllers {
            controller.dispose();
        }
        self.controllers.clear();
        self.by_pos.clear();
    }
}

impl Drop for TableViews {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use tableplus_doc::builders::{cell, doc, p, row, table};
    use tableplus_doc::table::COLUMN_WIDTHS;
    use tableplus_runtime::Editor;

    use super::*;

    fn two_tables() -> Node {
        doc(vec![
            table(vec![row(vec![cell("a"), cell("b")])]).with_attr(COLUMN_WIDTHS, "40,60"),
            p("between"),
            table(vec![row(vec![cell("c")])]),
        ])
    }

    fn views() -> (TableViews, Observable<DirectionHints>) {
        let hints = Observable::new(DirectionHints::ltr());
        (TableViews::new(TablePlusConfig::default(), hints.clone()), hints)
    }

    #[test]
    fn creates_one_controller_per_table() {
        let (mut views, hints) = views();
        let report = views.sync(&two_tables());
        assert_eq!(report.created, 2);
        assert_eq!(views.len(), 2);
        // first table 0..14, paragraph 14..23
        assert_eq!(views.get(1).map(TableResizeController::table_pos), Some(23));
        assert!(views.at(23).is_some());
        assert_eq!(hints.live_subscriber_count(), 2);
    }

    #[test]
    fn removed_tables_are_disposed() {
        let (mut views, hints) = views();
        views.sync(&two_tables());
        let report = views.sync(&doc(vec![p("gone")]));
        assert_eq!(report.disposed, 2);
        assert!(views.is_empty());
        assert_eq!(hints.live_subscriber_count(), 0);
    }

    #[test]
    fn second_sync_updates_in_place() {
        let (mut views, _) = views();
        views.sync(&two_tables());
        let report = views.sync(&two_tables());
        assert_eq!(
            report,
            SyncReport {
                created: 0,
                updated: 2,
                disposed: 0
            }
        );
    }

    #[test]
    fn release_commits_and_resyncs() {
        let mut editor = Editor::with_table_plus(two_tables(), &TablePlusConfig::default());
        let hints = Observable::new(DirectionHints::ltr());
        let mut views = TableViews::attach(&editor, TablePlusConfig::default(), hints);
        let bounds = Rect::new(0.0, 0.0, 1000.0, 30.0);

        assert!(
            views
                .at_mut(0)
                .expect("first table")
                .pointer_down(0, &PointerEvent::down(400.0, 5.0))
        );
        assert!(views.drag(&PointerEvent::moved(250.0, 5.0), bounds));
        let outcome = views.release(0, &PointerEvent::up(250.0, 5.0), &mut editor);
        assert!(outcome.is_committed());
        let first = views.at(0).expect("first table");
        assert_eq!(first.cell_percentage().as_slice(), &[25.0, 75.0]);
        assert_eq!(first.node().attr_str(COLUMN_WIDTHS), Some("25,75"));
    }

    #[test]
    fn press_elsewhere_cancels_a_drag_that_lost_its_release() {
        let (mut views, _) = views();
        views.sync(&two_tables());
        let bounds = Rect::new(0.0, 0.0, 1000.0, 30.0);

        assert!(views.press(0, 0, &PointerEvent::down(400.0, 5.0)));
        assert!(views.drag(&PointerEvent::moved(250.0, 5.0), bounds));
        assert_eq!(
            views.at(0).expect("first table").cell_percentage().as_slice(),
            &[25.0, 75.0]
        );

        assert!(views.press(23, 0, &PointerEvent::down(900.0, 5.0)));
        let first = views.at(0).expect("first table");
        assert!(!first.is_dragging());
        assert_eq!(first.cell_percentage().as_slice(), &[40.0, 60.0]);
        assert!(views.at(23).expect("second table").is_dragging());
        assert!(!views.press(99, 0, &PointerEvent::down(0.0, 0.0)));
    }

    #[test]
    fn dropping_the_registry_releases_subscriptions() {
        let (mut views, hints) = views();
        views.sync(&two_tables());
        drop(views);
        assert_eq!(hints.live_subscriber_count(), 0);
    }
}

#![forbid(unsafe_code)]

//! In-memory editor host.
//!
//! [`Editor`] owns the current [`EditorState`] and implements the
//! dispatch cycle: apply the transaction, then let every plugin append
//! corrective transactions until none does, bounded by a round limit. The
//! final state is published once, after the whole cycle.

use std::fmt;

use tableplus_core::reactive::{Observable, Subscription};
use tableplus_doc::{DispatchError, EditorHost, EditorState, Node, Transaction};
use tracing::{debug, warn};
use web_time::Instant;

use crate::config::TablePlusConfig;
use crate::plugin::Plugin;
use crate::reconcile::ColumnWidthReconciler;

/// Default bound on append rounds per dispatch.
pub const DEFAULT_MAX_APPEND_ROUNDS: usize = 8;

/// An editor holding one document and a plugin chain.
pub struct Editor {
    state: EditorState,
    plugins: Vec<Box<dyn Plugin>>,
    max_append_rounds: usize,
    last_transactions: Vec<Transaction>,
    dispatch_count: u64,
    version: Observable<u64>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("version", &self.state.version())
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.key()).collect::<Vec<_>>(),
            )
            .field("max_append_rounds", &self.max_append_rounds)
            .field("dispatch_count", &self.dispatch_count)
            .finish()
    }
}

impl Editor {
    /// Editor over `doc` with no plugins.
    #[must_use]
    pub fn new(doc: Node) -> Self {
        Self::from_state(EditorState::new(doc))
    }

    /// Editor starting from an existing state.
    #[must_use]
    pub fn from_state(state: EditorState) -> Self {
        let version = Observable::new(state.version());
        Self {
            state,
            plugins: Vec::new(),
            max_append_rounds: DEFAULT_MAX_APPEND_ROUNDS,
            last_transactions: Vec::new(),
            dispatch_count: 0,
            version,
        }
    }

    /// Editor over `doc` with the column-width reconciler installed.
    #[must_use]
    pub fn with_table_plus(doc: Node, config: &TablePlusConfig) -> Self {
        Self::new(doc)
            .with_plugin(ColumnWidthReconciler::new(&config.reconcile))
            .with_max_append_rounds(config.reconcile.max_append_rounds)
    }

    /// Add a plugin after the existing ones.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Set the append round bound (at least 1).
    #[must_use]
    pub fn with_max_append_rounds(mut self, rounds: usize) -> Self {
        self.max_append_rounds = rounds.max(1);
        self
    }

    /// Replace the state without running plugins, e.g. when loading a
    /// document.
    pub fn set_state(&mut self, state: EditorState) {
        self.state = state;
        self.last_transactions.clear();
        self.version.set(self.state.version());
    }

    /// Transactions applied by the last dispatch, the dispatched one first.
    #[must_use]
    pub fn last_transactions(&self) -> &[Transaction] {
        &self.last_transactions
    }

    /// Number of successful dispatches.
    #[must_use]
    pub const fn dispatch_count(&self) -> u64 {
        self.dispatch_count
    }

    /// Watch the document version; fires once per dispatch that changed
    /// the document.
    pub fn subscribe(&self, callback: impl Fn(&u64) + 'static) -> Subscription {
        self.version.subscribe(callback)
    }

    /// Run `tr` and the plugin chain, returning the final state and every
    /// applied transaction.
    fn apply_with_plugins(
        &self,
        tr: Transaction,
    ) -> Result<(EditorState, Vec<Transaction>), DispatchError> {
        let root = &self.state;
        let mut state = root.apply(&tr)?;
        let mut trs = vec![tr];
        // Per plugin: how many transactions it has seen, and the state then.
        let mut seen: Vec<(usize, EditorState)> =
            self.plugins.iter().map(|_| (0, root.clone())).collect();

        let mut rounds = 0usize;
        loop {
            let mut appended = false;
            for (i, plugin) in self.plugins.iter().enumerate() {
                let n = seen[i].0;
                if n < trs.len() {
                    let appended_tr = plugin.append_transaction(&trs[n..], &seen[i].1, &state);
                    if let Some(extra) = appended_tr {
                        match state.apply(&extra) {
                            Ok(next) => {
                                debug!(
                                    target: "tableplus.editor",
                                    plugin = plugin.key(),
                                    steps = extra.steps().len(),
                                    "appended transaction"
                                );
                                state = next;
                                trs.push(extra);
                                appended = true;
                            }
                            Err(err) => warn!(
                                target: "tableplus.editor",
                                plugin = plugin.key(),
                                error = %err,
                                "dropped appended transaction"
                            ),
                        }
                    }
                    seen[i] = (trs.len(), state.clone());
                }
            }
            if !appended {
                break;
            }
            rounds += 1;
            if rounds >= self.max_append_rounds {
                warn!(
                    target: "tableplus.editor",
                    rounds,
                    "append round limit reached; plugins may not have settled"
                );
                break;
            }
        }
        Ok((state, trs))
    }
}

impl EditorHost for Editor {
    fn state(&self) -> &EditorState {
        &self.state
    }

    fn dispatch(&mut self, tr: Transaction) -> Result<(), DispatchError> {
        let start = Instant::now();
        let origin = tr.origin();
        let (state, trs) = self.apply_with_plugins(tr)?;
        let changed = state.version() != self.state.version();
        self.state = state;
        self.last_transactions = trs;
        self.dispatch_count += 1;
        debug!(
            target: "tableplus.editor",
            %origin,
            transactions = self.last_transactions.len(),
            version = self.state.version(),
            duration_us = start.elapsed().as_micros() as u64,
            "dispatched"
        );
        if changed {
            self.version.set(self.state.version());
        }
        Ok(())
    }
}

#![forbid(unsafe_code)]

//! Append-transaction plugins.

use tableplus_doc::{EditorState, Transaction};

/// A hook that may follow every dispatched transaction with one of its own.
///
/// The editor offers each plugin the transactions it has not seen yet
/// (including transactions appended by other plugins), the state before
/// them, and the state after them. A returned transaction must be built on
/// `new_state` and is applied in the same dispatch, so observers never see
/// the intermediate state.
pub trait Plugin {
    /// Stable plugin name, used for transaction origins and logs.
    fn key(&self) -> &'static str;

    /// Follow-up transaction, or `None` when nothing needs correcting.
    fn append_transaction(
        &self,
        transactions: &[Transaction],
        old_state: &EditorState,
        new_state: &EditorState,
    ) -> Option<Transaction>;
}

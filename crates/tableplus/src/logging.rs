#![forbid(unsafe_code)]

//! Global log output.
//!
//! Filtering follows `TABLEPLUS_LOG` with `EnvFilter` syntax, e.g.
//! `TABLEPLUS_LOG=tableplus.reconcile=debug,info`. Without it only `info`
//! and above are printed.

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "TABLEPLUS_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Filter from [`LOG_ENV`], falling back to `info`.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install a human-readable formatter as the global subscriber.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))
}

/// Install a JSON-lines formatter as the global subscriber.
pub fn init_json() -> Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))
}

#![forbid(unsafe_code)]

//! tableplus error model.
//!
//! The engine and the resize controller never fail outward: they log and
//! degrade to a no-op. Errors surface only where a caller drives the
//! document or loads configuration directly.

use std::fmt;

use tableplus_doc::{DispatchError, StepError};
use tableplus_runtime::ConfigError;

/// Top-level error type for tableplus callers.
#[derive(Debug)]
pub enum Error {
    /// A step could not be added to a transaction.
    Step(StepError),
    /// The host refused a transaction.
    Dispatch(DispatchError),
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// A global tracing subscriber could not be installed.
    Logging(String),
}

/// Standard result type for tableplus APIs.
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step(err) => write!(f, "edit step error: {err}"),
            Self::Dispatch(err) => write!(f, "dispatch error: {err}"),
            Self::Config(err) => write!(f, "config error: {err}"),
            Self::Logging(msg) => write!(f, "logging setup error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Step(err) => Some(err),
            Self::Dispatch(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<StepError> for Error {
    fn from(err: StepError) -> Self {
        Self::Step(err)
    }
}

impl From<DispatchError> for Error {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

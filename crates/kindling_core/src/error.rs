//! Error types for kindling_core

use std::fmt;

use thiserror::Error;

/// Error type returned by fallible effect callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Hook family referred to by strict hook-order checks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookKind {
    State,
    Effect,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::State => f.write_str("state"),
            HookKind::Effect => f.write_str("effect"),
        }
    }
}

/// Errors that can escape a refresh
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// An effect callback failed; the remaining effects of that pass were skipped
    #[error("effect at position {position} failed: {source}")]
    Effect {
        position: usize,
        #[source]
        source: BoxError,
    },

    /// A pass registered a different number of hooks than the pass before it
    #[error("{kind} hook count changed between passes: {previous} -> {current}")]
    HookOrderMismatch {
        kind: HookKind,
        previous: usize,
        current: usize,
    },

    /// A state position was read with a different value type than it holds
    #[error("state hook at position {position} was read as `{expected}` but holds another type")]
    HookTypeMismatch {
        position: usize,
        expected: &'static str,
    },

    /// The replay loop ran more passes than the configured limit
    #[error("refresh exceeded {passes} consecutive render passes")]
    RefreshLimitExceeded { passes: u32 },
}

/// Result type for kindling_core operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

//! # Error Types
//!
//! Error types for the prediction config-set engine.
//!
//! Both error enums describe caller-side logic defects rather than runtime
//! faults: a config set has no transient failure modes, so none of these are
//! retryable. They are surfaced as `Result` values so a defect aborts the
//! operation at the call site instead of corrupting the set.
//!
//! - [`ConfigSetError`]: mutation attempted on a frozen set, or a positional
//!   access outside the ordered list
//! - [`CursorError`]: removal-cursor protocol violations
//!
//! When the `diagnostics` feature is enabled, errors integrate with
//! [`miette`] for rich reporting.

use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Errors raised by config-set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ConfigSetError {
    /// The set was frozen by a read-only snapshot; inserts, removals, and
    /// clears are permanently rejected.
    #[error("config set is read-only")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(prediction::read_only)))]
    ReadOnly,

    /// Positional removal outside the ordered list.
    #[error("index {index} out of bounds for config set of length {len}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(prediction::out_of_bounds)))]
    OutOfBounds {
        /// Requested position
        index: usize,
        /// Length of the ordered list at the time of the call
        len: usize,
    },
}

/// Removal-cursor protocol violations.
///
/// The cursor permits at most one removal per successful advance; anything
/// else is a defect in the driving loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum CursorError {
    /// Advance attempted past the last configuration.
    #[error("cursor advanced past the end of the config set")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(prediction::cursor_exhausted)))]
    Exhausted,

    /// Removal attempted before any successful advance.
    #[error("cursor removal requires a successful advance first")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(code(prediction::cursor_remove_before_advance))
    )]
    RemoveBeforeAdvance,

    /// Second removal attempted for the same cursor position.
    #[error("cursor already removed the configuration at this position")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(code(prediction::cursor_remove_repeated))
    )]
    RemoveRepeated,

    /// The underlying positional removal failed (e.g. the set is frozen).
    #[error(transparent)]
    Set(#[from] ConfigSetError),
}

//! # Forerun
//!
//! Prediction runtime core for adaptive LL parsing.
//!
//! ## Overview
//!
//! When an adaptive LL parser decides which alternative to take, it simulates
//! lookahead by exploring the grammar automaton and tracking a set of
//! in-flight "configurations" (automaton state + alternative + call context +
//! semantic predicate). Forerun provides the data structure at the center of
//! that simulation:
//!
//! - **Merge-on-insert config sets**: configurations sharing an automaton
//!   state and alternative are merged by joining their call contexts, which
//!   keeps the simulated state space polynomial instead of exponential
//! - **Two-tier indexing**: an O(1) representative index per merge key plus a
//!   small fallback list for same-key entries whose predicates differ
//! - **Aggregate bookkeeping**: unique-alternative tracking, semantic-context
//!   and outer-context-escape flags, maintained incrementally across inserts
//! - **Copy-on-freeze snapshots**: a read-only clone can be published into a
//!   shared decision cache and read concurrently without locking
//!
//! The automaton itself, the closure traversal, and the call-context join
//! algorithm are collaborator concerns: consumers supply them through the
//! [`context::CallContext`] and [`context::PredicateContext`] traits.
//!
//! ## Quick Start
//!
//! ```rust
//! use forerun::testing::{GatePredicate, SiteContext};
//! use forerun::{Config, ConfigSet, ContextMode};
//!
//! let mut set = ConfigSet::new(ContextMode::Local);
//!
//! // Two paths reach state 5 under alternative 1: they merge into one entry
//! // whose context joins both call stacks.
//! set.insert(Config::new(5, 1, SiteContext::of([10]), GatePredicate::Always))?;
//! set.insert(Config::new(5, 1, SiteContext::of([20]), GatePredicate::Always))?;
//! assert_eq!(set.len(), 1);
//! assert_eq!(set.unique_alt(), Some(1));
//!
//! // A second alternative permanently invalidates the unique-alt fact.
//! set.insert(Config::new(7, 2, SiteContext::of([10]), GatePredicate::Always))?;
//! assert_eq!(set.unique_alt(), None);
//!
//! // Freeze for publication: mutation now fails loudly.
//! let mut frozen = set.snapshot(true);
//! assert!(frozen
//!     .insert(Config::new(9, 1, SiteContext::of([1]), GatePredicate::Always))
//!     .is_err());
//! # Ok::<(), forerun::ConfigSetError>(())
//! ```
//!
//! ## Modules
//!
//! - [`prediction`] - Configuration records, the indexed config set, and the
//!   removal cursor
//! - [`context`] - Collaborator interfaces (call contexts, predicates, mode)
//! - [`error`] - Error types
//! - [`testing`] - Deterministic collaborator implementations for tests

pub mod context;
pub mod error;
pub mod prediction;
pub mod testing;

// Re-export commonly used types
pub use context::{CallContext, ContextMode, Joined, NonePredicate, PredicateContext};
pub use error::{ConfigSetError, CursorError};
pub use prediction::{AltNumber, Config, ConfigSet, MergeKey, RemovalCursor, StateId};

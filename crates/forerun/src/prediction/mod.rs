//! # Prediction Config Sets
//!
//! The configuration-set engine driven during lookahead simulation.
//!
//! ## Overview
//!
//! A [`ConfigSet`] holds the in-flight configurations explored while a
//! prediction loop walks the grammar automaton. Inserting a configuration
//! whose automaton state and alternative match an existing entry (with an
//! equal predicate context) merges the two by joining their call contexts
//! instead of growing the set; this is what bounds the simulated state
//! space.
//!
//! The set maintains a two-tier index over the ordered configuration list:
//!
//! - a fast map holding at most one *representative* position per
//!   (state, alternative) merge key
//! - a small *unmerged* list for positions whose key collides with a
//!   representative but whose predicate context differs
//!
//! Predicate variants per key are normally few, so the fallback scan stays
//! short while the common path remains a single hash lookup.
//!
//! After closure converges the consumer reads the aggregate facts
//! ([`ConfigSet::unique_alt`], [`ConfigSet::has_semantic_context`],
//! [`ConfigSet::dips_outer_context`]) to decide whether prediction resolved,
//! then publishes the set into a decision cache via a read-only
//! [`ConfigSet::snapshot`].

pub mod config;
pub mod cursor;
pub mod set;

pub use config::{AltNumber, Config, MergeKey, StateId};
pub use cursor::RemovalCursor;
pub use set::ConfigSet;

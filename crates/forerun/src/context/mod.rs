//! # Collaborator Interfaces
//!
//! Traits for the data the prediction engine consumes but does not compute:
//! call contexts (the rule-invocation stack and its join operation) and
//! semantic-predicate contexts. The automaton closure, the join algorithm,
//! and predicate evaluation all live with the consumer; the config set only
//! needs the narrow contracts defined here.
//!
//! ## The join contract
//!
//! [`CallContext::join`] must report "no new information" explicitly by
//! returning [`Joined::Unchanged`] whenever joining `right` into `left` adds
//! no reachable path. The config set relies on that signal to decide whether
//! an insert changed anything; implementations must not depend on pointer
//! identity or incidental sharing to convey it.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Whether a config set simulates with locally-scoped or full call contexts.
///
/// Fixed at construction. Local-context prediction is the cheap first pass;
/// full-context prediction is the fallback when the first pass reports a
/// conflict, and joins behave differently in each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ContextMode {
    /// Contexts are scoped to the decision's local rule invocation.
    Local,
    /// Contexts carry the full rule-invocation stack.
    Full,
}

impl ContextMode {
    /// Whether this is local-context mode.
    #[must_use]
    pub const fn is_local(self) -> bool {
        matches!(self, Self::Local)
    }
}

/// Result of joining two call contexts.
///
/// The explicit no-change variant replaces identity comparison of the join
/// result: value-oriented contexts cannot promise stable addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Joined<C> {
    /// The join result is the left input; the right context added no new
    /// reachable path.
    Unchanged,
    /// The join produced new information.
    New(C),
}

/// A shareable, immutable representation of the rule-invocation stack.
///
/// Implementations are typically cheap handles (`Arc`-backed or interned)
/// since config sets clone them freely during merges and snapshots.
pub trait CallContext: Clone + PartialEq + Eq + Hash + fmt::Debug {
    /// Join two contexts into one reachable from both.
    ///
    /// Must return [`Joined::Unchanged`] when `right` adds nothing that
    /// `left` does not already reach, and [`Joined::New`] otherwise. `mode`
    /// distinguishes local-context joining from full-context joining.
    fn join(left: &Self, right: &Self, mode: ContextMode) -> Joined<Self>
    where
        Self: Sized;

    /// Whether this context already reaches everything `other` reaches.
    ///
    /// Derived from the join contract: covering a context means joining it
    /// in changes nothing.
    fn covers(&self, other: &Self, mode: ContextMode) -> bool {
        matches!(Self::join(self, other, mode), Joined::Unchanged)
    }
}

/// Semantic condition gating an alternative's viability.
///
/// Evaluation happens in the consumer; the config set only compares
/// predicate contexts for equality and asks whether one is trivial.
pub trait PredicateContext: Clone + PartialEq + Eq + Hash + fmt::Debug {
    /// Whether this is the trivial always-true predicate.
    ///
    /// Configurations carrying a non-trivial predicate set the config set's
    /// `has_semantic_context` flag.
    fn is_always_true(&self) -> bool;
}

/// The trivial predicate context for grammars without semantic predicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct NonePredicate;

impl PredicateContext for NonePredicate {
    fn is_always_true(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SiteContext;

    #[test]
    fn test_none_predicate_is_trivial() {
        assert!(NonePredicate.is_always_true());
    }

    #[test]
    fn test_covers_follows_join() {
        let wide = SiteContext::of([1, 2, 3]);
        let narrow = SiteContext::of([2]);

        assert!(wide.covers(&narrow, ContextMode::Local));
        assert!(!narrow.covers(&wide, ContextMode::Local));
    }

    #[test]
    fn test_context_mode_is_local() {
        assert!(ContextMode::Local.is_local());
        assert!(!ContextMode::Full.is_local());
    }
}

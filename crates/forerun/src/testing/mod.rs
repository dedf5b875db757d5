//! # Testing Utilities
//!
//! Deterministic collaborator implementations for exercising the config-set
//! engine in tests, benches, and doctests.
//!
//! A production consumer supplies graph-backed call contexts whose join
//! follows the automaton's rule-invocation structure. These substitutes keep
//! the same contracts with trivially checkable semantics:
//!
//! - [`SiteContext`]: a context is the set of return sites it can reach, and
//!   joining is set union — `Unchanged` exactly when the right side is a
//!   subset of the left
//! - [`GatePredicate`]: an opaque numbered gate, equal only to itself, with
//!   [`GatePredicate::Always`] as the trivial predicate

use crate::context::{CallContext, ContextMode, Joined, PredicateContext};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A call context modeled as the set of return sites it reaches.
///
/// Cheap to clone: the site set is shared behind an `Arc`, matching how
/// production contexts are shareable immutable structures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteContext {
    sites: Arc<BTreeSet<u32>>,
}

impl SiteContext {
    /// Build a context reaching the given return sites.
    #[must_use]
    pub fn of(sites: impl IntoIterator<Item = u32>) -> Self {
        Self {
            sites: Arc::new(sites.into_iter().collect()),
        }
    }

    /// The reachable return sites, in ascending order.
    pub fn sites(&self) -> impl Iterator<Item = u32> + '_ {
        self.sites.iter().copied()
    }
}

impl CallContext for SiteContext {
    fn join(left: &Self, right: &Self, _mode: ContextMode) -> Joined<Self> {
        if right.sites.is_subset(&left.sites) {
            return Joined::Unchanged;
        }
        Joined::New(Self {
            sites: Arc::new(left.sites.union(&right.sites).copied().collect()),
        })
    }
}

/// A semantic predicate identified by an opaque gate number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatePredicate {
    /// The trivial always-true predicate.
    Always,
    /// A non-trivial gate; equal only to the same gate.
    Gate(u32),
}

impl PredicateContext for GatePredicate {
    fn is_always_true(&self) -> bool {
        matches!(self, Self::Always)
    }
}

//! Configuration records and merge keys.

use crate::context::{CallContext, PredicateContext};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an automaton state.
pub type StateId = u32;

/// A 1-based alternative number within a decision.
pub type AltNumber = u32;

/// Merge key identifying a family of mergeable configurations.
///
/// Packs (state, alternative) into a single comparable value. Equal keys
/// make two configurations merge *candidates*; they actually merge only if
/// their predicate contexts are also equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MergeKey(u64);

impl MergeKey {
    /// Pack a state identity and alternative number.
    #[must_use]
    pub const fn new(state: StateId, alt: AltNumber) -> Self {
        Self(((state as u64) << 32) | alt as u64)
    }

    /// The state identity half of the key.
    #[must_use]
    pub const fn state(self) -> StateId {
        (self.0 >> 32) as StateId
    }

    /// The alternative half of the key.
    #[must_use]
    pub const fn alt(self) -> AltNumber {
        self.0 as AltNumber
    }
}

/// One simulated in-flight parse path.
///
/// Value-comparable; the owning [`ConfigSet`](crate::prediction::ConfigSet)
/// rewrites the `context` field when a merge joins new information in, and
/// raises `reaches_outer_context` to the maximum seen for the merged family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Config<C, P> {
    /// Automaton state this path has reached.
    pub state: StateId,
    /// Alternative being predicted along this path.
    pub alt: AltNumber,
    /// Call context: the rule-invocation stack that led here.
    pub context: C,
    /// Semantic predicate gating this path's viability.
    pub predicate: P,
    /// Greater than zero when the path escapes the decision's local context.
    pub reaches_outer_context: u32,
}

impl<C: CallContext, P: PredicateContext> Config<C, P> {
    /// Create a configuration that has not escaped its local context.
    pub fn new(state: StateId, alt: AltNumber, context: C, predicate: P) -> Self {
        Self {
            state,
            alt,
            context,
            predicate,
            reaches_outer_context: 0,
        }
    }

    /// The merge key for this configuration.
    #[must_use]
    pub fn key(&self) -> MergeKey {
        MergeKey::new(self.state, self.alt)
    }

    /// Whether `self` and `other` belong to the same mergeable family.
    ///
    /// `key` is `self.key()`, precomputed by the caller.
    pub(crate) fn can_merge(&self, key: MergeKey, other: &Self) -> bool {
        key == other.key() && self.predicate == other.predicate
    }
}

impl<C: CallContext, P: PredicateContext> fmt::Display for Config<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {:?}", self.state, self.alt, self.context)?;
        if !self.predicate.is_always_true() {
            write!(f, ", {:?}", self.predicate)?;
        }
        if self.reaches_outer_context > 0 {
            write!(f, ", up={}", self.reaches_outer_context)?;
        }
        write!(f, ")")
    }
}

//! The indexed configuration container.

use crate::context::{CallContext, ContextMode, Joined, PredicateContext};
use crate::error::ConfigSetError;
use crate::prediction::config::{AltNumber, Config, MergeKey, StateId};
use crate::prediction::cursor::RemovalCursor;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Running unique-alternative fact.
///
/// Moves forward only: once conflicted it never returns to a valid value,
/// regardless of later inserts or removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UniqueAlt {
    /// No configuration inserted yet.
    Unset,
    /// Every configuration inserted so far predicts this alternative.
    Alt(AltNumber),
    /// Inserted configurations disagree on the alternative.
    Conflicted,
}

/// The two-tier merge index: positions into the ordered list.
///
/// `merged` holds at most one representative position per merge key;
/// `unmerged` holds positions whose key collides with a representative but
/// whose predicate context differs. Dropped entirely when a set freezes.
#[derive(Debug, Clone)]
struct MergeIndex {
    merged: HashMap<MergeKey, usize, ahash::RandomState>,
    unmerged: SmallVec<[usize; 4]>,
}

impl MergeIndex {
    fn new() -> Self {
        Self {
            merged: HashMap::with_hasher(ahash::RandomState::new()),
            unmerged: SmallVec::new(),
        }
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            merged: HashMap::with_capacity_and_hasher(capacity, ahash::RandomState::new()),
            unmerged: SmallVec::new(),
        }
    }

    /// Re-derive the index from an ordered list built under the set's
    /// invariants: the first position seen for a key becomes the
    /// representative, later positions for the same key go to the fallback
    /// list.
    fn rebuild<C: CallContext, P: PredicateContext>(configs: &[Config<C, P>]) -> Self {
        let mut index = Self::with_capacity(configs.len());
        for (pos, config) in configs.iter().enumerate() {
            let key = config.key();
            if index.merged.contains_key(&key) {
                index.unmerged.push(pos);
            } else {
                index.merged.insert(key, pos);
            }
        }
        index
    }
}

/// An ordered, merge-on-insert set of prediction configurations.
///
/// Built by a single owner during one closure computation; published for
/// concurrent readers exclusively through a read-only [`snapshot`]. A frozen
/// set keeps no index tables, and every mutation on it fails with
/// [`ConfigSetError::ReadOnly`].
///
/// Aggregate properties (`unique_alt`, `has_semantic_context`,
/// `dips_outer_context`) are maintained incrementally across inserts only.
/// Removal does not recompute them: they are high-water marks over
/// everything ever inserted, which is what the prediction loop needs and
/// what [`clear`] resets.
///
/// [`snapshot`]: ConfigSet::snapshot
/// [`clear`]: ConfigSet::clear
pub struct ConfigSet<C, P> {
    mode: ContextMode,
    configs: Vec<Config<C, P>>,
    /// `None` once frozen.
    index: Option<MergeIndex>,
    /// Depth bookkeeping maintained by the driving simulator; copied by
    /// snapshots and reset by [`ConfigSet::clear`].
    pub outer_context_depth: u32,
    unique_alt: UniqueAlt,
    conflicting_alts: Option<SmallVec<[AltNumber; 4]>>,
    has_semantic_context: bool,
    dips_outer_context: bool,
}

impl<C: CallContext, P: PredicateContext> ConfigSet<C, P> {
    /// Create an empty, mutable set operating in the given context mode.
    #[must_use]
    pub fn new(mode: ContextMode) -> Self {
        Self {
            mode,
            configs: Vec::new(),
            index: Some(MergeIndex::new()),
            outer_context_depth: 0,
            unique_alt: UniqueAlt::Unset,
            conflicting_alts: None,
            has_semantic_context: false,
            dips_outer_context: false,
        }
    }

    /// Create an empty set sized for an expected number of configurations.
    #[must_use]
    pub fn with_capacity(mode: ContextMode, capacity: usize) -> Self {
        Self {
            mode,
            configs: Vec::with_capacity(capacity),
            index: Some(MergeIndex::with_capacity(capacity)),
            ..Self::new(mode)
        }
    }

    /// The context mode fixed at construction.
    #[must_use]
    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    /// Whether the set was frozen by a read-only snapshot.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.index.is_none()
    }

    /// Number of stored configurations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// The ordered list of stored configurations.
    #[must_use]
    pub fn as_slice(&self) -> &[Config<C, P>] {
        &self.configs
    }

    /// Iterate over the ordered list.
    pub fn iter(&self) -> std::slice::Iter<'_, Config<C, P>> {
        self.configs.iter()
    }

    /// Bounds-checked read from the ordered list.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Config<C, P>> {
        self.configs.get(index)
    }

    /// The distinct automaton states present in the set.
    #[must_use]
    pub fn states(&self) -> HashSet<StateId, ahash::RandomState> {
        self.configs.iter().map(|c| c.state).collect()
    }

    /// Insert a configuration, merging it into an existing entry when one
    /// shares its merge key and predicate context.
    ///
    /// Returns whether the set's contents changed: a merge whose join adds
    /// no new reachable path reports `false` and leaves the stored context
    /// untouched.
    ///
    /// # Errors
    ///
    /// [`ConfigSetError::ReadOnly`] if the set is frozen.
    pub fn insert(&mut self, config: Config<C, P>) -> Result<bool, ConfigSetError> {
        let index = self.index.as_mut().ok_or(ConfigSetError::ReadOnly)?;
        let key = config.key();
        let rep = index.merged.get(&key).copied();

        if let Some(pos) = rep {
            let stored = &mut self.configs[pos];
            if config.can_merge(key, stored) {
                stored.reaches_outer_context =
                    stored.reaches_outer_context.max(config.reaches_outer_context);
                return match C::join(&stored.context, &config.context, self.mode) {
                    Joined::Unchanged => Ok(false),
                    Joined::New(joined) => {
                        stored.context = joined;
                        // A merge cannot change the alt or the predicate.
                        self.dips_outer_context |= config.reaches_outer_context > 0;
                        Ok(true)
                    }
                };
            }
        }

        for slot in 0..index.unmerged.len() {
            let pos = index.unmerged[slot];
            let stored = &mut self.configs[pos];
            if !config.can_merge(key, stored) {
                continue;
            }

            stored.reaches_outer_context =
                stored.reaches_outer_context.max(config.reaches_outer_context);
            return match C::join(&stored.context, &config.context, self.mode) {
                Joined::Unchanged => Ok(false),
                Joined::New(joined) => {
                    stored.context = joined;
                    // The key just gained its only representative: promote.
                    if rep.is_none() {
                        index.unmerged.remove(slot);
                        index.merged.insert(key, pos);
                    }
                    self.dips_outer_context |= config.reaches_outer_context > 0;
                    Ok(true)
                }
            };
        }

        let pos = self.configs.len();
        if rep.is_none() {
            index.merged.insert(key, pos);
        } else {
            index.unmerged.push(pos);
        }

        self.unique_alt = match self.unique_alt {
            UniqueAlt::Unset => UniqueAlt::Alt(config.alt),
            UniqueAlt::Alt(alt) if alt != config.alt => UniqueAlt::Conflicted,
            running => running,
        };
        self.has_semantic_context |= !config.predicate.is_always_true();
        self.dips_outer_context |= config.reaches_outer_context > 0;

        self.configs.push(config);
        Ok(true)
    }

    /// Insert every configuration from `configs`.
    ///
    /// Returns whether any insert changed the set.
    ///
    /// # Errors
    ///
    /// [`ConfigSetError::ReadOnly`] if the set is frozen; nothing is
    /// inserted in that case.
    pub fn insert_all<I>(&mut self, configs: I) -> Result<bool, ConfigSetError>
    where
        I: IntoIterator<Item = Config<C, P>>,
    {
        if self.is_frozen() {
            return Err(ConfigSetError::ReadOnly);
        }

        let mut changed = false;
        for config in configs {
            changed |= self.insert(config)?;
        }
        Ok(changed)
    }

    /// Whether the set already accounts for `probe`.
    ///
    /// A stored configuration accounts for the probe when they share a merge
    /// key and predicate context and the stored call context covers the
    /// probe's (joining the probe's context in would add nothing). Frozen
    /// sets keep no index tables, so the lookup degrades to a scan there.
    #[must_use]
    pub fn contains(&self, probe: &Config<C, P>) -> bool {
        let key = probe.key();
        let Some(index) = &self.index else {
            return self.configs.iter().any(|stored| {
                probe.can_merge(key, stored) && stored.context.covers(&probe.context, self.mode)
            });
        };

        if let Some(&pos) = index.merged.get(&key) {
            let stored = &self.configs[pos];
            if probe.can_merge(key, stored) {
                return stored.context.covers(&probe.context, self.mode);
            }
        }

        index.unmerged.iter().any(|&pos| {
            let stored = &self.configs[pos];
            probe.can_merge(key, stored) && stored.context.covers(&probe.context, self.mode)
        })
    }

    /// Whether the set accounts for every probe in `probes`.
    pub fn contains_all<'a, I>(&self, probes: I) -> bool
    where
        I: IntoIterator<Item = &'a Config<C, P>>,
        C: 'a,
        P: 'a,
    {
        probes.into_iter().all(|probe| self.contains(probe))
    }

    /// Remove the configuration at `index` from the ordered list and from
    /// whichever index tier holds it, returning it.
    ///
    /// Aggregate properties are not recomputed; see the type-level notes.
    ///
    /// # Errors
    ///
    /// [`ConfigSetError::ReadOnly`] if the set is frozen,
    /// [`ConfigSetError::OutOfBounds`] if `index` is past the end.
    pub fn remove(&mut self, index: usize) -> Result<Config<C, P>, ConfigSetError> {
        let tables = self.index.as_mut().ok_or(ConfigSetError::ReadOnly)?;
        if index >= self.configs.len() {
            return Err(ConfigSetError::OutOfBounds {
                index,
                len: self.configs.len(),
            });
        }

        let key = self.configs[index].key();
        if tables.merged.get(&key) == Some(&index) {
            tables.merged.remove(&key);
        } else if let Some(slot) = tables.unmerged.iter().position(|&pos| pos == index) {
            tables.unmerged.remove(slot);
        }

        // Positions past the removal point shift down by one.
        for pos in tables.merged.values_mut() {
            if *pos > index {
                *pos -= 1;
            }
        }
        for pos in &mut tables.unmerged {
            if *pos > index {
                *pos -= 1;
            }
        }

        Ok(self.configs.remove(index))
    }

    /// A removal cursor starting before the first configuration.
    ///
    /// This is the only bulk-filtering facility: callers that need
    /// retain-style removal advance the cursor and remove at most once per
    /// advance.
    pub fn cursor(&mut self) -> RemovalCursor<'_, C, P> {
        RemovalCursor::new(self)
    }

    /// Remove every configuration and reset all aggregate bookkeeping.
    ///
    /// # Errors
    ///
    /// [`ConfigSetError::ReadOnly`] if the set is frozen.
    pub fn clear(&mut self) -> Result<(), ConfigSetError> {
        let tables = self.index.as_mut().ok_or(ConfigSetError::ReadOnly)?;
        tables.merged.clear();
        tables.unmerged.clear();
        self.configs.clear();
        self.outer_context_depth = 0;
        self.unique_alt = UniqueAlt::Unset;
        self.conflicting_alts = None;
        self.has_semantic_context = false;
        self.dips_outer_context = false;
        Ok(())
    }

    /// Produce an independent copy.
    ///
    /// The ordered list and aggregates are copied either way. With
    /// `readonly = true` the copy materializes no index tables, so every
    /// later mutation on it fails immediately — safe to publish for
    /// concurrent reads. With `readonly = false` the copy gets its own
    /// tables (re-derived from the list when `self` is itself frozen) and
    /// mutates independently of the original.
    #[must_use]
    pub fn snapshot(&self, readonly: bool) -> Self {
        let index = if readonly {
            None
        } else {
            match &self.index {
                Some(tables) => Some(tables.clone()),
                None => Some(MergeIndex::rebuild(&self.configs)),
            }
        };

        Self {
            mode: self.mode,
            configs: self.configs.clone(),
            index,
            outer_context_depth: self.outer_context_depth,
            unique_alt: self.unique_alt,
            conflicting_alts: self.conflicting_alts.clone(),
            has_semantic_context: self.has_semantic_context,
            dips_outer_context: self.dips_outer_context,
        }
    }

    /// The alternative all stored configurations agree on, if they ever did.
    ///
    /// `None` for an empty set and permanently `None` once inserts diverge.
    #[must_use]
    pub fn unique_alt(&self) -> Option<AltNumber> {
        match self.unique_alt {
            UniqueAlt::Alt(alt) => Some(alt),
            UniqueAlt::Unset | UniqueAlt::Conflicted => None,
        }
    }

    /// Whether any inserted configuration carried a non-trivial predicate.
    #[must_use]
    pub fn has_semantic_context(&self) -> bool {
        self.has_semantic_context
    }

    /// Whether any inserted configuration's path escapes the local context.
    #[must_use]
    pub fn dips_outer_context(&self) -> bool {
        self.dips_outer_context
    }

    /// The conflicting alternatives assigned by the consumer, if any.
    #[must_use]
    pub fn conflicting_alts(&self) -> Option<&[AltNumber]> {
        self.conflicting_alts.as_deref()
    }

    /// Record the consumer's conflict-analysis result.
    ///
    /// Deliberately skips the frozen check: the value is assigned after the
    /// set has otherwise stabilized into a cached decision state.
    pub fn set_conflicting_alts<I>(&mut self, alts: I)
    where
        I: IntoIterator<Item = AltNumber>,
    {
        let mut list: SmallVec<[AltNumber; 4]> = alts.into_iter().collect();
        list.sort_unstable();
        list.dedup();
        self.conflicting_alts = Some(list);
    }
}

/// Equality covers the context mode and the ordered configuration sequence;
/// index tables and consumer-assigned conflict data do not participate.
impl<C: CallContext, P: PredicateContext> PartialEq for ConfigSet<C, P> {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode && self.configs == other.configs
    }
}

impl<C: CallContext, P: PredicateContext> Eq for ConfigSet<C, P> {}

impl<C: CallContext, P: PredicateContext> Hash for ConfigSet<C, P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mode.hash(state);
        self.configs.hash(state);
    }
}

impl<C: CallContext, P: PredicateContext> fmt::Debug for ConfigSet<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSet")
            .field("mode", &self.mode)
            .field("configs", &self.configs)
            .field("frozen", &self.is_frozen())
            .field("unique_alt", &self.unique_alt)
            .field("has_semantic_context", &self.has_semantic_context)
            .field("dips_outer_context", &self.dips_outer_context)
            .finish()
    }
}

/// Rendering is derived from the same data as equality and hashing (mode
/// plus ordered sequence, with the informative aggregate suffixes), so a
/// rendered set is a usable cache key.
impl<C: CallContext, P: PredicateContext> fmt::Display for ConfigSet<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, config) in self.configs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{config}")?;
        }
        write!(f, "]")?;

        if self.has_semantic_context {
            write!(f, ", has_semantic_context")?;
        }
        if let UniqueAlt::Alt(alt) = self.unique_alt {
            write!(f, ", unique_alt={alt}")?;
        }
        if let Some(alts) = &self.conflicting_alts {
            write!(f, ", conflicting_alts={alts:?}")?;
        }
        if self.dips_outer_context {
            write!(f, ", dips_outer_context")?;
        }
        Ok(())
    }
}

impl<'a, C: CallContext, P: PredicateContext> IntoIterator for &'a ConfigSet<C, P> {
    type Item = &'a Config<C, P>;
    type IntoIter = std::slice::Iter<'a, Config<C, P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.configs.iter()
    }
}

//! Traversal with single-shot removal.

use crate::context::{CallContext, PredicateContext};
use crate::error::CursorError;
use crate::prediction::config::Config;
use crate::prediction::set::ConfigSet;

/// A cursor over a config set permitting at most one removal per advance.
///
/// Starts before the first configuration. [`advance`] moves to the next
/// position and yields the configuration there; [`remove`] deletes the
/// configuration at the current position and parks the cursor before its
/// successor, so the following advance visits every remaining entry.
///
/// Protocol violations — advancing past the end, removing before any
/// advance, or removing twice at one position — fail with [`CursorError`].
///
/// [`advance`]: RemovalCursor::advance
/// [`remove`]: RemovalCursor::remove
pub struct RemovalCursor<'a, C: CallContext, P: PredicateContext> {
    set: &'a mut ConfigSet<C, P>,
    /// Current position; `None` before the first advance.
    pos: Option<usize>,
    removed: bool,
}

impl<'a, C: CallContext, P: PredicateContext> RemovalCursor<'a, C, P> {
    pub(crate) fn new(set: &'a mut ConfigSet<C, P>) -> Self {
        Self {
            set,
            pos: None,
            removed: false,
        }
    }

    /// Whether another advance would succeed.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next_pos() < self.set.len()
    }

    /// Move to the next configuration and return it.
    ///
    /// # Errors
    ///
    /// [`CursorError::Exhausted`] at the end of the set.
    pub fn advance(&mut self) -> Result<&Config<C, P>, CursorError> {
        let next = self.next_pos();
        if next >= self.set.len() {
            return Err(CursorError::Exhausted);
        }

        self.pos = Some(next);
        self.removed = false;
        self.set.get(next).ok_or(CursorError::Exhausted)
    }

    /// Remove the configuration at the current position, returning it.
    ///
    /// Permitted at most once per successful advance.
    ///
    /// # Errors
    ///
    /// [`CursorError::RemoveBeforeAdvance`] before the first advance,
    /// [`CursorError::RemoveRepeated`] on a second removal at one position,
    /// and the underlying [`ConfigSetError`](crate::error::ConfigSetError)
    /// when the set is frozen.
    pub fn remove(&mut self) -> Result<Config<C, P>, CursorError> {
        let Some(pos) = self.pos else {
            return Err(CursorError::RemoveBeforeAdvance);
        };
        if self.removed {
            return Err(CursorError::RemoveRepeated);
        }

        let config = self.set.remove(pos)?;
        self.removed = true;
        Ok(config)
    }

    fn next_pos(&self) -> usize {
        match (self.pos, self.removed) {
            // Before the first element.
            (None, _) => 0,
            // The successor shifted into the vacated slot.
            (Some(pos), true) => pos,
            (Some(pos), false) => pos + 1,
        }
    }
}

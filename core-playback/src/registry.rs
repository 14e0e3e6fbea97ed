//! Session registry: one owned record per session in an arena, addressed
//! through an identifier index.

use bridge_traits::SessionId;
use std::collections::HashMap;

#[derive(Debug)]
struct Slot<S> {
    id: SessionId,
    session: S,
}

/// Arena of sessions keyed by [`SessionId`].
///
/// Freed slots are reused, so the arena does not grow with churn.
#[derive(Debug)]
pub struct Registry<S> {
    slots: Vec<Option<Slot<S>>>,
    free: Vec<usize>,
    index: HashMap<SessionId, usize>,
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a session. A session previously stored under `id` is returned.
    pub fn insert(&mut self, id: SessionId, session: S) -> Option<S> {
        if let Some(&slot) = self.index.get(&id) {
            let previous = self.slots[slot].replace(Slot { id, session });
            return previous.map(|slot| slot.session);
        }

        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(Slot { id, session });
                slot
            }
            None => {
                self.slots.push(Some(Slot { id, session }));
                self.slots.len() - 1
            }
        };
        self.index.insert(id, slot);
        None
    }

    pub fn get(&self, id: SessionId) -> Option<&S> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_ref().map(|slot| &slot.session)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut S> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_mut().map(|slot| &mut slot.session)
    }

    /// Remove and return the session, purging its index entry.
    pub fn remove(&mut self, id: SessionId) -> Option<S> {
        let slot = self.index.remove(&id)?;
        let removed = self.slots[slot].take();
        self.free.push(slot);
        removed.map(|slot| slot.session)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Identifiers of all live sessions, in ascending order.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.index.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (SessionId, &S)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|slot| (slot.id, &slot.session)))
    }

    /// Remove every session.
    pub fn drain(&mut self) -> Vec<(SessionId, S)> {
        self.index.clear();
        self.free.clear();
        self.slots
            .drain(..)
            .flatten()
            .map(|slot| (slot.id, slot.session))
            .collect()
    }
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

//! Membership list store.
//!
//! Shared mutable state consulted on every role resolution, so reads are
//! cheap and `replace_all` swaps a fully built set under the write lock:
//! a concurrent reader sees either the old list or the new one, never a
//! half-replaced mixture.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use its_model::ItsId;

/// Well-known override list names.
pub mod lists {
    /// IDs always resolved to the regional-coordinator role.
    pub const REGIONAL_COORDINATORS: &str = "regional-coordinators";
    /// IDs always resolved to the learner role.
    pub const LEARNERS: &str = "learners";
}

/// Named sets of registry IDs maintained by administrators.
#[derive(Debug, Default)]
pub struct MembershipListStore {
    lists: RwLock<HashMap<String, HashSet<ItsId>>>,
}

impl MembershipListStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether an ID is on a list.
    #[must_use]
    pub fn contains(&self, list: &str, id: &ItsId) -> bool {
        self.lists
            .read()
            .get(list)
            .is_some_and(|ids| ids.contains(id))
    }

    /// Replaces the whole list atomically. Returns the new list size.
    pub fn replace_all(&self, list: &str, ids: impl IntoIterator<Item = ItsId>) -> usize {
        // Build the set outside the lock; the swap itself is O(1).
        let set: HashSet<ItsId> = ids.into_iter().collect();
        let size = set.len();
        self.lists.write().insert(list.to_string(), set);
        size
    }

    /// Appends IDs to a list, creating it if absent. Returns how many
    /// were newly added (duplicates are idempotent).
    pub fn add(&self, list: &str, ids: impl IntoIterator<Item = ItsId>) -> usize {
        let mut lists = self.lists.write();
        let set = lists.entry(list.to_string()).or_default();
        ids.into_iter().filter(|id| set.insert(id.clone())).count()
    }

    /// Removes IDs from a list. Returns how many were present.
    pub fn remove(&self, list: &str, ids: &[ItsId]) -> usize {
        let mut lists = self.lists.write();
        match lists.get_mut(list) {
            Some(set) => ids.iter().filter(|id| set.remove(id)).count(),
            None => 0,
        }
    }

    /// Empties a list.
    pub fn clear(&self, list: &str) {
        self.lists.write().remove(list);
    }

    /// Returns the size of a list.
    #[must_use]
    pub fn len(&self, list: &str) -> usize {
        self.lists.read().get(list).map_or(0, HashSet::len)
    }

    /// Returns true when a list is absent or empty.
    #[must_use]
    pub fn is_empty(&self, list: &str) -> bool {
        self.len(list) == 0
    }

    /// Returns a sorted snapshot of a list's members.
    #[must_use]
    pub fn members(&self, list: &str) -> Vec<ItsId> {
        let mut members: Vec<ItsId> = self
            .lists
            .read()
            .get(list)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        members.sort_unstable();
        members
    }

    /// Returns the names of all non-empty lists, sorted.
    #[must_use]
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .lists
            .read()
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }
}

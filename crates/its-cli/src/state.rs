//! Roster persistence between CLI invocations.
//!
//! The subsystem's membership lists are in-process state; the CLI keeps
//! them across runs in a small JSON file mapping list name to a sorted
//! array of IDs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use its_model::ItsId;
use its_roster::MembershipListStore;

use crate::error::CliResult;

/// File-backed roster state.
#[derive(Debug, Clone)]
pub struct RosterFile {
    path: PathBuf,
}

impl RosterFile {
    /// Creates a handle for the given path. Nothing is read yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored lists. A missing file yields an empty store;
    /// entries that no longer parse as IDs are skipped with a warning.
    ///
    /// ## Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load(&self) -> CliResult<MembershipListStore> {
        let store = MembershipListStore::new();
        if !self.path.exists() {
            return Ok(store);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let lists: BTreeMap<String, Vec<String>> = serde_json::from_str(&content)?;

        for (name, raw_ids) in lists {
            let mut ids = Vec::with_capacity(raw_ids.len());
            for raw in raw_ids {
                match ItsId::new(raw) {
                    Ok(id) => ids.push(id),
                    Err(err) => {
                        tracing::warn!(list = %name, error = %err, "skipping bad roster entry");
                    }
                }
            }
            store.replace_all(&name, ids);
        }
        Ok(store)
    }

    /// Writes the store back to disk.
    ///
    /// ## Errors
    ///
    /// Fails when the file cannot be written.
    pub fn save(&self, store: &MembershipListStore) -> CliResult<()> {
        let mut lists: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for name in store.list_names() {
            let members = store
                .members(&name)
                .into_iter()
                .map(String::from)
                .collect();
            lists.insert(name, members);
        }

        let json = serde_json::to_string_pretty(&lists)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use its_roster::lists;

    use super::*;

    fn id(raw: &str) -> ItsId {
        ItsId::new(raw).unwrap()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let roster = RosterFile::new(dir.path().join("roster.json"));
        let store = roster.load().unwrap();
        assert!(store.list_names().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let roster = RosterFile::new(dir.path().join("roster.json"));

        let store = MembershipListStore::new();
        store.replace_all(lists::LEARNERS, [id("22222222"), id("11111111")]);
        store.replace_all(lists::REGIONAL_COORDINATORS, [id("33333333")]);
        roster.save(&store).unwrap();

        let loaded = roster.load().unwrap();
        assert!(loaded.contains(lists::LEARNERS, &id("11111111")));
        assert!(loaded.contains(lists::LEARNERS, &id("22222222")));
        assert!(loaded.contains(lists::REGIONAL_COORDINATORS, &id("33333333")));
        assert_eq!(loaded.list_names().len(), 2);
    }

    #[test]
    fn bad_entries_are_skipped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(&path, r#"{"learners": ["11111111", "bogus"]}"#).unwrap();

        let loaded = RosterFile::new(&path).load().unwrap();
        assert_eq!(loaded.len(lists::LEARNERS), 1);
    }
}

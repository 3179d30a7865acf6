//! Permission catalog for one group context

use super::entry::PermissionEntry;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

/// Name-ordered set of permission entries.
///
/// Names are unique. Adding an entry whose name is already present keeps the
/// existing entry untouched: the first contribution wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCatalog {
    entries: BTreeMap<String, PermissionEntry>,
}

impl PermissionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `entry` unless its name is taken; returns whether it was added
    pub fn insert_if_absent(&mut self, entry: impl Into<PermissionEntry>) -> bool {
        let entry = entry.into();
        match self.entries.entry(entry.name()) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
            Entry::Occupied(existing) => {
                if existing.get() != &entry {
                    debug!(
                        permission = %existing.key(),
                        "Keeping first registered permission, later definition ignored"
                    );
                }
                false
            }
        }
    }

    /// Add every entry of `other` whose name is not present yet
    pub fn merge(&mut self, other: PermissionCatalog) -> usize {
        other
            .entries
            .into_values()
            .filter(|entry| self.insert_if_absent(entry.clone()))
            .count()
    }

    pub fn get(&self, name: &str) -> Option<&PermissionEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PermissionEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the permissions granted to `role_name` by default
    pub fn default_permissions_for(&self, role_name: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.default_roles().contains(role_name))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl<E: Into<PermissionEntry>> FromIterator<E> for PermissionCatalog {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut catalog = PermissionCatalog::new();
        for entry in iter {
            catalog.insert_if_absent(entry);
        }
        catalog
    }
}

/// Append-only view of a catalog handed to permission contributors.
///
/// Entries can be added when their name is free and looked up, but never
/// replaced or removed.
pub struct PermissionContributions<'a> {
    catalog: &'a mut PermissionCatalog,
    added: usize,
}

impl<'a> PermissionContributions<'a> {
    pub(crate) fn new(catalog: &'a mut PermissionCatalog) -> Self {
        Self { catalog, added: 0 }
    }

    /// See [`PermissionCatalog::insert_if_absent`]
    pub fn insert_if_absent(&mut self, entry: impl Into<PermissionEntry>) -> bool {
        let inserted = self.catalog.insert_if_absent(entry);
        if inserted {
            self.added += 1;
        }
        inserted
    }

    pub fn get(&self, name: &str) -> Option<&PermissionEntry> {
        self.catalog.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }

    /// Entries added through this handle
    pub fn added(&self) -> usize {
        self.added
    }
}

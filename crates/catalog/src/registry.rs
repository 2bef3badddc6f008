// Copyright (c) 2025 Metamap Team
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Generic named registry
//!
//! Every level of the catalog tree (root, engine, schema) tracks its
//! children through the same ordered name-to-child mapping defined
//! here. Lookups that miss fail with a typed not-found error carrying
//! the registry's item kind.

use std::collections::BTreeMap;

use crate::error::{CatalogError, CatalogResult, ItemKind};

/// Ordered mapping from name to child entity
///
/// Keys are unique within the registry. Inserting under an existing
/// key replaces the prior entry (last write wins). Enumeration is
/// lazy, restartable, and ascending by key regardless of insertion
/// order.
#[derive(Debug, Clone)]
pub struct Registry<V> {
    kind: ItemKind,
    items: BTreeMap<String, V>,
}

impl<V> Registry<V> {
    /// Create an empty registry tracking items of the given kind
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            items: BTreeMap::new(),
        }
    }

    /// The kind of item this registry tracks
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Insert an entry, replacing and returning any prior entry under
    /// the same name
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        self.items.insert(name.into(), value)
    }

    /// Look up an entry by name
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` with this registry's item kind
    /// when no entry exists under `name`.
    pub fn get(&self, name: &str) -> CatalogResult<&V> {
        self.items.get(name).ok_or_else(|| self.not_found(name))
    }

    /// Look up an entry by name for mutation
    pub fn get_mut(&mut self, name: &str) -> CatalogResult<&mut V> {
        let kind = self.kind;
        self.items.get_mut(name).ok_or_else(|| CatalogError::NotFound {
            kind,
            name: name.to_string(),
        })
    }

    /// Whether an entry exists under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Entry names in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Entries in ascending name order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.items.values()
    }

    /// Name/entry pairs in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sorted snapshot of entry names, for display
    pub fn list_item_keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn not_found(&self, name: &str) -> CatalogError {
        CatalogError::NotFound {
            kind: self.kind,
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_miss_carries_kind() {
        let registry: Registry<u32> = Registry::new(ItemKind::Table);
        let err = registry.get("missing").unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NotFound {
                kind: ItemKind::Table,
                ..
            }
        ));
    }

    #[test]
    fn test_keys_sorted_regardless_of_insertion_order() {
        let mut registry = Registry::new(ItemKind::Item);
        registry.insert("zebra", 1);
        registry.insert("apple", 2);
        registry.insert("mango", 3);
        assert_eq!(registry.list_item_keys(), vec!["apple", "mango", "zebra"]);
        let keys: Vec<&str> = registry.keys().collect();
        assert_eq!(keys, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut registry = Registry::new(ItemKind::Schema);
        assert!(registry.insert("public", 1).is_none());
        assert_eq!(registry.insert("public", 2), Some(1));
        assert_eq!(registry.len(), 1);
        assert_eq!(*registry.get("public").unwrap(), 2);
    }

    #[test]
    fn test_iterators_are_restartable() {
        let mut registry = Registry::new(ItemKind::Item);
        registry.insert("a", 1);
        registry.insert("b", 2);
        assert_eq!(registry.values().count(), 2);
        assert_eq!(registry.values().count(), 2);
        assert_eq!(registry.iter().count(), 2);
    }

    #[test]
    fn test_contains() {
        let mut registry = Registry::new(ItemKind::Item);
        registry.insert("here", ());
        assert!(registry.contains("here"));
        assert!(!registry.contains("gone"));
    }
}

//! Ordered key-value store
//!
//! The registry persists everything as byte keys and values:
//! - [`KvStore`]: the minimal store interface (get/set/delete, prefix scans)
//! - [`MemStore`]: a `BTreeMap` backed store
//! - [`CacheStore`]: a write-back overlay; its pending writes become a
//!   [`ChangeSet`] that is applied to the parent in one step or dropped

use std::collections::BTreeMap;
use thiserror::Error;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("Corrupt record at {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// A stored key and its value
pub type KvPair = (Vec<u8>, Vec<u8>);

// =============================================================================
// Store Interface
// =============================================================================

/// Byte-oriented ordered key-value store
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>);

    fn delete(&mut self, key: &[u8]);

    /// Pairs whose key starts with `prefix`, in ascending key order
    ///
    /// The iterator works on a snapshot taken when it is created; later writes
    /// to the store are not observed by it.
    fn prefix_iter(&self, prefix: &[u8]) -> PrefixIter;
}

/// Iterator over a prefix snapshot
#[derive(Debug)]
pub struct PrefixIter {
    inner: std::vec::IntoIter<KvPair>,
}

impl PrefixIter {
    fn new(pairs: Vec<KvPair>) -> Self {
        Self {
            inner: pairs.into_iter(),
        }
    }
}

impl Iterator for PrefixIter {
    type Item = KvPair;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

fn scan<'a, V: 'a>(
    map: &'a BTreeMap<Vec<u8>, V>,
    prefix: &'a [u8],
) -> impl Iterator<Item = (&'a Vec<u8>, &'a V)> + 'a {
    map.range(prefix.to_vec()..)
        .take_while(move |(k, _)| k.starts_with(prefix))
}

// =============================================================================
// In-memory Store
// =============================================================================

/// In-memory store backed by a `BTreeMap`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.get(key).cloned()
    }

    fn has(&self, key: &[u8]) -> bool {
        self.data.contains_key(key)
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.data.insert(key, value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.data.remove(key);
    }

    fn prefix_iter(&self, prefix: &[u8]) -> PrefixIter {
        PrefixIter::new(
            scan(&self.data, prefix)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

// =============================================================================
// Change Set
// =============================================================================

/// Pending writes; `None` marks a deletion
///
/// Keys are applied in the order they were first written, so a caller that
/// writes the primary record before its indices gets the same order on apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    order: Vec<Vec<u8>>,
}

impl ChangeSet {
    fn record(&mut self, key: Vec<u8>, value: Option<Vec<u8>>) {
        if !self.writes.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.writes.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Keys in write order
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.order.iter().map(Vec::as_slice)
    }

    /// Write every pending change into `store`
    pub fn apply<S: KvStore + ?Sized>(mut self, store: &mut S) {
        for key in self.order {
            match self.writes.remove(&key) {
                Some(Some(value)) => store.set(key, value),
                Some(None) => store.delete(&key),
                None => {}
            }
        }
    }
}

// =============================================================================
// Overlay
// =============================================================================

/// Write-back overlay over a parent store
///
/// Reads see the overlay's own writes on top of the parent. Nothing reaches
/// the parent until the extracted [`ChangeSet`] is applied.
#[derive(Debug)]
pub struct CacheStore<'a, S: KvStore + ?Sized> {
    parent: &'a S,
    changes: ChangeSet,
}

impl<'a, S: KvStore + ?Sized> CacheStore<'a, S> {
    pub fn new(parent: &'a S) -> Self {
        Self {
            parent,
            changes: ChangeSet::default(),
        }
    }

    /// Finish the overlay, keeping its writes for the caller to apply
    pub fn into_changes(self) -> ChangeSet {
        self.changes
    }
}

impl<S: KvStore + ?Sized> KvStore for CacheStore<'_, S> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.changes.writes.get(key) {
            Some(value) => value.clone(),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.changes.record(key, Some(value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.changes.record(key.to_vec(), None);
    }

    fn prefix_iter(&self, prefix: &[u8]) -> PrefixIter {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = self.parent.prefix_iter(prefix).collect();

        for (key, value) in scan(&self.changes.writes, prefix) {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        PrefixIter::new(merged.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(iter: PrefixIter) -> Vec<Vec<u8>> {
        iter.map(|(k, _)| k).collect()
    }

    #[test]
    fn test_mem_store() {
        let mut store = MemStore::new();
        store.set(b"a:1".to_vec(), b"one".to_vec());
        store.set(b"a:2".to_vec(), b"two".to_vec());
        store.set(b"b:1".to_vec(), b"other".to_vec());

        assert!(store.has(b"a:1"));
        assert_eq!(store.get(b"a:2"), Some(b"two".to_vec()));
        assert_eq!(keys(store.prefix_iter(b"a:")), vec![b"a:1".to_vec(), b"a:2".to_vec()]);

        store.delete(b"a:1");
        assert!(!store.has(b"a:1"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_prefix_iter_is_snapshot() {
        let mut store = MemStore::new();
        store.set(b"a:1".to_vec(), vec![1]);

        let iter = store.prefix_iter(b"a:");
        store.set(b"a:2".to_vec(), vec![2]);

        assert_eq!(iter.count(), 1);
        assert_eq!(store.prefix_iter(b"a:").count(), 2);
    }

    #[test]
    fn test_cache_store_reads_through() {
        let mut parent = MemStore::new();
        parent.set(b"a:1".to_vec(), vec![1]);
        parent.set(b"a:2".to_vec(), vec![2]);

        let mut cache = CacheStore::new(&parent);
        cache.set(b"a:3".to_vec(), vec![3]);
        cache.delete(b"a:1");

        assert!(!cache.has(b"a:1"));
        assert_eq!(cache.get(b"a:2"), Some(vec![2]));
        assert_eq!(keys(cache.prefix_iter(b"a:")), vec![b"a:2".to_vec(), b"a:3".to_vec()]);

        // Parent untouched until the changes are applied
        assert!(parent.has(b"a:1"));
        assert!(!parent.has(b"a:3"));
    }

    #[test]
    fn test_change_set_apply() {
        let mut parent = MemStore::new();
        parent.set(b"a:1".to_vec(), vec![1]);

        let changes = {
            let mut cache = CacheStore::new(&parent);
            cache.set(b"a:2".to_vec(), vec![2]);
            cache.delete(b"a:1");
            cache.into_changes()
        };
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.keys().collect::<Vec<_>>(), vec![&b"a:2"[..], &b"a:1"[..]]);

        changes.apply(&mut parent);
        assert!(!parent.has(b"a:1"));
        assert_eq!(parent.get(b"a:2"), Some(vec![2]));
    }

    #[test]
    fn test_dropped_overlay_leaves_parent() {
        let parent = MemStore::new();
        {
            let mut cache = CacheStore::new(&parent);
            cache.set(b"k".to_vec(), vec![1]);
        }
        assert!(parent.is_empty());
    }
}

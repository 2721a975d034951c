//! core::cache
//!
//! Shape-keyed snapshot cache with explicit invalidation.
//!
//! # Design
//!
//! Each distinct query shape (full collection, filtered subset) holds one
//! materialized snapshot, populated on first read and evicted in its
//! entirety whenever any member of the underlying collection changes -
//! wholesale invalidation, never incremental patching. Point lookups keyed
//! by a natural identifier are stored separately and updated write-through
//! from the result of the mutating call, with no extra round trip to the
//! store.
//!
//! Entry lifetime is bounded by explicit invalidation only; there is no
//! time-to-live.
//!
//! The cache is a passive component: services perform the read-through
//! explicitly (get, load from store on miss, put), which keeps the coherence
//! contract directly unit-testable.
//!
//! # Example
//!
//! ```
//! use registrar::core::cache::SnapshotCache;
//!
//! #[derive(Clone, PartialEq, Debug)]
//! struct Row(u32);
//!
//! let cache: SnapshotCache<&'static str, Row> = SnapshotCache::new();
//!
//! // Read-through: miss, load, populate.
//! assert!(cache.get_collection(&"all").is_none());
//! cache.put_collection("all", vec![Row(1), Row(2)]);
//! assert_eq!(cache.get_collection(&"all").unwrap().len(), 2);
//!
//! // A mutation writes the point entry through and evicts collections.
//! cache.put_point("E123", Row(3));
//! cache.invalidate_collections();
//! assert!(cache.get_collection(&"all").is_none());
//! assert_eq!(cache.get_point("E123"), Some(Row(3)));
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

/// Snapshot cache for one collection of records.
///
/// `Q` is the query-shape key (typically a small enum); `V` is the
/// materialized record snapshot. Values are cloned out on read so callers
/// never hold the internal lock.
#[derive(Debug, Default)]
pub struct SnapshotCache<Q: Eq + Hash, V: Clone> {
    inner: Mutex<CacheInner<Q, V>>,
}

#[derive(Debug)]
struct CacheInner<Q, V> {
    /// Collection-shaped snapshots, keyed by query shape.
    collections: HashMap<Q, Vec<V>>,
    /// Point snapshots, keyed by natural identifier.
    points: HashMap<String, V>,
}

impl<Q, V> Default for CacheInner<Q, V> {
    fn default() -> Self {
        Self {
            collections: HashMap::new(),
            points: HashMap::new(),
        }
    }
}

impl<Q: Eq + Hash, V: Clone> SnapshotCache<Q, V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Get the cached snapshot for a collection shape, if populated.
    pub fn get_collection(&self, shape: &Q) -> Option<Vec<V>> {
        self.lock().collections.get(shape).cloned()
    }

    /// Store the snapshot for a collection shape (read-through populate).
    pub fn put_collection(&self, shape: Q, values: Vec<V>) {
        self.lock().collections.insert(shape, values);
    }

    /// Get the cached point snapshot for a natural key, if present.
    pub fn get_point(&self, key: &str) -> Option<V> {
        self.lock().points.get(key).cloned()
    }

    /// Store a point snapshot (write-through from a mutation result, or
    /// read-through populate on a point miss).
    pub fn put_point(&self, key: impl Into<String>, value: V) {
        self.lock().points.insert(key.into(), value);
    }

    /// Drop a single point entry.
    ///
    /// Used when a record's natural key changes or the record is deleted.
    pub fn remove_point(&self, key: &str) {
        self.lock().points.remove(key);
    }

    /// Evict every collection-shaped snapshot.
    ///
    /// Point entries survive; they are kept current write-through by the
    /// mutating calls themselves.
    pub fn invalidate_collections(&self) {
        self.lock().collections.clear();
    }

    /// Evict everything, collections and points alike.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.collections.clear();
        inner.points.clear();
    }

    /// Number of populated collection shapes.
    pub fn collection_count(&self) -> usize {
        self.lock().collections.len()
    }

    /// Number of point entries.
    pub fn point_count(&self) -> usize {
        self.lock().points.len()
    }

    /// Check if the cache holds nothing at all.
    pub fn is_empty(&self) -> bool {
        let inner = self.lock();
        inner.collections.is_empty() && inner.points.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner<Q, V>> {
        // Snapshots are plain data; a poisoned lock cannot leave them in a
        // torn state, so recover rather than propagate.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

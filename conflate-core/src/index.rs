//! Key-to-entry lookup.
//!
//! [`KeyIndex`] abstracts over how a conflation queue finds (or creates) the
//! [`Entry`](crate::entry) for a key. [`DynamicKeyIndex`] supports an
//! unbounded, discovered-at-runtime key set via a concurrent map.
//! [`DeclaredKeyIndex`] is for callers who know every key up front (typically
//! a small `enum`): lookup is a direct array index, with no map, no hashing,
//! and no entry insertion race to resolve.

use alloc::sync::Arc;
use alloc::vec::Vec;

/// Maps keys to the per-key entry that holds their pending value.
///
/// Implementations must guarantee that `get_or_insert` is idempotent for a
/// given key: concurrent callers racing to create the same key's entry must
/// all observe the same entry afterward (I-5, no split-brain entries).
pub trait KeyIndex<K, E> {
    /// Look up the entry for `key`, creating it via `make` if absent.
    fn get_or_insert(&self, key: K, make: impl FnOnce() -> E) -> Arc<E>;

    /// Look up the entry for `key` if it has already been created.
    fn get(&self, key: &K) -> Option<Arc<E>>;
}

/// A [`KeyIndex`] over an unbounded key set, backed by a sharded concurrent
/// hash map so lookups from different shards don't contend.
#[cfg(feature = "dashmap")]
pub struct DynamicKeyIndex<K, E> {
    map: dashmap::DashMap<K, Arc<E>>,
}

#[cfg(feature = "dashmap")]
impl<K, E> DynamicKeyIndex<K, E>
where
    K: core::hash::Hash + Eq + Clone,
{
    /// An empty index with no pre-sized capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: dashmap::DashMap::new(),
        }
    }

    /// An empty index pre-sized for `capacity` distinct keys.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: dashmap::DashMap::with_capacity(capacity),
        }
    }
}

#[cfg(feature = "dashmap")]
impl<K, E> Default for DynamicKeyIndex<K, E>
where
    K: core::hash::Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "dashmap")]
impl<K, E> KeyIndex<K, E> for DynamicKeyIndex<K, E>
where
    K: core::hash::Hash + Eq + Clone,
{
    fn get_or_insert(&self, key: K, make: impl FnOnce() -> E) -> Arc<E> {
        if let Some(existing) = self.map.get(&key) {
            return Arc::clone(&existing);
        }
        // `entry()` takes a shard write lock, so whichever caller wins the
        // race to create this key's entry does so alone; the loser's `make`
        // closure is simply never called.
        Arc::clone(&*self.map.entry(key).or_insert_with(|| Arc::new(make())))
    }

    fn get(&self, key: &K) -> Option<Arc<E>> {
        self.map.get(key).map(|e| Arc::clone(&e))
    }
}

/// A key that enumerates its own position in a dense, contiguous index
/// space, for use with [`DeclaredKeyIndex`].
pub trait IndexedKey {
    /// This key's slot, in `0..Self::CARDINALITY`.
    fn index(&self) -> usize;

    /// Total number of distinct keys.
    const CARDINALITY: usize;
}

/// A [`KeyIndex`] over a statically-known, dense key set: a plain array,
/// every entry eagerly created at construction. No hashing, no insertion
/// race, no allocation on the lookup path.
pub struct DeclaredKeyIndex<E> {
    entries: Vec<Arc<E>>,
}

impl<E> DeclaredKeyIndex<E> {
    /// Eagerly build one entry per key via `make`, called once per index
    /// position in order. `K` fixes the cardinality via [`IndexedKey`].
    pub fn new<K: IndexedKey>(make: impl FnMut(usize) -> E) -> Self {
        Self::with_cardinality(K::CARDINALITY, make)
    }

    /// Build with an explicit cardinality, bypassing [`IndexedKey`].
    pub fn with_cardinality(cardinality: usize, mut make: impl FnMut(usize) -> E) -> Self {
        let entries = (0..cardinality).map(|i| Arc::new(make(i))).collect();
        Self { entries }
    }
}

impl<K, E> KeyIndex<K, E> for DeclaredKeyIndex<E>
where
    K: IndexedKey,
{
    fn get_or_insert(&self, key: K, _make: impl FnOnce() -> E) -> Arc<E> {
        Arc::clone(&self.entries[key.index()])
    }

    fn get(&self, key: &K) -> Option<Arc<E>> {
        self.entries.get(key.index()).map(Arc::clone)
    }
}

//! The Atomic conflation queue: single CAS-free swap, no merge, no tag.
//!
//! The cheapest of the three variants. A repeat arrival for a still-pending
//! key simply replaces it (outcome EVICTED); there is no UNUSED/USED state
//! to track beyond "is the pointer null".
//!
//! Queue facades require `std`: the listener is backed by a `Mutex`. The
//! underlying [`AtomicEntry`], [`KeyIndex`] and [`BackingQueue`] primitives
//! remain usable from `alloc`-only, `no_std` code.

use std::sync::{Arc, Mutex};

use crate::backing_queue::BackingQueue;
use crate::entry::{AtomicEntry, Conflation};
use crate::error::{ConflateError, Result};
use crate::index::KeyIndex;
use crate::listener::ConflationEvent;
use spout::{DropSpout, Spout};

/// A conflation queue using the Atomic variant.
///
/// `I` is the key index (e.g. [`DynamicKeyIndex`](crate::index::DynamicKeyIndex)
/// or [`DeclaredKeyIndex`](crate::index::DeclaredKeyIndex)); `B` is the
/// backing queue (e.g. [`MpmcQueue`](crate::backing_queue::MpmcQueue)); `L`
/// is a [`ConflationListener`](crate::listener::ConflationListener) notified
/// of every outcome, defaulting to [`DropSpout`] (no observability overhead
/// unless a listener is actually attached).
pub struct AtomicConflationQueue<K, V, I, B, L = DropSpout> {
    index: I,
    backing: B,
    listener: Mutex<L>,
    _marker: core::marker::PhantomData<fn() -> (K, V)>,
}

impl<K, V, I, B> AtomicConflationQueue<K, V, I, B, DropSpout>
where
    K: Clone,
    I: KeyIndex<K, AtomicEntry<V>>,
    B: BackingQueue<(K, Arc<AtomicEntry<V>>)>,
{
    /// Build a queue over an already-constructed index and backing queue,
    /// with no listener attached.
    pub fn new(index: I, backing: B) -> Self {
        Self {
            index,
            backing,
            listener: Mutex::new(DropSpout),
            _marker: core::marker::PhantomData,
        }
    }
}

impl<K, V, I, B, L> AtomicConflationQueue<K, V, I, B, L>
where
    K: Clone,
    I: KeyIndex<K, AtomicEntry<V>>,
    B: BackingQueue<(K, Arc<AtomicEntry<V>>)>,
    L: Spout<ConflationEvent<K>>,
{
    /// Build a queue with an explicit listener.
    pub fn with_listener(index: I, backing: B, listener: L) -> Self {
        Self {
            index,
            backing,
            listener: Mutex::new(listener),
            _marker: core::marker::PhantomData,
        }
    }

    fn notify(&self, key: &K, outcome: Conflation) {
        let event = ConflationEvent {
            key: key.clone(),
            outcome,
        };
        self.listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .send(event);
    }

    /// Offer `value` for `key`. Appends to the backing queue only if no
    /// value was already pending for this key.
    pub fn enqueue(&self, key: K, value: V) -> Result<Conflation> {
        let entry = self.index.get_or_insert(key.clone(), AtomicEntry::empty);
        let prior = entry.swap_in(value);
        let outcome = if prior.is_none() {
            log::trace!("atomic queue: entry published, no prior value pending");
            self.backing.push((key.clone(), entry)).map_err(|_| {
                log::error!("atomic queue: backing queue refused a freshly published entry");
                ConflateError::BackingQueueRefused
            })?;
            Conflation::Unconflated
        } else {
            log::debug!("atomic queue: prior pending value evicted");
            Conflation::Evicted
        };
        self.notify(&key, outcome);
        Ok(outcome)
    }

    /// Remove and return the next distinct key with its most-recently
    /// conflated value, or `None` if nothing is pending.
    pub fn poll(&self) -> Option<(K, V)> {
        let (key, entry) = self.backing.pop()?;
        let value = entry
            .take()
            .expect("entry popped from the backing queue must hold a value");
        Some((key, *value))
    }

    /// Like [`Self::poll`], but invokes `callback` with the key and value
    /// before returning the polled value, instead of making the caller
    /// destructure the tuple themselves.
    pub fn poll_with<F>(&self, callback: F) -> Option<V>
    where
        F: FnOnce(&K, &V),
    {
        let (key, value) = self.poll()?;
        callback(&key, &value);
        Some(value)
    }

    /// Approximate number of keys currently pending in the backing queue.
    pub fn size(&self) -> usize {
        self.backing.len()
    }
}

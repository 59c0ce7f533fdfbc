//! The Evict conflation queue: two-phase UNUSED/USED marker exchange.
//!
//! Unlike the Atomic variant, a poller hands an exchange marker back to the
//! entry so a producer's next enqueue can reuse it instead of allocating —
//! see [`EvictAppender`]/[`EvictPoller`] for the per-thread scratch that
//! makes this allocation-free in steady state.

use std::sync::{Arc, Mutex};

use crate::backing_queue::BackingQueue;
use crate::entry::{Conflation, EvictEntry, MarkedValue};
use crate::error::{ConflateError, Result};
use crate::index::KeyIndex;
use crate::listener::ConflationEvent;
use spout::{DropSpout, Spout};

/// A conflation queue using the Evict variant.
pub struct EvictConflationQueue<K, V, I, B, L = DropSpout> {
    index: I,
    backing: B,
    listener: Mutex<L>,
    _marker: core::marker::PhantomData<fn() -> (K, V)>,
}

impl<K, V, I, B> EvictConflationQueue<K, V, I, B, DropSpout>
where
    K: Clone,
    I: KeyIndex<K, EvictEntry<V>>,
    B: BackingQueue<(K, Arc<EvictEntry<V>>)>,
{
    /// Build a queue with no listener attached.
    pub fn new(index: I, backing: B) -> Self {
        Self {
            index,
            backing,
            listener: Mutex::new(DropSpout),
            _marker: core::marker::PhantomData,
        }
    }
}

impl<K, V, I, B, L> EvictConflationQueue<K, V, I, B, L>
where
    K: Clone,
    I: KeyIndex<K, EvictEntry<V>>,
    B: BackingQueue<(K, Arc<EvictEntry<V>>)>,
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
        self.listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .send(ConflationEvent {
                key: key.clone(),
                outcome,
            });
    }

    /// Offer `value` for `key` using a per-thread [`EvictAppender`]'s scratch
    /// marker. Appends to the backing queue only on first arrival for this
    /// key since the last poll.
    ///
    /// Returns the outcome alongside the value released from the slot: the
    /// previously-evicted value when `EVICTED`, or a poller's exchange
    /// object when `UNCONFLATED` and a poll had already installed one.
    pub fn enqueue(
        &self,
        appender: &mut EvictAppender<V>,
        key: K,
        value: V,
    ) -> Result<(Conflation, Option<V>)> {
        let entry = self.index.get_or_insert(key.clone(), EvictEntry::empty);
        let scratch = appender.take_scratch();
        let (was_unused, released, scratch) = entry.enqueue(value, scratch);
        appender.give_back(scratch);
        let outcome = if was_unused {
            log::trace!("evict queue: entry published, no prior value pending");
            self.backing.push((key.clone(), entry)).map_err(|_| {
                log::error!("evict queue: backing queue refused a freshly published entry");
                ConflateError::BackingQueueRefused
            })?;
            Conflation::Unconflated
        } else {
            log::debug!("evict queue: prior pending value evicted");
            Conflation::Evicted
        };
        self.notify(&key, outcome);
        Ok((outcome, released))
    }

    /// Remove and return the next distinct key with its value, using a
    /// per-thread [`EvictPoller`]'s scratch marker. `exchange` is installed
    /// in the entry's now-empty slot so the next producer to enqueue for
    /// this key gets it back instead of `None`.
    pub fn poll(&self, poller: &mut EvictPoller<V>, exchange: Option<V>) -> Option<(K, V)> {
        let (key, entry) = self.backing.pop()?;
        let scratch = poller.take_scratch();
        let (value, scratch) = entry.poll(exchange, scratch);
        poller.give_back(scratch);
        Some((key, value))
    }

    /// Like [`Self::poll`], but invokes `callback` with the key and value
    /// before returning the polled value.
    pub fn poll_with<F>(&self, poller: &mut EvictPoller<V>, exchange: Option<V>, callback: F) -> Option<V>
    where
        F: FnOnce(&K, &V),
    {
        let (key, value) = self.poll(poller, exchange)?;
        callback(&key, &value);
        Some(value)
    }

    /// Approximate number of keys currently pending in the backing queue.
    pub fn size(&self) -> usize {
        self.backing.len()
    }
}

/// Per-thread reusable scratch for [`EvictConflationQueue::enqueue`].
pub struct EvictAppender<V> {
    scratch: Option<Box<MarkedValue<V>>>,
}

impl<V> Default for EvictAppender<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> EvictAppender<V> {
    /// A fresh appender; its first call allocates one marker, reused after.
    #[must_use]
    pub fn new() -> Self {
        Self { scratch: None }
    }

    fn take_scratch(&mut self) -> Box<MarkedValue<V>> {
        self.scratch
            .take()
            .unwrap_or_else(|| Box::new(MarkedValue::scratch()))
    }

    fn give_back(&mut self, scratch: Box<MarkedValue<V>>) {
        self.scratch = Some(scratch);
    }
}

/// Per-thread reusable scratch for [`EvictConflationQueue::poll`].
pub struct EvictPoller<V> {
    scratch: Option<Box<MarkedValue<V>>>,
}

impl<V> Default for EvictPoller<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> EvictPoller<V> {
    /// A fresh poller; its first call allocates one marker, reused after.
    #[must_use]
    pub fn new() -> Self {
        Self { scratch: None }
    }

    fn take_scratch(&mut self) -> Box<MarkedValue<V>> {
        self.scratch
            .take()
            .unwrap_or_else(|| Box::new(MarkedValue::scratch()))
    }

    fn give_back(&mut self, scratch: Box<MarkedValue<V>>) {
        self.scratch = Some(scratch);
    }
}

#[cfg(all(test, feature = "dashmap"))]
mod tests {
    use super::*;
    use crate::backing_queue::MpmcQueue;
    use crate::index::DynamicKeyIndex;

    fn queue() -> EvictConflationQueue<
        &'static str,
        i32,
        DynamicKeyIndex<&'static str, EvictEntry<i32>>,
        MpmcQueue<(&'static str, Arc<EvictEntry<i32>>)>,
    > {
        EvictConflationQueue::new(DynamicKeyIndex::new(), MpmcQueue::with_capacity(16))
    }

    #[test]
    fn repeat_key_conflates_before_poll() {
        let q = queue();
        let mut appender = EvictAppender::new();
        let mut poller = EvictPoller::new();
        assert_eq!(
            q.enqueue(&mut appender, "a", 1).unwrap(),
            (Conflation::Unconflated, None)
        );
        assert_eq!(
            q.enqueue(&mut appender, "a", 2).unwrap(),
            (Conflation::Evicted, Some(1))
        );
        assert_eq!(q.poll(&mut poller, None), Some(("a", 2)));
        assert_eq!(q.poll(&mut poller, None), None);
    }

    #[test]
    fn key_can_be_requeued_after_poll() {
        let q = queue();
        let mut appender = EvictAppender::new();
        let mut poller = EvictPoller::new();
        q.enqueue(&mut appender, "a", 1).unwrap();
        q.poll(&mut poller, None);
        assert_eq!(
            q.enqueue(&mut appender, "a", 2).unwrap(),
            (Conflation::Unconflated, None)
        );
    }

    #[test]
    fn exchange_given_on_poll_is_returned_by_next_enqueue() {
        let q = queue();
        let mut appender = EvictAppender::new();
        let mut poller = EvictPoller::new();

        assert_eq!(q.poll(&mut poller, None), None);

        assert_eq!(
            q.enqueue(&mut appender, "a", 1).unwrap(),
            (Conflation::Unconflated, None)
        );
        assert_eq!(
            q.enqueue(&mut appender, "a", 2).unwrap(),
            (Conflation::Evicted, Some(1))
        );
        assert_eq!(q.poll(&mut poller, Some(99)), Some(("a", 2)));

        assert_eq!(
            q.enqueue(&mut appender, "a", 3).unwrap(),
            (Conflation::Unconflated, Some(99))
        );
    }

    #[test]
    fn poll_with_invokes_callback_and_returns_value() {
        let q = queue();
        let mut appender = EvictAppender::new();
        let mut poller = EvictPoller::new();
        q.enqueue(&mut appender, "a", 1).unwrap();
        let mut seen = None;
        let value = q.poll_with(&mut poller, None, |k, v| seen = Some((*k, *v)));
        assert_eq!(value, Some(1));
        assert_eq!(seen, Some(("a", 1)));
    }

    #[test]
    fn size_reflects_distinct_pending_keys() {
        let q = queue();
        let mut appender = EvictAppender::new();
        let mut poller = EvictPoller::new();
        assert_eq!(q.size(), 0);
        q.enqueue(&mut appender, "a", 1).unwrap();
        q.enqueue(&mut appender, "b", 2).unwrap();
        q.enqueue(&mut appender, "a", 3).unwrap();
        assert_eq!(q.size(), 2);
        q.poll(&mut poller, None);
        assert_eq!(q.size(), 1);
    }
}

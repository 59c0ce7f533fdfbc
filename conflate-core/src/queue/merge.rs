//! The Merge conflation queue: three-state UNUSED/UNCONFIRMED/CONFIRMED
//! rendezvous, combining repeat arrivals with a user-supplied [`Merger`]
//! instead of discarding the older value outright.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use crate::backing_queue::BackingQueue;
use crate::entry::merge::{confirm_fresh, settle_and_take};
use crate::entry::{Conflation, MergeEntry, MergeMarker, Merger};
use crate::error::{ConflateError, Result};
use crate::index::KeyIndex;
use crate::listener::ConflationEvent;
use spout::{DropSpout, Spout};

/// A conflation queue using the Merge variant.
pub struct MergeConflationQueue<K, V, I, B, M, L = DropSpout> {
    index: I,
    backing: B,
    merger: M,
    listener: Mutex<L>,
    _marker: core::marker::PhantomData<fn() -> (K, V)>,
}

impl<K, V, I, B, M> MergeConflationQueue<K, V, I, B, M, DropSpout>
where
    K: Clone,
    I: KeyIndex<K, MergeEntry<V>>,
    B: BackingQueue<(K, Arc<MergeEntry<V>>)>,
    M: Merger<K, V>,
{
    /// Build a queue with no listener attached.
    pub fn new(index: I, backing: B, merger: M) -> Self {
        Self {
            index,
            backing,
            merger,
            listener: Mutex::new(DropSpout),
            _marker: core::marker::PhantomData,
        }
    }
}

impl<K, V, I, B, M, L> MergeConflationQueue<K, V, I, B, M, L>
where
    K: Clone,
    I: KeyIndex<K, MergeEntry<V>>,
    B: BackingQueue<(K, Arc<MergeEntry<V>>)>,
    M: Merger<K, V>,
    L: Spout<ConflationEvent<K>>,
{
    /// Build a queue with an explicit listener.
    pub fn with_listener(index: I, backing: B, merger: M, listener: L) -> Self {
        Self {
            index,
            backing,
            merger,
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

    /// Offer `value` for `key` using a per-thread [`MergeAppender`]'s
    /// scratch marker.
    ///
    /// If a value is already pending, this queue's [`Merger`] combines it
    /// with `value` rather than discarding either. If the merger panics,
    /// the pending value is left as it was (the panic-in-progress merge is
    /// treated as a no-op) and the panic is propagated to the caller.
    ///
    /// Returns the outcome alongside a poller's exchange object, when one
    /// was pending and this call was the first enqueue since (`UNCONFLATED`
    /// with no prior value merged away).
    pub fn enqueue(
        &self,
        appender: &mut MergeAppender<V>,
        key: K,
        value: V,
    ) -> Result<(Conflation, Option<V>)> {
        let entry = self.index.get_or_insert(key.clone(), MergeEntry::empty);
        let scratch = appender.take_scratch();
        let fresh = MergeEntry::prepare_unconfirmed(value, scratch);
        let (fresh_ptr, prior) = entry.install(fresh);
        let (was_unused, prior_value) = settle_and_take(&prior);

        let (outcome, exchange) = if was_unused {
            log::trace!("merge queue: entry published, no prior value pending");
            confirm_fresh(fresh_ptr);
            appender.give_back(prior);
            (Conflation::Unconflated, prior_value)
        } else {
            let older = prior_value.expect("settled Merge marker must hold a value");
            // SAFETY: `fresh_ptr` was installed by this call and is still
            // UNCONFIRMED; only this thread touches its value until `confirm_fresh`.
            let newer = unsafe { crate::entry::merge::take_fresh_value(fresh_ptr) }
                .expect("just-installed Merge marker must hold a value");
            let merged = match catch_unwind(AssertUnwindSafe(|| self.merger.merge(&key, &older, newer))) {
                Ok(merged) => merged,
                Err(payload) => {
                    log::warn!("merge queue: merger panicked, confirming slot with the older value");
                    // SAFETY: same precondition as above.
                    unsafe { crate::entry::merge::set_fresh_value(fresh_ptr, Some(older)) };
                    confirm_fresh(fresh_ptr);
                    appender.give_back(prior);
                    std::panic::resume_unwind(payload);
                }
            };
            // SAFETY: same precondition as above.
            unsafe { crate::entry::merge::set_fresh_value(fresh_ptr, Some(merged)) };
            confirm_fresh(fresh_ptr);
            appender.give_back(prior);
            log::debug!("merge queue: prior pending value merged with new arrival");
            (Conflation::Merged, None)
        };

        if outcome == Conflation::Unconflated {
            self.backing.push((key.clone(), entry)).map_err(|_| {
                log::error!("merge queue: backing queue refused a freshly published entry");
                ConflateError::BackingQueueRefused
            })?;
        }
        self.notify(&key, outcome);
        Ok((outcome, exchange))
    }

    /// Remove and return the next distinct key with its value, using a
    /// per-thread [`MergePoller`]'s scratch marker. `exchange` is installed
    /// in the entry's now-UNUSED slot so the next producer to enqueue for
    /// this key gets it back instead of `None`.
    pub fn poll(&self, poller: &mut MergePoller<V>, exchange: Option<V>) -> Option<(K, V)> {
        let (key, entry) = self.backing.pop()?;
        let scratch = poller.take_scratch();
        let fresh = MergeEntry::prepare_unused(exchange, scratch);
        let (_fresh_ptr, prior) = entry.install(fresh);
        let (was_unused, value) = settle_and_take(&prior);
        debug_assert!(!was_unused, "dequeued Merge entry must have been confirmed occupied");
        poller.give_back(prior);
        Some((key, value.expect("settled, occupied Merge marker must hold a value")))
    }

    /// Like [`Self::poll`], but invokes `callback` with the key and value
    /// before returning the polled value.
    pub fn poll_with<F>(&self, poller: &mut MergePoller<V>, exchange: Option<V>, callback: F) -> Option<V>
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

/// Per-thread reusable scratch for [`MergeConflationQueue::enqueue`].
pub struct MergeAppender<V> {
    scratch: Option<Box<MergeMarker<V>>>,
}

impl<V> Default for MergeAppender<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MergeAppender<V> {
    /// A fresh appender; its first call allocates one marker, reused after.
    #[must_use]
    pub fn new() -> Self {
        Self { scratch: None }
    }

    fn take_scratch(&mut self) -> Box<MergeMarker<V>> {
        self.scratch
            .take()
            .unwrap_or_else(|| Box::new(MergeMarker::scratch()))
    }

    fn give_back(&mut self, scratch: Box<MergeMarker<V>>) {
        self.scratch = Some(scratch);
    }
}

/// Per-thread reusable scratch for [`MergeConflationQueue::poll`].
pub struct MergePoller<V> {
    scratch: Option<Box<MergeMarker<V>>>,
}

impl<V> Default for MergePoller<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MergePoller<V> {
    /// A fresh poller; its first call allocates one marker, reused after.
    #[must_use]
    pub fn new() -> Self {
        Self { scratch: None }
    }

    fn take_scratch(&mut self) -> Box<MergeMarker<V>> {
        self.scratch
            .take()
            .unwrap_or_else(|| Box::new(MergeMarker::scratch()))
    }

    fn give_back(&mut self, scratch: Box<MergeMarker<V>>) {
        self.scratch = Some(scratch);
    }
}

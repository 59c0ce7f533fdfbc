use alloc::boxed::Box;
use core::sync::atomic::{AtomicPtr, Ordering};

/// Tag carried alongside an Evict entry's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No producer has enqueued a value since the last poll (or ever).
    Unused,
    /// A producer has enqueued a value that no poll has yet claimed.
    Used,
}

/// A marker swapped as a unit: state and value travel together so a
/// producer can tell, from one atomic swap, whether it found the entry
/// empty or occupied.
pub struct MarkedValue<V> {
    pub(crate) state: SlotState,
    pub(crate) value: Option<V>,
}

impl<V> MarkedValue<V> {
    fn unused(value: Option<V>) -> Self {
        Self {
            state: SlotState::Unused,
            value,
        }
    }

    fn used(value: V) -> Self {
        Self {
            state: SlotState::Used,
            value: Some(value),
        }
    }

    /// A fresh scratch marker for a new [`EvictAppender`](crate::queue::evict::EvictAppender)
    /// or [`EvictPoller`](crate::queue::evict::EvictPoller) to start from.
    #[must_use]
    pub fn scratch() -> Self {
        Self::unused(None)
    }
}

/// The value slot for the Evict conflation variant.
pub struct EvictEntry<V> {
    slot: AtomicPtr<MarkedValue<V>>,
}

impl<V> EvictEntry<V> {
    /// An entry with no pending value.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            slot: AtomicPtr::new(Box::into_raw(Box::new(MarkedValue::unused(None)))),
        }
    }

    fn swap_in(&self, fresh: Box<MarkedValue<V>>) -> Box<MarkedValue<V>> {
        let fresh_ptr = Box::into_raw(fresh);
        let prior_ptr = self.slot.swap(fresh_ptr, Ordering::AcqRel);
        // SAFETY: every pointer ever installed here came from `Box::into_raw`
        // on a `MarkedValue<V>`, and `swap` hands back sole ownership.
        unsafe { Box::from_raw(prior_ptr) }
    }

    /// Install `value`, reusing `scratch` as the fresh marker.
    ///
    /// Returns `(was_unused, released, recycled_scratch)`: `was_unused` is
    /// true when no value was previously pending (outcome UNCONFLATED,
    /// caller must append to the backing queue); `released` is the value
    /// that was discarded when `was_unused` is false (outcome EVICTED);
    /// `recycled_scratch` is the prior marker, reset and ready to reuse on
    /// the next call so no allocation is needed in steady state.
    pub fn enqueue(
        &self,
        value: V,
        mut scratch: Box<MarkedValue<V>>,
    ) -> (bool, Option<V>, Box<MarkedValue<V>>) {
        scratch.state = SlotState::Used;
        scratch.value = Some(value);
        let mut prior = self.swap_in(scratch);
        let was_unused = prior.state == SlotState::Unused;
        let released = prior.value.take();
        (was_unused, released, prior)
    }

    /// Swap an UNUSED marker (carrying an optional exchange value for the
    /// poller to hand back to a producer later) into the slot, returning the
    /// value that was pending.
    ///
    /// Only valid immediately after the entry is dequeued from the backing
    /// queue, which guarantees the prior marker is USED.
    pub fn poll(
        &self,
        exchange: Option<V>,
        mut scratch: Box<MarkedValue<V>>,
    ) -> (V, Box<MarkedValue<V>>) {
        scratch.state = SlotState::Unused;
        scratch.value = exchange;
        let mut prior = self.swap_in(scratch);
        debug_assert_eq!(prior.state, SlotState::Used, "dequeued entry must be USED");
        let value = prior
            .value
            .take()
            .expect("dequeued Evict entry must hold a value");
        (value, prior)
    }
}

impl<V> Drop for EvictEntry<V> {
    fn drop(&mut self) {
        let ptr = *self.slot.get_mut();
        drop(unsafe { Box::from_raw(ptr) });
    }
}

unsafe impl<V: Send> Send for EvictEntry<V> {}
unsafe impl<V: Send> Sync for EvictEntry<V> {}

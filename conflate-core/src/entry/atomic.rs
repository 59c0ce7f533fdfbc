use alloc::boxed::Box;
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

/// The value slot for the Atomic conflation variant: one pointer, one swap.
///
/// Enqueue and poll are the same primitive operation in opposite directions —
/// swap a new pointer in, get the old one back. There is no UNUSED/USED tag
/// because the null pointer itself carries that information.
pub struct AtomicEntry<V> {
    slot: AtomicPtr<V>,
}

impl<V> AtomicEntry<V> {
    /// An entry with no pending value.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            slot: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Swap `value` into the slot, returning whatever was there before.
    ///
    /// `None` means the entry had no pending value and must be appended to
    /// the backing queue by the caller; `Some` means a value was already
    /// queued and is now discarded in favor of `value` (outcome EVICTED for
    /// the Atomic variant, which never merges).
    pub fn swap_in(&self, value: V) -> Option<Box<V>> {
        let fresh = Box::into_raw(Box::new(value));
        let prior = self.slot.swap(fresh, Ordering::AcqRel);
        // SAFETY: every non-null pointer ever stored here was produced by
        // `Box::into_raw` in this type, and `swap` hands us the only
        // outstanding copy of it.
        (!prior.is_null()).then(|| unsafe { Box::from_raw(prior) })
    }

    /// Swap the empty marker into the slot, returning the pending value.
    ///
    /// Callers only invoke this immediately after dequeuing the entry from
    /// the backing queue, at which point the queued-implies-nonempty
    /// invariant guarantees a `Some`.
    pub fn take(&self) -> Option<Box<V>> {
        let prior = self.slot.swap(ptr::null_mut(), Ordering::AcqRel);
        (!prior.is_null()).then(|| unsafe { Box::from_raw(prior) })
    }
}

impl<V> Drop for AtomicEntry<V> {
    fn drop(&mut self) {
        let ptr = *self.slot.get_mut();
        if !ptr.is_null() {
            drop(unsafe { Box::from_raw(ptr) });
        }
    }
}

// SAFETY: the only shared state is the `AtomicPtr`; the pointee is always
// uniquely owned by whichever side currently holds it.
unsafe impl<V: Send> Send for AtomicEntry<V> {}
unsafe impl<V: Send> Sync for AtomicEntry<V> {}

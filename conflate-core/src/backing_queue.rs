//! The FIFO of which keys currently have a pending value.
//!
//! A conflation queue enqueues each key's [`Entry`](crate::entry) handle
//! here *once* per unconflated arrival — repeat arrivals for a key already
//! present only touch the entry's value slot, never this queue. That's the
//! whole point: the backing queue's length is bounded by the number of
//! distinct pending keys, not the number of arrivals.

use alloc::vec::Vec;
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

/// A FIFO of entry handles, safe for multiple concurrent appenders and
/// pollers.
pub trait BackingQueue<T> {
    /// Append `item`. Returns `item` back if the queue is at capacity.
    fn push(&self, item: T) -> Result<(), T>;

    /// Remove and return the oldest item, or `None` if empty.
    fn pop(&self) -> Option<T>;

    /// Number of items currently enqueued. Approximate under concurrent
    /// access from other producers/consumers — a caller observing `len()`
    /// alongside concurrent `push`/`pop` calls may see a value that was
    /// only momentarily accurate.
    fn len(&self) -> usize;
}

struct Node<T> {
    sequence: AtomicUsize,
    value: Option<T>,
}

/// A bounded, lock-free, multi-producer multi-consumer queue (Vyukov's
/// sequence-counter ring buffer), used as the default [`BackingQueue`].
///
/// Every slot carries its own sequence number, so producers and consumers
/// never contend on a shared head/tail beyond a single `compare_exchange`;
/// the ring is sized to a power of two so the index mask is a single `&`.
pub struct MpmcQueue<T> {
    buffer: Vec<UnsafeCell<Node<T>>>,
    mask: usize,
    enqueue_pos: AtomicUsize,
    _pad0: [u8; 64],
    dequeue_pos: AtomicUsize,
    _pad1: [u8; 64],
}

impl<T> MpmcQueue<T> {
    /// Build a queue whose capacity is the next power of two at or above
    /// `capacity` (minimum 2).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        let buffer = (0..capacity)
            .map(|i| {
                UnsafeCell::new(Node {
                    sequence: AtomicUsize::new(i),
                    value: None,
                })
            })
            .collect();
        Self {
            buffer,
            mask: capacity - 1,
            enqueue_pos: AtomicUsize::new(0),
            _pad0: [0; 64],
            dequeue_pos: AtomicUsize::new(0),
            _pad1: [0; 64],
        }
    }

    /// The ring's fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }
}

impl<T> BackingQueue<T> for MpmcQueue<T> {
    fn push(&self, value: T) -> Result<(), T> {
        let mask = self.mask;
        let mut pos = self.enqueue_pos.load(Ordering::Relaxed);
        loop {
            let node = &self.buffer[pos & mask];
            // SAFETY: the sequence counter arbitrates access; a slot is only
            // read or written by the single producer/consumer that currently
            // holds the matching sequence value.
            let seq = unsafe { (*node.get()).sequence.load(Ordering::Acquire) };
            let diff = seq as isize - pos as isize;
            match diff.cmp(&0) {
                core::cmp::Ordering::Equal => {
                    match self.enqueue_pos.compare_exchange_weak(
                        pos,
                        pos + 1,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => {
                            unsafe {
                                (*node.get()).value = Some(value);
                                (*node.get()).sequence.store(pos + 1, Ordering::Release);
                            }
                            return Ok(());
                        }
                        Err(observed) => pos = observed,
                    }
                }
                core::cmp::Ordering::Less => return Err(value),
                core::cmp::Ordering::Greater => pos = self.enqueue_pos.load(Ordering::Relaxed),
            }
        }
    }

    fn pop(&self) -> Option<T> {
        let mask = self.mask;
        let mut pos = self.dequeue_pos.load(Ordering::Relaxed);
        loop {
            let node = &self.buffer[pos & mask];
            let seq = unsafe { (*node.get()).sequence.load(Ordering::Acquire) };
            let diff = seq as isize - (pos + 1) as isize;
            match diff.cmp(&0) {
                core::cmp::Ordering::Equal => {
                    match self.dequeue_pos.compare_exchange_weak(
                        pos,
                        pos + 1,
                        Ordering::Relaxed,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => unsafe {
                            let value = (*node.get()).value.take();
                            (*node.get()).sequence.store(pos + mask + 1, Ordering::Release);
                            return value;
                        },
                        Err(observed) => pos = observed,
                    }
                }
                core::cmp::Ordering::Less => return None,
                core::cmp::Ordering::Greater => pos = self.dequeue_pos.load(Ordering::Relaxed),
            }
        }
    }

    fn len(&self) -> usize {
        let enqueued = self.enqueue_pos.load(Ordering::Relaxed);
        let dequeued = self.dequeue_pos.load(Ordering::Relaxed);
        enqueued.saturating_sub(dequeued)
    }
}

// SAFETY: all cross-thread access to `buffer` slots is arbitrated by the
// per-slot sequence counter, exactly as in the single-threaded-looking
// `UnsafeCell` accesses above.
unsafe impl<T: Send> Send for MpmcQueue<T> {}
unsafe impl<T: Send> Sync for MpmcQueue<T> {}

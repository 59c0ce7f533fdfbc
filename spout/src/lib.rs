//! A minimal, composable push-based trait for sending items to a destination.
//!
//! A [`Spout<T>`] is anything that can receive a stream of `T`s one at a time
//! (`send`) or in bulk (`send_all`), and later flush any buffering it does
//! internally. It has no notion of errors or backpressure — a spout that
//! needs either should encode it in `T` or in its own internal state.
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

/// Push-based destination for a stream of `T`.
pub trait Spout<T> {
    /// Send one item.
    fn send(&mut self, item: T);

    /// Send every item produced by an iterator.
    ///
    /// The default implementation calls [`send`](Self::send) once per item;
    /// override when a bulk path is cheaper (batched I/O, amortized locking).
    #[inline]
    fn send_all<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.send(item);
        }
    }

    /// Flush any internally buffered items. No-op for spouts that don't buffer.
    #[inline]
    fn flush(&mut self) {}
}

/// A spout that discards everything sent to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DropSpout;

impl<T> Spout<T> for DropSpout {
    #[inline]
    fn send(&mut self, _item: T) {}
}

/// A spout that accumulates everything sent to it into a `Vec`.
///
/// Useful in tests that assert on the set of evicted/conflated values a
/// listener observed.
#[cfg(feature = "alloc")]
#[derive(Debug, Default, Clone)]
pub struct CollectSpout<T>(alloc::vec::Vec<T>);

#[cfg(feature = "alloc")]
impl<T> CollectSpout<T> {
    /// Create an empty collecting spout.
    #[must_use]
    pub const fn new() -> Self {
        Self(alloc::vec::Vec::new())
    }

    /// Borrow the items collected so far, oldest first.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.0
    }

    /// Consume the spout, returning the collected items.
    #[must_use]
    pub fn into_items(self) -> alloc::vec::Vec<T> {
        self.0
    }
}

#[cfg(feature = "alloc")]
impl<T> Spout<T> for CollectSpout<T> {
    #[inline]
    fn send(&mut self, item: T) {
        self.0.push(item);
    }
}

/// A spout that forwards every item to a `std::sync::mpsc` sender.
///
/// Sends that fail because the receiver was dropped are silently discarded —
/// a spout has no error channel of its own.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct ChannelSpout<T>(std::sync::mpsc::Sender<T>);

#[cfg(feature = "std")]
impl<T> ChannelSpout<T> {
    /// Wrap an existing `mpsc::Sender`.
    #[must_use]
    pub const fn new(sender: std::sync::mpsc::Sender<T>) -> Self {
        Self(sender)
    }
}

#[cfg(feature = "std")]
impl<T> Spout<T> for ChannelSpout<T> {
    #[inline]
    fn send(&mut self, item: T) {
        let _ = self.0.send(item);
    }
}

/// [`ChannelSpout`] over a synchronous, bounded `std::sync::mpsc::SyncSender`.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SyncChannelSpout<T>(std::sync::mpsc::SyncSender<T>);

#[cfg(feature = "std")]
impl<T> SyncChannelSpout<T> {
    /// Wrap an existing `mpsc::SyncSender`.
    #[must_use]
    pub const fn new(sender: std::sync::mpsc::SyncSender<T>) -> Self {
        Self(sender)
    }
}

#[cfg(feature = "std")]
impl<T> Spout<T> for SyncChannelSpout<T> {
    #[inline]
    fn send(&mut self, item: T) {
        let _ = self.0.send(item);
    }
}

/// Fan a single stream of items out to two spouts.
pub struct TeeSpout<A, B>(pub A, pub B);

impl<T: Clone, A: Spout<T>, B: Spout<T>> Spout<T> for TeeSpout<A, B> {
    #[inline]
    fn send(&mut self, item: T) {
        self.0.send(item.clone());
        self.1.send(item);
    }

    #[inline]
    fn flush(&mut self) {
        self.0.flush();
        self.1.flush();
    }
}

/// A spout that counts how many items it has seen without storing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingSpout {
    count: u64,
}

impl CountingSpout {
    /// Create a fresh counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Number of items sent so far.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }
}

impl<T> Spout<T> for CountingSpout {
    #[inline]
    fn send(&mut self, _item: T) {
        self.count += 1;
    }
}

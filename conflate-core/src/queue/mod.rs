//! Conflation queue facades: one per concurrency variant.
//!
//! Each variant combines a [`KeyIndex`](crate::index::KeyIndex), a
//! [`BackingQueue`](crate::backing_queue::BackingQueue), and a choice of
//! [`Entry`](crate::entry) shape into a queue with the same basic contract:
//! an [`Appender`] offers `(key, value)` pairs in, conflating repeat arrivals
//! for a still-pending key; a [`Poller`] drains distinct keys out, oldest
//! unconflated arrival first.

pub mod atomic;
pub mod evict;
pub mod merge;

pub use atomic::AtomicConflationQueue;
pub use evict::EvictConflationQueue;
pub use merge::MergeConflationQueue;

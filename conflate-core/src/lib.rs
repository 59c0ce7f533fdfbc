//! Conflation queues: Atomic, Evict and Merge variants over a pluggable
//! [`BackingQueue`] and [`KeyIndex`].
//!
//! A conflation queue is a FIFO of *keys*, not of values: repeat arrivals
//! for a key that hasn't been polled yet never grow the queue, they fold
//! into the key's pending [`entry`] according to the variant's policy
//! (replace, discard, or merge). This bounds queue depth by the number of
//! distinct in-flight keys rather than arrival rate, which is the property
//! that makes these useful on a hot ingest path that a slower consumer
//! can't always keep up with.
#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod backing_queue;
pub mod entry;
pub mod error;
pub mod index;
#[cfg(feature = "std")]
pub mod listener;
#[cfg(feature = "std")]
pub mod queue;

pub use backing_queue::{BackingQueue, MpmcQueue};
pub use entry::Conflation;
pub use error::{ConflateError, Result};
pub use index::KeyIndex;
#[cfg(feature = "dashmap")]
pub use index::DynamicKeyIndex;
pub use index::{DeclaredKeyIndex, IndexedKey};
#[cfg(feature = "std")]
pub use listener::{ConflationEvent, ConflationListener};
#[cfg(feature = "std")]
pub use queue::{AtomicConflationQueue, EvictConflationQueue, MergeConflationQueue};

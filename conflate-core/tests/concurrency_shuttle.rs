//! Model-checked concurrency test: concurrent producers racing to enqueue
//! under a shared key against a single consumer polling it out, explored
//! across the thread interleavings `shuttle` can reach in a bounded search.
//!
//! This targets the races the inline unit tests can't: two producers
//! enqueueing the same key at the same instant must agree on exactly one
//! winner being reported `Unconflated` and the backing queue ending up with
//! exactly one entry for that key, under every interleaving shuttle tries.

#![cfg(feature = "dashmap")]

use std::sync::Arc;

use conflate_core::entry::{AtomicEntry, Conflation, EvictEntry, MergeEntry};
use conflate_core::index::DynamicKeyIndex;
use conflate_core::queue::atomic::AtomicConflationQueue;
use conflate_core::queue::evict::{EvictAppender, EvictConflationQueue, EvictPoller};
use conflate_core::queue::merge::{MergeAppender, MergeConflationQueue, MergePoller};
use conflate_core::MpmcQueue;

#[test]
fn concurrent_enqueues_on_one_key_agree_on_a_single_unconflated_winner() {
    shuttle::check_random(
        || {
            let q: Arc<
                AtomicConflationQueue<
                    &str,
                    i32,
                    DynamicKeyIndex<&str, AtomicEntry<i32>>,
                    MpmcQueue<(&str, Arc<AtomicEntry<i32>>)>,
                >,
            > = Arc::new(AtomicConflationQueue::new(
                DynamicKeyIndex::new(),
                MpmcQueue::with_capacity(8),
            ));

            let handles: Vec<_> = (0..3)
                .map(|i| {
                    let q = Arc::clone(&q);
                    shuttle::thread::spawn(move || q.enqueue("shared", i).unwrap())
                })
                .collect();

            let outcomes: Vec<Conflation> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();

            let unconflated = outcomes
                .iter()
                .filter(|o| **o == Conflation::Unconflated)
                .count();
            assert_eq!(unconflated, 1, "exactly one enqueue must win the race");

            assert!(q.poll().is_some());
            assert!(q.poll().is_none());
        },
        200,
    );
}

#[test]
fn concurrent_evict_enqueues_agree_on_a_single_unconflated_winner() {
    shuttle::check_random(
        || {
            let q: Arc<
                EvictConflationQueue<
                    &str,
                    i32,
                    DynamicKeyIndex<&str, EvictEntry<i32>>,
                    MpmcQueue<(&str, Arc<EvictEntry<i32>>)>,
                >,
            > = Arc::new(EvictConflationQueue::new(
                DynamicKeyIndex::new(),
                MpmcQueue::with_capacity(8),
            ));

            let handles: Vec<_> = (0..3)
                .map(|i| {
                    let q = Arc::clone(&q);
                    shuttle::thread::spawn(move || {
                        let mut appender = EvictAppender::new();
                        q.enqueue(&mut appender, "shared", i).unwrap()
                    })
                })
                .collect();

            let outcomes: Vec<Conflation> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();

            let unconflated = outcomes
                .iter()
                .filter(|o| **o == Conflation::Unconflated)
                .count();
            assert_eq!(unconflated, 1, "exactly one enqueue must win the race");

            let mut poller = EvictPoller::new();
            assert!(q.poll(&mut poller, None).is_some());
            assert!(q.poll(&mut poller, None).is_none());
        },
        200,
    );
}

#[test]
fn concurrent_merge_enqueues_fold_into_one_entry_with_the_correct_sum() {
    shuttle::check_random(
        || {
            let q: Arc<
                MergeConflationQueue<
                    &str,
                    i32,
                    DynamicKeyIndex<&str, MergeEntry<i32>>,
                    MpmcQueue<(&str, Arc<MergeEntry<i32>>)>,
                    fn(&&str, &i32, i32) -> i32,
                >,
            > = Arc::new(MergeConflationQueue::new(
                DynamicKeyIndex::new(),
                MpmcQueue::with_capacity(8),
                |_k: &&str, older: &i32, newer: i32| older + newer,
            ));

            let values = [1, 2, 3];
            let handles: Vec<_> = values
                .iter()
                .copied()
                .map(|v| {
                    let q = Arc::clone(&q);
                    shuttle::thread::spawn(move || {
                        let mut appender = MergeAppender::new();
                        q.enqueue(&mut appender, "shared", v).unwrap()
                    })
                })
                .collect();

            let outcomes: Vec<Conflation> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();

            let unconflated = outcomes
                .iter()
                .filter(|o| **o == Conflation::Unconflated)
                .count();
            assert_eq!(unconflated, 1, "exactly one enqueue starts the entry fresh");

            let mut poller = MergePoller::new();
            let (_key, total) = q
                .poll(&mut poller, None)
                .expect("merged entry must be pollable");
            assert_eq!(total, values.iter().sum::<i32>());
            assert!(q.poll(&mut poller, None).is_none());
        },
        200,
    );
}

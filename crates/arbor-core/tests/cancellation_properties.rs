//! Cancellation properties under fuzzed emission/pump/cancel orderings.
//!
//! The contract under test: once a bag is cancelled, nothing more is
//! delivered through its subscriptions — not values sent afterwards, and
//! not values that were already queued but not yet pumped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use arbor_core::{CancelBag, EventSource, MainScheduler};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Send,
    Pump,
    Cancel,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Send),
        3 => Just(Op::Pump),
        1 => Just(Op::Cancel),
    ]
}

proptest! {
    #[test]
    fn delivery_count_matches_pre_cancel_pumps(
        ops in proptest::collection::vec(op_strategy(), 1..64),
    ) {
        let scheduler = MainScheduler::new();
        let source = EventSource::new(&scheduler);
        let bag = CancelBag::new();
        let delivered = Arc::new(AtomicUsize::new(0));
        {
            let delivered = delivered.clone();
            source
                .subscribe(move |_: &u32| {
                    delivered.fetch_add(1, Ordering::SeqCst);
                })
                .store_in(&bag);
        }

        let mut queued = 0usize;
        let mut expected = 0usize;
        let mut cancelled = false;
        for op in ops {
            match op {
                Op::Send => {
                    source.send(1);
                    if !cancelled {
                        queued += 1;
                    }
                }
                Op::Pump => {
                    scheduler.run_until_idle();
                    if !cancelled {
                        expected += queued;
                        queued = 0;
                    }
                }
                Op::Cancel => {
                    // Anything still queued must be dropped, not flushed.
                    bag.cancel();
                    cancelled = true;
                }
            }
            prop_assert!(delivered.load(Ordering::SeqCst) <= expected + queued);
        }

        scheduler.run_until_idle();
        prop_assert_eq!(delivered.load(Ordering::SeqCst), expected);
    }
}

#[test]
fn cancel_freezes_delivery_against_background_senders() {
    let scheduler = MainScheduler::new();
    let source = EventSource::new(&scheduler);
    let bag = CancelBag::new();
    let delivered = Arc::new(AtomicUsize::new(0));
    {
        let delivered = delivered.clone();
        source
            .subscribe(move |_: &u32| {
                delivered.fetch_add(1, Ordering::SeqCst);
            })
            .store_in(&bag);
    }

    let pre_cancel: Vec<_> = (0..4)
        .map(|i| {
            let source = source.clone();
            thread::spawn(move || source.send(i))
        })
        .collect();
    for handle in pre_cancel {
        handle.join().unwrap();
    }

    bag.cancel();
    scheduler.run_until_idle();
    let frozen = delivered.load(Ordering::SeqCst);
    assert_eq!(frozen, 0);

    let post_cancel: Vec<_> = (0..4)
        .map(|i| {
            let source = source.clone();
            thread::spawn(move || source.send(i))
        })
        .collect();
    for handle in post_cancel {
        handle.join().unwrap();
    }

    scheduler.run_until_idle();
    assert_eq!(delivered.load(Ordering::SeqCst), frozen);
}

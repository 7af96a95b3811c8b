use proptest::prelude::*;
use reactor::time::ManualClock;
use reactor::{Runtime, create_task, gather, sleep};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Spawns one task per delay, in order, and records the order they resume in.
fn resume_order(delays: &[u64]) -> Vec<usize> {
    let rt = Runtime::builder()
        .clock(ManualClock::new())
        .wait_for_all(true)
        .build();
    let order = Rc::new(RefCell::new(Vec::new()));

    let o = order.clone();
    let delays = delays.to_vec();
    rt.run(async move {
        for (index, delay) in delays.into_iter().enumerate() {
            let o = o.clone();
            create_task(async move {
                sleep(Duration::from_millis(delay)).await;
                o.borrow_mut().push(index);
            });
        }
    })
    .unwrap();

    order.take()
}

proptest! {
    #[test]
    fn resume_order_follows_wake_time_then_creation(delays in prop::collection::vec(0u64..20, 1..32)) {
        let mut expected: Vec<usize> = (0..delays.len()).collect();
        expected.sort_by_key(|&index| delays[index]);

        prop_assert_eq!(resume_order(&delays), expected);
    }

    #[test]
    fn gather_results_follow_argument_order(delays in prop::collection::vec(0u64..50, 0..16)) {
        let rt = Runtime::builder().clock(ManualClock::new()).build();

        let expected = delays.clone();
        let results = rt.run(async move {
            gather(delays.into_iter().map(|delay| async move {
                sleep(Duration::from_millis(delay)).await;
                delay
            }))
            .await
        });

        prop_assert_eq!(results, Ok(expected));
    }
}

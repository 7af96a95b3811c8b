use reactor::time::ManualClock;
use reactor::{Event, Runtime, create_task, sleep};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Counts how many times it has been dropped.
struct DropCounter(Rc<Cell<u32>>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

fn virtual_runtime(wait_for_all: bool) -> Runtime {
    Runtime::builder()
        .clock(ManualClock::new())
        .wait_for_all(wait_for_all)
        .build()
}

#[test]
fn test_pending_tasks_never_resume_after_primary_finishes() {
    let rt = virtual_runtime(false);
    let after_sleep = Rc::new(Cell::new(false));
    let drops = Rc::new(Cell::new(0));

    let flag = after_sleep.clone();
    let d = drops.clone();
    let result = rt.run(async move {
        create_task(async move {
            let _guard = DropCounter(d);
            sleep(Duration::from_secs(1)).await;
            flag.set(true);
        });
        sleep(Duration::from_millis(10)).await;
        "main done"
    });

    assert_eq!(result, Ok("main done"));
    assert!(!after_sleep.get(), "Cancelled task must not run past its suspension point");
    assert_eq!(drops.get(), 1, "Cancelled task should release what it holds");
    assert_eq!(rt.pending_tasks(), 0);
}

#[test]
fn test_never_started_tasks_are_discarded() {
    let rt = virtual_runtime(false);
    let started = Rc::new(Cell::new(false));
    let drops = Rc::new(Cell::new(0));

    let s = started.clone();
    let guard = DropCounter(drops.clone());
    rt.run(async move {
        create_task(async move {
            let _guard = guard;
            s.set(true);
        });
    })
    .unwrap();

    assert!(!started.get());
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_cancellation_is_transitive_through_joins() {
    let rt = virtual_runtime(false);
    let log = Rc::new(RefCell::new(Vec::new()));
    let drops = Rc::new(Cell::new(0));

    let l = log.clone();
    let d = drops.clone();
    rt.run(async move {
        let l1 = l.clone();
        let d1 = d.clone();
        let slow = create_task(async move {
            let _guard = DropCounter(d1);
            sleep(Duration::from_secs(10)).await;
            l1.borrow_mut().push("slow");
        });

        let l2 = l.clone();
        create_task(async move {
            let _guard = DropCounter(d);
            slow.await;
            l2.borrow_mut().push("dependent");
        });

        sleep(Duration::from_secs(1)).await;
    })
    .unwrap();

    assert!(log.borrow().is_empty());
    assert_eq!(drops.get(), 2);
}

#[test]
fn test_event_waiters_are_discarded() {
    let rt = virtual_runtime(false);
    let event = Event::new();
    let drops = Rc::new(Cell::new(0));

    let e = event.clone();
    let probe = event.clone();
    let d = drops.clone();
    rt.run(async move {
        create_task(async move {
            let _guard = DropCounter(d);
            e.wait().await;
        });
        sleep(Duration::from_secs(1)).await;
        assert_eq!(probe.waiter_count(), 1);
    })
    .unwrap();

    assert_eq!(drops.get(), 1);
    assert_eq!(event.waiter_count(), 0);
}

#[test]
fn test_wait_for_all_runs_every_task_to_completion() {
    let rt = virtual_runtime(true);
    let counter = Rc::new(Cell::new(0));

    let c = counter.clone();
    let result = rt.run(async move {
        for i in 0..10u64 {
            let c = c.clone();
            create_task(async move {
                sleep(Duration::from_secs(i)).await;
                c.set(c.get() + 1);
            });
        }
        9000
    });

    assert_eq!(result, Ok(9000));
    assert_eq!(counter.get(), 10);
    assert_eq!(rt.pending_tasks(), 0);
}

#[test]
fn test_wait_for_all_discards_tasks_parked_forever() {
    let rt = virtual_runtime(true);
    let event = Event::new();
    let drops = Rc::new(Cell::new(0));

    let e = event.clone();
    let d = drops.clone();
    let result = rt.run(async move {
        create_task(async move {
            let _guard = DropCounter(d);
            e.wait().await;
        });
        1
    });

    assert_eq!(result, Ok(1));
    assert_eq!(drops.get(), 1);
    assert_eq!(rt.pending_tasks(), 0);
    assert_eq!(event.waiter_count(), 0);
}

#[test]
fn test_panicking_destructor_is_suppressed() {
    struct Boom;

    impl Drop for Boom {
        fn drop(&mut self) {
            panic!("cleanup failed");
        }
    }

    let rt = virtual_runtime(false);
    let survivor_drops = Rc::new(Cell::new(0));

    let d = survivor_drops.clone();
    let result = rt.run(async move {
        create_task(async move {
            let _boom = Boom;
            sleep(Duration::from_secs(1)).await;
        });
        create_task(async move {
            let _guard = DropCounter(d);
            sleep(Duration::from_secs(1)).await;
        });
        sleep(Duration::ZERO).await;
        "ok"
    });

    assert_eq!(result, Ok("ok"));
    assert_eq!(survivor_drops.get(), 1, "Other tasks are still discarded");
}

#[test]
fn test_discarded_task_spawning_in_destructor_is_cleaned_up() {
    struct SpawnOnDrop(Rc<Cell<bool>>);

    impl Drop for SpawnOnDrop {
        fn drop(&mut self) {
            let ran = self.0.clone();
            create_task(async move { ran.set(true) });
        }
    }

    let rt = virtual_runtime(false);
    let ran = Rc::new(Cell::new(false));

    let r = ran.clone();
    rt.run(async move {
        create_task(async move {
            let _spawner = SpawnOnDrop(r);
            sleep(Duration::from_secs(1)).await;
        });
        sleep(Duration::ZERO).await;
    })
    .unwrap();

    assert!(!ran.get());
    assert_eq!(rt.pending_tasks(), 0);
}

#[test]
fn test_task_sleeping_forever_is_discarded() {
    let rt = virtual_runtime(false);
    let woke = Rc::new(Cell::new(false));
    let drops = Rc::new(Cell::new(0));

    let w = woke.clone();
    let d = drops.clone();
    let result = rt.run(async move {
        create_task(async move {
            let _guard = DropCounter(d);
            sleep(Duration::MAX).await;
            w.set(true);
        });
        sleep(Duration::ZERO).await;
        7
    });

    assert_eq!(result, Ok(7));
    assert!(!woke.get());
    assert_eq!(drops.get(), 1);
    assert_eq!(rt.pending_tasks(), 0);
}

#[test]
fn test_sleeping_forever_on_real_clock_does_not_overflow() {
    let rt = Runtime::new();

    let result = rt.run(async {
        create_task(async { sleep(Duration::MAX).await });
        sleep(Duration::ZERO).await;
        "done"
    });

    assert_eq!(result, Ok("done"));
}

#[test]
fn test_joining_a_discarded_task_discards_the_joiner() {
    let rt = virtual_runtime(false);

    // Queued before the first run, then discarded by that run's teardown.
    let orphan = rt.create_task(async {
        sleep(Duration::from_secs(60)).await;
        1
    });
    rt.run(async {}).unwrap();
    assert_eq!(rt.pending_tasks(), 0);

    let joined = Rc::new(Cell::new(false));
    let drops = Rc::new(Cell::new(0));

    let j = joined.clone();
    let d = drops.clone();
    let seen = drops.clone();
    let result = rt.run(async move {
        create_task(async move {
            let _guard = DropCounter(d);
            orphan.await;
            j.set(true);
        });
        sleep(Duration::from_secs(1)).await;
        seen.get()
    });

    assert_eq!(result, Ok(1), "Joiner is discarded as soon as it joins");
    assert!(!joined.get());
    assert_eq!(rt.pending_tasks(), 0);
}

use reactor::time::ManualClock;
use reactor::{Runtime, RuntimeBuilder, create_task, sleep};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

#[test]
fn test_builder_creation() {
    let rt = RuntimeBuilder::new().build();
    assert!(!rt.is_running());
    assert_eq!(rt.pending_tasks(), 0);
}

#[test]
fn test_builder_simple_future() {
    let rt = RuntimeBuilder::new().build();
    let completed = Rc::new(Cell::new(false));
    let completed_clone = completed.clone();

    rt.run(async move {
        completed_clone.set(true);
    })
    .unwrap();

    assert!(completed.get(), "Future should have completed");
}

#[test]
fn test_builder_immediate_result() {
    let rt = RuntimeBuilder::new().build();
    let value = 42;

    let result = rt.run(async move { value });

    assert_eq!(result, Ok(42), "Future should return correct value");
}

#[test]
fn test_builder_multiple_instances() {
    let rt1 = RuntimeBuilder::new().build();
    let rt2 = RuntimeBuilder::new().build();

    assert_eq!(rt1.run(async { 10 }), Ok(10));
    assert_eq!(rt2.run(async { 20 }), Ok(20));
}

#[test]
fn test_runtime_is_reusable() {
    let rt = Runtime::new();

    assert_eq!(rt.run(async { 1 }), Ok(1));
    assert_eq!(rt.run(async { 2 }), Ok(2));
    assert!(!rt.is_running());
}

#[test]
fn test_builder_with_async_function() {
    let rt = RuntimeBuilder::new().build();
    let counter = Rc::new(Cell::new(0));

    async fn increment_counter(counter: Rc<Cell<i32>>) -> i32 {
        counter.set(counter.get() + 1);
        counter.get()
    }

    let result = rt.run(increment_counter(counter.clone()));

    assert_eq!(result, Ok(1), "Counter should be incremented");
    assert_eq!(counter.get(), 1, "Shared counter should be 1");
}

#[test]
fn test_create_task_before_run() {
    let rt = RuntimeBuilder::new().wait_for_all(true).build();
    let state = Rc::new(RefCell::new(Vec::new()));

    for i in 0..3 {
        let state_clone = state.clone();
        rt.create_task(async move {
            state_clone.borrow_mut().push(i);
        });
    }
    assert_eq!(rt.pending_tasks(), 3);

    rt.run(async {}).unwrap();

    assert_eq!(*state.borrow(), vec![0, 1, 2], "Pre-created tasks run in order");
    assert_eq!(rt.pending_tasks(), 0);
}

#[test]
fn test_run_on_pre_created_handle() {
    let rt = Runtime::new();
    let handle = rt.create_task(async { "done" });

    assert_eq!(rt.run(handle), Ok("done"));
}

#[test]
fn test_configured_policy_is_default_for_run() {
    let counter = Rc::new(Cell::new(0));

    for (wait_for_all, expected) in [(false, 0), (true, 1)] {
        let clock = ManualClock::new();
        let rt = Runtime::builder()
            .clock(clock)
            .wait_for_all(wait_for_all)
            .build();
        counter.set(0);

        let c = counter.clone();
        rt.run(async move {
            create_task(async move {
                sleep(Duration::from_secs(1)).await;
                c.set(c.get() + 1);
            });
        })
        .unwrap();

        assert_eq!(counter.get(), expected, "wait_for_all = {wait_for_all}");
    }
}

#[test]
fn test_run_with_overrides_configured_policy() {
    let rt = Runtime::builder()
        .clock(ManualClock::new())
        .wait_for_all(false)
        .build();
    let finished = Rc::new(Cell::new(false));

    let f = finished.clone();
    rt.run_with(
        async move {
            create_task(async move {
                sleep(Duration::from_secs(5)).await;
                f.set(true);
            });
        },
        true,
    )
    .unwrap();

    assert!(finished.get());
}

#[test]
fn test_free_run_function() {
    let order = Rc::new(RefCell::new(Vec::new()));

    let o = order.clone();
    let val = reactor::run(
        async move {
            for i in (0..5u64).rev() {
                let o = o.clone();
                create_task(async move {
                    sleep(Duration::from_millis(i * 5)).await;
                    o.borrow_mut().push(i);
                });
            }
            9000
        },
        true,
    );

    assert_eq!(val, Ok(9000));
    assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4]);
}

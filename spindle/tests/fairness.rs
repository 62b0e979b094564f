use spindle::{Loop, task, yield_now};

use std::cell::RefCell;
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_round_robin_order() {
    init_logging();

    let mut event_loop = Loop::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    for name in ['A', 'B', 'C'] {
        let log = log.clone();
        event_loop.add_task(async move {
            for round in 0..3 {
                log.borrow_mut().push(format!("{name}{round}"));
                yield_now().await;
            }
        });
    }

    let stats = event_loop.run();

    assert_eq!(
        *log.borrow(),
        vec!["A0", "B0", "C0", "A1", "B1", "C1", "A2", "B2", "C2"]
    );
    assert_eq!(stats.completed, 3);
    // Three yields plus the final resume that completes, per task.
    assert_eq!(stats.resumed, 12);
}

#[test]
fn test_task_added_while_running_goes_to_the_tail() {
    let mut event_loop = Loop::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let handle = event_loop.handle();

    let first = log.clone();
    let late = log.clone();
    event_loop.add_task(async move {
        first.borrow_mut().push("first:0");
        handle.add_task(async move { late.borrow_mut().push("late") });
        yield_now().await;
        first.borrow_mut().push("first:1");
    });

    let second = log.clone();
    event_loop.add_task(async move {
        second.borrow_mut().push("second");
    });

    event_loop.run();

    assert_eq!(*log.borrow(), vec!["first:0", "second", "late", "first:1"]);
}

#[test]
fn test_spawn_and_join() {
    let mut event_loop = Loop::new();

    let result = event_loop.run_task(async {
        let handle = task::spawn(async {
            yield_now().await;
            21 * 2
        });

        assert!(!handle.is_finished());
        handle.await
    });

    assert_eq!(result, Ok(42));
}

#[test]
fn test_join_handle_of_finished_task_resolves_immediately() {
    let mut event_loop = Loop::new();

    let result = event_loop.run_task(async {
        let handle = task::spawn(async { "ready" });

        for _ in 0..3 {
            yield_now().await;
        }

        assert!(handle.is_finished());
        handle.await
    });

    assert_eq!(result, Ok("ready"));
}

#[test]
fn test_loop_can_be_reused() {
    let mut event_loop = Loop::new();

    assert_eq!(event_loop.run_task(async { 1 }), Ok(1));
    assert_eq!(event_loop.run_task(async { 2 }), Ok(2));
}

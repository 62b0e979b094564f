use spindle::time::{sleep, sleep_until};
use spindle::{IdleStrategy, Loop, LoopBuilder, gather, yield_now};

use std::cell::RefCell;
use std::future::{Future, poll_fn};
use std::pin::Pin;
use std::rc::Rc;
use std::task::Poll;
use std::time::{Duration, Instant};

const UNIT: Duration = Duration::from_millis(10);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Sleeps for 3, 1, then 2 units and records the order of wake-ups.
fn staggered_sleeps(mut event_loop: Loop) {
    init_logging();

    let start = Instant::now();
    let woke = Rc::new(RefCell::new(Vec::new()));

    for units in [3u32, 1, 2] {
        let woke = woke.clone();
        event_loop.add_task(async move {
            sleep(UNIT * units).await;

            let elapsed = start.elapsed();
            assert!(elapsed >= UNIT * units, "woke early after {elapsed:?}");
            woke.borrow_mut().push(units);
        });
    }

    let stats = event_loop.run();

    assert_eq!(*woke.borrow(), vec![1, 2, 3]);
    assert_eq!(stats.timers_fired, 3);
    assert!(start.elapsed() >= UNIT * 3);
}

#[test]
fn test_timers_fire_in_deadline_order_when_spinning() {
    staggered_sleeps(Loop::new());
}

#[test]
fn test_timers_fire_in_deadline_order_when_parking() {
    staggered_sleeps(LoopBuilder::new().idle(IdleStrategy::Park).build());
}

#[test]
fn test_equal_deadlines_fire_in_registration_order() {
    let mut event_loop = Loop::new();
    let deadline = Instant::now() + UNIT;
    let woke = Rc::new(RefCell::new(Vec::new()));

    for name in ["first", "second", "third"] {
        let woke = woke.clone();
        event_loop.add_task(async move {
            sleep_until(deadline).await;
            woke.borrow_mut().push(name);
        });
    }

    event_loop.run();

    assert_eq!(*woke.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_elapsed_deadline_still_suspends() {
    let mut event_loop = Loop::new();

    event_loop.add_task(async {
        sleep_until(Instant::now()).await;
    });

    let stats = event_loop.run();

    assert_eq!(stats.timers_fired, 1);
    assert_eq!(stats.resumed, 2);
}

#[test]
fn test_sleep_deadline_is_fixed_at_creation() {
    let before = Instant::now();
    let sleeping = sleep(UNIT);

    assert!(sleeping.deadline() >= before + UNIT);
    assert!(sleeping.deadline() <= Instant::now() + UNIT);
}

#[test]
fn test_sleeping_tasks_do_not_block_ready_ones() {
    let mut event_loop = LoopBuilder::new().idle(IdleStrategy::Park).build();
    let start = Instant::now();

    let outputs = event_loop.run_task(async move {
        gather([5u32, 0].map(|units| async move {
            if units > 0 {
                sleep(UNIT * units).await;
            }
            start.elapsed()
        }))
        .await
    });

    let outputs = outputs.unwrap();
    assert!(outputs[1] < outputs[0]);
    assert!(outputs[0] >= UNIT * 5);
}

/// Polls a sleep and a yield side by side in one task, in the given order.
async fn join_sleep_and_yield(units: u32, sleep_first: bool) -> Duration {
    let start = Instant::now();

    let mut sleeping: Pin<Box<dyn Future<Output = ()>>> = Box::pin(sleep(UNIT * units));
    let mut yielding: Pin<Box<dyn Future<Output = ()>>> = Box::pin(yield_now());
    let (mut slept, mut yielded) = (false, false);

    poll_fn(move |cx| {
        for first in [sleep_first, !sleep_first] {
            if first && !slept {
                slept = sleeping.as_mut().poll(cx).is_ready();
            } else if !first && !yielded {
                yielded = yielding.as_mut().poll(cx).is_ready();
            }
        }

        if slept && yielded {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    })
    .await;

    start.elapsed()
}

#[test]
fn test_sleep_joined_with_yield_in_one_task() {
    init_logging();

    for sleep_first in [true, false] {
        let mut event_loop = Loop::new();

        let elapsed = event_loop.run_task(join_sleep_and_yield(3, sleep_first));

        assert!(elapsed.unwrap() >= UNIT * 3);
    }
}

#[test]
fn test_joined_sleep_parks_until_its_timer_fires() {
    let mut event_loop = LoopBuilder::new().idle(IdleStrategy::Park).build();
    let handle = event_loop.handle();

    event_loop.add_task(async {
        join_sleep_and_yield(2, true).await;
    });

    let observer = handle.clone();
    event_loop.add_task(async move {
        // Let the joining task yield once and then park on its sleep.
        yield_now().await;
        yield_now().await;
        assert_eq!(observer.parked(), 1);
    });

    let stats = event_loop.run();

    assert_eq!(stats.timers_fired, 1);
    assert_eq!(stats.completed, 2);
    assert_eq!(handle.parked(), 0);
}

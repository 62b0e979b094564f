use spindle::sync::Waiter;
use spindle::{Error, Loop, yield_now};

use std::cell::Cell;
use std::rc::Rc;

#[test]
fn test_waiter_needs_every_set() {
    let mut event_loop = Loop::new();
    let waiter = Waiter::new(3);
    let released = Rc::new(Cell::new(false));

    let flag = released.clone();
    let awaited = waiter.clone();
    event_loop.add_task(async move {
        awaited.await;
        flag.set(true);
    });

    let setter = waiter.clone();
    event_loop.add_task(async move {
        setter.set();
        yield_now().await;
        setter.set();
    });

    assert_eq!(
        event_loop.run_bounded(1_000),
        Err(Error::TurnLimitExceeded { turns: 1_000 })
    );
    assert!(!released.get());
    assert_eq!(waiter.remaining(), 1);

    let last = waiter.clone();
    event_loop.add_task(async move { last.set() });

    assert!(event_loop.run_bounded(1_000).is_ok());
    assert!(released.get());
}

#[test]
fn test_waiter_with_zero_count_releases_immediately() {
    let mut event_loop = Loop::new();

    let result = event_loop.run_task(async { Waiter::new(0).await });

    assert_eq!(result, Ok(()));
}

#[test]
fn test_waiter_yields_every_turn() {
    let mut event_loop = Loop::new();
    let waiter = Waiter::new(1);

    let awaited = waiter.clone();
    event_loop.add_task(async move { awaited.await });

    let setter = waiter.clone();
    event_loop.add_task(async move {
        for _ in 0..4 {
            yield_now().await;
        }
        setter.set();
    });

    let stats = event_loop.run();

    // The waiting task polls the count on each of its turns.
    assert_eq!(stats.resumed, 11);
    assert!(waiter.is_released());
}

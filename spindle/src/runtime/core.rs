use super::builder::{IdleStrategy, LoopBuilder};
use super::context::{self, enter_context};
use crate::error::{Error, Result};
use crate::sync::Future;
use crate::task::gather::gather_on;
use crate::task::{JoinHandle, Step, Task, TaskId};
use crate::time::timer::TimerEvent;

use log::{debug, error, trace, warn};

use std::cell::{Cell, RefCell};
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use std::hint;
use std::rc::Rc;
use std::thread;
use std::time::Instant;

/// State shared between a [`Loop`] and every [`Handle`] to it.
struct Shared {
    /// Tasks ready to be resumed, in FIFO order.
    ready: RefCell<VecDeque<Task>>,

    /// Pending timer events, earliest deadline first.
    timers: RefCell<BinaryHeap<TimerEvent>>,

    /// Insertion counter giving equal deadlines a stable order.
    sequence: Cell<u64>,

    /// Number of tasks currently parked on a future.
    parked: Cell<usize>,
}

/// A cheap, cloneable reference to a loop.
///
/// `Handle` exposes the only two ways of mutating the loop's collections,
/// adding a task and registering a timer, so that code running inside a
/// task can schedule more work. Use [`Handle::current`] to reach the loop
/// that is running on this thread.
#[derive(Clone)]
pub struct Handle {
    shared: Rc<Shared>,
}

impl Handle {
    fn new(queue_capacity: usize) -> Self {
        Self {
            shared: Rc::new(Shared {
                ready: RefCell::new(VecDeque::with_capacity(queue_capacity)),
                timers: RefCell::new(BinaryHeap::new()),
                sequence: Cell::new(0),
                parked: Cell::new(0),
            }),
        }
    }

    /// Returns the loop running on this thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCurrentLoop`] outside of [`Loop::run`].
    pub fn try_current() -> Result<Self> {
        context::current().ok_or(Error::NoCurrentLoop)
    }

    /// Returns the loop running on this thread.
    ///
    /// # Panics
    ///
    /// Panics if no loop is running on this thread.
    pub fn current() -> Self {
        Self::try_current().expect("Handle::current called outside of a running loop")
    }

    /// Wraps `future` into a task and appends it to the ready-queue.
    pub fn add_task<F>(&self, future: F) -> TaskId
    where
        F: std::future::Future<Output = ()> + 'static,
    {
        let task = Task::new(future);
        let id = task.id();

        debug!("task {id} added");

        self.schedule(task);
        id
    }

    /// Appends an existing task to the tail of the ready-queue.
    ///
    /// Finished tasks are dropped instead of being queued. A task still
    /// waiting on a future is parked on it, and only queued once the
    /// future is set.
    pub fn schedule(&self, task: Task) {
        if task.is_finished() {
            warn!("refusing to schedule finished task {}", task.id());
            return;
        }

        if let Some(future) = task.awaited().cloned() {
            debug!("task {} is waiting, parking it on its future", task.id());
            future.attach(task, self);
            return;
        }

        self.shared.ready.borrow_mut().push_back(task);
    }

    /// Adds `future` as a task and returns a handle to its output.
    pub fn spawn<F, T>(&self, future: F) -> JoinHandle<T>
    where
        F: std::future::Future<Output = T> + 'static,
        T: 'static,
    {
        let done = Future::new();
        let output = Rc::new(RefCell::new(None));

        let task_done = done.clone();
        let task_output = output.clone();

        let id = self.add_task(async move {
            let value = future.await;
            *task_output.borrow_mut() = Some(value);
            task_done.set();
        });

        JoinHandle {
            id,
            done,
            output,
            wait: None,
        }
    }

    /// Registers `future` to be set once `deadline` has passed.
    pub fn call_later(&self, deadline: Instant, future: Future) {
        let sequence = self.shared.sequence.get();
        self.shared.sequence.set(sequence + 1);

        self.shared.timers.borrow_mut().push(TimerEvent {
            deadline,
            sequence,
            future,
        });
    }

    /// Runs every future concurrently on this loop and waits for all of
    /// them. See [`gather`](crate::gather).
    pub async fn gather<I, F, T>(&self, futures: I) -> Vec<T>
    where
        I: IntoIterator<Item = F>,
        F: std::future::Future<Output = T> + 'static,
        T: 'static,
    {
        gather_on(self, futures).await
    }

    /// Number of tasks in the ready-queue.
    pub fn ready_len(&self) -> usize {
        self.shared.ready.borrow().len()
    }

    /// Number of timers not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.shared.timers.borrow().len()
    }

    /// Number of tasks parked on a future.
    pub fn parked(&self) -> usize {
        self.shared.parked.get()
    }

    pub(crate) fn park(&self) {
        self.shared.parked.set(self.shared.parked.get() + 1);
    }

    pub(crate) fn unpark(&self) {
        self.shared.parked.set(self.shared.parked.get().saturating_sub(1));
    }

    fn pop_ready(&self) -> Option<Task> {
        self.shared.ready.borrow_mut().pop_front()
    }

    /// Returns `true` once both the ready-queue and the timer heap are empty.
    fn is_drained(&self) -> bool {
        self.shared.ready.borrow().is_empty() && self.shared.timers.borrow().is_empty()
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.shared.timers.borrow().peek().map(|event| event.deadline)
    }

    /// Pops the earliest timer and fires it if its deadline has passed.
    ///
    /// At most one timer fires per call.
    fn fire_due_timer(&self, now: Instant) -> bool {
        let due = {
            let mut timers = self.shared.timers.borrow_mut();

            match timers.peek() {
                Some(event) if event.deadline <= now => timers.pop(),
                _ => None,
            }
        };

        match due {
            Some(event) => {
                trace!("timer #{} fired", event.sequence);
                event.fire();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("ready", &self.ready_len())
            .field("timers", &self.pending_timers())
            .field("parked", &self.parked())
            .finish()
    }
}

/// Counters collected while a loop runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Scheduling turns, idle ones included.
    pub turns: usize,

    /// Times a task was resumed.
    pub resumed: usize,

    /// Tasks that ran to completion.
    pub completed: usize,

    /// Timer events fired.
    pub timers_fired: usize,
}

/// What a single scheduling turn did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    /// Nothing left to do: the loop is finished.
    Drained,

    /// No task was ready; only timers are pending.
    Idle,

    /// One task was resumed.
    Resumed,
}

/// The cooperative event loop.
///
/// A `Loop` owns a FIFO ready-queue of [`Task`]s and a min-heap of timer
/// events. [`run`](Self::run) repeatedly:
///
/// 1. fires the earliest timer if its deadline has passed,
/// 2. spins (or parks, see [`IdleStrategy`]) if no task is ready,
/// 3. otherwise resumes the task at the head of the queue once, then
///    drops it if it completed, re-queues it at the tail if it yielded, or
///    parks it on the [`Future`] it is waiting for.
///
/// It returns once both the ready-queue and the timer heap are empty.
/// Exactly one task runs at a time; tasks give up control only at their
/// own suspension points.
///
/// # Examples
///
/// ```rust
/// use spindle::{Loop, yield_now};
///
/// let mut event_loop = Loop::new();
///
/// for name in ["a", "b"] {
///     event_loop.add_task(async move {
///         for round in 0..2 {
///             println!("{name}{round}");
///             yield_now().await;
///         }
///     });
/// }
///
/// // prints a0 b0 a1 b1
/// event_loop.run();
/// ```
pub struct Loop {
    handle: Handle,
    idle: IdleStrategy,
}

impl Loop {
    /// Creates a loop with the default configuration.
    pub fn new() -> Self {
        LoopBuilder::new().build()
    }

    /// Returns a [`LoopBuilder`].
    pub fn builder() -> LoopBuilder {
        LoopBuilder::new()
    }

    pub(crate) fn with_config(idle: IdleStrategy, queue_capacity: usize) -> Self {
        Self {
            handle: Handle::new(queue_capacity),
            idle,
        }
    }

    /// Returns a handle to this loop.
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Wraps `future` into a task and appends it to the ready-queue.
    pub fn add_task<F>(&self, future: F) -> TaskId
    where
        F: std::future::Future<Output = ()> + 'static,
    {
        self.handle.add_task(future)
    }

    /// Appends an existing task to the ready-queue.
    pub fn schedule(&self, task: Task) {
        self.handle.schedule(task);
    }

    /// Adds `future` as a task and returns a handle to its output.
    pub fn spawn<F, T>(&self, future: F) -> JoinHandle<T>
    where
        F: std::future::Future<Output = T> + 'static,
        T: 'static,
    {
        self.handle.spawn(future)
    }

    /// Registers `future` to be set once `deadline` has passed.
    pub fn call_later(&self, deadline: Instant, future: Future) {
        self.handle.call_later(deadline, future);
    }

    /// Drives the loop until the ready-queue and the timer heap are empty.
    ///
    /// Tasks parked on a future that is never set are not waited for;
    /// they are reported in the log when the loop drains.
    pub fn run(&mut self) -> RunStats {
        let mut stats = RunStats::default();

        self.drive(&mut stats, None);
        stats
    }

    /// Like [`run`](Self::run), but gives up after `max_turns` turns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TurnLimitExceeded`] if the loop is still busy
    /// after `max_turns` turns. Remaining tasks stay queued and a later
    /// call resumes where this one stopped.
    pub fn run_bounded(&mut self, max_turns: usize) -> Result<RunStats> {
        let mut stats = RunStats::default();

        if self.drive(&mut stats, Some(max_turns)) {
            Ok(stats)
        } else {
            Err(Error::TurnLimitExceeded { turns: max_turns })
        }
    }

    /// Adds `future` as a task, runs the loop, and returns its output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stalled`] if the loop drained while the task was
    /// still parked.
    pub fn run_task<F, T>(&mut self, future: F) -> Result<T>
    where
        F: std::future::Future<Output = T> + 'static,
        T: 'static,
    {
        let handle = self.handle.spawn(future);

        self.run();

        handle.try_take().ok_or(Error::Stalled {
            parked: self.handle.parked(),
        })
    }

    /// Runs turns until the loop drains or the turn budget is spent.
    /// Returns `true` if the loop drained.
    fn drive(&self, stats: &mut RunStats, max_turns: Option<usize>) -> bool {
        debug!("loop started with {} ready task(s)", self.handle.ready_len());

        let drained = enter_context(self.handle.clone(), || loop {
            if max_turns.is_some_and(|max| stats.turns >= max) {
                break false;
            }

            if self.turn(stats) == Turn::Drained {
                break true;
            }

            stats.turns += 1;
        });

        if drained {
            debug!(
                "loop drained after {} turn(s), {} task(s) completed",
                stats.turns, stats.completed
            );

            if self.handle.parked() > 0 {
                warn!(
                    "loop drained with {} task(s) parked on futures that were never set",
                    self.handle.parked()
                );
            }
        }

        drained
    }

    fn turn(&self, stats: &mut RunStats) -> Turn {
        let handle = &self.handle;

        if handle.is_drained() {
            return Turn::Drained;
        }

        if handle.fire_due_timer(Instant::now()) {
            stats.timers_fired += 1;
        }

        let Some(mut task) = handle.pop_ready() else {
            self.idle();
            return Turn::Idle;
        };

        stats.resumed += 1;

        match task.resume() {
            Ok(Step::Complete(())) => {
                debug!("task {} finished", task.id());
                stats.completed += 1;
            }
            Ok(Step::Yielded) => handle.schedule(task),
            Ok(Step::Waiting(future)) => future.attach(task, handle),
            // Finished tasks are dropped above and never queued again.
            Err(err) => error!("{err}"),
        }

        Turn::Resumed
    }

    fn idle(&self) {
        match self.idle {
            IdleStrategy::Spin => hint::spin_loop(),
            IdleStrategy::Park => {
                if let Some(deadline) = self.handle.next_deadline() {
                    let now = Instant::now();

                    if deadline > now {
                        thread::sleep(deadline - now);
                    }
                }
            }
        }
    }
}

impl Default for Loop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Loop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loop")
            .field("handle", &self.handle)
            .field("idle", &self.idle)
            .finish()
    }
}

//! Cooperative fixed-interval task scheduler.
//!
//! The main loop calls [`Scheduler::run_all`] back to back. Each pass reads
//! the clock once and runs, in registration order, every task whose next-due
//! time has arrived, then moves that task's next-due time to
//! `now + interval`. Missed periods are not caught up: a task that fell
//! behind runs once and is rescheduled from the current time.
//!
//! There is no priority and no preemption. A slow task delays every later
//! task in the same pass, so task bodies must be short and never block.

use pulsar_core::Clock;

/// A periodic unit of cooperative work.
pub trait Task {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Period between executions in microseconds.
    fn interval_us(&self) -> u64;

    /// One-time setup, run by [`Scheduler::init_all`] in registration order.
    fn init(&mut self) {}

    /// The periodic body.
    fn execute(&mut self);
}

struct Entry<'a> {
    task: Box<dyn Task + 'a>,
    next_due: u64,
}

/// Ordered collection of tasks driven by a clock.
///
/// # Example
///
/// ```rust
/// use pulsar_core::ManualClock;
/// use pulsar_engine::{Scheduler, Task};
///
/// struct Tick<'a>(&'a std::cell::Cell<u32>);
///
/// impl Task for Tick<'_> {
///     fn name(&self) -> &'static str { "tick" }
///     fn interval_us(&self) -> u64 { 1_000 }
///     fn execute(&mut self) { self.0.set(self.0.get() + 1); }
/// }
///
/// let clock = ManualClock::new(0);
/// let ticks = std::cell::Cell::new(0);
/// let mut scheduler = Scheduler::new(&clock);
/// scheduler.add(Tick(&ticks));
/// scheduler.init_all();
///
/// scheduler.run_all(); // due immediately
/// scheduler.run_all(); // not yet
/// clock.advance(1_000);
/// scheduler.run_all();
/// assert_eq!(ticks.get(), 2);
/// ```
pub struct Scheduler<'a, C: Clock> {
    clock: C,
    entries: Vec<Entry<'a>>,
}

impl<C: Clock> core::fmt::Debug for Scheduler<'_, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|e| (e.task.name(), e.task.interval_us(), e.next_due)),
            )
            .finish()
    }
}

impl<'a, C: Clock> Scheduler<'a, C> {
    /// Creates an empty scheduler reading `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            entries: Vec::new(),
        }
    }

    /// Appends a task. Tasks run in the order they were added.
    pub fn add(&mut self, task: impl Task + 'a) -> &mut Self {
        self.add_boxed(Box::new(task))
    }

    /// Appends an already boxed task.
    pub fn add_boxed(&mut self, task: Box<dyn Task + 'a>) -> &mut Self {
        self.entries.push(Entry { task, next_due: 0 });
        self
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no task has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every task's `init` in order and makes every task due now.
    pub fn init_all(&mut self) {
        for entry in &mut self.entries {
            tracing::debug!(
                task = entry.task.name(),
                interval_us = entry.task.interval_us(),
                "init task"
            );
            entry.task.init();
        }
        let now = self.clock.now_us();
        for entry in &mut self.entries {
            entry.next_due = now;
        }
        tracing::info!(tasks = self.entries.len(), "scheduler initialized");
    }

    /// One pass over all tasks. Returns how many executed.
    pub fn run_all(&mut self) -> usize {
        let now = self.clock.now_us();
        let mut executed = 0;
        for entry in &mut self.entries {
            if now >= entry.next_due {
                entry.next_due = now.saturating_add(entry.task.interval_us());
                entry.task.execute();
                executed += 1;
            }
        }
        executed
    }

    /// Time at which the earliest task becomes due, if any task exists.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.next_due).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsar_core::ManualClock;
    use std::cell::RefCell;

    struct Recorder<'a> {
        name: &'static str,
        interval: u64,
        log: &'a RefCell<Vec<&'static str>>,
    }

    impl Task for Recorder<'_> {
        fn name(&self) -> &'static str {
            self.name
        }
        fn interval_us(&self) -> u64 {
            self.interval
        }
        fn init(&mut self) {
            self.log.borrow_mut().push("init");
        }
        fn execute(&mut self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    #[test]
    fn test_init_in_order_then_due_immediately() {
        let clock = ManualClock::new(100);
        let log = RefCell::new(Vec::new());
        let mut scheduler = Scheduler::new(&clock);
        scheduler
            .add(Recorder {
                name: "a",
                interval: 10,
                log: &log,
            })
            .add(Recorder {
                name: "b",
                interval: 20,
                log: &log,
            });

        scheduler.init_all();
        assert_eq!(scheduler.next_due(), Some(100));
        assert_eq!(scheduler.run_all(), 2);
        assert_eq!(*log.borrow(), ["init", "init", "a", "b"]);
    }

    #[test]
    fn test_due_boundary_is_inclusive() {
        let clock = ManualClock::new(0);
        let log = RefCell::new(Vec::new());
        let mut scheduler = Scheduler::new(&clock);
        scheduler.add(Recorder {
            name: "a",
            interval: 10,
            log: &log,
        });
        scheduler.init_all();
        scheduler.run_all();

        clock.advance(9);
        assert_eq!(scheduler.run_all(), 0);
        clock.advance(1);
        assert_eq!(scheduler.run_all(), 1);
        assert_eq!(scheduler.run_all(), 0);
    }

    #[test]
    fn test_no_catch_up_after_stall() {
        let clock = ManualClock::new(0);
        let log = RefCell::new(Vec::new());
        let mut scheduler = Scheduler::new(&clock);
        scheduler.add(Recorder {
            name: "a",
            interval: 10,
            log: &log,
        });
        scheduler.init_all();
        scheduler.run_all();

        clock.advance(95);
        assert_eq!(scheduler.run_all(), 1);
        assert_eq!(scheduler.run_all(), 0);
        assert_eq!(scheduler.next_due(), Some(105));
    }

    #[test]
    fn test_fixed_order_within_pass() {
        let clock = ManualClock::new(0);
        let log = RefCell::new(Vec::new());
        let mut scheduler = Scheduler::new(&clock);
        for name in ["x", "y", "z"] {
            scheduler.add(Recorder {
                name,
                interval: 5,
                log: &log,
            });
        }
        scheduler.init_all();
        log.borrow_mut().clear();
        scheduler.run_all();
        clock.advance(5);
        scheduler.run_all();
        assert_eq!(*log.borrow(), ["x", "y", "z", "x", "y", "z"]);
    }

    #[test]
    fn test_empty_scheduler() {
        let mut scheduler = Scheduler::new(ManualClock::new(0));
        scheduler.init_all();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.run_all(), 0);
        assert_eq!(scheduler.next_due(), None);
    }
}

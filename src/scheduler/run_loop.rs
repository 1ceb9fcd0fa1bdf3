use std::{
  collections::BTreeMap,
  sync::{Arc, Mutex},
  time::Duration,
};

use super::{Executor, Scheduler, Task, TaskHandle};
use crate::rc::lock;

/// A main-loop dispatch queue driven by its owner.
///
/// Tasks posted to a `RunLoop` never run on the posting call; they run when
/// the owner calls [`run_pending`](RunLoop::run_pending) or advances the
/// virtual clock with [`advance_by`](RunLoop::advance_by). Delayed tasks are
/// due at `now + delay` on that clock, and tasks due at the same instant run
/// in posting order.
#[derive(Clone, Default)]
pub struct RunLoop(Arc<Mutex<LoopState>>);

#[derive(Default)]
struct LoopState {
  now: Duration,
  seq: u64,
  queue: BTreeMap<(Duration, u64), (Task, TaskHandle)>,
}

impl RunLoop {
  pub fn new() -> Self { Self::default() }

  pub fn scheduler(&self) -> Scheduler { Scheduler::new(self.clone()) }

  /// Elapsed virtual time.
  pub fn now(&self) -> Duration { lock(&self.0).now }

  /// Number of queued tasks that were not cancelled.
  pub fn pending(&self) -> usize {
    lock(&self.0)
      .queue
      .values()
      .filter(|(_, handle)| !handle.is_cancelled())
      .count()
  }

  /// Runs every task that is due at the current virtual time, including
  /// tasks posted while running. Returns the number of tasks that ran.
  pub fn run_pending(&self) -> usize {
    let now = self.now();
    self.run_until(now)
  }

  /// Moves the virtual clock forward by `duration`, running due tasks in
  /// order. While a task runs, [`now`](RunLoop::now) reads its due time.
  pub fn advance_by(&self, duration: Duration) -> usize {
    let target = self.now() + duration;
    let ran = self.run_until(target);
    lock(&self.0).now = target;
    ran
  }

  fn run_until(&self, target: Duration) -> usize {
    let mut ran = 0;
    loop {
      let due = {
        let mut state = lock(&self.0);
        let key = match state.queue.keys().next() {
          Some(key) if key.0 <= target => *key,
          _ => break,
        };
        if key.0 > state.now {
          state.now = key.0;
        }
        state.queue.remove(&key)
      };
      if let Some((task, handle)) = due {
        if !handle.is_cancelled() {
          ran += 1;
        }
        task();
      }
    }
    ran
  }
}

impl Executor for RunLoop {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let mut state = lock(&self.0);
    let due = state.now + delay.unwrap_or_default();
    let seq = state.seq;
    state.seq += 1;
    state.queue.insert((due, seq), (handle.guard(task), handle.clone()));
    handle
  }
}

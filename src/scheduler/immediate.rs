use std::time::Duration;

use super::{Executor, Task, TaskHandle};

/// Runs tasks synchronously on the scheduling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateExecutor;

impl Executor for ImmediateExecutor {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    if let Some(delay) = delay {
      std::thread::sleep(delay);
    }
    handle.guard(task)();
    handle
  }

  fn is_synchronous(&self) -> bool { true }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  };

  #[test]
  fn runs_inline() {
    let ran = Arc::new(AtomicBool::new(false));
    let c_ran = ran.clone();
    let handle = ImmediateExecutor.schedule(Box::new(move || c_ran.store(true, Ordering::SeqCst)), None);
    assert!(ran.load(Ordering::SeqCst));
    assert!(handle.is_finished());
  }
}

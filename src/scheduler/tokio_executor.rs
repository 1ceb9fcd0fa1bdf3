use std::time::Duration;

use futures::future::abortable;
use tokio::runtime::Handle;

use super::{Executor, Task, TaskHandle};

/// Runs tasks on a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioExecutor {
  handle: Handle,
}

impl TokioExecutor {
  pub fn new(handle: Handle) -> Self { TokioExecutor { handle } }

  /// Uses the runtime the caller is running on.
  pub fn current() -> Self { TokioExecutor { handle: Handle::current() } }
}

impl Executor for TokioExecutor {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let run = handle.guard(task);
    let (fut, abort) = abortable(async move {
      if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
      }
      run();
    });
    handle.set_abort_handle(abort);
    self.handle.spawn(fut);
    handle
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[tokio::test(flavor = "multi_thread")]
  async fn interval_on_tokio() {
    let scheduler = Scheduler::new(TokioExecutor::current());
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let subscription = Observable::interval_on(Duration::from_millis(5), scheduler)
      .take(3)
      .subscribe(move |v: i64| c_seen.lock().unwrap().push(v));
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    assert!(subscription.is_closed());
  }
}

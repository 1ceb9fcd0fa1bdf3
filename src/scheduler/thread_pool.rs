use std::time::Duration;

use futures::{executor::ThreadPool, future::abortable};

use super::{Executor, Task, TaskHandle};

/// Runs tasks on a futures [`ThreadPool`]. Delays are awaited on the pool
/// and cancelling a task aborts its pending timer.
#[derive(Clone)]
pub struct ThreadPoolExecutor {
  pool: ThreadPool,
}

impl ThreadPoolExecutor {
  pub fn new() -> std::io::Result<Self> { Ok(Self::from_pool(ThreadPool::new()?)) }

  pub fn from_pool(pool: ThreadPool) -> Self { ThreadPoolExecutor { pool } }
}

impl Executor for ThreadPoolExecutor {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let run = handle.guard(task);
    let (fut, abort) = abortable(async move {
      if let Some(delay) = delay {
        sleep(delay).await;
      }
      run();
    });
    handle.set_abort_handle(abort);
    self.pool.spawn_ok(async move {
      let _ = fut.await;
    });
    handle
  }
}

#[cfg(feature = "timer")]
async fn sleep(delay: Duration) { futures_time::task::sleep(delay.into()).await; }

#[cfg(not(feature = "timer"))]
async fn sleep(delay: Duration) { std::thread::sleep(delay) }

#[cfg(test)]
mod test {
  use super::*;
  use futures::channel::oneshot;
  use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  };

  #[test]
  fn runs_on_pool() {
    let executor = ThreadPoolExecutor::new().unwrap();
    let (tx, rx) = oneshot::channel();
    executor.schedule(
      Box::new(move || {
        let _ = tx.send(std::thread::current().id());
      }),
      None,
    );
    let id = futures::executor::block_on(rx).unwrap();
    assert_ne!(id, std::thread::current().id());
  }

  #[test]
  fn cancel_before_delay_elapses() {
    let executor = ThreadPoolExecutor::new().unwrap();
    let ran = Arc::new(AtomicBool::new(false));
    let c_ran = ran.clone();
    let handle = executor.schedule(
      Box::new(move || c_ran.store(true, Ordering::SeqCst)),
      Some(Duration::from_millis(50)),
    );
    handle.cancel();
    std::thread::sleep(Duration::from_millis(120));
    assert!(!ran.load(Ordering::SeqCst));
    assert!(handle.is_closed());
  }
}

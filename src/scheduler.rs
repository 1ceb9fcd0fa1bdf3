//! Execution contexts for delivering notifications.
//!
//! A [`Scheduler`] is a cheap, cloneable handle over an [`Executor`]. Hosts
//! integrate their own dispatch loop by implementing [`Executor`]; the crate
//! ships an immediate executor, a thread-pool executor (feature
//! `futures-scheduler`), an optional tokio executor (feature
//! `tokio-scheduler`) and [`RunLoop`], a main-loop dispatch queue driven by
//! the host with a virtual clock.

use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
  },
  time::Duration,
};

use futures::future::AbortHandle;

use crate::{error::RxError, rc::lock, subscription::Subscription};

mod immediate;
mod run_loop;
#[cfg(feature = "futures-scheduler")]
mod thread_pool;
#[cfg(feature = "tokio-scheduler")]
mod tokio_executor;

pub use immediate::ImmediateExecutor;
pub use run_loop::RunLoop;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool::ThreadPoolExecutor;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_executor::TokioExecutor;

/// A unit of work handed to an executor.
pub type Task = Box<dyn FnOnce() + Send>;

/// Something that runs tasks, now or after a delay.
pub trait Executor: Send + Sync + 'static {
  /// Schedules `task` to run after `delay` (as soon as possible when `None`).
  ///
  /// Implementations must not run a task whose handle was cancelled; wrapping
  /// the task with [`TaskHandle::guard`] takes care of that.
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle;

  /// `true` when `schedule` runs the task before returning. Periodic work
  /// refuses such executors.
  fn is_synchronous(&self) -> bool { false }
}

/// Cancellation handle of a scheduled task.
#[derive(Clone, Default)]
pub struct TaskHandle(Arc<HandleInner>);

#[derive(Default)]
struct HandleInner {
  cancelled: AtomicBool,
  finished: AtomicBool,
  abort: Mutex<Option<AbortHandle>>,
}

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// Attaches the abort handle of the future driving this task, so that
  /// cancelling also drops a pending timer.
  pub fn set_abort_handle(&self, handle: AbortHandle) {
    if self.is_cancelled() {
      handle.abort();
    } else {
      *lock(&self.0.abort) = Some(handle);
    }
  }

  /// Wraps `task` so that it is skipped once this handle is cancelled and
  /// marks the handle finished after it ran.
  pub fn guard(&self, task: Task) -> Task {
    let handle = self.clone();
    Box::new(move || {
      if !handle.is_cancelled() {
        task();
      }
      handle.0.finished.store(true, Ordering::Release);
    })
  }

  pub fn cancel(&self) {
    self.0.cancelled.store(true, Ordering::Release);
    if let Some(abort) = lock(&self.0.abort).take() {
      abort.abort();
    }
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.0.cancelled.load(Ordering::Acquire) }

  #[inline]
  pub fn is_finished(&self) -> bool { self.0.finished.load(Ordering::Acquire) }

  /// A handle is closed once it can no longer run its task.
  #[inline]
  pub fn is_closed(&self) -> bool { self.is_cancelled() || self.is_finished() }
}

impl Debug for TaskHandle {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TaskHandle")
      .field("cancelled", &self.is_cancelled())
      .field("finished", &self.is_finished())
      .finish()
  }
}

/// A cloneable handle over an [`Executor`].
#[derive(Clone)]
pub struct Scheduler(Arc<dyn Executor>);

impl Scheduler {
  pub fn new(executor: impl Executor) -> Self { Scheduler(Arc::new(executor)) }

  /// Runs every task synchronously on the calling thread. A delayed task
  /// blocks the caller for the delay.
  pub fn immediate() -> Self { Scheduler::new(ImmediateExecutor) }

  /// A fresh thread pool.
  #[cfg(feature = "futures-scheduler")]
  pub fn thread_pool() -> std::io::Result<Self> {
    Ok(Scheduler::new(ThreadPoolExecutor::new()?))
  }

  /// Schedules onto an existing futures thread pool.
  #[cfg(feature = "futures-scheduler")]
  pub fn from_pool(pool: futures::executor::ThreadPool) -> Self {
    Scheduler::new(ThreadPoolExecutor::from_pool(pool))
  }

  /// Schedules onto a tokio runtime.
  #[cfg(feature = "tokio-scheduler")]
  pub fn tokio(handle: ::tokio::runtime::Handle) -> Self { Scheduler::new(TokioExecutor::new(handle)) }

  /// The process-wide default asynchronous scheduler, see
  /// [`config::set_default_scheduler`](crate::config::set_default_scheduler).
  pub fn default_async() -> Self { crate::config::default_scheduler() }

  pub fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    tracing::trace!(?delay, "schedule task");
    self.0.schedule(task, delay)
  }

  pub fn post(&self, task: impl FnOnce() + Send + 'static) -> TaskHandle {
    self.schedule(Box::new(task), None)
  }

  pub fn post_delayed(&self, delay: Duration, task: impl FnOnce() + Send + 'static) -> TaskHandle {
    self.schedule(Box::new(task), Some(delay))
  }

  #[inline]
  pub fn is_synchronous(&self) -> bool { self.0.is_synchronous() }

  /// Runs `task` every `period`, passing the zero-based tick index, until
  /// `owner` is unsubscribed. Every pending tick is registered on `owner`.
  ///
  /// Fails on a synchronous executor, where every tick would schedule the
  /// next one from inside itself.
  pub(crate) fn repeat(
    &self,
    period: Duration,
    owner: &Subscription,
    task: impl FnMut(u64) + Send + 'static,
  ) -> Result<(), RxError> {
    if self.is_synchronous() {
      return Err(RxError::SynchronousScheduler);
    }
    repeat_from(self.clone(), period, owner.clone(), Box::new(task), 0);
    Ok(())
  }
}

fn repeat_from(
  scheduler: Scheduler,
  period: Duration,
  owner: Subscription,
  task: Box<dyn FnMut(u64) + Send>,
  tick: u64,
) {
  let c_scheduler = scheduler.clone();
  let c_owner = owner.clone();
  let handle = scheduler.post_delayed(period, move || {
    let mut task = task;
    if c_owner.is_closed() {
      return;
    }
    task(tick);
    repeat_from(c_scheduler, period, c_owner, task, tick + 1);
  });
  owner.add_task(handle);
}

impl Debug for Scheduler {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str("Scheduler") }
}

//! Process-wide configuration.
//!
//! Two settings live here: the handler for errors nobody subscribed to, and
//! the default asynchronous scheduler used by time-based factories and
//! operators when no scheduler is given explicitly.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::{error::RxError, scheduler::Scheduler};

type ErrorHandler = Arc<dyn Fn(RxError) + Send + Sync>;

static UNOBSERVED_ERROR: Lazy<RwLock<ErrorHandler>> =
  Lazy::new(|| RwLock::new(Arc::new(terminate_on_error)));

static DEFAULT_SCHEDULER: Lazy<RwLock<Option<Scheduler>>> = Lazy::new(|| RwLock::new(None));

#[cfg(feature = "futures-scheduler")]
static SHARED_POOL: Lazy<Option<Scheduler>> = Lazy::new(|| match Scheduler::thread_pool() {
  Ok(scheduler) => Some(scheduler),
  Err(err) => {
    tracing::warn!(%err, "cannot start the shared thread pool, falling back to immediate");
    None
  }
});

fn terminate_on_error(err: RxError) {
  tracing::error!(error = %err, label = err.as_label(), "unobserved error, aborting");
  std::process::abort();
}

/// Replaces the handler invoked when an observable errors and its
/// subscriber supplied no error callback.
///
/// The default handler logs the error and aborts the process.
pub fn set_unobserved_error_handler(handler: impl Fn(RxError) + Send + Sync + 'static) {
  *UNOBSERVED_ERROR.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(handler);
}

/// Restores the default fail-fast handler.
pub fn reset_unobserved_error_handler() {
  *UNOBSERVED_ERROR.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(terminate_on_error);
}

pub(crate) fn report_unobserved(err: RxError) {
  let handler = UNOBSERVED_ERROR.read().unwrap_or_else(|e| e.into_inner()).clone();
  handler(err);
}

/// Sets the scheduler returned by [`Scheduler::default_async`].
pub fn set_default_scheduler(scheduler: Scheduler) {
  *DEFAULT_SCHEDULER.write().unwrap_or_else(|e| e.into_inner()) = Some(scheduler);
}

/// Forgets a scheduler set with [`set_default_scheduler`].
pub fn reset_default_scheduler() {
  *DEFAULT_SCHEDULER.write().unwrap_or_else(|e| e.into_inner()) = None;
}

/// The configured default scheduler, or a lazily started shared thread
/// pool when none was configured.
pub fn default_scheduler() -> Scheduler {
  if let Some(scheduler) = DEFAULT_SCHEDULER.read().unwrap_or_else(|e| e.into_inner()).as_ref() {
    return scheduler.clone();
  }
  fallback_scheduler()
}

#[cfg(feature = "futures-scheduler")]
fn fallback_scheduler() -> Scheduler { SHARED_POOL.clone().unwrap_or_else(Scheduler::immediate) }

#[cfg(not(feature = "futures-scheduler"))]
fn fallback_scheduler() -> Scheduler {
  tracing::warn!(
    "no default scheduler configured, falling back to immediate; interval and sample error on it"
  );
  Scheduler::immediate()
}

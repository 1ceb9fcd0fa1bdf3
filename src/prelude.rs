//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Configuration
pub use crate::config::{
  reset_default_scheduler, reset_unobserved_error_handler, set_default_scheduler,
  set_unobserved_error_handler,
};
// Errors
pub use crate::error::RxError;
// Observable and its factories
pub use crate::observable::{
  Emit, Listener, ListenerId, Observable, OnCompleted, OnError, RangeItem, TerminalHandler,
  ValueSource,
};
// Observer
pub use crate::observer::Observer;
// Schedulers
pub use crate::scheduler::{Executor, ImmediateExecutor, RunLoop, Scheduler, Task, TaskHandle};
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::ThreadPoolExecutor;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioExecutor;
// Subjects
pub use crate::subject::{BehaviorSubject, PublishSubject, ReplaySubject, Subject};
// Subscription
pub use crate::subscription::{DisposeBag, Subscription, SubscriptionGuard};
// Values
pub use crate::value::{FromValue, IntoValue, ObjectRef, Value};
pub use crate::value_cell::ValueCell;

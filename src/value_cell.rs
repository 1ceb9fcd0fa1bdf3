//! An in-process mutable value that reports its changes.

use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, Weak,
  },
};

use crate::{
  error::RxError,
  observable::{Listener, ListenerId, Observable, ValueSource},
  observer::Observer,
  rc::lock,
  scheduler::Scheduler,
  value::{FromValue, IntoValue, Value},
};

/// A mutable [`Value`] implementing [`ValueSource`].
///
/// Setting a different value stores it right away and posts one
/// notification task on the cell's scheduler; listeners therefore never run
/// on the setting call. A notification still pending when the last handle to
/// the cell is dropped is discarded.
///
/// ```
/// use rxdyn::prelude::*;
///
/// let run_loop = RunLoop::new();
/// let cell = ValueCell::with_scheduler(0, run_loop.scheduler());
/// cell.observable().subscribe(|v: Value| println!("{v}"));
/// cell.set_value(1);
/// run_loop.run_pending();
/// ```
#[derive(Clone)]
pub struct ValueCell(Arc<CellInner>);

struct CellInner {
  me: Weak<CellInner>,
  value: Mutex<Value>,
  listeners: Mutex<Vec<(ListenerId, Listener)>>,
  next_id: AtomicU64,
  scheduler: Scheduler,
}

impl ValueCell {
  /// A cell notifying on the default asynchronous scheduler.
  pub fn new(initial: impl IntoValue) -> Self { Self::with_scheduler(initial, Scheduler::default_async()) }

  pub fn with_scheduler(initial: impl IntoValue, scheduler: Scheduler) -> Self {
    let value = Mutex::new(initial.into_value());
    ValueCell(Arc::new_cyclic(|me| CellInner {
      me: me.clone(),
      value,
      listeners: Mutex::new(vec![]),
      next_id: AtomicU64::new(0),
      scheduler,
    }))
  }

  pub fn value(&self) -> Value { self.0.current_value() }

  /// The current value converted to `T`.
  pub fn get<T: FromValue>(&self) -> Result<T, RxError> { T::from_value(self.value()) }

  pub fn set_value(&self, value: impl IntoValue) { self.0.set_current_value(value.into_value()) }

  /// Emits the current value on subscribe, then every change.
  pub fn observable(&self) -> Observable<Value> { Observable::from_value_source(&self.0) }

  /// An observer setting this cell's value.
  pub fn observer(&self) -> Observer<Value> { Observer::for_source(&self.0) }

  pub fn listener_count(&self) -> usize { lock(&self.0.listeners).len() }
}

impl CellInner {
  fn notify(&self, value: Value) {
    let listeners: Vec<Listener> = lock(&self.listeners).iter().map(|(_, l)| l.clone()).collect();
    for listener in listeners {
      listener(value.clone());
    }
  }
}

impl ValueSource for CellInner {
  fn current_value(&self) -> Value { lock(&self.value).clone() }

  fn set_current_value(&self, value: Value) {
    {
      let mut current = lock(&self.value);
      if *current == value {
        return;
      }
      *current = value.clone();
    }
    let me = self.me.clone();
    self.scheduler.post(move || {
      if let Some(cell) = me.upgrade() {
        cell.notify(value);
      }
    });
  }

  fn add_listener(&self, listener: Listener) -> ListenerId {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    lock(&self.listeners).push((id, listener));
    id
  }

  fn remove_listener(&self, id: ListenerId) { lock(&self.listeners).retain(|(i, _)| *i != id); }
}

impl ValueSource for ValueCell {
  fn current_value(&self) -> Value { self.0.current_value() }

  fn set_current_value(&self, value: Value) { self.0.set_current_value(value) }

  fn add_listener(&self, listener: Listener) -> ListenerId { self.0.add_listener(listener) }

  fn remove_listener(&self, id: ListenerId) { self.0.remove_listener(id) }
}

impl<T: IntoValue + 'static> From<&ValueCell> for Observer<T> {
  fn from(cell: &ValueCell) -> Self { Observer::for_source(&cell.0) }
}

impl Debug for ValueCell {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ValueCell")
      .field("value", &self.value())
      .field("listeners", &self.listener_count())
      .finish()
  }
}

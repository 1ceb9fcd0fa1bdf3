//! The producer handle and its subscribe family.
//!
//! An [`Observable`] is an immutable, cloneable description of a stream.
//! Cold observables run their producer once per subscription; hot ones
//! (created from subjects) share a single producer between every
//! subscriber. Values travel as [`Value`]; the type parameter is the element
//! type the stream declares, checked when a subscriber converts it back.

use std::{
  fmt::{Debug, Formatter},
  marker::PhantomData,
  sync::{Arc, Mutex},
};

use futures::channel::oneshot;

use crate::{
  config,
  error::RxError,
  observer::Observer,
  rc::{lock, MutArc},
  subject::SubjectCore,
  subscriber::Subscriber,
  subscription::Subscription,
  value::{FromValue, IntoValue, Value},
};

mod create;
mod from_iter;
mod interval;
mod range;
mod value_source;

pub use create::Emit;
pub use range::RangeItem;
pub use value_source::{Listener, ListenerId, ValueSource};

type SubscribeFn = Arc<dyn Fn(Subscriber) + Send + Sync>;

#[derive(Clone)]
enum Source {
  Cold(SubscribeFn),
  Hot(Arc<SubjectCore>),
}

/// A stream of `T` values.
pub struct Observable<T = Value> {
  source: Source,
  _hint: PhantomData<fn() -> T>,
}

impl<T> Clone for Observable<T> {
  fn clone(&self) -> Self { Observable { source: self.source.clone(), _hint: PhantomData } }
}

impl<T> Debug for Observable<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let kind = match self.source {
      Source::Cold(_) => "cold",
      Source::Hot(_) => "hot",
    };
    f.debug_struct("Observable")
      .field("source", &kind)
      .field("item", &std::any::type_name::<T>())
      .finish()
  }
}

impl<T> Observable<T> {
  pub(crate) fn from_fn(subscribe: impl Fn(Subscriber) + Send + Sync + 'static) -> Self {
    Observable { source: Source::Cold(Arc::new(subscribe)), _hint: PhantomData }
  }

  pub(crate) fn hot(core: Arc<SubjectCore>) -> Self {
    Observable { source: Source::Hot(core), _hint: PhantomData }
  }

  pub(crate) fn actual_subscribe(&self, subscriber: Subscriber) {
    tracing::trace!(item = std::any::type_name::<T>(), "subscribe");
    match &self.source {
      Source::Cold(subscribe) => subscribe(subscriber),
      Source::Hot(core) => core.attach(subscriber),
    }
  }

  /// Views this stream as a stream of erased values.
  pub fn erase(&self) -> Observable<Value> { self.cast() }

  /// Re-declares the element type. Each element is checked against `U`
  /// when a subscriber or operator converts it.
  pub fn cast<U>(&self) -> Observable<U> { Observable { source: self.source.clone(), _hint: PhantomData } }
}

/// Marker for a terminal handler that takes the error.
pub struct OnError;

/// Marker for a terminal handler that takes nothing.
pub struct OnCompleted;

/// A terminal callback of [`Observable::subscribe_all`]: either an error
/// handler `FnOnce(RxError)` or a completion handler `FnOnce()`.
///
/// The marker parameter only tells the two apart; closures taking the error
/// need their argument annotated (`|e: RxError| ...`).
pub trait TerminalHandler<Marker> {
  #[doc(hidden)]
  fn into_terminal(self) -> Terminal;
}

#[doc(hidden)]
pub enum Terminal {
  Error(Box<dyn FnOnce(RxError) + Send>),
  Completed(Box<dyn FnOnce() + Send>),
}

impl<F: FnOnce(RxError) + Send + 'static> TerminalHandler<OnError> for F {
  fn into_terminal(self) -> Terminal { Terminal::Error(Box::new(self)) }
}

impl<F: FnOnce() + Send + 'static> TerminalHandler<OnCompleted> for F {
  fn into_terminal(self) -> Terminal { Terminal::Completed(Box::new(self)) }
}

impl<T: FromValue + 'static> Observable<T> {
  /// Subscribes to values only. An error is handed to the unobserved-error
  /// handler, which aborts the process unless it was replaced in
  /// [`config`].
  pub fn subscribe(&self, next: impl FnMut(T) + Send + 'static) -> Subscription {
    self.subscribe_with(next, config::report_unobserved, || {})
  }

  pub fn subscribe_err(
    &self,
    next: impl FnMut(T) + Send + 'static,
    error: impl FnOnce(RxError) + Send + 'static,
  ) -> Subscription {
    self.subscribe_with(next, error, || {})
  }

  /// Subscribes with a value callback plus an error and a completion
  /// callback given in either order.
  ///
  /// ```
  /// use rxdyn::prelude::*;
  ///
  /// Observable::from(vec![1, 2]).subscribe_all(
  ///   |v: i32| println!("{v}"),
  ///   || println!("done"),
  ///   |e: RxError| println!("{e}"),
  /// );
  /// ```
  ///
  /// Two handlers of the same kind both run, in argument order.
  pub fn subscribe_all<A, MA, B, MB>(
    &self,
    next: impl FnMut(T) + Send + 'static,
    a: A,
    b: B,
  ) -> Subscription
  where
    A: TerminalHandler<MA>,
    B: TerminalHandler<MB>,
  {
    let mut on_error: Vec<Box<dyn FnOnce(RxError) + Send>> = vec![];
    let mut on_completed: Vec<Box<dyn FnOnce() + Send>> = vec![];
    for terminal in [a.into_terminal(), b.into_terminal()] {
      match terminal {
        Terminal::Error(f) => on_error.push(f),
        Terminal::Completed(f) => on_completed.push(f),
      }
    }
    let error = move |err: RxError| {
      if on_error.is_empty() {
        config::report_unobserved(err);
      } else {
        for f in on_error {
          f(err.clone());
        }
      }
    };
    let complete = move || on_completed.into_iter().for_each(|f| f());
    self.subscribe_with(next, error, complete)
  }

  /// Subscribes an [`Observer`] (or anything convertible into one, such as
  /// a subject or a value cell).
  pub fn subscribe_by(&self, observer: impl Into<Observer<T>>) -> Subscription {
    let observer = observer.into();
    let (e, c) = (observer.clone(), observer.clone());
    let subscriber = Subscriber::new(
      move |v| observer.push_value(v),
      move |err| e.on_error(err),
      move || c.on_completed(),
    );
    let subscription = subscriber.subscription().clone();
    self.actual_subscribe(subscriber);
    subscription
  }

  fn subscribe_with(
    &self,
    mut next: impl FnMut(T) + Send + 'static,
    error: impl FnOnce(RxError) + Send + 'static,
    complete: impl FnOnce() + Send + 'static,
  ) -> Subscription {
    let subscriber = Subscriber::new(
      move |v| {
        next(T::from_value(v)?);
        Ok(())
      },
      error,
      complete,
    );
    let subscription = subscriber.subscription().clone();
    self.actual_subscribe(subscriber);
    subscription
  }

  /// Blocks the calling thread until the stream terminates and returns every
  /// value it emitted. A stream whose producer is dropped without
  /// terminating yields an error.
  ///
  /// Never returns for a live stream that does not terminate. It also never
  /// returns when the stream is delivered through a [`RunLoop`] pumped by the
  /// calling thread.
  ///
  /// [`RunLoop`]: crate::scheduler::RunLoop
  pub fn to_array(&self) -> Result<Vec<T>, RxError>
  where
    T: Send,
  {
    let (tx, rx) = oneshot::channel();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let items = MutArc::own(vec![]);
    let (c_items, d_items, e_tx) = (items.clone(), items, tx.clone());
    self.subscribe_with(
      move |v| c_items.rc_deref_mut().push(v),
      move |err| send(&e_tx, Err(err)),
      move || send(&tx, Ok(std::mem::take(&mut *d_items.rc_deref_mut()))),
    );
    futures::executor::block_on(rx)
      .unwrap_or_else(|_| Err(RxError::message("stream dropped before terminating")))
  }
}

type ResultSender<T> = Mutex<Option<oneshot::Sender<Result<Vec<T>, RxError>>>>;

fn send<T>(tx: &ResultSender<T>, result: Result<Vec<T>, RxError>) {
  if let Some(tx) = lock(tx).take() {
    let _ = tx.send(result);
  }
}

impl<T: 'static> IntoValue for Observable<T> {
  fn into_value(self) -> Value { Value::object(self.erase()) }
}

impl<T: 'static> FromValue for Observable<T> {
  fn from_value(value: Value) -> Result<Self, RxError> {
    match value.as_object().and_then(|obj| obj.downcast_ref::<Observable<Value>>()) {
      Some(observable) => Ok(observable.cast()),
      None => Err(RxError::type_mismatch("Observable", value.kind_name())),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn cold_runs_per_subscription() {
    let runs = MutArc::own(0);
    let c_runs = runs.clone();
    let o = Observable::<i32>::from_fn(move |s| {
      *c_runs.rc_deref_mut() += 1;
      s.next(Value::Int(1));
      s.complete();
    });
    o.subscribe(|_| {});
    o.subscribe(|_| {});
    assert_eq!(*runs.rc_deref_mut(), 2);
  }

  #[test]
  fn conversion_failure_terminates_subscriber() {
    let errors = MutArc::own(vec![]);
    let c_errors = errors.clone();
    Observable::from(vec!["a", "b"])
      .cast::<i32>()
      .subscribe_err(|_| {}, move |e| c_errors.rc_deref_mut().push(e.as_label()));
    assert_eq!(*errors.rc_deref_mut(), vec!["type_mismatch"]);
  }

  #[test]
  fn terminal_handlers_in_any_order() {
    let log = MutArc::own(vec![]);
    let (a, b) = (log.clone(), log.clone());
    Observable::from(vec![1]).subscribe_all(
      |_: i32| {},
      move || a.rc_deref_mut().push("complete"),
      move |_: RxError| b.rc_deref_mut().push("error"),
    );
    let (c, d) = (log.clone(), log.clone());
    Observable::<i32>::throw(RxError::message("x")).subscribe_all(
      |_| {},
      move |_: RxError| c.rc_deref_mut().push("error"),
      move || d.rc_deref_mut().push("complete"),
    );
    assert_eq!(*log.rc_deref_mut(), vec!["complete", "error"]);
  }

  #[test]
  fn to_array_collects() {
    assert_eq!(Observable::from(vec![3, 4, 5]).to_array().unwrap(), vec![3, 4, 5]);
    assert!(Observable::<i32>::throw(RxError::message("x")).to_array().is_err());
    assert!(Observable::<i32>::never().to_array().is_err());
  }

  #[test]
  fn observables_as_values() {
    let inner = Observable::from(vec![1, 2]);
    let boxed = inner.into_value();
    let back = Observable::<i32>::from_value(boxed).unwrap();
    assert_eq!(back.to_array().unwrap(), vec![1, 2]);
    assert!(Observable::<i32>::from_value(Value::Int(1)).is_err());
  }
}

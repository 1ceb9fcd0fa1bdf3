use std::sync::Arc;

use crate::{
  error::RxError,
  observable::Observable,
  value::{IntoValue, Value},
};

impl<T: IntoValue> Observable<T> {
  /// Creates an observable that produces values from an iterator.
  ///
  /// The iterator is drained when the observable is created, so every
  /// subscriber sees the same sequence. Each subscription emits the values in
  /// order, synchronously inside `subscribe`, then completes. Emission stops
  /// early once the subscription is closed.
  ///
  /// ```
  /// use rxdyn::prelude::*;
  ///
  /// Observable::from_iter(vec![0, 1, 2, 3]).subscribe(|v: i32| println!("{v},"));
  /// ```
  #[allow(clippy::should_implement_trait)]
  pub fn from_iter(iter: impl IntoIterator<Item = T>) -> Self {
    let items: Arc<[Value]> = iter.into_iter().map(IntoValue::into_value).collect();
    Observable::from_fn(move |s| {
      for v in items.iter() {
        if s.is_closed() {
          return;
        }
        s.next(v.clone());
      }
      s.complete();
    })
  }

  /// Emits `value` once, then completes.
  pub fn just(value: T) -> Self {
    let value = value.into_value();
    Observable::from_fn(move |s| {
      s.next(value.clone());
      s.complete();
    })
  }
}

impl<T> Observable<T> {
  /// Completes immediately without emitting.
  pub fn empty() -> Self { Observable::from_fn(|s| s.complete()) }

  /// Never emits and never terminates.
  pub fn never() -> Self { Observable::from_fn(|_| {}) }

  /// Terminates every subscription with `err` right away.
  pub fn throw(err: RxError) -> Self { Observable::from_fn(move |s| s.error(err.clone())) }
}

impl<T: IntoValue> From<Vec<T>> for Observable<T> {
  fn from(items: Vec<T>) -> Self { Observable::from_iter(items) }
}

impl<T: IntoValue> FromIterator<T> for Observable<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self { Observable::from_iter(iter) }
}

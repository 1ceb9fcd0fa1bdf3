use std::{
  fmt::{Debug, Formatter},
  marker::PhantomData,
  sync::Arc,
};

use super::{Policy, Subject, SubjectCore};
use crate::{
  error::RxError,
  observable::Observable,
  observer::Observer,
  value::{FromValue, IntoValue},
};

macro_rules! typed_subject {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    pub struct $name<T> {
      core: Arc<SubjectCore>,
      _hint: PhantomData<fn(T) -> T>,
    }

    impl<T> Clone for $name<T> {
      fn clone(&self) -> Self { $name { core: self.core.clone(), _hint: PhantomData } }
    }

    impl<T> Debug for $name<T> {
      fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!($name))
          .field("item", &std::any::type_name::<T>())
          .field("closed", &self.core.is_terminated())
          .finish()
      }
    }

    impl<T: IntoValue + FromValue + 'static> $name<T> {
      fn with_core(core: Arc<SubjectCore>) -> Self { $name { core, _hint: PhantomData } }

      pub fn on_next(&self, value: T) { self.core.on_next(value.into_value()) }

      pub fn on_error(&self, err: RxError) { self.core.on_error(err) }

      pub fn on_completed(&self) { self.core.on_completed() }

      pub fn observable(&self) -> Observable<T> { Observable::hot(self.core.clone()) }

      pub fn observer(&self) -> Observer<T> { Observer::from_sink(self.core.clone()) }

      /// Number of live subscribers.
      pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }

      /// `true` once the subject errored or completed.
      pub fn is_closed(&self) -> bool { self.core.is_terminated() }

      /// The same subject over erased values.
      pub fn erase(&self) -> Subject { Subject(self.core.clone()) }
    }

    /// Feeds the subject from a stream of another type: every value is
    /// converted `T -> U` when pushed, and a value that does not convert
    /// errors the subject.
    impl<T, U> From<&$name<U>> for Observer<T>
    where
      T: IntoValue + 'static,
      U: IntoValue + FromValue + 'static,
    {
      fn from(subject: &$name<U>) -> Self { Observer::narrowing::<U>(subject.core.clone()) }
    }
  };
}

typed_subject!(
  /// A subject that emits only what is pushed after subscribing.
  ///
  /// ```
  /// use rxdyn::prelude::*;
  ///
  /// let subject = PublishSubject::<i32>::new();
  /// subject.observable().subscribe(|v| println!("{v}"));
  /// subject.on_next(1);
  /// ```
  PublishSubject
);

typed_subject!(
  /// A subject that remembers its latest value and emits it to every new
  /// subscriber.
  BehaviorSubject
);

typed_subject!(
  /// A subject that replays up to a fixed number of past values to every new
  /// subscriber.
  ReplaySubject
);

impl<T: IntoValue + FromValue + 'static> PublishSubject<T> {
  pub fn new() -> Self { Self::with_core(SubjectCore::new(Policy::Publish, None)) }
}

impl<T: IntoValue + FromValue + 'static> Default for PublishSubject<T> {
  fn default() -> Self { Self::new() }
}

impl<T: IntoValue + FromValue + 'static> BehaviorSubject<T> {
  pub fn new(initial: T) -> Self {
    Self::with_core(SubjectCore::new(Policy::Behavior, Some(initial.into_value())))
  }

  /// The latest value without subscribing.
  pub fn value(&self) -> Result<T, RxError> {
    let latest = self.core.latest_item().unwrap_or_default();
    T::from_value(latest)
  }
}

impl<T: IntoValue + FromValue + 'static> ReplaySubject<T> {
  pub fn new(buffer_size: usize) -> Self {
    Self::with_core(SubjectCore::new(Policy::Replay(buffer_size), None))
  }

  /// Every value currently buffered, oldest first.
  pub fn values(&self) -> Result<Vec<T>, RxError> {
    let values = self.core.buffered();
    values.into_iter().map(T::from_value).collect()
  }
}

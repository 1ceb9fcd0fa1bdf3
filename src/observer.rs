use std::{
  fmt::{Debug, Formatter},
  sync::{Arc, Weak},
};

use crate::{
  config,
  error::RxError,
  observable::ValueSource,
  subscriber::{Sink, Subscriber},
  value::{FromValue, IntoValue, Value},
};

type Adapt<T> = Arc<dyn Fn(T) -> Result<Value, RxError> + Send + Sync>;

/// The push side of a stream: something `T` values can be fed into.
///
/// An `Observer` is a cheap handle over a shared sink (a callback set, a
/// subject, a value source) plus the conversion applied to every pushed
/// value. Observers are contravariant: an `Observer<f64>` can feed a subject
/// of `i32` (values truncate), and an observer of a base payload can accept a
/// derived payload registered with
/// [`register_conversion`](crate::value::register_conversion). A value the
/// sink cannot accept terminates it with [`RxError::TypeMismatch`].
pub struct Observer<T = Value> {
  sink: Arc<dyn Sink>,
  adapt: Adapt<T>,
}

impl<T> Clone for Observer<T> {
  fn clone(&self) -> Self { Observer { sink: self.sink.clone(), adapt: self.adapt.clone() } }
}

impl<T> Debug for Observer<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Observer").field("closed", &self.sink.is_closed()).finish()
  }
}

impl<T: IntoValue + 'static> Observer<T> {
  pub(crate) fn from_sink(sink: Arc<dyn Sink>) -> Self {
    Observer { sink, adapt: Arc::new(|t: T| Ok(t.into_value())) }
  }

  /// An observer whose sink expects `U`: every pushed `T` is checked
  /// against `U` first.
  pub(crate) fn narrowing<U>(sink: Arc<dyn Sink>) -> Self
  where
    U: FromValue + IntoValue,
  {
    Observer {
      sink,
      adapt: Arc::new(|t: T| U::from_value(t.into_value()).map(IntoValue::into_value)),
    }
  }

  /// Pushes into a [`ValueSource`], setting its current value. The observer
  /// holds the source weakly and is closed once it is gone.
  pub fn for_source<S: ValueSource + 'static>(source: &Arc<S>) -> Self {
    let weak: Weak<S> = Arc::downgrade(source);
    Observer::from_sink(Arc::new(SourceSink(weak)))
  }
}

impl<T: FromValue + IntoValue + 'static> Observer<T> {
  /// Observes values only. Errors go to the unobserved-error handler.
  pub fn new(on_next: impl FnMut(T) + Send + 'static) -> Self {
    Self::with_all(on_next, config::report_unobserved, || {})
  }

  pub fn with_error(
    on_next: impl FnMut(T) + Send + 'static,
    on_error: impl FnOnce(RxError) + Send + 'static,
  ) -> Self {
    Self::with_all(on_next, on_error, || {})
  }

  pub fn with_all(
    mut on_next: impl FnMut(T) + Send + 'static,
    on_error: impl FnOnce(RxError) + Send + 'static,
    on_completed: impl FnOnce() + Send + 'static,
  ) -> Self {
    let subscriber = Subscriber::new(
      move |v| {
        on_next(T::from_value(v)?);
        Ok(())
      },
      on_error,
      on_completed,
    );
    Observer::from_sink(Arc::new(subscriber))
  }
}

impl<T> Observer<T> {
  pub fn on_next(&self, value: T) {
    match (self.adapt)(value) {
      Ok(v) => self.sink.next(v),
      Err(err) => self.sink.error(err),
    }
  }

  pub fn on_error(&self, err: RxError) { self.sink.error(err) }

  pub fn on_completed(&self) { self.sink.complete() }

  /// `true` once the underlying sink accepts nothing more.
  pub fn is_closed(&self) -> bool { self.sink.is_closed() }

  /// An observer of `S` feeding this one: pushed values are converted
  /// `S -> T` before this observer's own conversion runs.
  pub fn accepting<S>(&self) -> Observer<S>
  where
    S: IntoValue + 'static,
    T: FromValue + 'static,
  {
    let adapt = self.adapt.clone();
    Observer {
      sink: self.sink.clone(),
      adapt: Arc::new(move |s: S| adapt(T::from_value(s.into_value())?)),
    }
  }

  /// Pushes an already erased value through this observer's conversion.
  pub(crate) fn push_value(&self, value: Value) -> Result<(), RxError>
  where
    T: FromValue,
  {
    let v = (self.adapt)(T::from_value(value)?)?;
    self.sink.next(v);
    Ok(())
  }
}

struct SourceSink<S>(Weak<S>);

impl<S: ValueSource> Sink for SourceSink<S> {
  fn next(&self, value: Value) {
    if let Some(source) = self.0.upgrade() {
      source.set_current_value(value);
    }
  }

  fn error(&self, err: RxError) {
    tracing::debug!(error = %err, "value source ignores error");
  }

  fn complete(&self) {}

  fn is_closed(&self) -> bool { self.0.strong_count() == 0 }
}

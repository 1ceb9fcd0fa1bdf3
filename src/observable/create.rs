use std::sync::Arc;

use crate::{
  observable::Observable,
  observer::Observer,
  value::{IntoValue, Value},
};

/// Callback handed to the register closure of [`Observable::from_listener`].
pub type Emit = Arc<dyn Fn() + Send + Sync>;

impl<T: IntoValue + 'static> Observable<T> {
  /// Observable created from a function.
  ///
  /// `on_subscribe` runs once per subscription with a fresh [`Observer`].
  /// After `on_error` or `on_completed` the observer delivers nothing more,
  /// and [`Observer::is_closed`] tells the producer when to stop.
  ///
  /// ```
  /// use rxdyn::prelude::*;
  ///
  /// let o = Observable::create(|observer: Observer<i32>| {
  ///   observer.on_next(1);
  ///   observer.on_next(2);
  ///   observer.on_completed();
  /// });
  /// assert_eq!(o.to_array().unwrap(), vec![1, 2]);
  /// ```
  pub fn create(on_subscribe: impl Fn(Observer<T>) + Send + Sync + 'static) -> Self {
    Observable::from_fn(move |s| on_subscribe(Observer::from_sink(Arc::new(s))))
  }
}

impl Observable<()> {
  /// Adapts a fire-and-forget event source.
  ///
  /// `register` runs once per subscription with an [`Emit`] callback that
  /// pushes [`Value::Void`]; the closure it returns is run when the
  /// subscription is disposed and must unregister the callback.
  pub fn from_listener<R, U>(register: R) -> Self
  where
    R: Fn(Emit) -> U + Send + Sync + 'static,
    U: FnOnce() + Send + 'static,
  {
    Observable::from_fn(move |s| {
      let c_s = s.clone();
      let unregister = register(Arc::new(move || c_s.next(Value::Void)));
      s.subscription().add_fn(unregister);
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, rc::MutArc};
  use std::sync::Arc;

  #[test]
  fn nothing_after_complete() {
    let o = Observable::create(|observer: Observer<&'static str>| {
      observer.on_next("a");
      observer.on_completed();
      observer.on_next("b");
      observer.on_error(RxError::message("late"));
    });
    assert_eq!(o.cast::<String>().to_array().unwrap(), vec!["a"]);
  }

  #[test]
  fn producer_sees_disposal() {
    let observers: MutArc<Vec<Observer<i32>>> = MutArc::own(vec![]);
    let c_observers = observers.clone();
    let o = Observable::create(move |observer| c_observers.rc_deref_mut().push(observer));
    let seen = MutArc::own(vec![]);
    let c_seen = seen.clone();
    let subscription = o.subscribe(move |v| c_seen.rc_deref_mut().push(v));

    let observer = observers.rc_deref_mut()[0].clone();
    observer.on_next(1);
    subscription.unsubscribe();
    assert!(observer.is_closed());
    observer.on_next(2);
    assert_eq!(*seen.rc_deref_mut(), vec![1]);
  }

  #[derive(Default)]
  struct Button {
    handlers: MutArc<Vec<(usize, Emit)>>,
    next_id: MutArc<usize>,
  }

  impl Button {
    fn click(&self) {
      let handlers: Vec<Emit> = self.handlers.rc_deref_mut().iter().map(|(_, h)| h.clone()).collect();
      handlers.iter().for_each(|h| h());
    }
  }

  #[test]
  fn listener_registration() {
    let button = Arc::new(Button::default());
    let c_button = button.clone();
    let clicks = Observable::from_listener(move |emit| {
      let id = {
        let mut next_id = c_button.next_id.rc_deref_mut();
        *next_id += 1;
        *next_id
      };
      c_button.handlers.rc_deref_mut().push((id, emit));
      let handlers = c_button.handlers.clone();
      move || handlers.rc_deref_mut().retain(|(i, _)| *i != id)
    });

    let count = MutArc::own(0);
    let c_count = count.clone();
    let subscription = clicks.subscribe(move |()| *c_count.rc_deref_mut() += 1);
    button.click();
    button.click();
    assert_eq!(button.handlers.rc_deref_mut().len(), 1);

    subscription.unsubscribe();
    button.click();
    assert_eq!(*count.rc_deref_mut(), 2);
    assert!(button.handlers.rc_deref_mut().is_empty());
  }
}

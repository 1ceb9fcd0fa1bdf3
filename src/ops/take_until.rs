use crate::observable::Observable;

impl<T: 'static> Observable<T> {
  /// Emits values until `notifier` emits its first value or completes, then
  /// completes. An error from `notifier` is forwarded.
  ///
  /// The notifier is subscribed before the source, so a notifier that fires
  /// synchronously keeps the source from ever being subscribed.
  pub fn take_until<U: 'static>(&self, notifier: &Observable<U>) -> Observable<T> {
    let source = self.clone();
    let notifier = notifier.erase();
    Observable::from_fn(move |down| {
      let (n, e, c) = (down.clone(), down.clone(), down.clone());
      let stop = down.upstream(
        move |_| {
          n.complete();
          Ok(())
        },
        move |err| e.error(err),
        move || c.complete(),
      );
      notifier.actual_subscribe(stop);
      if !down.is_closed() {
        source.actual_subscribe(down.forward());
      }
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, rc::MutArc};

  #[test]
  fn base_function() {
    let source = PublishSubject::<i32>::new();
    let notifier = PublishSubject::<()>::new();
    let log = MutArc::own(vec![]);
    let (n, c) = (log.clone(), log.clone());
    source.observable().take_until(&notifier.observable()).subscribe_all(
      move |v: i32| n.rc_deref_mut().push(v),
      move || c.rc_deref_mut().push(-1),
      |_: RxError| {},
    );
    source.on_next(1);
    source.on_next(2);
    notifier.on_next(());
    source.on_next(3);
    assert_eq!(*log.rc_deref_mut(), vec![1, 2, -1]);
    assert_eq!(source.subscriber_count(), 0);
    assert_eq!(notifier.subscriber_count(), 0);
  }

  #[test]
  fn notifier_completion_completes() {
    let source = PublishSubject::<i32>::new();
    let notifier = PublishSubject::<i32>::new();
    let completed = MutArc::own(false);
    let c_completed = completed.clone();
    source.observable().take_until(&notifier.observable()).subscribe_all(
      |_: i32| {},
      move || *c_completed.rc_deref_mut() = true,
      |_: RxError| {},
    );
    notifier.on_completed();
    assert!(*completed.rc_deref_mut());
    assert_eq!(source.subscriber_count(), 0);
  }

  #[test]
  fn notifier_error_propagates() {
    let result = Observable::<i32>::never()
      .take_until(&Observable::<i32>::throw(RxError::message("stop")))
      .to_array();
    assert_eq!(result.unwrap_err().to_string(), "stop");
  }

  #[test]
  fn immediate_notifier_skips_source() {
    let subscribed = MutArc::own(false);
    let c_subscribed = subscribed.clone();
    let source = Observable::create(move |_: Observer<i32>| *c_subscribed.rc_deref_mut() = true);
    let seen = source.take_until(&Observable::just(0)).to_array().unwrap();
    assert!(seen.is_empty());
    assert!(!*subscribed.rc_deref_mut());
  }
}

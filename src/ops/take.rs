use crate::observable::Observable;

impl<T: 'static> Observable<T> {
  /// Emits only the first `count` values, completing right after the last
  /// one. `take(0)` completes without subscribing to the source.
  pub fn take(&self, count: usize) -> Observable<T> {
    if count == 0 {
      return Observable::empty();
    }
    let source = self.clone();
    Observable::from_fn(move |down| {
      let mut left = count;
      source.actual_subscribe(down.chain(move |down, v| {
        left -= 1;
        down.next(v);
        if left == 0 {
          down.complete();
        }
        Ok(())
      }));
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, rc::MutArc};

  #[test]
  fn base_function() {
    let completed = MutArc::own(false);
    let c_completed = completed.clone();
    let next_count = MutArc::own(0);
    let c_next = next_count.clone();
    Observable::from_iter(0..100).take(5).subscribe_all(
      move |_: i32| *c_next.rc_deref_mut() += 1,
      move || *c_completed.rc_deref_mut() = true,
      |_: RxError| {},
    );
    assert!(*completed.rc_deref_mut());
    assert_eq!(*next_count.rc_deref_mut(), 5);
  }

  #[test]
  fn take_zero_never_subscribes() {
    let subscribed = MutArc::own(false);
    let c_subscribed = subscribed.clone();
    let source = Observable::create(move |_: Observer<i32>| *c_subscribed.rc_deref_mut() = true);
    assert!(source.take(0).to_array().unwrap().is_empty());
    assert!(!*subscribed.rc_deref_mut());
  }

  #[test]
  fn take_stops_hot_source() {
    let subject = PublishSubject::<i32>::new();
    let seen = MutArc::own(vec![]);
    let c_seen = seen.clone();
    subject.observable().take(2).subscribe(move |v| c_seen.rc_deref_mut().push(v));
    (1..=4).for_each(|v| subject.on_next(v));
    assert_eq!(*seen.rc_deref_mut(), vec![1, 2]);
    assert_eq!(subject.subscriber_count(), 0);
  }
}

use std::sync::Arc;

use crate::{observable::Observable, rc::MutArc, value::FromValue};

impl<T: FromValue + 'static> Observable<T> {
  /// Maps every value to an inner observable and merges what the inners
  /// emit. Completes once the source and every inner have completed; the
  /// first error from any of them terminates the result.
  pub fn flat_map<R, F>(&self, f: F) -> Observable<R>
  where
    R: 'static,
    F: Fn(T) -> Observable<R> + Send + Sync + 'static,
  {
    let f = Arc::new(f);
    let source = self.clone();
    Observable::from_fn(move |down| {
      let f = f.clone();
      // The source counts as one active stream until it completes.
      let active = MutArc::own(1usize);
      let (c_active, c_down) = (active.clone(), down.clone());
      let up = down.upstream(
        move |v| {
          let inner = f(T::from_value(v)?);
          *c_active.rc_deref_mut() += 1;
          let (n, e, c, c_active) = (c_down.clone(), c_down.clone(), c_down.clone(), c_active.clone());
          let inner_up = c_down.upstream(
            move |v| {
              n.next(v);
              Ok(())
            },
            move |err| e.error(err),
            move || complete_one(&c_active, || c.complete()),
          );
          inner.actual_subscribe(inner_up);
          Ok(())
        },
        {
          let down = down.clone();
          move |err| down.error(err)
        },
        {
          let down = down.clone();
          move || complete_one(&active, || down.complete())
        },
      );
      source.actual_subscribe(up);
    })
  }
}

fn complete_one(active: &MutArc<usize>, complete: impl FnOnce()) {
  let done = {
    let mut active = active.rc_deref_mut();
    *active -= 1;
    *active == 0
  };
  if done {
    complete();
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, rc::MutArc};

  #[test]
  fn flattens_in_order() {
    let seen = Observable::from(vec![1, 2, 3])
      .flat_map(|v: i32| Observable::from(vec![v, v * 10]))
      .to_array()
      .unwrap();
    assert_eq!(seen, vec![1, 10, 2, 20, 3, 30]);
  }

  #[test]
  fn waits_for_inners() {
    let outer = PublishSubject::<i32>::new();
    let inner = PublishSubject::<i32>::new();
    let c_inner = inner.clone();
    let log = MutArc::own(vec![]);
    let (n, c) = (log.clone(), log.clone());
    outer.observable().flat_map(move |_| c_inner.observable()).subscribe_all(
      move |v: i32| n.rc_deref_mut().push(v),
      move || c.rc_deref_mut().push(-1),
      |_: RxError| {},
    );
    outer.on_next(0);
    inner.on_next(7);
    outer.on_completed();
    assert_eq!(*log.rc_deref_mut(), vec![7]);
    inner.on_next(8);
    inner.on_completed();
    assert_eq!(*log.rc_deref_mut(), vec![7, 8, -1]);
  }

  #[test]
  fn inner_error_terminates() {
    let err = Observable::from(vec![1, 2])
      .flat_map(|v: i32| {
        if v == 2 {
          Observable::throw(RxError::message("inner"))
        } else {
          Observable::just(v)
        }
      })
      .to_array()
      .unwrap_err();
    assert_eq!(err.to_string(), "inner");
  }
}

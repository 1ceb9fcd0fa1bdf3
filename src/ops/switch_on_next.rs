use crate::{
  observable::Observable,
  rc::MutArc,
  subscription::Subscription,
  value::FromValue,
};

#[derive(Default)]
struct SwitchState {
  generation: u64,
  inner: Option<Subscription>,
  outer_done: bool,
  inner_active: bool,
}

impl<U: 'static> Observable<Observable<U>> {
  /// Flattens a stream of streams by following only the most recent inner
  /// stream. The previous inner is unsubscribed as soon as a new one
  /// arrives.
  ///
  /// Completes once the outer stream and the current inner have both
  /// completed; an error from either terminates the result.
  pub fn switch_on_next(&self) -> Observable<U> {
    let source = self.clone();
    Observable::from_fn(move |down| {
      let state = MutArc::own(SwitchState::default());
      let (n_state, c_state) = (state.clone(), state);
      let (n, e, c) = (down.clone(), down.clone(), down.clone());
      let up = down.upstream(
        move |v| {
          let inner = Observable::<U>::from_value(v)?;
          let (generation, previous) = {
            let mut state = n_state.rc_deref_mut();
            state.generation += 1;
            state.inner_active = true;
            (state.generation, state.inner.take())
          };
          if let Some(previous) = previous {
            previous.unsubscribe();
          }

          let (i_state, i_down, ic_state, ic_down) =
            (n_state.clone(), n.clone(), n_state.clone(), n.clone());
          let i_err = n.clone();
          let inner_up = n.upstream(
            move |v| {
              if i_state.rc_deref_mut().generation == generation {
                i_down.next(v);
              }
              Ok(())
            },
            move |err| i_err.error(err),
            move || {
              let done = {
                let mut state = ic_state.rc_deref_mut();
                if state.generation != generation {
                  return;
                }
                state.inner_active = false;
                state.inner = None;
                state.outer_done
              };
              if done {
                ic_down.complete();
              }
            },
          );
          {
            let mut state = n_state.rc_deref_mut();
            if state.generation == generation {
              state.inner = Some(inner_up.subscription().clone());
            }
          }
          inner.actual_subscribe(inner_up);
          Ok(())
        },
        move |err| e.error(err),
        move || {
          let done = {
            let mut state = c_state.rc_deref_mut();
            state.outer_done = true;
            !state.inner_active
          };
          if done {
            c.complete();
          }
        },
      );
      source.actual_subscribe(up);
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, rc::MutArc};

  #[test]
  fn switches_to_latest() {
    let outer = PublishSubject::<Observable<i32>>::new();
    let a = PublishSubject::<i32>::new();
    let b = PublishSubject::<i32>::new();
    let log = MutArc::own(vec![]);
    let (n, c) = (log.clone(), log.clone());
    outer.observable().switch_on_next().subscribe_all(
      move |v: i32| n.rc_deref_mut().push(v),
      move || c.rc_deref_mut().push(-1),
      |_: RxError| {},
    );

    outer.on_next(a.observable());
    a.on_next(1);
    outer.on_next(b.observable());
    assert_eq!(a.subscriber_count(), 0);
    a.on_next(2);
    b.on_next(3);
    assert_eq!(*log.rc_deref_mut(), vec![1, 3]);

    outer.on_completed();
    assert_eq!(*log.rc_deref_mut(), vec![1, 3]);
    b.on_completed();
    assert_eq!(*log.rc_deref_mut(), vec![1, 3, -1]);
  }

  #[test]
  fn completed_inner_then_outer() {
    let seen = Observable::from(vec![Observable::from(vec![1, 2]), Observable::from(vec![3])])
      .switch_on_next()
      .to_array()
      .unwrap();
    assert_eq!(seen, vec![1, 2, 3]);
  }

  #[test]
  fn inner_error_terminates() {
    let outer = PublishSubject::<Observable<i32>>::new();
    let errors = MutArc::own(0);
    let c_errors = errors.clone();
    outer
      .observable()
      .switch_on_next()
      .subscribe_err(|_| {}, move |_| *c_errors.rc_deref_mut() += 1);
    outer.on_next(Observable::throw(RxError::message("inner")));
    assert_eq!(*errors.rc_deref_mut(), 1);
    assert_eq!(outer.subscriber_count(), 0);
  }

  #[test]
  fn non_observable_item_errors() {
    let result = Observable::from(vec![1]).cast::<Observable<i32>>().switch_on_next().to_array();
    assert_eq!(result.unwrap_err().as_label(), "type_mismatch");
  }
}

use std::sync::Arc;

use crate::{
  error::RxError,
  observable::Observable,
  rc::MutArc,
  value::{FromValue, IntoValue, Value},
};

type Combine = Arc<dyn Fn(Vec<Value>) -> Result<Value, RxError> + Send + Sync>;

struct CombineState {
  latest: Vec<Option<Value>>,
  completed: usize,
}

fn combine_latest_values(sources: Vec<Observable<Value>>, combine: Combine) -> Observable<Value> {
  Observable::from_fn(move |down| {
    let state = MutArc::own(CombineState { latest: vec![None; sources.len()], completed: 0 });
    for (index, source) in sources.iter().enumerate() {
      if down.is_closed() {
        return;
      }
      let (n_state, c_state) = (state.clone(), state.clone());
      let (n, e, c) = (down.clone(), down.clone(), down.clone());
      let combine = combine.clone();
      let total = sources.len();
      let up = down.upstream(
        move |v| {
          let ready = {
            let mut state = n_state.rc_deref_mut();
            state.latest[index] = Some(v);
            state.latest.iter().cloned().collect::<Option<Vec<_>>>()
          };
          if let Some(values) = ready {
            n.next(combine(values)?);
          }
          Ok(())
        },
        move |err| e.error(err),
        move || {
          let done = {
            let mut state = c_state.rc_deref_mut();
            state.completed += 1;
            state.completed == total
          };
          if done {
            c.complete();
          }
        },
      );
      source.actual_subscribe(up);
    }
  })
}

macro_rules! combine_latest_fn {
  ($(#[$meta:meta])* $name:ident, $($o:ident: $t:ident),+) => {
    $(#[$meta])*
    pub fn $name<$($t,)+ R, F>(&self, $($o: &Observable<$t>,)+ f: F) -> Observable<R>
    where
      $($t: FromValue + 'static,)+
      R: IntoValue,
      F: Fn(T, $($t),+) -> R + Send + Sync + 'static,
    {
      let sources = vec![self.erase(), $($o.erase()),+];
      let combine: Combine = Arc::new(move |values: Vec<Value>| {
        let mut values = values.into_iter();
        let first = T::from_value(values.next().unwrap_or_default())?;
        Ok(f(first, $(<$t>::from_value(values.next().unwrap_or_default())?),+).into_value())
      });
      combine_latest_values(sources, combine).cast()
    }
  };
}

impl<T: FromValue + 'static> Observable<T> {
  combine_latest_fn!(
    /// Combines this observable with `o1`: once both emitted, every value of
    /// either one emits `f` applied to the latest value of each.
    ///
    /// Completes once every input completed; an error from any input
    /// propagates immediately.
    ///
    /// ```
    /// use rxdyn::prelude::*;
    ///
    /// let a = PublishSubject::<i32>::new();
    /// let b = PublishSubject::<String>::new();
    /// let sums = a.observable().combine_latest(&b.observable(), |n, s| format!("{s}{n}"));
    /// sums.subscribe(|v: String| println!("{v}"));
    /// a.on_next(1);
    /// b.on_next("x".to_owned());
    /// ```
    combine_latest, o1: A
  );
  combine_latest_fn!(
    /// [`combine_latest`](Self::combine_latest) over three inputs.
    combine_latest2, o1: A, o2: B
  );
  combine_latest_fn!(
    /// [`combine_latest`](Self::combine_latest) over four inputs.
    combine_latest3, o1: A, o2: B, o3: C
  );
  combine_latest_fn!(
    /// [`combine_latest`](Self::combine_latest) over five inputs.
    combine_latest4, o1: A, o2: B, o3: C, o4: D
  );
  combine_latest_fn!(
    /// [`combine_latest`](Self::combine_latest) over six inputs.
    combine_latest5, o1: A, o2: B, o3: C, o4: D, o5: E
  );
  combine_latest_fn!(
    /// [`combine_latest`](Self::combine_latest) over seven inputs.
    combine_latest6, o1: A, o2: B, o3: C, o4: D, o5: E, o6: G
  );
  combine_latest_fn!(
    /// [`combine_latest`](Self::combine_latest) over eight inputs.
    combine_latest7, o1: A, o2: B, o3: C, o4: D, o5: E, o6: G, o7: H
  );
}

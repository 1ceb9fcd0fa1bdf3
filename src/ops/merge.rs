use crate::{observable::Observable, rc::MutArc};

impl<T: 'static> Observable<T> {
  /// Interleaves the values of this observable and `others` as they arrive.
  ///
  /// Completes once every input has completed. The first error terminates
  /// the result and disposes every input.
  ///
  /// ```
  /// use rxdyn::prelude::*;
  ///
  /// let odd = Observable::from(vec![1, 3]);
  /// let even = Observable::from(vec![2, 4]);
  /// assert_eq!(odd.merge([even]).to_array().unwrap(), vec![1, 3, 2, 4]);
  /// ```
  pub fn merge(&self, others: impl IntoIterator<Item = Observable<T>>) -> Observable<T> {
    let sources: Vec<Observable<T>> = std::iter::once(self.clone()).chain(others).collect();
    Observable::from_fn(move |down| {
      let active = MutArc::own(sources.len());
      for source in sources.iter() {
        if down.is_closed() {
          return;
        }
        let (n, e, c, active) = (down.clone(), down.clone(), down.clone(), active.clone());
        let up = down.upstream(
          move |v| {
            n.next(v);
            Ok(())
          },
          move |err| e.error(err),
          move || {
            let done = {
              let mut active = active.rc_deref_mut();
              *active -= 1;
              *active == 0
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
}

use std::sync::Arc;

use crate::{
  observable::Observable,
  value::{FromValue, IntoValue},
};

impl<T: FromValue + 'static> Observable<T> {
  /// Emits `acc = f(acc, value)` for every value, starting from `seed`.
  /// The seed itself is not emitted.
  ///
  /// ```
  /// use rxdyn::prelude::*;
  ///
  /// let sums = Observable::from(vec![1, 2, 3]).scan(0, |acc, v| acc + v);
  /// assert_eq!(sums.to_array().unwrap(), vec![1, 3, 6]);
  /// ```
  pub fn scan<R, F>(&self, seed: R, f: F) -> Observable<R>
  where
    R: IntoValue + Clone + Send + Sync + 'static,
    F: Fn(R, T) -> R + Send + Sync + 'static,
  {
    let f = Arc::new(f);
    let source = self.clone();
    Observable::from_fn(move |down| {
      let f = f.clone();
      let mut acc = seed.clone();
      source.actual_subscribe(down.chain(move |down, v| {
        acc = f(acc.clone(), T::from_value(v)?);
        down.next(acc.clone().into_value());
        Ok(())
      }));
    })
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn seed_per_subscription() {
    let joined = Observable::from(vec!["a", "b", "c"])
      .cast::<String>()
      .scan(String::new(), |acc, v| acc + &v);
    assert_eq!(joined.to_array().unwrap(), vec!["a", "ab", "abc"]);
    assert_eq!(joined.to_array().unwrap(), vec!["a", "ab", "abc"]);
  }
}

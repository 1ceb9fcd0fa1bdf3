use std::sync::Arc;

use crate::{observable::Observable, value::FromValue};

impl<T: FromValue + 'static> Observable<T> {
  /// Emits only the values for which `predicate` returns `true`.
  pub fn filter<F>(&self, predicate: F) -> Observable<T>
  where
    F: Fn(&T) -> bool + Send + Sync + 'static,
  {
    let predicate = Arc::new(predicate);
    let source = self.clone();
    Observable::from_fn(move |down| {
      let predicate = predicate.clone();
      source.actual_subscribe(down.chain(move |down, v| {
        if predicate(&T::from_value(v.clone())?) {
          down.next(v);
        }
        Ok(())
      }));
    })
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn fork_and_shared() {
    let evens = Observable::from_iter(0..10).filter(|v| v % 2 == 0);
    assert_eq!(evens.to_array().unwrap(), vec![0, 2, 4, 6, 8]);
    assert_eq!(evens.map(|v| v * 10).to_array().unwrap(), vec![0, 20, 40, 60, 80]);
  }
}

use std::sync::Arc;

use crate::{
  observable::Observable,
  value::{FromValue, IntoValue},
};

impl<T: FromValue + 'static> Observable<T> {
  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  ///
  /// A value that does not convert to `T` terminates the stream with
  /// [`RxError::TypeMismatch`](crate::RxError::TypeMismatch).
  pub fn map<R, F>(&self, f: F) -> Observable<R>
  where
    R: IntoValue,
    F: Fn(T) -> R + Send + Sync + 'static,
  {
    let f = Arc::new(f);
    let source = self.clone();
    Observable::from_fn(move |down| {
      let f = f.clone();
      source.actual_subscribe(down.chain(move |down, v| {
        down.next(f(T::from_value(v)?).into_value());
        Ok(())
      }));
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, rc::MutArc};
  use bencher::{benchmark_group, Bencher};

  #[test]
  fn primitive_type() {
    let sum = MutArc::own(0);
    let c_sum = sum.clone();
    Observable::from_iter(100..101)
      .map(|v: i32| v * 2)
      .subscribe(move |v| *c_sum.rc_deref_mut() += v);
    assert_eq!(*sum.rc_deref_mut(), 200);
  }

  #[test]
  fn map_types_mixed() {
    let seen = Observable::from(vec![1, 2, 3]).map(|v| format!("#{v}")).to_array().unwrap();
    assert_eq!(seen, vec!["#1", "#2", "#3"]);
  }

  #[test]
  fn mismatch_errors() {
    let errors = MutArc::own(vec![]);
    let c_errors = errors.clone();
    Observable::from(vec![Value::Int(1), Value::Text("x".into()), Value::Int(3)])
      .cast::<i32>()
      .map(|v| v + 1)
      .subscribe_err(|_| {}, move |e| c_errors.rc_deref_mut().push(e.as_label()));
    assert_eq!(*errors.rc_deref_mut(), vec!["type_mismatch"]);
  }

  #[test]
  fn bench() { do_bench(); }

  benchmark_group!(do_bench, bench_map);

  fn bench_map(b: &mut Bencher) { b.iter(primitive_type); }
}

//! Observers accepting values of other types than the subject they feed.

use rxdyn::{impl_value_object, prelude::*, value::register_conversion};
use std::sync::{Arc, Mutex};

fn recorder<T: FromValue + Send + 'static>(
  observable: &Observable<T>,
) -> (Arc<Mutex<Vec<T>>>, Subscription) {
  let seen = Arc::new(Mutex::new(vec![]));
  let c_seen = seen.clone();
  let subscription = observable.subscribe(move |v| c_seen.lock().unwrap().push(v));
  (seen, subscription)
}

#[test]
fn var_into_float() {
  let subject = PublishSubject::<f64>::new();
  let (seen, _) = recorder(&subject.observable());
  let observer = Observer::<Value>::from(&subject);
  observer.on_next(Value::Double(14.57));
  assert_eq!(*seen.lock().unwrap(), vec![14.57]);
}

#[test]
fn float_into_var() {
  let subject = PublishSubject::<Value>::new();
  let (seen, _) = recorder(&subject.observable());
  let observer = Observer::<f64>::from(&subject);
  observer.on_next(85.2);
  assert_eq!(*seen.lock().unwrap(), vec![Value::Double(85.2)]);
}

#[test]
fn var_into_string() {
  let subject = PublishSubject::<String>::new();
  let (seen, _) = recorder(&subject.observable());
  let observer = Observer::<Value>::from(&subject);
  observer.on_next(Value::from("hello"));
  assert_eq!(*seen.lock().unwrap(), vec!["hello".to_owned()]);
}

#[test]
fn float_into_int() {
  let subject = PublishSubject::<i32>::new();
  let (seen, _) = recorder(&subject.observable());
  let observer = Observer::<f64>::from(&subject);
  observer.on_next(15.67);
  assert_eq!(*seen.lock().unwrap(), vec![15]);
}

#[derive(Clone, Debug, PartialEq)]
struct Base {
  id: i32,
}

#[derive(Clone, Debug, PartialEq)]
struct Derived {
  base: Base,
  extra: i32,
}

impl From<Derived> for Base {
  fn from(d: Derived) -> Base { d.base }
}

impl_value_object!(Base, Derived);

#[test]
fn derived_into_base() {
  register_conversion::<Derived, Base>();
  let subject = PublishSubject::<Base>::new();
  let (seen, _) = recorder(&subject.observable());
  let observer = Observer::<Derived>::from(&subject);
  observer.on_next(Derived { base: Base { id: 205 }, extra: 1002 });
  assert_eq!(*seen.lock().unwrap(), vec![Base { id: 205 }]);
}

#[test]
fn unconvertible_value_errors_the_subject() {
  let subject = PublishSubject::<i32>::new();
  let errors = Arc::new(Mutex::new(vec![]));
  let c_errors = errors.clone();
  subject
    .observable()
    .subscribe_err(|_| {}, move |e| c_errors.lock().unwrap().push(e.as_label()));
  Observer::<Value>::from(&subject).on_next(Value::from("not a number"));
  assert_eq!(*errors.lock().unwrap(), vec!["type_mismatch"]);
  assert!(subject.is_closed());
}

#[test]
fn accepting_chains_conversions() {
  let subject = PublishSubject::<i64>::new();
  let (seen, _) = recorder(&subject.observable());
  let observer: Observer<i64> = subject.observer();
  observer.accepting::<f32>().on_next(2.5);
  assert_eq!(*seen.lock().unwrap(), vec![2]);
}

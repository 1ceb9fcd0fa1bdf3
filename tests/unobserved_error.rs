//! The process-wide handler for errors no subscriber handles.
//!
//! Kept to a single test: the handler is global to the test binary.

use rxdyn::prelude::*;
use std::sync::{Arc, Mutex};

#[test]
fn unhandled_errors_reach_the_handler() {
  let reported = Arc::new(Mutex::new(vec![]));
  let c_reported = reported.clone();
  set_unobserved_error_handler(move |err| c_reported.lock().unwrap().push(err.to_string()));

  Observable::<i32>::throw(RxError::message("plain subscribe")).subscribe(|_| {});

  let completions = Arc::new(Mutex::new(0));
  let (a, b) = (completions.clone(), completions.clone());
  Observable::<i32>::throw(RxError::message("two completion handlers")).subscribe_all(
    |_| {},
    move || *a.lock().unwrap() += 1,
    move || *b.lock().unwrap() += 1,
  );

  let handled = Arc::new(Mutex::new(vec![]));
  let c_handled = handled.clone();
  Observable::<i32>::throw(RxError::message("handled")).subscribe_err(
    |_| {},
    move |err| c_handled.lock().unwrap().push(err.to_string()),
  );

  let subject = PublishSubject::<i32>::new();
  subject.observable().subscribe(|_| {});
  subject.on_error(RxError::message("from subject"));

  assert_eq!(
    *reported.lock().unwrap(),
    vec!["plain subscribe", "two completion handlers", "from subject"]
  );
  assert_eq!(*handled.lock().unwrap(), vec!["handled"]);
  assert_eq!(*completions.lock().unwrap(), 0);

  reset_unobserved_error_handler();
}

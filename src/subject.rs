//! Multicast streams that are observers and observables at once.
//!
//! A subject keeps a list of subscribers and fans every pushed value out to
//! them synchronously, in subscription order. Three flavours differ only in
//! the history a late subscriber receives:
//!
//! | Subject | On subscribe |
//! |---------|--------------|
//! | publish | nothing retroactive |
//! | behavior | the latest value (the initial one until something is pushed) |
//! | replay(n) | up to the last `n` values, in order |
//!
//! After `on_error` or `on_completed` a subject ignores further pushes. A
//! subscriber arriving after that receives the terminal notification right
//! away; a replay subject replays its buffer first.

use std::sync::Arc;

use crate::{
  error::RxError,
  observable::Observable,
  observer::Observer,
  value::{IntoValue, Value},
};

mod subject_core;
mod typed;

pub(crate) use subject_core::{Policy, SubjectCore};
pub use typed::{BehaviorSubject, PublishSubject, ReplaySubject};

/// A subject over erased values.
#[derive(Clone)]
pub struct Subject(Arc<SubjectCore>);

impl Subject {
  pub fn publish() -> Self { Subject(SubjectCore::new(Policy::Publish, None)) }

  pub fn behavior(initial: impl IntoValue) -> Self {
    Subject(SubjectCore::new(Policy::Behavior, Some(initial.into_value())))
  }

  /// Keeps the last `buffer_size` values for late subscribers.
  pub fn replay(buffer_size: usize) -> Self { Subject(SubjectCore::new(Policy::Replay(buffer_size), None)) }

  pub fn on_next(&self, value: impl IntoValue) { self.0.on_next(value.into_value()) }

  pub fn on_error(&self, err: RxError) { self.0.on_error(err) }

  pub fn on_completed(&self) { self.0.on_completed() }

  /// The latest buffered value without subscribing. Always `None` for a
  /// publish subject.
  pub fn latest_item(&self) -> Option<Value> { self.0.latest_item() }

  pub fn observable(&self) -> Observable<Value> { Observable::hot(self.0.clone()) }

  pub fn observer(&self) -> Observer<Value> { self.into() }

  /// Number of live subscribers.
  pub fn subscriber_count(&self) -> usize { self.0.subscriber_count() }

  /// `true` once the subject errored or completed.
  pub fn is_closed(&self) -> bool { self.0.is_terminated() }
}

impl<T: IntoValue + 'static> From<&Subject> for Observer<T> {
  fn from(subject: &Subject) -> Self { Observer::from_sink(subject.0.clone()) }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::rc::MutArc;

  fn record(subject: &Subject) -> MutArc<Vec<String>> {
    let log = MutArc::own(vec![]);
    let (n, e, c) = (log.clone(), log.clone(), log.clone());
    subject.observable().subscribe_all(
      move |v: Value| n.rc_deref_mut().push(v.to_string()),
      move |err: RxError| e.rc_deref_mut().push(format!("error: {err}")),
      move || c.rc_deref_mut().push("complete".to_owned()),
    );
    log
  }

  #[test]
  fn publish_fans_out_in_order() {
    let subject = Subject::publish();
    subject.on_next(0);
    let a = record(&subject);
    let b = record(&subject);
    subject.on_next(1);
    subject.on_next("two");
    assert_eq!(*a.rc_deref_mut(), vec!["1", "two"]);
    assert_eq!(*b.rc_deref_mut(), vec!["1", "two"]);
    assert_eq!(subject.latest_item(), None);
  }

  #[test]
  fn behavior_replays_latest() {
    let subject = Subject::behavior(1);
    let a = record(&subject);
    subject.on_next(2);
    let b = record(&subject);
    assert_eq!(*a.rc_deref_mut(), vec!["1", "2"]);
    assert_eq!(*b.rc_deref_mut(), vec!["2"]);
    assert_eq!(subject.latest_item(), Some(Value::Int(2)));
  }

  #[test]
  fn replay_keeps_window() {
    let subject = Subject::replay(2);
    for i in 1..=4 {
      subject.on_next(i);
    }
    let a = record(&subject);
    subject.on_completed();
    let late = record(&subject);
    assert_eq!(*a.rc_deref_mut(), vec!["3", "4", "complete"]);
    assert_eq!(*late.rc_deref_mut(), vec!["3", "4", "complete"]);
  }

  #[test]
  fn terminated_subject() {
    let subject = Subject::behavior(1);
    subject.on_error(RxError::message("gone"));
    subject.on_next(2);
    subject.on_completed();
    let late = record(&subject);
    assert_eq!(*late.rc_deref_mut(), vec!["error: gone"]);
    assert!(subject.is_closed());
  }

  #[test]
  fn unsubscribe_removes_subscriber() {
    let subject = Subject::publish();
    let s1 = subject.observable().subscribe(|_| {});
    let _s2 = subject.observable().subscribe(|_| {});
    assert_eq!(subject.subscriber_count(), 2);
    s1.unsubscribe();
    assert_eq!(subject.subscriber_count(), 1);
  }

  #[test]
  fn push_from_within_subscriber() {
    let subject = Subject::publish();
    let log = MutArc::own(vec![]);
    let (c_subject, c_log) = (subject.clone(), log.clone());
    subject.observable().cast::<i32>().subscribe(move |v| {
      c_log.rc_deref_mut().push(v);
      if v < 3 {
        c_subject.on_next(v + 1);
      }
    });
    subject.on_next(1);
    assert_eq!(*log.rc_deref_mut(), vec![1, 2, 3]);
  }

  #[test]
  fn subscribe_racing_pushes_keeps_order() {
    use std::thread;

    for _ in 0..50 {
      let subject = BehaviorSubject::<i32>::new(0);
      let c_subject = subject.clone();
      let producer = thread::spawn(move || (1..=2000).for_each(|v| c_subject.on_next(v)));
      for _ in 0..20 {
        let seen = MutArc::own(vec![]);
        let c_seen = seen.clone();
        subject
          .observable()
          .subscribe(move |v: i32| c_seen.rc_deref_mut().push(v))
          .unsubscribe();
        let seen = seen.rc_deref_mut();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "out of order: {seen:?}");
      }
      producer.join().unwrap();
    }
  }

  #[test]
  fn replay_history_precedes_racing_pushes() {
    use std::thread;

    let subject = ReplaySubject::<i32>::new(100);
    (0..100).for_each(|v| subject.on_next(v));
    let c_subject = subject.clone();
    let producer = thread::spawn(move || (100..1000).for_each(|v| c_subject.on_next(v)));
    let seen = MutArc::own(vec![]);
    let c_seen = seen.clone();
    let _guard = subject
      .observable()
      .subscribe(move |v: i32| c_seen.rc_deref_mut().push(v))
      .unsubscribe_when_dropped();
    producer.join().unwrap();
    let seen = seen.rc_deref_mut();
    assert_eq!(seen.last(), Some(&999));
    assert!(seen.windows(2).all(|w| w[0] + 1 == w[1]));
  }

  #[test]
  fn subject_as_observer() {
    let source = Subject::publish();
    let sink = Subject::replay(10);
    source.observable().subscribe_by(&sink);
    source.on_next(1);
    source.on_completed();
    let log = record(&sink);
    assert_eq!(*log.rc_deref_mut(), vec!["1", "complete"]);
  }
}

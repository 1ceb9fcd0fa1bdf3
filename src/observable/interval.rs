use std::time::Duration;

use crate::{observable::Observable, scheduler::Scheduler, value::Value};

impl Observable<i64> {
  /// Emits `0, 1, 2, ...` every `period` on the default asynchronous
  /// scheduler. Never completes.
  pub fn interval(period: Duration) -> Self { Self::interval_on(period, Scheduler::default_async()) }

  /// Emits `0, 1, 2, ...` every `period` on `scheduler`. Never completes.
  /// On a synchronous scheduler it errors with
  /// [`RxError::SynchronousScheduler`](crate::RxError::SynchronousScheduler)
  /// instead of ticking.
  ///
  /// Disposing the subscription cancels the pending tick, and a tick that
  /// is already running delivers nothing.
  pub fn interval_on(period: Duration, scheduler: Scheduler) -> Self {
    Observable::from_fn(move |s| {
      let c_s = s.clone();
      let ticking = scheduler.repeat(period, s.subscription(), move |tick| {
        c_s.next(Value::Int(tick as i64));
      });
      if let Err(err) = ticking {
        s.error(err);
      }
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, rc::MutArc};
  use std::time::Duration;

  #[test]
  fn ticks_on_run_loop() {
    let run_loop = RunLoop::new();
    let seen = MutArc::own(vec![]);
    let c_seen = seen.clone();
    let subscription = Observable::interval_on(Duration::from_millis(10), run_loop.scheduler())
      .subscribe(move |v: i64| c_seen.rc_deref_mut().push(v));

    run_loop.advance_by(Duration::from_millis(9));
    assert!(seen.rc_deref_mut().is_empty());
    run_loop.advance_by(Duration::from_millis(31));
    assert_eq!(*seen.rc_deref_mut(), vec![0, 1, 2, 3]);

    subscription.unsubscribe();
    run_loop.advance_by(Duration::from_millis(100));
    assert_eq!(*seen.rc_deref_mut(), vec![0, 1, 2, 3]);
    assert_eq!(run_loop.pending(), 0);
  }

  #[test]
  fn immediate_scheduler_errors() {
    let result = Observable::interval_on(Duration::from_millis(1), Scheduler::immediate())
      .take(1)
      .to_array();
    assert_eq!(result.unwrap_err().as_label(), "synchronous_scheduler");
  }

  #[cfg(feature = "futures-scheduler")]
  #[test]
  fn shared() {
    let scheduler = Scheduler::thread_pool().unwrap();
    let seen = Observable::interval_on(Duration::from_millis(1), scheduler)
      .take(5)
      .to_array()
      .unwrap();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
  }
}

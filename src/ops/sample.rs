use std::time::Duration;

use crate::{observable::Observable, rc::MutArc, scheduler::Scheduler};

impl<T: 'static> Observable<T> {
  /// Every `period`, emits the most recent value if a new one arrived since
  /// the previous tick. Ticks on the default asynchronous scheduler.
  pub fn sample(&self, period: Duration) -> Observable<T> {
    self.sample_on(period, Scheduler::default_async())
  }

  /// Like [`sample`](Self::sample), ticking on `scheduler`.
  ///
  /// Completion stops the ticker and completes right away; a value that
  /// arrived after the last tick is not emitted.
  pub fn sample_on(&self, period: Duration, scheduler: Scheduler) -> Observable<T> {
    let source = self.clone();
    Observable::from_fn(move |down| {
      let latest = MutArc::own(None);
      let (t_latest, t_down) = (latest.clone(), down.clone());
      let ticking = scheduler.repeat(period, down.subscription(), move |_| {
        let value = t_latest.rc_deref_mut().take();
        if let Some(value) = value {
          t_down.next(value);
        }
      });
      if let Err(err) = ticking {
        down.error(err);
        return;
      }
      source.actual_subscribe(down.chain(move |_, v| {
        *latest.rc_deref_mut() = Some(v);
        Ok(())
      }));
    })
  }
}

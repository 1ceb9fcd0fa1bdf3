use std::time::Duration;

use crate::{
  observable::Observable,
  rc::MutArc,
  scheduler::{Scheduler, TaskHandle},
  value::Value,
};

#[derive(Default)]
struct DebounceState {
  generation: u64,
  trailing: Option<Value>,
  task: Option<TaskHandle>,
}

impl DebounceState {
  fn cancel(&mut self) -> Option<Value> {
    if let Some(task) = self.task.take() {
      task.cancel();
    }
    self.trailing.take()
  }
}

impl<T: 'static> Observable<T> {
  /// Emits a value only after `period` passed without another value, on the
  /// default asynchronous scheduler.
  pub fn debounce(&self, period: Duration) -> Observable<T> {
    self.debounce_on(period, Scheduler::default_async())
  }

  /// Emits a value only after `period` passed on `scheduler` without another
  /// value. A value still waiting when the source completes is emitted right
  /// before the completion; an error drops it.
  pub fn debounce_on(&self, period: Duration, scheduler: Scheduler) -> Observable<T> {
    let source = self.clone();
    Observable::from_fn(move |down| {
      let state = MutArc::own(DebounceState::default());
      let (n_state, e_state, c_state) = (state.clone(), state.clone(), state);
      let (n, e, c) = (down.clone(), down.clone(), down.clone());
      let scheduler = scheduler.clone();
      let up = down.upstream(
        move |v| {
          let generation = {
            let mut state = n_state.rc_deref_mut();
            state.cancel();
            state.generation += 1;
            state.trailing = Some(v);
            state.generation
          };
          let (t_state, t_down) = (n_state.clone(), n.clone());
          let task = scheduler.post_delayed(period, move || {
            let value = {
              let mut state = t_state.rc_deref_mut();
              if state.generation != generation {
                return;
              }
              state.task = None;
              state.trailing.take()
            };
            if let Some(value) = value {
              t_down.next(value);
            }
          });
          n.subscription().add_task(task.clone());
          let mut state = n_state.rc_deref_mut();
          if state.generation == generation && !task.is_finished() {
            state.task = Some(task);
          }
          Ok(())
        },
        move |err| {
          e_state.rc_deref_mut().cancel();
          e.error(err);
        },
        move || {
          let trailing = c_state.rc_deref_mut().cancel();
          if let Some(value) = trailing {
            c.next(value);
          }
          c.complete();
        },
      );
      source.actual_subscribe(up);
    })
  }
}

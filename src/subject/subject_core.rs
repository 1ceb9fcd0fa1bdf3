use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use crate::{
  error::RxError,
  rc::lock,
  subscriber::{Event, Sink, Subscriber},
  value::Value,
};

/// How much history a subject keeps for late subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Policy {
  Publish,
  Behavior,
  Replay(usize),
}

#[derive(Clone)]
enum Status {
  Active,
  Completed,
  Errored(RxError),
}

struct State {
  status: Status,
  buffer: VecDeque<Value>,
  subscribers: Vec<(u64, Subscriber)>,
  next_id: u64,
}

/// Shared state of a subject: its history buffer and subscriber list, both
/// behind one lock.
pub(crate) struct SubjectCore {
  policy: Policy,
  state: Mutex<State>,
}

impl SubjectCore {
  pub(crate) fn new(policy: Policy, initial: Option<Value>) -> Arc<Self> {
    Arc::new(SubjectCore {
      policy,
      state: Mutex::new(State {
        status: Status::Active,
        buffer: initial.into_iter().collect(),
        subscribers: vec![],
        next_id: 0,
      }),
    })
  }

  /// Connects `subscriber`, replaying history first. A subscriber arriving
  /// after termination gets the history (replay only) and the terminal
  /// notification.
  ///
  /// The history is queued on the subscriber under the subject lock, so a
  /// value pushed from another thread right after registration waits behind
  /// it.
  pub(crate) fn attach(self: &Arc<Self>, subscriber: Subscriber) {
    if subscriber.is_closed() {
      return;
    }
    let (primed, registered) = {
      let mut guard = lock(&self.state);
      let state = &mut *guard;
      let mut events: Vec<Event> = match (&state.status, self.policy) {
        (_, Policy::Replay(_)) | (Status::Active, Policy::Behavior) => {
          state.buffer.iter().cloned().map(Event::Next).collect()
        }
        _ => vec![],
      };
      let registered = match &state.status {
        Status::Active => {
          let id = state.next_id;
          state.next_id += 1;
          state.subscribers.push((id, subscriber.clone()));
          Some(id)
        }
        Status::Completed => {
          events.push(Event::Complete);
          None
        }
        Status::Errored(err) => {
          events.push(Event::Error(err.clone()));
          None
        }
      };
      (subscriber.prime(events), registered)
    };

    if let Some(id) = registered {
      let core = Arc::downgrade(self);
      subscriber.subscription().add_fn(move || {
        if let Some(core) = core.upgrade() {
          core.remove(id);
        }
      });
    }
    if primed {
      subscriber.release();
    }
  }

  fn remove(&self, id: u64) {
    tracing::trace!(id, "subject subscriber removed");
    lock(&self.state).subscribers.retain(|(i, _)| *i != id);
  }

  pub(crate) fn on_next(&self, value: Value) {
    let subscribers = {
      let mut state = lock(&self.state);
      if !matches!(state.status, Status::Active) {
        tracing::debug!("value pushed into a terminated subject is ignored");
        return;
      }
      match self.policy {
        Policy::Publish => {}
        Policy::Behavior => {
          state.buffer.clear();
          state.buffer.push_back(value.clone());
        }
        Policy::Replay(size) => {
          state.buffer.push_back(value.clone());
          while state.buffer.len() > size {
            state.buffer.pop_front();
          }
        }
      }
      snapshot(&state)
    };
    for s in subscribers {
      s.next(value.clone());
    }
  }

  pub(crate) fn on_error(&self, err: RxError) {
    if let Some(subscribers) = self.terminate(Status::Errored(err.clone())) {
      tracing::debug!(error = %err, "subject errored");
      for s in subscribers {
        s.error(err.clone());
      }
    }
  }

  pub(crate) fn on_completed(&self) {
    if let Some(subscribers) = self.terminate(Status::Completed) {
      tracing::debug!("subject completed");
      for s in subscribers {
        s.complete();
      }
    }
  }

  fn terminate(&self, status: Status) -> Option<Vec<Subscriber>> {
    let mut state = lock(&self.state);
    if !matches!(state.status, Status::Active) {
      tracing::debug!("subject already terminated, notification ignored");
      return None;
    }
    state.status = status;
    let subscribers = std::mem::take(&mut state.subscribers);
    Some(subscribers.into_iter().map(|(_, s)| s).collect())
  }

  /// Most recent buffered value, `None` for a publish subject.
  pub(crate) fn latest_item(&self) -> Option<Value> { lock(&self.state).buffer.back().cloned() }

  pub(crate) fn buffered(&self) -> Vec<Value> { lock(&self.state).buffer.iter().cloned().collect() }

  pub(crate) fn subscriber_count(&self) -> usize {
    let mut state = lock(&self.state);
    state.subscribers.retain(|(_, s)| !s.is_closed());
    state.subscribers.len()
  }

  pub(crate) fn is_terminated(&self) -> bool {
    !matches!(lock(&self.state).status, Status::Active)
  }
}

fn snapshot(state: &State) -> Vec<Subscriber> {
  state.subscribers.iter().map(|(_, s)| s.clone()).collect()
}

impl Sink for SubjectCore {
  fn next(&self, value: Value) { self.on_next(value) }

  fn error(&self, err: RxError) { self.on_error(err) }

  fn complete(&self) { self.on_completed() }

  fn is_closed(&self) -> bool { self.is_terminated() }
}

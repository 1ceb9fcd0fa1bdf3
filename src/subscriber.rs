use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use crate::{error::RxError, rc::lock, subscription::Subscription, value::Value};

/// Anything that accepts erased notifications.
pub(crate) trait Sink: Send + Sync {
  fn next(&self, value: Value);
  fn error(&self, err: RxError);
  fn complete(&self);
  fn is_closed(&self) -> bool;
}

pub(crate) type NextFn = Box<dyn FnMut(Value) -> Result<(), RxError> + Send>;
pub(crate) type ErrorFn = Box<dyn FnOnce(RxError) + Send>;
pub(crate) type CompleteFn = Box<dyn FnOnce() + Send>;

/// One notification.
pub(crate) enum Event {
  Next(Value),
  Error(RxError),
  Complete,
}

impl Event {
  pub(crate) fn deliver(self, sink: &dyn Sink) {
    match self {
      Event::Next(v) => sink.next(v),
      Event::Error(e) => sink.error(e),
      Event::Complete => sink.complete(),
    }
  }
}

/// The erased consumer end of one subscription.
///
/// Notifications are serialized: a notification that arrives while another
/// one is being handled (from another thread, or re-entrantly from the
/// handler itself) is queued and handled by the thread already inside. After
/// `error` or `complete` the handlers are dropped and nothing more is
/// delivered. A `next` handler returning `Err` terminates the subscription
/// with that error. A `next` handler that panics leaves the subscription
/// open and able to take further notifications.
#[derive(Clone)]
pub(crate) struct Subscriber(Arc<Inner>);

struct Inner {
  state: Mutex<State>,
  subscription: Subscription,
}

struct Handlers {
  next: NextFn,
  error: ErrorFn,
  complete: CompleteFn,
}

struct State {
  handlers: Option<Handlers>,
  busy: bool,
  queue: VecDeque<Event>,
}

impl Subscriber {
  pub(crate) fn new(
    next: impl FnMut(Value) -> Result<(), RxError> + Send + 'static,
    error: impl FnOnce(RxError) + Send + 'static,
    complete: impl FnOnce() + Send + 'static,
  ) -> Self {
    Subscriber(Arc::new(Inner {
      state: Mutex::new(State {
        handlers: Some(Handlers {
          next: Box::new(next),
          error: Box::new(error),
          complete: Box::new(complete),
        }),
        busy: false,
        queue: VecDeque::new(),
      }),
      subscription: Subscription::default(),
    }))
  }

  #[inline]
  pub(crate) fn subscription(&self) -> &Subscription { &self.0.subscription }

  /// Creates the subscriber an operator hands to its source. Its
  /// subscription is tied to this one, so disposing downstream disposes it.
  pub(crate) fn upstream(
    &self,
    next: impl FnMut(Value) -> Result<(), RxError> + Send + 'static,
    error: impl FnOnce(RxError) + Send + 'static,
    complete: impl FnOnce() + Send + 'static,
  ) -> Subscriber {
    let up = Subscriber::new(next, error, complete);
    self.0.subscription.add(up.subscription().clone());
    up
  }

  /// An upstream subscriber with a custom `next` that forwards the terminal
  /// notifications to `self`.
  pub(crate) fn chain(
    &self,
    mut next: impl FnMut(&Subscriber, Value) -> Result<(), RxError> + Send + 'static,
  ) -> Subscriber {
    let (n, e, c) = (self.clone(), self.clone(), self.clone());
    self.upstream(move |v| next(&n, v), move |err| e.error(err), move || c.complete())
  }

  /// An upstream subscriber forwarding everything to `self`.
  pub(crate) fn forward(&self) -> Subscriber {
    self.chain(|down, v| {
      down.next(v);
      Ok(())
    })
  }

  /// Queues `events` ahead of anything delivered later and marks the
  /// subscriber busy, so concurrent notifications wait behind them. Returns
  /// `false` when nothing was queued; otherwise the caller must call
  /// [`release`](Self::release) once it can deliver.
  pub(crate) fn prime(&self, events: Vec<Event>) -> bool {
    if events.is_empty() {
      return false;
    }
    let mut state = lock(&self.0.state);
    if state.busy {
      // Already being delivered to: queue behind the current holder.
      state.queue.extend(events);
      return false;
    }
    state.busy = true;
    state.queue.extend(events);
    true
  }

  /// Delivers everything queued by [`prime`](Self::prime).
  pub(crate) fn release(&self) {
    let (handlers, event) = {
      let mut state = lock(&self.0.state);
      let event = match state.queue.pop_front() {
        Some(event) if !self.0.subscription.is_closed() => event,
        _ => {
          state.busy = false;
          state.queue.clear();
          return;
        }
      };
      match state.handlers.take() {
        Some(handlers) => (handlers, event),
        None => {
          state.busy = false;
          state.queue.clear();
          return;
        }
      }
    };
    self.run(handlers, event);
  }

  fn emit(&self, event: Event) {
    if self.is_closed() {
      return;
    }
    let handlers = {
      let mut state = lock(&self.0.state);
      if state.busy {
        state.queue.push_back(event);
        return;
      }
      match state.handlers.take() {
        Some(handlers) => {
          state.busy = true;
          handlers
        }
        None => return,
      }
    };
    self.run(handlers, event);
  }

  /// Delivers `event`, then whatever got queued meanwhile. Called with
  /// `busy` set and the handlers taken out of the state.
  fn run(&self, handlers: Handlers, mut event: Event) {
    let mut running = Running { state: &self.0.state, handlers: Some(handlers) };
    loop {
      match event {
        Event::Next(v) => {
          let Some(handlers) = running.handlers.as_mut() else { return };
          if let Err(err) = (handlers.next)(v) {
            let handlers = running.handlers.take();
            self.finish();
            if let Some(handlers) = handlers {
              (handlers.error)(err);
            }
            return;
          }
        }
        Event::Error(err) => {
          let handlers = running.handlers.take();
          self.finish();
          if let Some(handlers) = handlers {
            (handlers.error)(err);
          }
          return;
        }
        Event::Complete => {
          let handlers = running.handlers.take();
          self.finish();
          if let Some(handlers) = handlers {
            (handlers.complete)();
          }
          return;
        }
      }

      let mut state = lock(&self.0.state);
      if self.0.subscription.is_closed() {
        state.busy = false;
        state.queue.clear();
        drop(state);
        running.handlers = None;
        return;
      }
      match state.queue.pop_front() {
        Some(queued) => event = queued,
        None => {
          state.handlers = running.handlers.take();
          state.busy = false;
          return;
        }
      }
    }
  }

  fn finish(&self) {
    {
      let mut state = lock(&self.0.state);
      state.busy = false;
      state.queue.clear();
    }
    self.0.subscription.unsubscribe();
  }
}

/// Handlers on loan to the delivering thread. Still holding them on drop
/// means a handler panicked: they go back into the state and the
/// notifications queued behind the panicking one are dropped, so the next
/// notification is delivered normally.
struct Running<'a> {
  state: &'a Mutex<State>,
  handlers: Option<Handlers>,
}

impl Drop for Running<'_> {
  fn drop(&mut self) {
    if let Some(handlers) = self.handlers.take() {
      let mut state = lock(self.state);
      state.handlers = Some(handlers);
      state.busy = false;
      state.queue.clear();
    }
  }
}

impl Sink for Subscriber {
  #[inline]
  fn next(&self, value: Value) { self.emit(Event::Next(value)) }

  #[inline]
  fn error(&self, err: RxError) { self.emit(Event::Error(err)) }

  #[inline]
  fn complete(&self) { self.emit(Event::Complete) }

  #[inline]
  fn is_closed(&self) -> bool { self.0.subscription.is_closed() }
}

impl Subscriber {
  #[inline]
  pub(crate) fn next(&self, value: Value) { Sink::next(self, value) }

  #[inline]
  pub(crate) fn error(&self, err: RxError) { Sink::error(self, err) }

  #[inline]
  pub(crate) fn complete(&self) { Sink::complete(self) }

  #[inline]
  pub(crate) fn is_closed(&self) -> bool { Sink::is_closed(self) }
}

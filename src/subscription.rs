use std::{
  fmt::{Debug, Formatter},
  sync::{Arc, Mutex},
};

use smallvec::SmallVec;

use crate::{rc::lock, scheduler::TaskHandle};

/// Handle returned from `Observable::subscribe` that cancels the live
/// connection.
///
/// Cloning a `Subscription` shares the same connection. Unsubscribing is
/// idempotent and synchronous: once `unsubscribe` returns, no further
/// notification reaches the attached observer, and every resource the
/// connection registered (upstream subscriptions, pending timers, listener
/// registrations) has been released.
#[derive(Clone, Default)]
pub struct Subscription(Arc<Mutex<Inner>>);

enum Teardown {
  Subscription(Subscription),
  Task(TaskHandle),
  Fn(Box<dyn FnOnce() + Send>),
}

impl Teardown {
  fn is_closed(&self) -> bool {
    match self {
      Teardown::Subscription(s) => s.is_closed(),
      Teardown::Task(t) => t.is_closed(),
      Teardown::Fn(_) => false,
    }
  }

  fn run(self) {
    match self {
      Teardown::Subscription(s) => s.unsubscribe(),
      Teardown::Task(t) => t.cancel(),
      Teardown::Fn(f) => f(),
    }
  }
}

#[derive(Default)]
struct Inner {
  closed: bool,
  teardown: SmallVec<[Teardown; 1]>,
}

impl Subscription {
  /// Deregisters the consumer before the stream has finished.
  pub fn unsubscribe(&self) {
    let teardown = {
      let mut inner = lock(&self.0);
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.teardown)
    };
    tracing::trace!(teardown = teardown.len(), "subscription closed");
    for t in teardown {
      t.run();
    }
  }

  #[inline]
  pub fn is_closed(&self) -> bool { lock(&self.0).closed }

  /// Ties `subscription` to this one: unsubscribing `self` unsubscribes it.
  pub fn add(&self, subscription: Subscription) {
    if !Arc::ptr_eq(&self.0, &subscription.0) {
      self.add_teardown(Teardown::Subscription(subscription));
    }
  }

  /// Cancels `task` when this subscription is unsubscribed.
  pub fn add_task(&self, task: TaskHandle) { self.add_teardown(Teardown::Task(task)); }

  /// Runs `f` once when this subscription is unsubscribed.
  pub fn add_fn(&self, f: impl FnOnce() + Send + 'static) {
    self.add_teardown(Teardown::Fn(Box::new(f)));
  }

  fn add_teardown(&self, t: Teardown) {
    let rejected = {
      let mut inner = lock(&self.0);
      if inner.closed {
        Some(t)
      } else {
        inner.teardown.retain(|v| !v.is_closed());
        inner.teardown.push(t);
        None
      }
    };
    if let Some(t) = rejected {
      t.run();
    }
  }

  /// Number of live teardowns still registered.
  pub fn teardown_size(&self) -> usize { lock(&self.0).teardown.len() }

  /// Adds this subscription to `bag`; it is unsubscribed when the bag is.
  pub fn disposed_by(self, bag: &DisposeBag) { bag.add(self) }

  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard(self) }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = lock(&self.0);
    f.debug_struct("Subscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(pub(crate) Subscription);

impl SubscriptionGuard {
  pub fn new(subscription: Subscription) -> SubscriptionGuard { SubscriptionGuard(subscription) }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}

/// A scoped collection of subscriptions, disposed together.
///
/// Dropping the bag disposes every member. A subscription added after the
/// bag was disposed is unsubscribed on the spot.
#[derive(Debug, Default)]
pub struct DisposeBag(Subscription);

impl DisposeBag {
  pub fn new() -> Self { Self::default() }

  pub fn add(&self, subscription: Subscription) { self.0.add(subscription) }

  /// Unsubscribes every member. Later additions are unsubscribed
  /// immediately.
  pub fn dispose(&self) { self.0.unsubscribe() }

  pub fn is_disposed(&self) -> bool { self.0.is_closed() }

  /// Number of members that are still live.
  pub fn len(&self) -> usize {
    let inner = lock(&(self.0).0);
    inner.teardown.iter().filter(|t| !t.is_closed()).count()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Drop for DisposeBag {
  fn drop(&mut self) { self.0.unsubscribe() }
}

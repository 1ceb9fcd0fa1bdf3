use std::sync::Arc;

use crate::{observable::Observable, value::Value};

/// Registration id returned by [`ValueSource::add_listener`].
pub type ListenerId = u64;

/// Change callback registered on a [`ValueSource`].
pub type Listener = Arc<dyn Fn(Value) + Send + Sync>;

/// A mutable value that reports its changes, such as a host toolkit's
/// observable property.
pub trait ValueSource: Send + Sync {
  fn current_value(&self) -> Value;

  fn set_current_value(&self, value: Value);

  fn add_listener(&self, listener: Listener) -> ListenerId;

  fn remove_listener(&self, id: ListenerId);
}

impl Observable<Value> {
  /// Emits the current value of `source` on subscribe and every change
  /// after that.
  ///
  /// The observable holds `source` weakly: once the source is gone nothing
  /// more is emitted, and subscribing to a dead source completes right away.
  /// Disposing the subscription removes the listener.
  pub fn from_value_source<S: ValueSource + 'static>(source: &Arc<S>) -> Self {
    let weak = Arc::downgrade(source);
    Observable::from_fn(move |s| {
      let Some(source) = weak.upgrade() else {
        s.complete();
        return;
      };
      s.next(source.current_value());
      if s.is_closed() {
        return;
      }
      let c_s = s.clone();
      let id = source.add_listener(Arc::new(move |v| c_s.next(v)));
      let c_weak = weak.clone();
      s.subscription().add_fn(move || {
        if let Some(source) = c_weak.upgrade() {
          source.remove_listener(id);
        }
      });
    })
  }
}

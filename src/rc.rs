use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared, thread-safe mutable state used by operators to keep
/// per-subscription bookkeeping.
///
/// A panicking user callback poisons the lock it ran under; `MutArc` keeps
/// handing out the guard so one bad callback does not wedge the pipeline.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  #[inline]
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> { lock(&self.0) }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

/// Locks `m`, recovering the guard if a previous holder panicked.
#[inline]
pub(crate) fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn survives_poison() {
    let cell = MutArc::own(1);
    let c_cell = cell.clone();
    let _ = std::thread::spawn(move || {
      let _guard = c_cell.rc_deref_mut();
      panic!("poison the lock");
    })
    .join();
    *cell.rc_deref_mut() += 1;
    assert_eq!(*cell.rc_deref_mut(), 2);
  }
}

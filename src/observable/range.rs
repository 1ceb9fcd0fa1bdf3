use std::fmt::Display;

use crate::{error::RxError, observable::Observable, value::IntoValue};

/// Numeric types usable with [`Observable::range`].
pub trait RangeItem: Copy + PartialOrd + Display + IntoValue + Send + Sync + 'static {
  #[doc(hidden)]
  const ZERO: Self;

  /// `self + step * index`, or `None` once that overflows.
  #[doc(hidden)]
  fn nth_step(self, step: Self, index: usize) -> Option<Self>;
}

macro_rules! impl_range_int {
  ($($t:ty),*) => {
    $(
      impl RangeItem for $t {
        const ZERO: Self = 0;

        fn nth_step(self, step: Self, index: usize) -> Option<Self> {
          <$t>::try_from(index)
            .ok()
            .and_then(|i| step.checked_mul(i))
            .and_then(|offset| self.checked_add(offset))
        }
      }
    )*
  };
}

impl_range_int!(i32, i64, u32, u64, usize);

macro_rules! impl_range_float {
  ($($t:ty),*) => {
    $(
      impl RangeItem for $t {
        const ZERO: Self = 0.0;

        fn nth_step(self, step: Self, index: usize) -> Option<Self> {
          Some(self + step * index as $t)
        }
      }
    )*
  };
}

impl_range_float!(f32, f64);

impl<N: RangeItem> Observable<N> {
  /// Emits `first, first + step, ...` up to and including `last`, then
  /// completes.
  ///
  /// Fails with [`RxError::InvalidRange`] when `first > last` or the bounds
  /// do not compare (a NaN bound), and with [`RxError::InvalidStep`] when
  /// `step` is not positive.
  ///
  /// ```
  /// use rxdyn::prelude::*;
  ///
  /// let evens = Observable::range(0, 6, 2)?.to_array()?;
  /// assert_eq!(evens, vec![0, 2, 4, 6]);
  /// assert!(Observable::range(5, 1, 1).is_err());
  /// # Ok::<(), RxError>(())
  /// ```
  pub fn range(first: N, last: N, step: N) -> Result<Self, RxError> {
    if !(first <= last) {
      return Err(RxError::invalid_range(first, last));
    }
    if !(step > N::ZERO) {
      return Err(RxError::invalid_step(step));
    }
    Ok(Observable::from_fn(move |s| {
      let mut index = 0;
      while let Some(v) = first.nth_step(step, index) {
        if v > last || s.is_closed() {
          break;
        }
        s.next(v.into_value());
        index += 1;
      }
      s.complete();
    }))
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use float_cmp::approx_eq;

  #[test]
  fn inclusive() {
    assert_eq!(Observable::range(1, 5, 1).unwrap().to_array().unwrap(), vec![1, 2, 3, 4, 5]);
    assert_eq!(Observable::range(1, 6, 2).unwrap().to_array().unwrap(), vec![1, 3, 5]);
    assert_eq!(Observable::range(3u32, 3, 9).unwrap().to_array().unwrap(), vec![3]);
  }

  #[test]
  fn setup_errors() {
    assert!(matches!(Observable::range(5, 1, 1), Err(RxError::InvalidRange { .. })));
    assert!(matches!(Observable::range(1, 5, 0), Err(RxError::InvalidStep { .. })));
    assert!(matches!(Observable::range(1.0, 5.0, -0.5), Err(RxError::InvalidStep { .. })));
    assert!(matches!(Observable::range(0.0, 1.0, f64::NAN), Err(RxError::InvalidStep { .. })));
  }

  #[test]
  fn nan_bounds_rejected() {
    assert!(matches!(Observable::range(0.0, f64::NAN, 1.0), Err(RxError::InvalidRange { .. })));
    assert!(matches!(Observable::range(f64::NAN, 1.0, 1.0), Err(RxError::InvalidRange { .. })));
    assert!(matches!(Observable::range(f32::NAN, f32::NAN, 1.0), Err(RxError::InvalidRange { .. })));
  }

  #[test]
  fn float_steps_do_not_drift() {
    let values = Observable::range(0.0, 1.0, 0.1).unwrap().to_array().unwrap();
    assert_eq!(values.len(), 11);
    assert!(approx_eq!(f64, values[10], 1.0, ulps = 2));
    assert!(approx_eq!(f64, values[3], 0.3, ulps = 2));
  }

  #[test]
  fn stops_at_overflow() {
    let values = Observable::range(i64::MAX - 2, i64::MAX, 2).unwrap().to_array().unwrap();
    assert_eq!(values, vec![i64::MAX - 2, i64::MAX]);
  }

  #[test]
  fn take_cuts_emission() {
    let seen = Observable::range(1, 100, 1).unwrap().take(3).to_array().unwrap();
    assert_eq!(seen, vec![1, 2, 3]);
  }
}

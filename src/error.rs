//! Error types carried through reactive pipelines.
//!
//! [`RxError`] covers the three families of failures a pipeline can see:
//!
//! - setup errors ([`RxError::InvalidRange`], [`RxError::InvalidStep`]),
//!   returned synchronously by the call that builds the offending
//!   observable;
//! - conversion errors ([`RxError::TypeMismatch`]), delivered as a terminal
//!   `error` notification to the affected subscription;
//! - producer errors ([`RxError::Producer`], [`RxError::Message`]), raised
//!   explicitly by a producer through `on_error`.

use std::{error::Error, fmt, sync::Arc};

use thiserror::Error;

/// # Errors produced by observables, observers and subjects.
///
/// `RxError` is cheap to clone so a single error can be fanned out to every
/// subscriber of a subject.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum RxError {
  /// A range was requested whose first bound lies after its last bound.
  #[error("invalid range: first bound {first} is greater than last bound {last}")]
  InvalidRange {
    /// Rendered first bound.
    first: String,
    /// Rendered last bound.
    last: String,
  },

  /// A range was requested with a step that would never reach the end.
  #[error("invalid range step {step}: step must be greater than zero")]
  InvalidStep {
    /// Rendered step.
    step: String,
  },

  /// An erased value could not be converted to the type a stage expects.
  #[error("type mismatch: expected {expected}, found {found}")]
  TypeMismatch {
    /// Name of the type the stage declared.
    expected: &'static str,
    /// Description of the value that arrived.
    found: String,
  },

  /// An error raised by a producer.
  #[error("producer error: {0}")]
  Producer(Arc<dyn Error + Send + Sync>),

  /// A periodic operator was subscribed on a scheduler that runs tasks
  /// inline.
  #[error("periodic operators cannot run on a synchronous scheduler")]
  SynchronousScheduler,

  /// A plain message raised by a producer.
  #[error("{0}")]
  Message(String),
}

impl RxError {
  /// Wraps an arbitrary error raised by a producer.
  pub fn producer<E>(err: E) -> Self
  where
    E: Error + Send + Sync + 'static,
  {
    RxError::Producer(Arc::new(err))
  }

  /// Creates a producer error from a message.
  pub fn message(msg: impl Into<String>) -> Self { RxError::Message(msg.into()) }

  pub(crate) fn invalid_range(first: impl fmt::Display, last: impl fmt::Display) -> Self {
    RxError::InvalidRange {
      first: first.to_string(),
      last: last.to_string(),
    }
  }

  pub(crate) fn invalid_step(step: impl fmt::Display) -> Self {
    RxError::InvalidStep { step: step.to_string() }
  }

  pub(crate) fn type_mismatch(expected: &'static str, found: impl Into<String>) -> Self {
    RxError::TypeMismatch { expected, found: found.into() }
  }

  /// Returns `true` for errors raised while building an observable.
  pub fn is_setup_error(&self) -> bool {
    matches!(self, RxError::InvalidRange { .. } | RxError::InvalidStep { .. })
  }

  /// Returns a short stable label (snake_case) for use in logs.
  ///
  /// # Example
  /// ```
  /// use rxdyn::RxError;
  ///
  /// assert_eq!(RxError::message("boom").as_label(), "producer_message");
  /// ```
  pub fn as_label(&self) -> &'static str {
    match self {
      RxError::InvalidRange { .. } => "setup_invalid_range",
      RxError::InvalidStep { .. } => "setup_invalid_step",
      RxError::TypeMismatch { .. } => "type_mismatch",
      RxError::SynchronousScheduler => "synchronous_scheduler",
      RxError::Producer(_) => "producer_error",
      RxError::Message(_) => "producer_message",
    }
  }
}

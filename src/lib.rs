//! # rxdyn: Reactive Extensions over dynamic values
//!
//! Observable streams whose values travel as one erased [`Value`] type
//! through a single, monomorphic pipeline. `Observable<T>`, `Observer<T>`
//! and the typed subjects are thin typed shells that convert at the edges.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxdyn::prelude::*;
//!
//! Observable::from_iter(0..10)
//!   .filter(|v: &i32| v % 2 == 0)
//!   .map(|v: i32| v * 2)
//!   .subscribe(|v: i32| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A cold or hot stream of values and its operators |
//! | [`Observer`] | The push side: `on_next`, `on_error`, `on_completed` |
//! | [`Subject`] / [`PublishSubject`] | Hot multicast producers |
//! | [`Subscription`] / [`DisposeBag`] | Handles to cancel live subscriptions |
//! | [`Scheduler`] | Where delayed and re-dispatched notifications run |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): thread-pool scheduler from `futures`
//! - **`timer`** (default): non-blocking delays on the thread pool
//! - **`tokio-scheduler`**: a scheduler over a tokio runtime handle
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subject`]: subject::Subject
//! [`PublishSubject`]: subject::PublishSubject
//! [`Subscription`]: subscription::Subscription
//! [`DisposeBag`]: subscription::DisposeBag
//! [`Scheduler`]: scheduler::Scheduler
//! [`Value`]: value::Value

pub mod config;
pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscription;
pub mod value;
pub mod value_cell;

mod subscriber;

pub use error::RxError;
pub use prelude::*;

#[cfg(doctest)]
mod readme {
  #![doc = include_str!("../README.md")]
}

//! Operators. Each one is an inherent method on
//! [`Observable`](crate::observable::Observable) that borrows the source and
//! returns a new observable; nothing runs until that one is subscribed.

mod combine_latest;
mod concat;
mod debounce;
mod filter;
mod flat_map;
mod map;
mod merge;
mod observe_on;
mod sample;
mod scan;
mod switch_on_next;
mod take;
mod take_until;

//! Lane-striped annotation with ordered reassembly.
//!
//! A run owns `N` lanes. Lane `i` reads the whole input through its
//! own streams but only annotates the records at positions `i`, `i + N`,
//! `i + 2N` and so on. The [`Dispatcher`] walks the lanes round-robin and
//! hands out one [`Slot`] per position, which is what puts the results back
//! into input order no matter which lane finishes first.
//!
//! Each lane holds exactly one armed slot. It is re-armed for its next
//! position only when the dispatcher collects the previous slot, which
//! bounds the work in flight to `N` records.

mod annotator;
mod dispatcher;
mod lane;
mod slot;
mod subscriber;

pub use annotator::*;
pub use dispatcher::Dispatcher;
pub use slot::{Annotated, Completion, Slot};
pub use subscriber::*;

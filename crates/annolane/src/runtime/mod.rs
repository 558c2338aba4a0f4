//! Where predictor round-trips wait.
//!
//! A lane that needs a prediction builds a future that fetches it. Once the
//! prediction arrives, resolving and publishing the record is handed to
//! [`Spawner::spawn_blocking`], since resolvers may block. The [`Spawner`]
//! decides who drives both:
//!
//! - [`BlockingSpawner`] drives it on the lane thread itself. The lane is
//!   parked for the whole round-trip, so predictor concurrency never exceeds
//!   the lane count.
//! - `TokioSpawner` (feature `async-tokio`) and `SmolSpawner` (feature
//!   `async-smol`) hand it to an async runtime and return immediately, so the
//!   lane can read ahead as soon as its next handle is armed. Resolution runs
//!   on the runtime's blocking pool, never on its async workers.
//!
//! Either way a lane holds at most one uncollected handle: the future owns
//! the handle it completes, and the lane is only re-armed once the
//! dispatcher has collected the previous one.

#[cfg(feature = "async-smol")]
mod smol;
#[cfg(feature = "async-tokio")]
mod tokio;

#[cfg(feature = "async-smol")]
pub use self::smol::*;
#[cfg(feature = "async-tokio")]
pub use self::tokio::*;

use futures::future::BoxFuture;

/// Work that may block the thread it runs on.
pub type BlockingJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs resolution tasks to completion.
pub trait Spawner: Send + Sync + 'static {
    /// Takes ownership of `task` and drives it to completion, now or later.
    fn spawn(&self, task: BoxFuture<'static, ()>);

    /// Runs `job` where blocking cannot stall the tasks given to
    /// [`Spawner::spawn`]. Defaults to running it on the calling thread.
    fn spawn_blocking(&self, job: BlockingJob) {
        job();
    }
}

/// Drives each task to completion on the calling thread before returning.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockingSpawner;

impl Spawner for BlockingSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        futures::executor::block_on(task);
    }
}

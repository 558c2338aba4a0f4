use super::{BlockingJob, Spawner};
use futures::future::BoxFuture;

/// Hands resolution tasks to smol's global executor and blocking work to
/// its thread pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmolSpawner;

impl Spawner for SmolSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        smol::spawn(task).detach();
    }

    fn spawn_blocking(&self, job: BlockingJob) {
        smol::unblock(job).detach();
    }
}

use super::{BlockingJob, Spawner};
use crate::{
    engine::{Annotated, Annotator, Subscriber},
    error::{Error, Result},
    resolve::Resolver,
};
use futures::future::BoxFuture;
use tokio::{runtime::Handle, sync::mpsc};
use tokio_stream::wrappers::ReceiverStream;

/// Hands resolution tasks to a Tokio runtime and blocking work to its
/// blocking pool.
#[derive(Clone, Debug)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    pub const fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is currently running inside.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Spawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        drop(self.handle.spawn(task));
    }

    fn spawn_blocking(&self, job: BlockingJob) {
        drop(self.handle.spawn_blocking(job));
    }
}

/// Forwards results into a Tokio channel from the coordination thread.
struct StreamSubscriber<R> {
    tx: mpsc::Sender<Result<Annotated<R>>>,
}

impl<R: Send + 'static> Subscriber<R> for StreamSubscriber<R> {
    fn on_next(&mut self, item: Annotated<R>) {
        let _ = self.tx.blocking_send(Ok(item));
    }

    fn on_error(&mut self, error: Error) {
        let _ = self.tx.blocking_send(Err(error));
    }

    fn on_complete(&mut self) {}

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Extension trait for consuming a run as an async [`Stream`].
///
/// [`Stream`]: futures::Stream
pub trait AnnotatorStreamExt<R> {
    /// Starts the run and returns its results as a stream.
    ///
    /// Items arrive in position order. A fatal error is the last item; a
    /// clean run simply ends the stream. At most `buffer` results are held
    /// ahead of the consumer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Thread`] if the coordination thread cannot be
    /// spawned.
    fn into_stream(self, buffer: usize) -> Result<ReceiverStream<Result<Annotated<R>>>>;
}

impl<S: Resolver> AnnotatorStreamExt<S::Output> for Annotator<S> {
    fn into_stream(self, buffer: usize) -> Result<ReceiverStream<Result<Annotated<S::Output>>>> {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        // Detached: the coordination thread stops once the run ends or the
        // stream is dropped.
        drop(self.subscribe(StreamSubscriber { tx })?);
        Ok(ReceiverStream::new(rx))
    }
}

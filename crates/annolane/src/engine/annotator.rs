use super::{
    dispatcher::{Dispatcher, LaneHandle},
    lane::Lane,
    slot::{Annotated, Completion},
    subscriber::Subscriber,
};
use crate::{
    config::AnnotatorConfig,
    error::{Error, Result},
    resolve::{Predictor, Resolver},
    runtime::{BlockingSpawner, Spawner},
    source::VariantSource,
};
use core::iter::FusedIterator;
use portable_atomic::AtomicBool;
use std::{sync::Arc, thread::JoinHandle};

/// Builds and starts annotation runs.
///
/// ```
/// use annolane::{Annotator, AnnotatorConfig, MemorySource, resolver_fn};
/// # use annolane::{Chromosome, CustomVariant, Locus, Variant};
/// # let variants: Vec<Variant> = (1..=3)
/// #     .map(|start| CustomVariant {
/// #         locus: Locus::new(Chromosome::Numbered(1), start, start),
/// #         reference: "A".into(),
/// #         alternate: "G".into(),
/// #     }.into())
/// #     .collect();
///
/// let annotator = Annotator::new(
///     MemorySource::new(variants),
///     resolver_fn(|record| Ok(record.locus().start)),
/// )
/// .with_config(AnnotatorConfig::new(2));
///
/// // Records without a pre-supplied prediction fail individually when no
/// // predictor is configured; the run itself still completes.
/// let results: Vec<_> = annotator.results()?.collect::<Result<_, _>>()?;
/// assert_eq!(results.len(), 3);
/// assert!(results.iter().all(|r| r.is_failed()));
/// # Ok::<(), annolane::Error>(())
/// ```
pub struct Annotator<S: Resolver> {
    config: AnnotatorConfig,
    source: Arc<dyn VariantSource>,
    resolver: Arc<S>,
    predictor: Option<Arc<dyn Predictor>>,
    spawner: Arc<dyn Spawner>,
}

impl<S: Resolver> Annotator<S> {
    /// An annotator over `source` with the default configuration, no
    /// predictor and the [`BlockingSpawner`].
    pub fn new(source: impl VariantSource + 'static, resolver: S) -> Self {
        Self {
            config: AnnotatorConfig::default(),
            source: Arc::new(source),
            resolver: Arc::new(resolver),
            predictor: None,
            spawner: Arc::new(BlockingSpawner),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: AnnotatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the predictor consulted for records that have no secondary
    /// record.
    #[must_use]
    pub fn with_predictor(mut self, predictor: impl Predictor) -> Self {
        self.predictor = Some(Arc::new(predictor));
        self
    }

    /// Sets who drives predictor round-trips.
    #[must_use]
    pub fn with_spawner(mut self, spawner: impl Spawner) -> Self {
        self.spawner = Arc::new(spawner);
        self
    }

    pub const fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Opens one pair of streams per lane and starts the lane threads.
    ///
    /// # Errors
    ///
    /// Fails without starting any lane if the configuration is invalid or
    /// the source cannot be opened. Fails with [`Error::Thread`] if a lane
    /// thread cannot be spawned; lanes already started are shut down.
    pub fn start(self) -> Result<LanePool<S::Output>> {
        self.config.validate()?;
        let workers = self.config.workers;
        let stride = workers as u64;

        let streams = (0..workers)
            .map(|_| self.source.open())
            .collect::<Result<Vec<_>>>()?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            workers,
            start_position = self.config.start_position,
            predictor = self.predictor.is_some(),
            "starting lanes"
        );

        let mut handles = Vec::with_capacity(workers);
        let mut threads = Vec::with_capacity(workers);
        for (index, streams) in streams.into_iter().enumerate() {
            let first_position = self.config.start_position.saturating_add(index as u64);
            let completed = Arc::new(AtomicBool::new(false));
            let (arm_tx, arm_rx) = crossbeam_channel::bounded(1);

            let lane = Lane::new(
                index,
                first_position,
                stride,
                streams,
                Arc::clone(&completed),
                arm_rx,
                Arc::clone(&self.resolver),
                self.predictor.clone(),
                Arc::clone(&self.spawner),
            );
            let thread = std::thread::Builder::new()
                .name(format!("annolane-lane-{index}"))
                .spawn(move || lane.run())
                .map_err(|e| Error::Thread {
                    context: format!("lane {index}: {e}"),
                })?;

            threads.push(thread);
            handles.push(LaneHandle::new(
                index,
                first_position,
                stride,
                completed,
                arm_tx,
            ));
        }

        Ok(LanePool {
            dispatcher: Dispatcher::new(handles),
            threads,
        })
    }

    /// Starts the run and returns its results as a blocking iterator.
    ///
    /// # Errors
    ///
    /// See [`Annotator::start`].
    pub fn results(self) -> Result<Results<S::Output>> {
        self.start().map(LanePool::into_results)
    }

    /// Starts the run on a dedicated coordination thread that pushes every
    /// result to `subscriber`.
    ///
    /// The subscriber sees `on_next` zero or more times in position order,
    /// then exactly one of `on_error` or `on_complete`. Errors raised while
    /// starting the run are delivered through `on_error` as well.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Thread`] if the coordination thread cannot be
    /// spawned.
    pub fn subscribe<T>(self, subscriber: T) -> Result<JoinHandle<()>>
    where
        T: Subscriber<S::Output>,
    {
        std::thread::Builder::new()
            .name("annolane-coordinator".to_owned())
            .spawn(move || {
                let mut subscriber = subscriber;
                match self.results() {
                    Ok(results) => results.drive(&mut subscriber),
                    Err(e) => subscriber.on_error(e),
                }
            })
            .map_err(|e| Error::Thread {
                context: format!("coordinator: {e}"),
            })
    }
}

impl<S: Resolver> core::fmt::Debug for Annotator<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Annotator")
            .field("config", &self.config)
            .field("predictor", &self.predictor.is_some())
            .finish_non_exhaustive()
    }
}

/// Running lanes and the dispatcher that drives them.
///
/// Dropping the pool disconnects the lanes and joins their threads.
#[derive(Debug)]
pub struct LanePool<R> {
    dispatcher: Dispatcher<R>,
    threads: Vec<JoinHandle<()>>,
}

impl<R> LanePool<R> {
    pub const fn dispatcher(&self) -> &Dispatcher<R> {
        &self.dispatcher
    }

    pub fn into_results(self) -> Results<R> {
        Results {
            pool: self,
            done: false,
        }
    }
}

impl<R> Drop for LanePool<R> {
    fn drop(&mut self) {
        self.dispatcher.close();
        for thread in self.threads.drain(..) {
            if thread.join().is_err() {
                #[cfg(feature = "tracing")]
                tracing::error!("lane thread panicked");
            }
        }
    }
}

/// Results of a run in position order.
///
/// Yields `Ok` for every record, failed or not, and ends after the input is
/// exhausted. A fatal error is yielded once as `Err` and ends the iteration.
#[derive(Debug)]
pub struct Results<R> {
    pool: LanePool<R>,
    done: bool,
}

impl<R> Results<R> {
    fn drive(mut self, subscriber: &mut impl Subscriber<R>) {
        loop {
            if subscriber.is_closed() {
                #[cfg(feature = "tracing")]
                tracing::debug!("subscriber closed; stopping run");
                return;
            }
            let Some(result) = self.next() else {
                break;
            };
            match result {
                Ok(annotated) => subscriber.on_next(annotated),
                Err(e) => {
                    subscriber.on_error(e);
                    return;
                }
            }
        }
        subscriber.on_complete();
    }
}

impl<R> Iterator for Results<R> {
    type Item = Result<Annotated<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.pool.dispatcher.next().wait() {
            Completion::Annotated(annotated) => Some(Ok(annotated)),
            Completion::End => {
                self.done = true;
                None
            }
            Completion::Fatal(e) => {
                #[cfg(feature = "tracing")]
                tracing::error!("run aborted: {e}");
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R> FusedIterator for Results<R> {}

//! A lane owns one stripe of the input.
//!
//! Lane `i` of `N` produces the records at positions `start + i`,
//! `start + i + N`, `start + i + 2N` and so on. It waits on its arm channel
//! for the publisher of its next position, advances its private streams to
//! that record, and publishes the outcome through the publisher. Stream
//! errors are published as [`Completion::Fatal`] at the position that raised
//! them; the lane then stops reading and answers every later arm with
//! [`Completion::End`].

use super::slot::{Annotated, Completion, Publisher};
use crate::{
    error::{Error, ResolveError, Result, Side},
    pairing::PairedRecord,
    resolve::{Predictor, Resolver},
    runtime::Spawner,
    source::Streams,
};
use crossbeam_channel::Receiver;
use portable_atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub(crate) struct Lane<S: Resolver> {
    index: usize,
    stride: u64,
    /// Records consumed by the first step: every record before this lane's
    /// first position, plus the record itself.
    first_step: u64,
    started: bool,
    streams: Streams,
    completed: Arc<AtomicBool>,
    arms: Receiver<Publisher<S::Output>>,
    resolver: Arc<S>,
    predictor: Option<Arc<dyn Predictor>>,
    spawner: Arc<dyn Spawner>,
}

impl<S: Resolver> Lane<S> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        index: usize,
        first_position: u64,
        stride: u64,
        streams: Streams,
        completed: Arc<AtomicBool>,
        arms: Receiver<Publisher<S::Output>>,
        resolver: Arc<S>,
        predictor: Option<Arc<dyn Predictor>>,
        spawner: Arc<dyn Spawner>,
    ) -> Self {
        Self {
            index,
            stride,
            first_step: first_position.saturating_add(1),
            started: false,
            streams,
            completed,
            arms,
            resolver,
            predictor,
            spawner,
        }
    }

    /// Serves arms until the dispatcher goes away.
    pub(crate) fn run(mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(lane = self.index, "lane started");

        while let Ok(publisher) = self.arms.recv() {
            if self.completed.load(Ordering::Acquire) {
                publisher.complete(Completion::End);
                continue;
            }

            let position = publisher.position();
            match self.advance(position) {
                Ok(Some(record)) => self.resolve(position, record, publisher),
                Ok(None) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(lane = self.index, position, "input exhausted");
                    self.completed.store(true, Ordering::Release);
                    publisher.complete(Completion::End);
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(lane = self.index, position, "lane stopped: {e}");
                    self.completed.store(true, Ordering::Release);
                    publisher.complete(Completion::Fatal(e));
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(lane = self.index, "lane shut down");
    }

    /// Moves the streams forward to the record at `position`.
    ///
    /// Returns `Ok(None)` once the primary input is exhausted.
    fn advance(&mut self, position: u64) -> Result<Option<PairedRecord>> {
        let steps = if self.started {
            self.stride
        } else {
            self.first_step
        };
        self.started = true;

        let mut current = None;
        for _ in 0..steps {
            let Some(variant) = self.streams.primary.next() else {
                self.ensure_secondary_exhausted(position)?;
                return Ok(None);
            };
            let variant = variant?;

            let prediction = match self.streams.secondary.as_mut() {
                Some(secondary) if variant.expects_secondary() => match secondary.next() {
                    Some(prediction) => Some(prediction?),
                    None => {
                        return Err(Error::CountMismatch {
                            position,
                            side: Side::Secondary,
                        });
                    }
                },
                _ => None,
            };
            current = Some((variant, prediction));
        }

        match current {
            Some((variant, Some(prediction))) => {
                PairedRecord::pair(position, variant, prediction).map(Some)
            }
            Some((variant, None)) => Ok(Some(PairedRecord::unpaired(variant))),
            None => Ok(None),
        }
    }

    fn ensure_secondary_exhausted(&mut self, position: u64) -> Result<()> {
        let Some(secondary) = self.streams.secondary.as_mut() else {
            return Ok(());
        };
        match secondary.next() {
            None => Ok(()),
            Some(Ok(_)) => Err(Error::CountMismatch {
                position,
                side: Side::Primary,
            }),
            Some(Err(e)) => Err(e),
        }
    }

    fn resolve(&self, position: u64, mut record: PairedRecord, publisher: Publisher<S::Output>) {
        if record.prediction().is_some() {
            let outcome = self.resolver.resolve(&record);
            publish(self.index, position, record, outcome, publisher);
            return;
        }

        let Some(predictor) = self.predictor.as_ref() else {
            let outcome = Err(ResolveError::NoPredictor {
                kind: record.variant().kind().as_str(),
                locus: record.locus().to_string(),
            });
            publish(self.index, position, record, outcome, publisher);
            return;
        };

        let fetch = predictor.fetch_payload(record.locus(), record.variant().allele());
        let resolver = Arc::clone(&self.resolver);
        let spawner = Arc::clone(&self.spawner);
        let lane = self.index;
        self.spawner.spawn(Box::pin(async move {
            match fetch.await {
                Ok(prediction) => spawner.spawn_blocking(Box::new(move || {
                    let outcome = record
                        .attach(prediction)
                        .and_then(|()| resolver.resolve(&record));
                    publish(lane, position, record, outcome, publisher);
                })),
                Err(e) => publish(lane, position, record, Err(e), publisher),
            }
        }));
    }
}

fn publish<R>(
    lane: usize,
    position: u64,
    record: PairedRecord,
    outcome: core::result::Result<R, ResolveError>,
    publisher: Publisher<R>,
) {
    #[cfg(feature = "tracing")]
    if let Err(e) = &outcome {
        tracing::warn!(lane, position, "record failed: {e}");
    }
    #[cfg(not(feature = "tracing"))]
    let _ = lane;

    let (variant, _) = record.into_parts();
    publisher.complete(Completion::Annotated(Annotated {
        position,
        variant,
        outcome,
    }));
}

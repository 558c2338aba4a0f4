use crate::{
    error::{Error, ResolveError},
    variant::Variant,
};
use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use futures::channel::oneshot;

/// One record of the ordered output.
#[derive(Clone, Debug)]
pub struct Annotated<R> {
    /// 0-based ordinal of the record in the primary input.
    pub position: u64,
    pub variant: Variant,
    /// The resolver's output, or why this record alone could not be
    /// annotated.
    pub outcome: Result<R, ResolveError>,
}

impl<R> Annotated<R> {
    pub const fn is_failed(&self) -> bool {
        self.outcome.is_err()
    }
}

/// What a [`Slot`] resolves to.
#[derive(Debug)]
pub enum Completion<R> {
    /// The record at the slot's position, annotated or failed.
    Annotated(Annotated<R>),
    /// The lane has no record at this position: the input is exhausted.
    End,
    /// The run cannot continue past this position.
    Fatal(Error),
}

/// A single-assignment handle to the outcome at one global position.
///
/// Slots are handed out by the [`Dispatcher`](super::Dispatcher) in strictly
/// increasing position order. Wait on one with [`Slot::wait`] or `.await` it.
#[derive(Debug)]
#[must_use = "a slot does nothing unless waited on"]
pub struct Slot<R> {
    lane: usize,
    position: u64,
    rx: oneshot::Receiver<Completion<R>>,
}

impl<R> Slot<R> {
    /// A slot that already holds its completion.
    pub(crate) fn resolved(lane: usize, position: u64, completion: Completion<R>) -> Self {
        let (slot, publisher) = pair(lane, position);
        publisher.complete(completion);
        slot
    }

    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Index of the lane that owns this slot's position.
    pub const fn lane(&self) -> usize {
        self.lane
    }

    /// Blocks the current thread until the slot is completed.
    ///
    /// A slot whose lane went away without completing it resolves to
    /// [`Error::LaneTerminated`].
    pub fn wait(self) -> Completion<R> {
        futures::executor::block_on(self)
    }
}

impl<R> Future for Slot<R> {
    type Output = Completion<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let (lane, position) = (self.lane, self.position);
        Pin::new(&mut self.rx).poll(cx).map(|completion| {
            completion.unwrap_or_else(|_| Completion::Fatal(Error::LaneTerminated { lane, position }))
        })
    }
}

/// The writing end of a [`Slot`], owned by whoever completes the record.
#[derive(Debug)]
pub(crate) struct Publisher<R> {
    #[cfg(feature = "tracing")]
    lane: usize,
    position: u64,
    tx: oneshot::Sender<Completion<R>>,
}

impl<R> Publisher<R> {
    pub(crate) const fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn complete(self, completion: Completion<R>) {
        if self.tx.send(completion).is_err() {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                lane = self.lane,
                position = self.position,
                "slot dropped before completion; discarding"
            );
        }
    }
}

/// Creates a connected slot and publisher for `position`.
pub(crate) fn pair<R>(lane: usize, position: u64) -> (Slot<R>, Publisher<R>) {
    let (tx, rx) = oneshot::channel();
    (
        Slot { lane, position, rx },
        Publisher {
            #[cfg(feature = "tracing")]
            lane,
            position,
            tx,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_slot_is_immediately_ready() {
        let slot: Slot<()> = Slot::resolved(1, 9, Completion::End);
        assert_eq!(slot.position(), 9);
        assert_eq!(slot.lane(), 1);
        assert!(matches!(slot.wait(), Completion::End));
    }

    #[test]
    fn dropped_publisher_terminates_the_slot() {
        let (slot, publisher) = pair::<()>(3, 11);
        drop(publisher);
        assert!(matches!(
            slot.wait(),
            Completion::Fatal(Error::LaneTerminated {
                lane: 3,
                position: 11
            })
        ));
    }

    #[test]
    fn publisher_completes_across_threads() {
        let (slot, publisher) = pair::<u32>(0, 0);
        let variant: Variant = crate::variant::CustomVariant {
            locus: crate::variant::Locus::new(crate::variant::Chromosome::X, 1, 1),
            reference: "A".to_owned(),
            alternate: "T".to_owned(),
        }
        .into();
        std::thread::spawn(move || {
            publisher.complete(Completion::Annotated(Annotated {
                position: 0,
                variant,
                outcome: Ok(5),
            }));
        });
        match slot.wait() {
            Completion::Annotated(a) => assert_eq!(a.outcome, Ok(5)),
            other => panic!("unexpected completion: {other:?}"),
        }
    }
}

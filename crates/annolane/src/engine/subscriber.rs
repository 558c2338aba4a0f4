use super::slot::Annotated;
use crate::error::Error;
use crossbeam_channel::{Receiver, Sender};

/// Receives the results of a run pushed from the coordination thread.
pub trait Subscriber<R>: Send + 'static {
    /// Called once per record in position order, including failed records.
    fn on_next(&mut self, item: Annotated<R>);

    /// The run was aborted. No further calls follow.
    fn on_error(&mut self, error: Error);

    /// Every record was delivered. No further calls follow.
    fn on_complete(&mut self);

    /// Returns `true` once the subscriber no longer wants results. The run
    /// is then stopped without a terminal call.
    fn is_closed(&self) -> bool {
        false
    }
}

/// What a [`ChannelSubscriber`] forwards.
#[derive(Debug)]
pub enum Event<R> {
    Next(Annotated<R>),
    Error(Error),
    Complete,
}

/// A [`Subscriber`] that forwards every call as an [`Event`] over a channel.
///
/// Once a send fails because the receiver was dropped, the subscriber
/// reports itself closed and the run stops.
#[derive(Debug)]
pub struct ChannelSubscriber<R> {
    tx: Sender<Event<R>>,
    closed: bool,
}

impl<R> ChannelSubscriber<R> {
    /// A subscriber with an unbounded queue.
    pub fn unbounded() -> (Self, Receiver<Event<R>>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx, closed: false }, rx)
    }

    /// A subscriber that holds at most `capacity` undelivered events. The
    /// run stalls while the queue is full.
    pub fn bounded(capacity: usize) -> (Self, Receiver<Event<R>>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx, closed: false }, rx)
    }
}

impl<R> ChannelSubscriber<R> {
    fn forward(&mut self, event: Event<R>) {
        if self.tx.send(event).is_err() {
            self.closed = true;
        }
    }
}

impl<R: Send + 'static> Subscriber<R> for ChannelSubscriber<R> {
    fn on_next(&mut self, item: Annotated<R>) {
        self.forward(Event::Next(item));
    }

    fn on_error(&mut self, error: Error) {
        self.forward(Event::Error(error));
    }

    fn on_complete(&mut self) {
        self.forward(Event::Complete);
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

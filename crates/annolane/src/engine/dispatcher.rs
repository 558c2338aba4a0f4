use super::slot::{self, Completion, Publisher, Slot};
use crossbeam_channel::Sender;
#[cfg(not(feature = "cache-padded"))]
use parking_lot::Mutex;
use portable_atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The dispatcher's end of one lane: the slot the lane is currently armed
/// with, and the channel used to arm it again.
pub(crate) struct LaneHandle<R> {
    index: usize,
    stride: u64,
    next_position: u64,
    current: Slot<R>,
    completed: Arc<AtomicBool>,
    arms: Sender<Publisher<R>>,
}

impl<R> LaneHandle<R> {
    /// Creates the handle and arms the lane for `first_position`.
    pub(crate) fn new(
        index: usize,
        first_position: u64,
        stride: u64,
        completed: Arc<AtomicBool>,
        arms: Sender<Publisher<R>>,
    ) -> Self {
        let current = arm(index, first_position, &completed, &arms);
        Self {
            index,
            stride,
            next_position: first_position.saturating_add(stride),
            current,
            completed,
            arms,
        }
    }

    /// Arms the lane for its next position and returns the slot it was armed
    /// with before.
    fn rotate(&mut self) -> Slot<R> {
        let next = arm(
            self.index,
            self.next_position,
            &self.completed,
            &self.arms,
        );
        self.next_position = self.next_position.saturating_add(self.stride);
        core::mem::replace(&mut self.current, next)
    }
}

fn arm<R>(
    index: usize,
    position: u64,
    completed: &AtomicBool,
    arms: &Sender<Publisher<R>>,
) -> Slot<R> {
    if completed.load(Ordering::Acquire) {
        return Slot::resolved(index, position, Completion::End);
    }
    let (slot, publisher) = slot::pair(index, position);
    // A closed channel drops the publisher, which resolves the slot to
    // `LaneTerminated`.
    let _ = arms.send(publisher);
    slot
}

struct Rotation<R> {
    lanes: Vec<LaneHandle<R>>,
    cursor: usize,
}

/// Hands out slots in global position order.
///
/// Every call to [`Dispatcher::next`] returns the slot for the next position,
/// taken round-robin from the lanes, and re-arms the lane it came from. The
/// whole step happens under one lock, so concurrent callers still receive
/// strictly consecutive positions.
pub struct Dispatcher<R> {
    #[cfg(feature = "cache-padded")]
    rotation: crossbeam_utils::CachePadded<parking_lot::Mutex<Rotation<R>>>,
    #[cfg(not(feature = "cache-padded"))]
    rotation: Mutex<Rotation<R>>,
    lanes: usize,
}

impl<R> Dispatcher<R> {
    /// `lanes` must be non-empty and ordered by lane index.
    pub(crate) fn new(lanes: Vec<LaneHandle<R>>) -> Self {
        debug_assert!(!lanes.is_empty());
        let count = lanes.len();
        let rotation = Rotation { lanes, cursor: 0 };
        Self {
            #[cfg(feature = "cache-padded")]
            rotation: crossbeam_utils::CachePadded::new(parking_lot::Mutex::new(rotation)),
            #[cfg(not(feature = "cache-padded"))]
            rotation: Mutex::new(rotation),
            lanes: count,
        }
    }

    /// Returns the slot for the next position.
    ///
    /// Once the input is exhausted every further slot resolves to
    /// [`Completion::End`].
    pub fn next(&self) -> Slot<R> {
        let mut rotation = self.rotation.lock();
        let cursor = rotation.cursor;
        rotation.cursor = (cursor + 1) % rotation.lanes.len();
        rotation.lanes[cursor].rotate()
    }

    /// Number of lanes.
    pub const fn lanes(&self) -> usize {
        self.lanes
    }

    /// Disconnects every lane. Lanes finish their current record and exit.
    pub(crate) fn close(&self) {
        self.rotation.lock().lanes.clear();
    }
}

impl<R> core::fmt::Debug for Dispatcher<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("lanes", &self.lanes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detached(count: usize) -> (Dispatcher<()>, Vec<crossbeam_channel::Receiver<Publisher<()>>>) {
        let mut lanes = Vec::new();
        let mut receivers = Vec::new();
        for index in 0..count {
            let (tx, rx) = crossbeam_channel::unbounded();
            let completed = Arc::new(AtomicBool::new(false));
            lanes.push(LaneHandle::new(index, index as u64, count as u64, completed, tx));
            receivers.push(rx);
        }
        (Dispatcher::new(lanes), receivers)
    }

    #[test]
    fn slots_rotate_through_lanes_in_position_order() {
        let (dispatcher, receivers) = detached(3);
        for expected in 0..6u64 {
            let slot = dispatcher.next();
            assert_eq!(slot.position(), expected);
            assert_eq!(slot.lane(), (expected % 3) as usize);
            // answer the arm that produced this slot
            let publisher = receivers[slot.lane()].recv().unwrap();
            assert_eq!(publisher.position(), expected);
            publisher.complete(Completion::End);
            assert!(matches!(slot.wait(), Completion::End));
        }
        assert_eq!(dispatcher.lanes(), 3);
    }

    #[test]
    fn completed_lane_is_not_armed_again() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let completed = Arc::new(AtomicBool::new(false));
        let dispatcher = Dispatcher::<()>::new(vec![LaneHandle::new(
            0,
            0,
            1,
            Arc::clone(&completed),
            tx,
        )]);

        rx.recv().unwrap().complete(Completion::End);
        completed.store(true, Ordering::Release);

        // the slot for position 0 was armed before completion
        assert!(matches!(dispatcher.next().wait(), Completion::End));
        // position 1 was resolved without touching the channel
        assert!(rx.try_recv().is_err());
        assert!(matches!(dispatcher.next().wait(), Completion::End));
    }

    #[test]
    fn closed_lane_terminates_its_slots() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        drop(rx);
        let completed = Arc::new(AtomicBool::new(false));
        let dispatcher = Dispatcher::<()>::new(vec![LaneHandle::new(0, 0, 1, completed, tx)]);
        match dispatcher.next().wait() {
            Completion::Fatal(crate::Error::LaneTerminated { lane, position }) => {
                assert_eq!((lane, position), (0, 0));
            }
            other => panic!("unexpected completion: {other:?}"),
        }
    }
}

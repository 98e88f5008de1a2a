use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::VecDeque;

use crate::containers::KeyedVec;
use crate::packing_asserts::packing_assert_moderate;
use crate::propagation::Priority;
use crate::propagation::PropagatorId;

/// The propagators waiting to be called, grouped by [`Priority`]. Within a priority level
/// propagators are called in the order in which they were enqueued.
#[derive(Debug, Clone)]
pub(crate) struct PropagatorQueue {
    queues: Vec<VecDeque<PropagatorId>>,
    is_enqueued: KeyedVec<PropagatorId, bool>,
    num_enqueued: usize,
    present_priorities: BinaryHeap<Reverse<u8>>,
}

impl Default for PropagatorQueue {
    fn default() -> Self {
        Self::new(4)
    }
}

impl PropagatorQueue {
    pub(crate) fn new(num_priority_levels: usize) -> PropagatorQueue {
        PropagatorQueue {
            queues: vec![VecDeque::new(); num_priority_levels],
            is_enqueued: KeyedVec::default(),
            num_enqueued: 0,
            present_priorities: BinaryHeap::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.num_enqueued == 0
    }

    pub(crate) fn enqueue_propagator(&mut self, propagator_id: PropagatorId, priority: Priority) {
        packing_assert_moderate!((priority as usize) < self.queues.len());

        if self.is_propagator_enqueued(propagator_id) {
            return;
        }

        while self.is_enqueued.len() <= propagator_id.0 as usize {
            let _ = self.is_enqueued.push(false);
        }
        self.is_enqueued[propagator_id] = true;
        self.num_enqueued += 1;

        if self.queues[priority as usize].is_empty() {
            self.present_priorities.push(Reverse(priority as u8));
        }
        self.queues[priority as usize].push_back(propagator_id);
    }

    pub(crate) fn pop(&mut self) -> Option<PropagatorId> {
        let Reverse(top_priority) = *self.present_priorities.peek()?;
        let top_priority = top_priority as usize;
        packing_assert_moderate!(!self.queues[top_priority].is_empty());

        let next_propagator_id = self.queues[top_priority].pop_front();

        if let Some(propagator_id) = next_propagator_id {
            self.is_enqueued[propagator_id] = false;
            self.num_enqueued -= 1;
        }

        if self.queues[top_priority].is_empty() {
            let _ = self.present_priorities.pop();
        }

        next_propagator_id
    }

    pub(crate) fn clear(&mut self) {
        for queue in self.queues.iter_mut() {
            queue.clear();
        }

        for is_propagator_enqueued in self.is_enqueued.iter_mut() {
            *is_propagator_enqueued = false;
        }

        self.present_priorities.clear();
        self.num_enqueued = 0;
    }

    pub(crate) fn is_propagator_enqueued(&self, propagator_id: PropagatorId) -> bool {
        (propagator_id.0 as usize) < self.is_enqueued.len() && self.is_enqueued[propagator_id]
    }
}

use std::fmt::Debug;
use std::ops::Index;
use std::ops::IndexMut;

use super::Propagator;
use super::PropagatorHandle;
use super::PropagatorId;
use crate::containers::KeyedVec;

/// Owns the propagators of the [`crate::state::State`], keyed by their [`PropagatorId`].
#[derive(Default)]
pub(crate) struct PropagatorStore {
    propagators: KeyedVec<PropagatorId, Box<dyn Propagator>>,
}

impl PropagatorStore {
    pub(crate) fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    /// The id the next added propagator receives.
    pub(crate) fn next_id(&self) -> PropagatorId {
        self.propagators.next_key()
    }

    pub(crate) fn add(&mut self, propagator: Box<dyn Propagator>) -> PropagatorId {
        self.propagators.push(propagator)
    }

    pub(crate) fn iter_propagators(&self) -> impl Iterator<Item = &dyn Propagator> + '_ {
        self.propagators.iter().map(Box::as_ref)
    }

    pub(crate) fn iter_propagators_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut Box<dyn Propagator>> + '_ {
        self.propagators.iter_mut()
    }

    /// The propagator behind `handle`, or `None` if it has a different type.
    pub(crate) fn get_propagator<P: Propagator>(&self, handle: PropagatorHandle<P>) -> Option<&P> {
        self[handle.propagator_id()].downcast_ref()
    }
}

impl Index<PropagatorId> for PropagatorStore {
    type Output = dyn Propagator;

    fn index(&self, id: PropagatorId) -> &Self::Output {
        self.propagators[id].as_ref()
    }
}

impl IndexMut<PropagatorId> for PropagatorStore {
    fn index_mut(&mut self, id: PropagatorId) -> &mut Self::Output {
        self.propagators[id].as_mut()
    }
}

impl Debug for PropagatorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter_propagators().map(|propagator| propagator.name()))
            .finish()
    }
}

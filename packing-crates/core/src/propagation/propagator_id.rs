use std::marker::PhantomData;

use super::LocalId;
use crate::containers::impl_storage_key;
#[cfg(doc)]
use crate::state::State;

/// An identifier to a propagator instance within the [`State`].
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct PropagatorId(pub(crate) u32);

impl std::fmt::Display for PropagatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PropagatorId({})", self.0)
    }
}

impl_storage_key!(PropagatorId);

/// A variable as it is known to one of the propagators watching it.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub(crate) struct PropagatorVarId {
    pub(crate) propagator: PropagatorId,
    pub(crate) variable: LocalId,
}

/// A typed handle to a propagator added to the [`State`]; it can be used to retrieve the
/// concrete propagator again.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PropagatorHandle<P> {
    id: PropagatorId,
    propagator: PhantomData<P>,
}

impl<P> PropagatorHandle<P> {
    pub(crate) fn new(id: PropagatorId) -> Self {
        PropagatorHandle {
            id,
            propagator: PhantomData,
        }
    }

    /// Get the type-erased [`PropagatorId`] of the propagator.
    pub fn propagator_id(self) -> PropagatorId {
        self.id
    }
}

// Implemented by hand so that `P` is not required to implement `Clone` and `Copy`.
impl<P> Clone for PropagatorHandle<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for PropagatorHandle<P> {}

use super::Domains;
use super::LocalId;
use super::Propagator;
use super::PropagatorId;
use super::PropagatorVarId;
use crate::engine::Assignments;
use crate::engine::TrailedBitSet;
use crate::engine::TrailedInteger;
use crate::engine::TrailedValues;
use crate::engine::variables::DomainId;
use crate::propagation::DomainEvents;
use crate::propagation::HasAssignments;
use crate::propagation::HasTrailedValues;
use crate::state::State;

/// A propagator constructor creates a fully initialized instance of a [`Propagator`].
///
/// The constructor is responsible for indicating on which events the propagator should be
/// enqueued, and for allocating the trailed bookkeeping of the propagator. The constructor
/// cannot change any domain; the first call to [`Propagator::propagate`] does that.
pub trait PropagatorConstructor {
    /// The propagator that is produced by this constructor.
    type PropagatorImpl: Propagator;

    /// Create the propagator instance from `Self`.
    fn create(self, context: PropagatorConstructorContext) -> Self::PropagatorImpl;
}

/// [`PropagatorConstructorContext`] is used when [`Propagator`]s are initialised after creation.
///
/// It represents a communication point between the [`State`] and the [`Propagator`].
/// Propagators use the [`PropagatorConstructorContext`] to register to domain changes
/// of variables and to retrieve the current bounds of variables.
#[derive(Debug)]
pub struct PropagatorConstructorContext<'a> {
    state: &'a mut State,
    pub(crate) propagator_id: PropagatorId,
}

impl PropagatorConstructorContext<'_> {
    pub(crate) fn new(
        propagator_id: PropagatorId,
        state: &mut State,
    ) -> PropagatorConstructorContext<'_> {
        PropagatorConstructorContext {
            propagator_id,
            state,
        }
    }

    /// Subscribes the propagator to the given [`DomainEvents`].
    ///
    /// The domain events determine when [`Propagator::notify()`] will be called on the
    /// propagator. The [`LocalId`] is the identifier of `var` in the propagator; it is passed
    /// back to [`Propagator::notify()`].
    pub fn register(&mut self, var: DomainId, domain_events: DomainEvents, local_id: LocalId) {
        let propagator_var = PropagatorVarId {
            propagator: self.propagator_id,
            variable: local_id,
        };

        self.state
            .notification_engine
            .watch_all(var, domain_events.get_events(), propagator_var);
    }

    pub fn domains(&self) -> Domains<'_> {
        Domains::new(&self.state.assignments, &self.state.trailed_values)
    }

    /// The checkpoint at which the propagator is being installed.
    pub fn get_checkpoint(&self) -> usize {
        self.state.get_checkpoint()
    }

    /// Allocates a [`TrailedInteger`] with the given initial value.
    pub fn new_trailed_integer(&mut self, initial_value: i64) -> TrailedInteger {
        self.state.trailed_values.grow(initial_value)
    }

    /// Allocates an empty [`TrailedBitSet`] which can hold the indices `0..capacity`.
    pub fn new_trailed_bit_set(&mut self, capacity: usize) -> TrailedBitSet {
        TrailedBitSet::new(&mut self.state.trailed_values, capacity)
    }
}

impl HasAssignments for PropagatorConstructorContext<'_> {
    fn assignments(&self) -> &Assignments {
        &self.state.assignments
    }

    fn trailed_values(&self) -> &TrailedValues {
        &self.state.trailed_values
    }
}

impl HasTrailedValues for PropagatorConstructorContext<'_> {
    fn trailed_values_mut(&mut self) -> &mut TrailedValues {
        &mut self.state.trailed_values
    }
}
